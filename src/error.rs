use std::path::PathBuf;

use thiserror::Error;

/// Library error type for theme extraction and application.
#[derive(Debug, Error)]
pub enum Error {
    /// The wallpaper could not be read or decoded.
    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The decoded image has no pixels.
    #[error("image has no pixels")]
    EmptyImage,

    /// K-means was asked for zero clusters.
    #[error("cluster count must be at least 1, got {0}")]
    InvalidClusterCount(usize),

    /// K-means was handed an empty point set.
    #[error("no colour points to cluster")]
    NoPoints,

    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML configuration error.
    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No `Image=` entry for the current activity.
    #[error("no wallpaper found in plasma config; have you set one yet?")]
    WallpaperNotFound,

    /// The configured wallpaper does not exist on disk.
    #[error("wallpaper appears to be {} but it cannot be found", .0.display())]
    WallpaperMissing(PathBuf),

    /// A theme template file is not installed.
    #[error("unable to find template {}", .0.display())]
    TemplateMissing(PathBuf),

    /// An external tool could not be started.
    #[error("unable to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },

    /// KWin did not answer on the session bus.
    #[error("unable to find KWin; is it running?")]
    KwinUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
