//! Derive a desktop colour theme from the dominant colours of a wallpaper.
//!
//! The pipeline is:
//! 1. Thumbnail the image and count its distinct colours ([`histogram`]).
//! 2. Cluster the weighted colours with k-means ([`kmeans`]).
//! 3. Take the darkest centroid as the base colour ([`select`]).
//! 4. Derive the theme colours from the base colour in HLS ([`derive`]).
//!
//! [`plasma`] writes the result into KDE Plasma.

use std::path::Path;

use image::DynamicImage;
use rand::Rng;
use tracing::info;

pub mod color;
pub mod config;
pub mod derive;
pub mod error;
pub mod histogram;
pub mod kmeans;
pub mod plasma;
pub mod select;

pub use color::Rgb;
pub use derive::ThemePalette;
pub use error::{Error, Result};
pub use kmeans::{ColorPoint, KmeansConfig};
pub use select::BaseColor;

/// Tuning knobs for [`extract_theme`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub thumbnail_size: u32,
    pub kmeans: KmeansConfig,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            thumbnail_size: histogram::THUMBNAIL_SIZE,
            kmeans: KmeansConfig::default(),
        }
    }
}

/// Everything the pipeline produced for one image.
#[derive(Debug, Clone)]
pub struct Theme {
    pub centroids: Vec<Rgb>,
    pub base: BaseColor,
    pub palette: ThemePalette,
}

pub fn extract_theme<R: Rng + ?Sized>(
    img: &DynamicImage,
    options: &ExtractOptions,
    rng: &mut R,
) -> Result<Theme> {
    let hist = histogram::histogram(img, options.thumbnail_size)?;
    let clustering = kmeans::kmeans(&hist.points, &options.kmeans, rng)?;

    let centroids: Vec<Rgb> = clustering.centers().map(color::from_coords).collect();
    let base = select::darkest(&centroids).ok_or(Error::NoPoints)?;
    info!(
        base = %color::hex(base.rgb),
        centroids = ?centroids.iter().map(|c| color::hex(*c)).collect::<Vec<_>>(),
        iterations = clustering.iterations,
        "chose base colour"
    );

    let palette = derive::derive(&base);
    Ok(Theme {
        centroids,
        base,
        palette,
    })
}

/// Decode an in-memory image and run [`extract_theme`] on it.
pub fn extract_theme_bytes<R: Rng + ?Sized>(
    input: &[u8],
    options: &ExtractOptions,
    rng: &mut R,
) -> Result<Theme> {
    let img = image::load_from_memory(input)?;
    extract_theme(&img, options, rng)
}

pub fn extract_theme_file<R: Rng + ?Sized>(
    path: &Path,
    options: &ExtractOptions,
    rng: &mut R,
) -> Result<Theme> {
    let img = image::open(path)?;
    extract_theme(&img, options, rng)
}
