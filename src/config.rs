//! TOML configuration, by default at `$XDG_CONFIG_HOME/culla/config.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::histogram::THUMBNAIL_SIZE;
use crate::kmeans::KmeansConfig;
use crate::ExtractOptions;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub clusters: usize,
    pub min_diff: f64,
    pub max_iterations: usize,
    pub thumbnail_size: u32,
    /// Fixed RNG seed for reproducible clustering.
    pub seed: Option<u64>,
    pub theme_name: String,
    pub tools: Tools,
    pub paths: PathOverrides,
}

impl Default for Config {
    fn default() -> Self {
        let kmeans = KmeansConfig::default();
        Self {
            clusters: kmeans.clusters,
            min_diff: kmeans.min_diff,
            max_iterations: kmeans.max_iterations,
            thumbnail_size: THUMBNAIL_SIZE,
            seed: None,
            theme_name: "Culla".to_string(),
            tools: Tools::default(),
            paths: PathOverrides::default(),
        }
    }
}

impl Config {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            thumbnail_size: self.thumbnail_size,
            kmeans: KmeansConfig {
                clusters: self.clusters,
                min_diff: self.min_diff,
                max_iterations: self.max_iterations,
            },
        }
    }
}

/// Names of the external KDE tools.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Tools {
    pub kwriteconfig: String,
    pub kreadconfig: String,
    pub kbuildsycoca: String,
    pub dbus_send: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            kwriteconfig: "kwriteconfig5".into(),
            kreadconfig: "kreadconfig5".into(),
            kbuildsycoca: "kbuildsycoca5".into(),
            dbus_send: "dbus-send".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PathOverrides {
    pub applets_rc: Option<PathBuf>,
    pub activity_rc: Option<PathBuf>,
    pub desktop_theme_dir: Option<PathBuf>,
    pub aurorae_theme_dir: Option<PathBuf>,
}

/// Locations of the Plasma files culla reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlasmaPaths {
    pub applets_rc: PathBuf,
    pub activity_rc: PathBuf,
    pub desktop_theme_dir: PathBuf,
    pub aurorae_theme_dir: PathBuf,
}

impl PlasmaPaths {
    pub fn resolve(overrides: &PathOverrides) -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        let config = dirs::config_dir().unwrap_or_else(|| home.join(".config"));
        let data = dirs::data_local_dir().unwrap_or_else(|| home.join(".local/share"));

        let pick = |value: &Option<PathBuf>, default: PathBuf| value.clone().unwrap_or(default);
        Self {
            applets_rc: pick(
                &overrides.applets_rc,
                config.join("plasma-org.kde.plasma.desktop-appletsrc"),
            ),
            activity_rc: pick(&overrides.activity_rc, config.join("kactivitymanagerdrc")),
            desktop_theme_dir: pick(
                &overrides.desktop_theme_dir,
                data.join("plasma").join("desktoptheme"),
            ),
            aurorae_theme_dir: pick(
                &overrides.aurorae_theme_dir,
                data.join("aurorae").join("themes"),
            ),
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("culla").join("config.toml"))
}

pub fn from_toml_str(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

pub fn from_toml_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    from_toml_str(&content).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `explicit` if given, else the default file if it exists, else defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return from_toml_file(path);
    }
    match default_path() {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "loading config");
            from_toml_file(&path)
        }
        _ => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.clusters, 3);
        assert_eq!(cfg.thumbnail_size, 128);
        assert_eq!(cfg.theme_name, "Culla");
        assert_eq!(cfg.tools.kwriteconfig, "kwriteconfig5");
    }

    #[test]
    fn parse_kebab_case_keys() {
        let toml = r#"
clusters = 5
min-diff = 0.5
max-iterations = 20
seed = 7
theme-name = "Mine"

[tools]
kwriteconfig = "kwriteconfig6"

[paths]
applets-rc = "/tmp/appletsrc"
"#;
        let cfg = from_toml_str(toml).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.theme_name, "Mine");
        assert_eq!(cfg.tools.kwriteconfig, "kwriteconfig6");
        assert_eq!(cfg.tools.kreadconfig, "kreadconfig5");

        let opts = cfg.extract_options();
        assert_eq!(opts.kmeans.clusters, 5);
        assert_eq!(opts.kmeans.max_iterations, 20);
        assert!((opts.kmeans.min_diff - 0.5).abs() < f64::EPSILON);

        let paths = PlasmaPaths::resolve(&cfg.paths);
        assert_eq!(paths.applets_rc, PathBuf::from("/tmp/appletsrc"));
        assert!(paths.activity_rc.ends_with("kactivitymanagerdrc"));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(from_toml_str("clusters = \"three\"").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/culla.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
