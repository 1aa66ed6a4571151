use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::PlasmaPaths;
use crate::error::{Error, Result};

/// Current activity id from the contents of `kactivitymanagerdrc`.
pub fn current_activity(activity_rc: &str) -> Option<String> {
    let line = activity_rc.lines().find(|line| line.contains("current"))?;
    let (_, id) = line.split_once('=')?;
    Some(id.trim().to_string())
}

/// Wallpaper path for `activity` from the contents of the desktop applets rc.
///
/// The search skips lines until one mentions the activity, then takes the
/// first `Image=` entry from there on. Without an activity the first
/// `Image=` entry wins.
pub fn find_wallpaper(applets_rc: &str, activity: Option<&str>) -> Option<PathBuf> {
    let mut in_activity = activity.is_none();
    for line in applets_rc.lines() {
        if let Some(id) = activity {
            if line.contains(id) {
                in_activity = true;
            }
        }
        if !in_activity {
            continue;
        }
        if let Some((_, value)) = line.split_once("Image=") {
            let path = match value.split_once("//") {
                Some((_, path)) => path,
                None => value,
            };
            return Some(PathBuf::from(path.trim()));
        }
    }
    None
}

/// Find the wallpaper image for the current Plasma activity.
pub fn locate_wallpaper(paths: &PlasmaPaths) -> Result<PathBuf> {
    let applets = std::fs::read_to_string(&paths.applets_rc)
        .map_err(|e| Error::io(&paths.applets_rc, e))?;

    let activity = match std::fs::read_to_string(&paths.activity_rc) {
        Ok(content) => current_activity(&content),
        Err(err) => {
            info!(path = %paths.activity_rc.display(), error = %err, "no activity manager rc, using default activity");
            None
        }
    };
    debug!(activity = ?activity, "looking up wallpaper");

    let wallpaper = find_wallpaper(&applets, activity.as_deref()).ok_or(Error::WallpaperNotFound)?;
    if !wallpaper.is_file() {
        return Err(Error::WallpaperMissing(wallpaper));
    }
    Ok(wallpaper)
}
