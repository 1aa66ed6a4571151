use std::path::{Path, PathBuf};

use tracing::info;

use crate::color::kde_triplet;
use crate::derive::ThemePalette;
use crate::error::{Error, Result};

/// Render the desktop theme `colors` file.
pub fn render_colors(palette: &ThemePalette) -> String {
    let panel = kde_triplet(palette.panel_background);
    let foreground = kde_triplet(palette.foreground);
    let frame = kde_triplet(palette.frame);
    let highlight = kde_triplet(palette.highlight);
    let minimised = kde_triplet(palette.minimised_task);

    format!(
        "[Colors:Window]
ForegroundNormal={foreground}
BackgroundNormal={panel}

[Colors:Selection]
BackgroundNormal={highlight}

[Colors:Button]
ForegroundNormal=248,248,248
BackgroundNormal={highlight}
DecorationFocus={minimised}

[Colors:Complementary]
BackgroundNormal=4,4,222

[Colors:View]
BackgroundNormal={panel}
ForegroundNormal=242,242,242
DecorationHover={frame}
"
    )
}

/// Write `<desktop_theme_dir>/<theme_name>/colors`.
///
/// The theme directory must already be installed.
pub fn write_colors(
    palette: &ThemePalette,
    desktop_theme_dir: &Path,
    theme_name: &str,
) -> Result<PathBuf> {
    let dir = desktop_theme_dir.join(theme_name);
    if !dir.is_dir() {
        return Err(Error::TemplateMissing(dir));
    }
    let path = dir.join("colors");
    std::fs::write(&path, render_colors(palette)).map_err(|e| Error::io(&path, e))?;
    info!(path = %path.display(), "wrote plasma colours");
    Ok(path)
}
