//! KDE Plasma integration: finding the wallpaper, writing the colour scheme
//! and asking Plasma and KWin to pick it up.

pub mod apply;
pub mod scheme;
pub mod wallpaper;

pub use apply::{CommandRunner, Kde, SystemRunner};
pub use scheme::{render_colors, write_colors};
pub use wallpaper::locate_wallpaper;
