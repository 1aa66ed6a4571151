//! Theme colours derived from the base colour.
//!
//! All colours except the panel background are rebuilt from the base hue with
//! fixed lightness levels, so only hue and saturation of the wallpaper carry
//! through into the theme.

use palette::Srgb;
use serde::Serialize;

use crate::color::{MAX_SATURATION, Rgb, color_triplet};
use crate::select::BaseColor;

/// Base lightness above which text switches to dark.
pub const LIGHT_THRESHOLD: f64 = 0.62;
/// Boosted saturation below which the wallpaper is treated as greyscale.
pub const MONOCHROME_THRESHOLD: f64 = 0.09;

const LOW_SATURATION: f64 = 0.35;
const LOW_SATURATION_BOOST: f64 = 0.08;
const SATURATION_BOOST: f64 = 0.04;

const ACCENT_CEILING: f64 = 0.88;
const ACCENT_BOOST: f64 = 0.12;

const FRAME_LIGHTNESS: f64 = 0.45;
const BUTTON_LIGHTNESS: f64 = 0.40;
const SELECTION_LIGHTNESS: f64 = 0.45;
const SELECTION_SATURATION: f64 = 0.45;
const FOCUS_OFFSET: f64 = 0.06;

const DARK_TEXT: Rgb = Srgb::new(16, 16, 16);
const LIGHT_TEXT: Rgb = Srgb::new(255, 255, 255);
const LIGHT_MINIMISED_TASK: Rgb = Srgb::new(248, 248, 248);
const DARK_MINIMISED_TASK: Rgb = Srgb::new(36, 36, 36);

/// The colours written into the desktop theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThemePalette {
    pub panel_background: Rgb,
    pub foreground: Rgb,
    pub frame: Rgb,
    pub highlight: Rgb,
    pub window_decoration: Rgb,
    pub focus_decoration: Rgb,
    pub minimised_task: Rgb,
}

impl ThemePalette {
    pub fn entries(&self) -> [(&'static str, Rgb); 7] {
        [
            ("panel_background", self.panel_background),
            ("foreground", self.foreground),
            ("frame", self.frame),
            ("highlight", self.highlight),
            ("window_decoration", self.window_decoration),
            ("focus_decoration", self.focus_decoration),
            ("minimised_task", self.minimised_task),
        ]
    }
}

/// Saturation levels used for the derived colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturations {
    pub base: f64,
    pub frame: f64,
    pub button: f64,
    pub selection: f64,
    pub monochrome: bool,
}

/// Nudge saturation up a little, more so for dull colours.
pub fn boost_saturation(saturation: f64) -> f64 {
    let boosted = if saturation < LOW_SATURATION {
        saturation + LOW_SATURATION_BOOST
    } else {
        saturation + SATURATION_BOOST
    };
    boosted.min(MAX_SATURATION)
}

pub fn saturations(base_saturation: f64) -> Saturations {
    let mut base = boost_saturation(base_saturation);
    let monochrome = base < MONOCHROME_THRESHOLD;
    if monochrome {
        base = 0.0;
    }

    // Frame and button share a formula but are tuned separately.
    let mut frame = base;
    let mut button = base;
    if base > MONOCHROME_THRESHOLD && base < ACCENT_CEILING {
        frame = base + ACCENT_BOOST;
        button = base + ACCENT_BOOST;
    }

    Saturations {
        base,
        frame,
        button,
        selection: SELECTION_SATURATION,
        monochrome,
    }
}

pub fn derive(base: &BaseColor) -> ThemePalette {
    let hue = base.hls.hue;
    let sat = saturations(base.hls.saturation);

    let (foreground, minimised_task) = if base.hls.lightness > LIGHT_THRESHOLD {
        (DARK_TEXT, LIGHT_MINIMISED_TASK)
    } else {
        (LIGHT_TEXT, DARK_MINIMISED_TASK)
    };

    ThemePalette {
        panel_background: base.rgb,
        foreground,
        frame: color_triplet(hue, FRAME_LIGHTNESS, sat.frame),
        highlight: color_triplet(hue, BUTTON_LIGHTNESS, sat.button),
        window_decoration: color_triplet(hue, SELECTION_LIGHTNESS, sat.selection),
        focus_decoration: color_triplet(
            hue,
            SELECTION_LIGHTNESS + FOCUS_OFFSET,
            sat.selection - FOCUS_OFFSET,
        ),
        minimised_task,
    }
}
