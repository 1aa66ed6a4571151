//! Colour representations shared by the pipeline stages.
//!
//! RGB triplets are plain `Srgb<u8>` values. HSV is used to rank brightness
//! and HLS drives the theme derivation, both as `f64` `palette` types so the
//! derivation thresholds see the same values as double precision HLS maths.

use palette::{FromColor, Hsl, Hsv, IntoColor, RgbHue, Srgb, encoding};

/// An 8-bit sRGB triplet.
pub type Rgb = Srgb<u8>;

pub type HlsColor = Hsl<encoding::Srgb, f64>;
pub type HsvColor = Hsv<encoding::Srgb, f64>;

/// Upper bound for any saturation fed into [`color_triplet`].
pub const MAX_SATURATION: f64 = 0.99;

pub fn to_hsv(color: Rgb) -> HsvColor {
    color.into_format::<f64>().into_color()
}

pub fn to_hls(color: Rgb) -> HlsColor {
    color.into_format::<f64>().into_color()
}

/// Convert an HLS colour back to 8-bit RGB.
///
/// Saturation is clamped to `[0, MAX_SATURATION]` and lightness to `[0, 1]`
/// first. Each normalised channel above 1.0 is clamped before being scaled
/// to 255 and truncated.
pub fn color_triplet(hue: RgbHue<f64>, lightness: f64, saturation: f64) -> Rgb {
    let hsl = HlsColor::new(
        hue,
        saturation.clamp(0.0, MAX_SATURATION),
        lightness.clamp(0.0, 1.0),
    );
    let rgb: Srgb<f64> = Srgb::from_color(hsl);
    Srgb::new(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Truncate floating point colour coordinates into an RGB triplet.
pub fn from_coords(coords: [f64; 3]) -> Rgb {
    let [r, g, b] = coords.map(|c| c.clamp(0.0, 255.0) as u8);
    Srgb::new(r, g, b)
}

/// KDE colour scheme form, `r,g,b`.
pub fn kde_triplet(color: Rgb) -> String {
    format!("{},{},{}", color.red, color.green, color.blue)
}

pub fn hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hls_of_pure_red() {
        let hls = to_hls(Srgb::new(255, 0, 0));
        assert!(hls.hue.into_positive_degrees().abs() < 1e-4);
        assert!((hls.saturation - 1.0).abs() < 1e-6);
        assert!((hls.lightness - 0.5).abs() < 1e-6);
    }

    #[test]
    fn value_is_brightest_channel() {
        let hsv = to_hsv(Srgb::new(16, 128, 64));
        assert!((hsv.value - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn triplet_truncates_channels() {
        // l=0.45, s=0.45 on red: r = 0.6525, g = b = 0.2475
        let c = color_triplet(RgbHue::from_degrees(0.0), 0.45, 0.45);
        assert_eq!(c, Srgb::new(166, 63, 63));
    }

    #[test]
    fn triplet_clamps_saturation() {
        let hue = RgbHue::from_degrees(120.0);
        assert_eq!(color_triplet(hue, 0.45, 1.5), color_triplet(hue, 0.45, 0.99));
        assert_eq!(color_triplet(hue, 0.4, -0.2), Srgb::new(102, 102, 102));
    }

    #[test]
    fn full_lightness_stays_in_range() {
        let c = color_triplet(RgbHue::from_degrees(200.0), 1.3, 0.5);
        assert_eq!(c, Srgb::new(255, 255, 255));
    }

    #[test]
    fn coords_truncate_and_clamp() {
        assert_eq!(from_coords([12.9, 300.0, -4.0]), Srgb::new(12, 255, 0));
    }

    #[test]
    fn formats() {
        let c = Srgb::new(4, 4, 222);
        assert_eq!(kde_triplet(c), "4,4,222");
        assert_eq!(hex(c), "#0404de");
    }
}
