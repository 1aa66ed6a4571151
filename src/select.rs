use crate::color::{HlsColor, HsvColor, Rgb, to_hls, to_hsv};

/// The dominant colour every theme colour is derived from.
#[derive(Debug, Clone, Copy)]
pub struct BaseColor {
    pub rgb: Rgb,
    pub hsv: HsvColor,
    pub hls: HlsColor,
}

impl BaseColor {
    pub fn new(rgb: Rgb) -> Self {
        Self {
            rgb,
            hsv: to_hsv(rgb),
            hls: to_hls(rgb),
        }
    }
}

/// Pick the darkest candidate by HSV value.
///
/// Candidates are compared with `<=` against a running minimum that starts
/// at full brightness, so the last of several equally dark colours wins.
pub fn darkest(candidates: &[Rgb]) -> Option<BaseColor> {
    let mut minimum = 1.0f64;
    let mut chosen = None;
    for &rgb in candidates {
        let base = BaseColor::new(rgb);
        if base.hsv.value <= minimum {
            minimum = base.hsv.value;
            chosen = Some(base);
        }
    }
    chosen
}
