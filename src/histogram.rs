use std::collections::BTreeMap;

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::{Error, Result};
use crate::kmeans::ColorPoint;

/// Longest side of the thumbnail the histogram is built from.
pub const THUMBNAIL_SIZE: u32 = 128;

/// Distinct colours of a thumbnail together with their pixel counts.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub width: u32,
    pub height: u32,
    pub points: Vec<ColorPoint>,
}

impl Histogram {
    /// Total number of pixels represented by the points.
    pub fn pixel_count(&self) -> u64 {
        self.points.iter().map(|p| u64::from(p.weight)).sum()
    }
}

/// Shrink `img` so its longer side is at most `max_side`, keeping the aspect
/// ratio. Smaller images are returned unchanged.
pub fn thumbnail(img: &DynamicImage, max_side: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w.max(h) <= max_side {
        return img.clone();
    }
    img.thumbnail(max_side, max_side)
}

/// Build the weighted colour point set for `img`.
///
/// Points come out in ascending RGB order so that clustering with a fixed
/// seed is reproducible.
pub fn histogram(img: &DynamicImage, max_side: u32) -> Result<Histogram> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(Error::EmptyImage);
    }

    let thumb = thumbnail(img, max_side.max(1)).to_rgb8();
    let (width, height) = thumb.dimensions();

    let mut counts: BTreeMap<[u8; 3], u32> = BTreeMap::new();
    for pixel in thumb.pixels() {
        *counts.entry(pixel.0).or_insert(0) += 1;
    }

    let points: Vec<ColorPoint> = counts
        .into_iter()
        .map(|(rgb, count)| ColorPoint::new(rgb.map(f64::from), count))
        .collect();

    debug!(
        width,
        height,
        distinct = points.len(),
        "built colour histogram"
    );

    Ok(Histogram {
        width,
        height,
        points,
    })
}
