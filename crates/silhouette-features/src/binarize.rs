//! Fixed-threshold binarization with polarity normalization and hole filling.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use silhouette_core::{BinaryMask, GrayImageView, Polarity};

use crate::BinarizeParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output of [`binarize`].
#[derive(Clone, Debug, PartialEq)]
pub struct Binarization {
    pub polarity: Polarity,
    /// Mean that decided the polarity (global or border, per the rule).
    pub mean: f64,
    /// Thresholded mask, object = `true`.
    pub raw: BinaryMask,
    /// `raw` with every enclosed background region turned into foreground.
    pub filled: BinaryMask,
}

/// Mask statistics worth reporting alongside descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinarizationStats {
    pub polarity: Polarity,
    pub mean: f64,
    pub raw_foreground: usize,
    pub filled_foreground: usize,
}

impl Binarization {
    pub fn stats(&self) -> BinarizationStats {
        BinarizationStats {
            polarity: self.polarity,
            mean: self.mean,
            raw_foreground: self.raw.count(),
            filled_foreground: self.filled.count(),
        }
    }
}

/// Threshold `img` so the object is always foreground, then fill holes.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn binarize(img: &GrayImageView<'_>, params: &BinarizeParams) -> Binarization {
    let (polarity, mean) = Polarity::estimate(img, params.polarity_rule, params.polarity_split);
    let raw = threshold(img, params.threshold, polarity);
    let filled = fill_holes(&raw);
    log::debug!(
        "binarize {}x{}: mean={:.1} polarity={:?} fg raw={} filled={}",
        img.width,
        img.height,
        mean,
        polarity,
        raw.count(),
        filled.count()
    );
    Binarization {
        polarity,
        mean,
        raw,
        filled,
    }
}

/// Apply the fixed threshold in the direction `polarity` dictates.
pub fn threshold(img: &GrayImageView<'_>, level: u8, polarity: Polarity) -> BinaryMask {
    let data = match polarity {
        Polarity::LightBackground => img.data.iter().map(|&v| v <= level).collect(),
        Polarity::DarkBackground => img.data.iter().map(|&v| v > level).collect(),
    };
    BinaryMask {
        width: img.width,
        height: img.height,
        data,
    }
}

/// Fill background regions that cannot reach the image border.
///
/// Background is flood-filled from every border pixel with 4-connectivity;
/// whatever stays unreached becomes foreground. The result is a fixed point:
/// filling it again changes nothing.
pub fn fill_holes(mask: &BinaryMask) -> BinaryMask {
    let (w, h) = (mask.width, mask.height);
    if w == 0 || h == 0 {
        return mask.clone();
    }
    let mut outside = vec![false; w * h];
    let mut queue = VecDeque::new();

    let seed = |x: usize, y: usize, outside: &mut [bool], queue: &mut VecDeque<(usize, usize)>| {
        let idx = y * w + x;
        if !mask.data[idx] && !outside[idx] {
            outside[idx] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        seed(x, 0, &mut outside, &mut queue);
        if h > 1 {
            seed(x, h - 1, &mut outside, &mut queue);
        }
    }
    for y in 0..h {
        seed(0, y, &mut outside, &mut queue);
        if w > 1 {
            seed(w - 1, y, &mut outside, &mut queue);
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        if x > 0 {
            seed(x - 1, y, &mut outside, &mut queue);
        }
        if x + 1 < w {
            seed(x + 1, y, &mut outside, &mut queue);
        }
        if y > 0 {
            seed(x, y - 1, &mut outside, &mut queue);
        }
        if y + 1 < h {
            seed(x, y + 1, &mut outside, &mut queue);
        }
    }

    BinaryMask {
        width: w,
        height: h,
        data: outside.into_iter().map(|o| !o).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silhouette_core::{GrayImage, PolarityRule};

    fn ring(size: usize, bg: u8, fg: u8) -> GrayImage {
        // Square annulus: outer side 13, hole side 5, centered.
        let c = size / 2;
        GrayImage::from_fn(size, size, |x, y| {
            let dx = (x as i64 - c as i64).abs();
            let dy = (y as i64 - c as i64).abs();
            let r = dx.max(dy);
            if (3..=6).contains(&r) {
                fg
            } else {
                bg
            }
        })
    }

    #[test]
    fn dark_background_keeps_bright_pixels() {
        let img = ring(40, 0, 255);
        let out = binarize(&img.view(), &BinarizeParams::default());
        assert_eq!(out.polarity, Polarity::DarkBackground);
        assert!(out.raw.is_set(20 + 4, 20));
        assert!(!out.raw.is_set(20, 20));
        assert!(out.filled.is_set(20, 20));
        assert!(!out.filled.is_set(0, 0));
        // 13x13 outer square, fully filled.
        assert_eq!(out.filled.count(), 169);
        assert_eq!(out.raw.count(), 169 - 25);
    }

    #[test]
    fn light_background_inverts_threshold() {
        let img = ring(40, 255, 0);
        let out = binarize(&img.view(), &BinarizeParams::default());
        assert_eq!(out.polarity, Polarity::LightBackground);
        assert_eq!(out.filled.count(), 169);
    }

    #[test]
    fn threshold_is_inclusive_on_light_side() {
        let img = GrayImage::from_raw(3, 1, vec![127, 128, 200]).expect("3x1");
        let light = threshold(&img.view(), 127, Polarity::LightBackground);
        assert_eq!(light.data, vec![true, false, false]);
        let dark = threshold(&img.view(), 127, Polarity::DarkBackground);
        assert_eq!(dark.data, vec![false, true, true]);
    }

    #[test]
    fn empty_masks_fill_to_themselves() {
        for (w, h) in [(0, 4), (4, 0), (0, 0)] {
            let mask = BinaryMask::new(w, h);
            assert_eq!(fill_holes(&mask), mask);
        }
        let img = GrayImage::new_fill(0, 5, 0);
        let out = binarize(&img.view(), &BinarizeParams::default());
        assert_eq!(out.filled.count(), 0);
    }

    #[test]
    fn filling_is_idempotent() {
        let img = ring(30, 0, 255);
        let once = binarize(&img.view(), &BinarizeParams::default()).filled;
        assert_eq!(fill_holes(&once), once);
    }

    #[test]
    fn diagonal_gaps_do_not_leak() {
        // A diamond of foreground pixels only touches diagonally, so a
        // 4-connected flood from outside cannot enter it.
        let mask = BinaryMask::from_fn(7, 7, |x, y| {
            (x as i64 - 3).abs() + (y as i64 - 3).abs() == 2
        });
        let filled = fill_holes(&mask);
        assert!(filled.is_set(3, 3));
        assert_eq!(filled.count(), 13);
    }

    #[test]
    fn border_rule_overrides_dominant_object() {
        let img = GrayImage::from_fn(10, 10, |x, y| {
            if (1..9).contains(&x) && (1..9).contains(&y) {
                255
            } else {
                0
            }
        });
        let params = BinarizeParams {
            polarity_rule: PolarityRule::BorderMean,
            ..BinarizeParams::default()
        };
        let out = binarize(&img.view(), &params);
        assert_eq!(out.polarity, Polarity::DarkBackground);
        assert_eq!(out.filled.count(), 64);
        assert_eq!(out.stats().filled_foreground, 64);
    }
}
