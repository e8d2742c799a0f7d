//! The fixed battery of geometric transforms.

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use silhouette_core::{sample_bilinear_or, GrayImage, GrayImageView, Polarity, PolarityRule};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One entry of the battery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Rotate45,
    Rotate90,
    Rotate180,
    Scale50,
}

impl TransformKind {
    pub const ALL: [TransformKind; 4] = [
        TransformKind::Rotate45,
        TransformKind::Rotate90,
        TransformKind::Rotate180,
        TransformKind::Scale50,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Rotate45 => "rotate_45",
            TransformKind::Rotate90 => "rotate_90",
            TransformKind::Rotate180 => "rotate_180",
            TransformKind::Scale50 => "scale_50",
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Transformed copies of one raster, all with the source dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformBattery {
    pub rotate45: GrayImage,
    pub rotate90: GrayImage,
    pub rotate180: GrayImage,
    pub scale50: GrayImage,
    /// Fill used for exposed pixels.
    pub border_value: u8,
}

impl TransformBattery {
    pub fn get(&self, kind: TransformKind) -> &GrayImage {
        match kind {
            TransformKind::Rotate45 => &self.rotate45,
            TransformKind::Rotate90 => &self.rotate90,
            TransformKind::Rotate180 => &self.rotate180,
            TransformKind::Scale50 => &self.scale50,
        }
    }

    /// Entries in [`TransformKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (TransformKind, &GrayImage)> + '_ {
        TransformKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < 1e-9 {
        r
    } else {
        v
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Rotate by `degrees` counter-clockwise as displayed (y axis down) about
/// `((w - 1) / 2, (h - 1) / 2)`.
///
/// Output keeps the source size; bilinear taps that leave the frame read
/// `border`. Multiples of 90 degrees on square frames move pixels exactly.
pub fn rotate_about_center(src: &GrayImageView<'_>, degrees: f64, border: u8) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let cx = (w as f64 - 1.0) / 2.0;
    let cy = (h as f64 - 1.0) / 2.0;
    // Inverse map: output offset rotated by +theta in y-down axes lands on the
    // source sample.
    let rot = Rotation2::new(degrees.to_radians());
    let fill = border as f32;
    GrayImage::from_fn(w, h, |x, y| {
        let d = rot * Vector2::new(x as f64 - cx, y as f64 - cy);
        let sx = snap(cx + d.x);
        let sy = snap(cy + d.y);
        to_u8(sample_bilinear_or(src, sx as f32, sy as f32, fill))
    })
}

/// 2x2 box-mean downsample to `(w / 2, h / 2)`; odd trailing rows/columns
/// are dropped.
pub fn downsample_2x2_mean(src: &GrayImageView<'_>) -> GrayImage {
    let (dw, dh) = (src.width / 2, src.height / 2);
    let w = src.width;
    GrayImage::from_fn(dw, dh, |x, y| {
        let (sx, sy) = (2 * x, 2 * y);
        let sum = src.data[sy * w + sx] as u32
            + src.data[sy * w + sx + 1] as u32
            + src.data[(sy + 1) * w + sx] as u32
            + src.data[(sy + 1) * w + sx + 1] as u32;
        ((sum + 2) / 4) as u8
    })
}

/// Paste `inner` centered on a `width x height` canvas of `border`.
///
/// When the leftover is odd the extra column/row goes right/bottom.
pub fn pad_centered(inner: &GrayImage, width: usize, height: usize, border: u8) -> GrayImage {
    let left = width.saturating_sub(inner.width) / 2;
    let top = height.saturating_sub(inner.height) / 2;
    GrayImage::from_fn(width, height, |x, y| {
        if x >= left && y >= top {
            inner.get(x - left, y - top).unwrap_or(border)
        } else {
            border
        }
    })
}

/// Half-size copy centered on a canvas of the source size.
pub fn scale_half_and_pad(src: &GrayImageView<'_>, border: u8) -> GrayImage {
    let small = downsample_2x2_mean(src);
    pad_centered(&small, src.width, src.height, border)
}

/// Build the battery for `img`. The border fill follows the raster's own
/// polarity under `rule` and `split`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img), fields(width = img.width, height = img.height))
)]
pub fn generate_transforms_with(
    img: &GrayImageView<'_>,
    rule: PolarityRule,
    split: f64,
) -> TransformBattery {
    let (polarity, _) = Polarity::estimate(img, rule, split);
    let border = polarity.border_value();
    log::debug!("transform battery: polarity={polarity:?} border={border}");
    TransformBattery {
        rotate45: rotate_about_center(img, 45.0, border),
        rotate90: rotate_about_center(img, 90.0, border),
        rotate180: rotate_about_center(img, 180.0, border),
        scale50: scale_half_and_pad(img, border),
        border_value: border,
    }
}

/// Battery with the global-mean polarity rule.
pub fn generate_transforms(img: &GrayImageView<'_>) -> TransformBattery {
    generate_transforms_with(
        img,
        PolarityRule::GlobalMean,
        silhouette_core::DEFAULT_POLARITY_SPLIT,
    )
}
