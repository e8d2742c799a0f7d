//! The eight-component shape descriptor.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use silhouette_core::BinaryMask;

use crate::contour::ContourMetrics;
use crate::harris::{detect_corners, CornerSet};
use crate::HarrisParams;

/// Descriptor names in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    Eccentricity,
    Circularity,
    Compactness,
    PerimeterAreaRatio,
    Solidity,
    Elongation,
    Extent,
    CornerCount,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 8] = [
        DescriptorKind::Eccentricity,
        DescriptorKind::Circularity,
        DescriptorKind::Compactness,
        DescriptorKind::PerimeterAreaRatio,
        DescriptorKind::Solidity,
        DescriptorKind::Elongation,
        DescriptorKind::Extent,
        DescriptorKind::CornerCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DescriptorKind::Eccentricity => "eccentricity",
            DescriptorKind::Circularity => "circularity",
            DescriptorKind::Compactness => "compactness",
            DescriptorKind::PerimeterAreaRatio => "perimeter_area_ratio",
            DescriptorKind::Solidity => "solidity",
            DescriptorKind::Elongation => "elongation",
            DescriptorKind::Extent => "extent",
            DescriptorKind::CornerCount => "corner_count",
        }
    }

    /// Position in [`DescriptorVector::as_array`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Shape descriptor. Every field is finite; undefined ratios are `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorVector {
    pub eccentricity: f64,
    pub circularity: f64,
    pub compactness: f64,
    pub perimeter_area_ratio: f64,
    pub solidity: f64,
    pub elongation: f64,
    pub extent: f64,
    pub corner_count: f64,
}

impl DescriptorVector {
    /// Values in [`DescriptorKind::ALL`] order.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.eccentricity,
            self.circularity,
            self.compactness,
            self.perimeter_area_ratio,
            self.solidity,
            self.elongation,
            self.extent,
            self.corner_count,
        ]
    }

    pub fn get(&self, kind: DescriptorKind) -> f64 {
        self.as_array()[kind.index()]
    }

    /// Euclidean distance over all eight components.
    pub fn euclidean_distance(&self, other: &DescriptorVector) -> f64 {
        self.as_array()
            .iter()
            .zip(other.as_array())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

#[inline]
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Descriptors derived from contour geometry alone (corner count left at 0).
pub fn shape_descriptors(metrics: &ContourMetrics) -> DescriptorVector {
    let m = &metrics.moments;
    let spread = m.mu20 + m.mu02;
    let eccentricity = if spread != 0.0 {
        ((m.mu20 - m.mu02).powi(2) + 4.0 * m.mu11 * m.mu11).sqrt() / spread
    } else {
        0.0
    };
    let (area, perimeter) = (metrics.area, metrics.perimeter);
    let (bw, bh) = (metrics.bbox.width as f64, metrics.bbox.height as f64);

    DescriptorVector {
        eccentricity,
        circularity: ratio(4.0 * PI * area, perimeter * perimeter),
        compactness: ratio(perimeter * perimeter, area),
        perimeter_area_ratio: ratio(perimeter, area),
        solidity: ratio(area, metrics.hull_area),
        elongation: ratio(bw, bh),
        extent: ratio(area, bw * bh),
        corner_count: 0.0,
    }
}

/// Full descriptor vector plus the Harris corners counted into it.
pub fn compute_descriptors(
    metrics: &ContourMetrics,
    mask_filled: &BinaryMask,
    harris: &HarrisParams,
) -> (DescriptorVector, CornerSet) {
    let mut desc = shape_descriptors(metrics);
    let (_, corners) = detect_corners(mask_filled, harris);
    desc.corner_count = corners.len() as f64;
    log::debug!("descriptors: {desc:?}");
    (desc, corners)
}
