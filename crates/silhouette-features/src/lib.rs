//! Shape description of binary silhouettes on top of `silhouette-core`.
//!
//! ## Quickstart
//!
//! ```
//! use silhouette_core::GrayImage;
//! use silhouette_features::{describe_raster, FeatureParams};
//!
//! let img = GrayImage::from_fn(64, 64, |x, y| {
//!     if (16..48).contains(&x) && (24..40).contains(&y) { 255 } else { 0 }
//! });
//! let (_, features) = describe_raster(&img.view(), img.area(), &FeatureParams::default());
//! let features = features.expect("one bright bar");
//! assert_eq!(features.descriptors.elongation, 2.0);
//! ```
//!
//! Pipeline:
//! 1. Pick the polarity from the mean intensity and threshold at a fixed
//!    level so the object is always foreground.
//! 2. Fill background regions that do not touch the frame.
//! 3. Trace the outer pixel-edge boundary of every 8-connected component and
//!    keep the largest one whose area falls inside the configured window
//!    (or the largest overall, flagged as a fallback).
//! 4. Measure area, perimeter, bounding box, convex hull and moments, then
//!    derive seven ratio descriptors.
//! 5. Count Harris corners on the filled mask for the eighth.

mod binarize;
mod contour;
mod describe;
mod descriptors;
mod harris;
mod params;

pub use binarize::{binarize, fill_holes, threshold, Binarization, BinarizationStats};
pub use contour::{
    find_contours, find_main_contour, label_components, Contour, ContourMetrics, MainContour,
    Selection,
};
pub use describe::{describe_mask, describe_raster, ShapeFeatures};
pub use descriptors::{compute_descriptors, shape_descriptors, DescriptorKind, DescriptorVector};
pub use harris::{corner_peaks, detect_corners, harris_response, CornerSet, ResponseMap};
pub use params::{BinarizeParams, ContourParams, FeatureParams, HarrisParams};
