//! High-level facade for the `silhouette-*` workspace.
//!
//! This crate provides:
//! - re-exports of the underlying crates
//! - [`analyze`]: one grayscale image end to end (descriptors, transform
//!   battery, drift report)
//! - batch helpers that aggregate drift per transform and compare classes
//! - (feature `image`) decoding, dataset discovery and PNG artifact dumps
//!
//! ## Quickstart
//!
//! ```
//! use silhouette::{analyze, AnalysisParams, TransformKind};
//! use silhouette::core::GrayImage;
//!
//! let img = GrayImage::from_fn(120, 120, |x, y| {
//!     if (20..100).contains(&x) && (20..100).contains(&y) { 255 } else { 0 }
//! });
//! let analysis = analyze(&img, &AnalysisParams::default()).expect("square");
//! assert_eq!(analysis.features.main.metrics.area, 6400.0);
//! assert!(analysis.distances.distance(TransformKind::Rotate90).is_some());
//! ```
//!
//! ## API map
//! - `silhouette::core`: rasters, masks, polarity, polygon geometry.
//! - `silhouette::features`: binarization, contour selection, descriptors.
//! - `silhouette::robustness`: transform battery and drift comparator.
//! - `silhouette::io` (feature `image`): loading and dumping rasters.

pub use silhouette_core as core;
pub use silhouette_features as features;
pub use silhouette_robustness as robustness;

pub use silhouette_features::{DescriptorKind, DescriptorVector, FeatureParams, Selection};
pub use silhouette_robustness::{DistanceReport, TransformKind};

mod analysis;
mod batch;
mod report;

pub use analysis::{
    analyze, analyze_raw, analyze_with_color, AnalysisError, AnalysisParams, AnalysisSummary,
    ShapeAnalysis,
};
pub use batch::{analyze_batch, RobustnessSummary, TransformStats};
pub use report::{class_label_for, CentroidDistance, ClassCentroid, DiscriminationReport};

#[cfg(feature = "image")]
pub mod io;

#[cfg(feature = "tracing")]
pub use silhouette_core::init_tracing;
