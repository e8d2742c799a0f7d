//! Descriptor robustness under rotation and scaling.
//!
//! [`generate_transforms`] builds four transformed copies of a raster
//! (45, 90 and 180 degree rotations and a centered half-size copy), and
//! [`compare`] re-runs the full description pipeline on each one and reports
//! the Euclidean drift from a baseline descriptor.

mod compare;
mod transform;

pub use compare::{compare, DistanceReport, TransformOutcome};
pub use transform::{
    downsample_2x2_mean, generate_transforms, generate_transforms_with, pad_centered,
    rotate_about_center, scale_half_and_pad, TransformBattery, TransformKind,
};
