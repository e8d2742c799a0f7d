//! Core types and utilities for silhouette shape analysis.
//!
//! This crate is small and purely geometric: rasters, binary
//! masks, image polarity and closed-polygon measurements. It knows nothing
//! about descriptors or transforms and performs no I/O.

mod error;
mod geometry;
mod image;
mod logger;
mod mask;
mod polarity;

pub use error::ImageError;
pub use geometry::{
    chain_code_length, convex_hull, polygon_area, polygon_moments, polygon_signed_area,
    BoundingBox, CentralMoments, PixelPoint, CHAIN_TURN_WEIGHT,
};
pub use image::{sample_bilinear_or, GrayImage, GrayImageView, RgbImage};
pub use mask::BinaryMask;
pub use polarity::{border_mean, Polarity, PolarityRule, DEFAULT_POLARITY_SPLIT};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
