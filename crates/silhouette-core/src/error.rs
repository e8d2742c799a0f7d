/// Errors produced when constructing rasters from raw buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid raster dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid raster buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
}
