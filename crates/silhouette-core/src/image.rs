use crate::ImageError;

/// Borrowed row-major 8-bit grayscale raster.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

/// Owned row-major 8-bit grayscale raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Owned 3-channel raster. Only carried along for display; descriptor logic
/// never reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<[u8; 3]>,
}

fn checked_len(width: usize, height: usize) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(ImageError::InvalidDimensions { width, height })
}

impl GrayImage {
    /// Raster of the given size with every sample set to `value`.
    pub fn new_fill(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap a row-major buffer, validating its length.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Number of pixels (`width * height`).
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.view().get(x, y)
    }

    pub fn mean_intensity(&self) -> f64 {
        self.view().mean_intensity()
    }
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Mean sample value; `0.0` for an empty view.
    pub fn mean_intensity(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&v| v as u64).sum();
        sum as f64 / self.data.len() as f64
    }
}

impl RgbImage {
    /// Wrap an interleaved `RGBRGB...` buffer.
    pub fn from_interleaved(width: usize, height: usize, raw: &[u8]) -> Result<Self, ImageError> {
        let expected = checked_len(width, height)?;
        if raw.len() != expected * 3 {
            return Err(ImageError::InvalidBuffer {
                expected: expected * 3,
                got: raw.len(),
            });
        }
        let data = raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

#[inline]
fn get_or(src: &GrayImageView<'_>, x: i32, y: i32, fill: f32) -> f32 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return fill;
    }
    src.data[y as usize * src.width + x as usize] as f32
}

/// Bilinear sample at pixel-center coordinates `(x, y)`; taps that fall
/// outside the raster read `fill` instead.
#[inline]
pub fn sample_bilinear_or(src: &GrayImageView<'_>, x: f32, y: f32, fill: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_or(src, x0, y0, fill);
    let p10 = get_or(src, x0 + 1, y0, fill);
    let p01 = get_or(src, x0, y0 + 1, fill);
    let p11 = get_or(src, x0 + 1, y0 + 1, fill);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}
