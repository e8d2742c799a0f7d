//! Binary foreground/background masks.

use crate::GrayImage;

/// Row-major boolean mask; `true` marks object (foreground) pixels.
///
/// Masks are polarity-normalized: whatever the brightness of the source
/// object, it is always the `true` side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
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

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Foreground test; anything outside the mask is background.
    #[inline]
    pub fn is_set(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// 0/255 raster for display.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| if v { 255 } else { 0 }).collect(),
        }
    }

    /// Foreground as `1.0`, background as `0.0`, row-major.
    pub fn to_unit_f32(&self) -> Vec<f32> {
        self.data
            .iter()
            .map(|&v| if v { 1.0 } else { 0.0 })
            .collect()
    }
}
