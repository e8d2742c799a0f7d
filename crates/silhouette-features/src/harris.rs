//! Harris corner response on a binary mask and greedy peak picking.

use serde::{Deserialize, Serialize};
use silhouette_core::BinaryMask;

use crate::HarrisParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Dense Harris response, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<f32>,
}

impl ResponseMap {
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.w + x]
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Corner landmarks as `(row, col)` pixel coordinates, strongest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerSet {
    pub points: Vec<(usize, usize)>,
}

impl CornerSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (4.0 * sigma + 0.5) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / denom).exp())
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

/// Separable convolution with zero padding.
fn blur_zero(src: &[f32], w: usize, h: usize, kernel: &[f32]) -> Vec<f32> {
    let r = (kernel.len() / 2) as i64;
    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (j, &kv) in kernel.iter().enumerate() {
                let xx = x as i64 + j as i64 - r;
                if xx >= 0 && (xx as usize) < w {
                    acc += kv * src[y * w + xx as usize];
                }
            }
            tmp[y * w + x] = acc;
        }
    }
    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (j, &kv) in kernel.iter().enumerate() {
                let yy = y as i64 + j as i64 - r;
                if yy >= 0 && (yy as usize) < h {
                    acc += kv * tmp[yy as usize * w + x];
                }
            }
            out[y * w + x] = acc;
        }
    }
    out
}

/// Harris response `det(M) - k * trace(M)^2` of the mask as `{0, 1}` floats.
///
/// `M` is the structure tensor of Sobel gradients smoothed by a Gaussian of
/// `params.sigma` (truncated at 4 sigma). Samples outside the mask read 0.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, params), fields(w = mask.width, h = mask.height))
)]
pub fn harris_response(mask: &BinaryMask, params: &HarrisParams) -> ResponseMap {
    let (w, h) = (mask.width, mask.height);
    let img = mask.to_unit_f32();
    let px = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            0.0
        } else {
            img[y as usize * w + x as usize]
        }
    };

    let mut ixx = vec![0.0f32; w * h];
    let mut iyy = vec![0.0f32; w * h];
    let mut ixy = vec![0.0f32; w * h];
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let gx = (px(x + 1, y - 1) + 2.0 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2.0 * px(x - 1, y) + px(x - 1, y + 1));
            let gy = (px(x - 1, y + 1) + 2.0 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2.0 * px(x, y - 1) + px(x + 1, y - 1));
            let i = y as usize * w + x as usize;
            ixx[i] = gx * gx;
            iyy[i] = gy * gy;
            ixy[i] = gx * gy;
        }
    }

    let kernel = gaussian_kernel(params.sigma);
    let a = blur_zero(&ixx, w, h, &kernel);
    let b = blur_zero(&iyy, w, h, &kernel);
    let c = blur_zero(&ixy, w, h, &kernel);

    let data = a
        .iter()
        .zip(&b)
        .zip(&c)
        .map(|((&a, &b), &c)| {
            let tr = a + b;
            a * b - c * c - params.k * tr * tr
        })
        .collect();
    ResponseMap { w, h, data }
}

fn is_local_max(resp: &ResponseMap, x: usize, y: usize, r: i64, v: f32) -> bool {
    let (w, h) = (resp.w as i64, resp.h as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            let (xx, yy) = (x as i64 + dx, y as i64 + dy);
            if xx < 0 || yy < 0 || xx >= w || yy >= h {
                continue;
            }
            if resp.at(xx as usize, yy as usize) > v {
                return false;
            }
        }
    }
    true
}

/// Pick corner peaks from a response map.
///
/// A pixel qualifies when it lies at least `min_distance` from every edge,
/// its response is strictly above `threshold_rel * max` (and positive), and
/// nothing in its `(2 * min_distance + 1)^2` window is larger. Qualifying
/// pixels are then accepted strongest first (ties by row, then column),
/// skipping any within Chebyshev distance `min_distance` of an accepted one.
pub fn corner_peaks(resp: &ResponseMap, params: &HarrisParams) -> CornerSet {
    let (w, h) = (resp.w, resp.h);
    let md = params.min_distance;
    if w <= 2 * md || h <= 2 * md {
        return CornerSet::default();
    }
    let max_r = resp.max();
    if !max_r.is_finite() || max_r <= 0.0 {
        return CornerSet::default();
    }
    let thr = (params.threshold_rel * max_r).max(0.0);

    let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
    for y in md..h - md {
        for x in md..w - md {
            let v = resp.at(x, y);
            if v <= thr {
                continue;
            }
            if is_local_max(resp, x, y, md as i64, v) {
                candidates.push((v, y, x));
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut accepted: Vec<(usize, usize)> = Vec::new();
    for &(_, row, col) in &candidates {
        let clear = accepted
            .iter()
            .all(|&(r, c)| row.abs_diff(r).max(col.abs_diff(c)) > md);
        if clear {
            accepted.push((row, col));
        }
    }
    log::debug!(
        "harris: max={max_r:.4} thr={thr:.4} candidates={} corners={}",
        candidates.len(),
        accepted.len()
    );
    CornerSet { points: accepted }
}

/// Harris response plus peak picking in one call.
pub fn detect_corners(mask: &BinaryMask, params: &HarrisParams) -> (ResponseMap, CornerSet) {
    let resp = harris_response(mask, params);
    let corners = corner_peaks(&resp, params);
    (resp, corners)
}
