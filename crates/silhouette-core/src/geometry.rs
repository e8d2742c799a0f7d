//! Closed-polygon measurements on integer vertices.
//!
//! Polygons are given as vertex lists without repeating the first vertex;
//! the closing edge `last -> first` is implicit. Vertex orientation does not
//! matter for any of the unsigned quantities below.

use std::f64::consts::{PI, SQRT_2};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer lattice point (a pixel corner or a pixel index), `(x, y)` with `y`
/// pointing down.
pub type PixelPoint = Point2<i32>;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Tight box around `points`; `None` when empty.
    pub fn from_points(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x) as u32,
            height: (max_y - min_y) as u32,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Raw and central second-order moments of a polygon region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralMoments {
    pub m00: f64,
    pub centroid_x: f64,
    pub centroid_y: f64,
    pub mu20: f64,
    pub mu02: f64,
    pub mu11: f64,
}

/// Shoelace sum; positive for counter-clockwise vertices in `y`-up axes.
pub fn polygon_signed_area(points: &[PixelPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    acc as f64 * 0.5
}

pub fn polygon_area(points: &[PixelPoint]) -> f64 {
    polygon_signed_area(points).abs()
}

/// Green's-theorem moments up to second order.
///
/// Degenerate polygons (zero enclosed area) yield all-zero moments.
pub fn polygon_moments(points: &[PixelPoint]) -> CentralMoments {
    let n = points.len();
    if n < 3 {
        return CentralMoments::default();
    }

    let (mut a00, mut a10, mut a01) = (0.0f64, 0.0f64, 0.0f64);
    let (mut a20, mut a02, mut a11) = (0.0f64, 0.0f64, 0.0f64);
    for i in 0..n {
        let (x0, y0) = (points[i].x as f64, points[i].y as f64);
        let (x1, y1) = (points[(i + 1) % n].x as f64, points[(i + 1) % n].y as f64);
        let cross = x0 * y1 - x1 * y0;
        a00 += cross;
        a10 += (x0 + x1) * cross;
        a01 += (y0 + y1) * cross;
        a20 += (x0 * x0 + x0 * x1 + x1 * x1) * cross;
        a02 += (y0 * y0 + y0 * y1 + y1 * y1) * cross;
        a11 += (x0 * y1 + 2.0 * x0 * y0 + 2.0 * x1 * y1 + x1 * y0) * cross;
    }

    // Orientation flips every raw moment's sign together.
    let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
    let m00 = sign * a00 / 2.0;
    if m00.abs() < f64::EPSILON {
        return CentralMoments::default();
    }
    let m10 = sign * a10 / 6.0;
    let m01 = sign * a01 / 6.0;
    let m20 = sign * a20 / 12.0;
    let m02 = sign * a02 / 12.0;
    let m11 = sign * a11 / 24.0;

    let cx = m10 / m00;
    let cy = m01 / m00;
    CentralMoments {
        m00,
        centroid_x: cx,
        centroid_y: cy,
        mu20: m20 - cx * m10,
        mu02: m02 - cy * m01,
        mu11: m11 - cx * m01,
    }
}

#[inline]
fn cross(o: PixelPoint, a: PixelPoint, b: PixelPoint) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Convex hull by Andrew's monotone chain. Collinear points are dropped.
pub fn convex_hull(points: &[PixelPoint]) -> Vec<PixelPoint> {
    let mut pts: Vec<PixelPoint> = points.to_vec();
    pts.sort_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<PixelPoint> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Weight of one change of step direction in [`chain_code_length`].
///
/// With axis steps at 1 and diagonal steps at `sqrt(2)`, this value makes the
/// estimate exact on horizontal, vertical and diagonal runs and unbiased when
/// averaged over all edge orientations.
pub const CHAIN_TURN_WEIGHT: f64 = -0.1208;

/// Perimeter estimate from a closed 8-connected chain of boundary pixels.
///
/// `chain` lists the pixels whose centres trace the boundary, each step a
/// unit king move, closing back to the first. The weighted step count
/// measures the curve through the pixel centres, which runs half a pixel
/// inside the pixel-edge outline; offsetting a simple closed curve outward by
/// `d` adds `2 * pi * d` to its length, so `pi` is added on top.
///
/// An empty chain measures `0`; a single pixel measures `pi`.
pub fn chain_code_length(chain: &[PixelPoint]) -> f64 {
    let n = chain.len();
    match n {
        0 => return 0.0,
        1 => return PI,
        _ => {}
    }

    let step = |i: usize| chain[(i + 1) % n] - chain[i];
    let (mut axis, mut diagonal, mut turns) = (0usize, 0usize, 0usize);
    let mut prev = step(n - 1);
    for i in 0..n {
        let d = step(i);
        if d.x != 0 && d.y != 0 {
            diagonal += 1;
        } else {
            axis += 1;
        }
        if d != prev {
            turns += 1;
        }
        prev = d;
    }
    axis as f64 + SQRT_2 * diagonal as f64 + CHAIN_TURN_WEIGHT * turns as f64 + PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(raw: &[(i32, i32)]) -> Vec<PixelPoint> {
        raw.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect()
    }

    #[test]
    fn square_area_perimeter_and_box() {
        let sq = pts(&[(10, 10), (90, 10), (90, 90), (10, 90)]);
        assert_relative_eq!(polygon_area(&sq), 6400.0);
        let bbox = BoundingBox::from_points(&sq).expect("non-empty");
        assert_eq!(
            bbox,
            BoundingBox {
                x: 10,
                y: 10,
                width: 80,
                height: 80
            }
        );
        assert_eq!(bbox.area(), 6400);
    }

    #[test]
    fn orientation_does_not_change_moments() {
        let ccw = pts(&[(0, 0), (4, 0), (4, 2), (0, 2)]);
        let cw: Vec<PixelPoint> = ccw.iter().rev().copied().collect();
        let a = polygon_moments(&ccw);
        let b = polygon_moments(&cw);
        assert_relative_eq!(a.m00, 8.0);
        assert_relative_eq!(a.centroid_x, 2.0);
        assert_relative_eq!(a.centroid_y, 1.0);
        // Rectangle w x h: mu20 = w^3 h / 12, mu02 = w h^3 / 12, mu11 = 0.
        assert_relative_eq!(a.mu20, 64.0 * 2.0 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(a.mu02, 4.0 * 8.0 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(a.mu11, 0.0, epsilon = 1e-9);
        assert_relative_eq!(a.mu20, b.mu20, epsilon = 1e-9);
        assert_relative_eq!(a.mu11, b.mu11, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_polygons_measure_zero() {
        let line = pts(&[(0, 0), (5, 0), (10, 0)]);
        assert_eq!(polygon_area(&line), 0.0);
        assert_eq!(polygon_moments(&line), CentralMoments::default());
        assert_eq!(polygon_area(&pts(&[(1, 1)])), 0.0);
    }

    #[test]
    fn hull_of_l_shape_closes_the_notch() {
        let l_shape = pts(&[(0, 0), (4, 0), (4, 2), (2, 2), (2, 4), (0, 4)]);
        let hull = convex_hull(&l_shape);
        assert_eq!(hull.len(), 5);
        assert_relative_eq!(polygon_area(&l_shape), 12.0);
        assert_relative_eq!(polygon_area(&hull), 14.0);
    }

    #[test]
    fn hull_drops_collinear_vertices() {
        let with_mid = pts(&[(0, 0), (2, 0), (4, 0), (4, 4), (0, 4)]);
        assert_eq!(convex_hull(&with_mid).len(), 4);
    }

    /// Closed ring through `corners`, one pixel per unit king move.
    fn ring(corners: &[(i32, i32)]) -> Vec<PixelPoint> {
        let mut out = Vec::new();
        for (i, &(x0, y0)) in corners.iter().enumerate() {
            let (x1, y1) = corners[(i + 1) % corners.len()];
            let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());
            let steps = (x1 - x0).abs().max((y1 - y0).abs());
            for k in 0..steps {
                out.push(PixelPoint::new(x0 + k * sx, y0 + k * sy));
            }
        }
        out
    }

    #[test]
    fn chain_length_of_axis_aligned_square() {
        // Centres of the outer pixels of an 80x80 block.
        let chain = ring(&[(0, 0), (79, 0), (79, 79), (0, 79)]);
        assert_eq!(chain.len(), 316);
        let expected = 316.0 + 4.0 * CHAIN_TURN_WEIGHT + PI;
        assert_relative_eq!(chain_code_length(&chain), expected, epsilon = 1e-9);
        assert_relative_eq!(chain_code_length(&chain), 320.0, max_relative = 0.01);
    }

    #[test]
    fn chain_length_of_diagonal_diamond() {
        let chain = ring(&[(20, 0), (40, 20), (20, 40), (0, 20)]);
        assert_eq!(chain.len(), 80);
        let expected = 80.0 * SQRT_2 + 4.0 * CHAIN_TURN_WEIGHT + PI;
        assert_relative_eq!(chain_code_length(&chain), expected, epsilon = 1e-9);
    }

    #[test]
    fn chain_length_does_not_depend_on_start_or_direction() {
        let chain = ring(&[(0, 0), (6, 0), (9, 3), (9, 7), (0, 7)]);
        let mut rotated = chain.clone();
        rotated.rotate_left(5);
        let reversed: Vec<PixelPoint> = chain.iter().rev().copied().collect();
        let base = chain_code_length(&chain);
        assert_relative_eq!(chain_code_length(&rotated), base, epsilon = 1e-12);
        assert_relative_eq!(chain_code_length(&reversed), base, epsilon = 1e-12);
    }

    #[test]
    fn tiny_chains() {
        assert_eq!(chain_code_length(&[]), 0.0);
        assert_relative_eq!(chain_code_length(&pts(&[(3, 3)])), PI);
        // Two pixels: out and back, two reversals.
        let pair = pts(&[(3, 3), (4, 3)]);
        assert_relative_eq!(
            chain_code_length(&pair),
            2.0 + 2.0 * CHAIN_TURN_WEIGHT + PI,
            epsilon = 1e-12
        );
    }
}
