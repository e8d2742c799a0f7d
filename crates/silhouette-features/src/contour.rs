//! Outer-boundary extraction and main-contour selection.
//!
//! Each 8-connected foreground component yields one closed boundary that
//! runs along pixel edges (the "crack" between object and background
//! pixels). Vertices sit on the pixel-corner lattice, so the shoelace area
//! of a boundary equals the number of pixels it encloses.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use silhouette_core::{
    chain_code_length, convex_hull, polygon_area, polygon_moments, BinaryMask, BoundingBox,
    CentralMoments, PixelPoint,
};

use crate::ContourParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Closed outer boundary of one connected component.
///
/// Only direction changes are stored; the closing edge is implicit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<PixelPoint>,
}

impl Contour {
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pixels just inside the boundary, in walk order.
    ///
    /// Every pixel edge of the boundary contributes the pixel on its inner
    /// side; consecutive repeats are merged, so neighbouring entries (and the
    /// last and first) are always one king move apart.
    pub fn boundary_pixels(&self) -> Vec<PixelPoint> {
        let n = self.points.len();
        let mut out: Vec<PixelPoint> = Vec::with_capacity(2 * n);
        for i in 0..n {
            let (from, to) = (self.points[i], self.points[(i + 1) % n]);
            let (dx, dy) = ((to.x - from.x).signum(), (to.y - from.y).signum());
            // The component lies to the right of the walk: (-dy, dx) with y down.
            let (rx, ry) = (-dy, dx);
            let steps = (to.x - from.x).abs() + (to.y - from.y).abs();
            for k in 0..steps {
                let pixel = PixelPoint::new(
                    from.x + k * dx + dx.min(0) + rx.min(0),
                    from.y + k * dy + dy.min(0) + ry.min(0),
                );
                if out.last() != Some(&pixel) {
                    out.push(pixel);
                }
            }
        }
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
        out
    }
}

/// How the main contour was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Largest candidate inside the area window.
    Valid,
    /// No candidate passed the area window; the largest overall was used.
    Fallback,
}

impl Selection {
    pub fn is_valid(self) -> bool {
        matches!(self, Selection::Valid)
    }
}

/// Geometric measurements of the selected contour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourMetrics {
    pub area: f64,
    pub perimeter: f64,
    pub bbox: BoundingBox,
    pub hull: Vec<PixelPoint>,
    pub hull_area: f64,
    pub moments: CentralMoments,
    pub mask_width: usize,
    pub mask_height: usize,
}

impl ContourMetrics {
    /// Measure `contour`. The perimeter is the chain-code estimate over
    /// [`Contour::boundary_pixels`]; everything else is exact on the
    /// pixel-edge polygon.
    pub fn measure(contour: &Contour, mask_width: usize, mask_height: usize) -> Self {
        let area = contour.area();
        let perimeter = chain_code_length(&contour.boundary_pixels());
        let bbox = BoundingBox::from_points(&contour.points).unwrap_or_default();
        let hull = convex_hull(&contour.points);
        let hull_area = polygon_area(&hull);
        let moments = polygon_moments(&contour.points);
        Self {
            area,
            perimeter,
            bbox,
            hull,
            hull_area,
            moments,
            mask_width,
            mask_height,
        }
    }
}

/// Selected object boundary plus the diagnostics of the selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MainContour {
    pub contour: Contour,
    pub metrics: ContourMetrics,
    pub selection: Selection,
    /// Area of every candidate, in discovery (raster) order.
    pub candidate_areas: Vec<f64>,
}

impl MainContour {
    pub fn candidate_count(&self) -> usize {
        self.candidate_areas.len()
    }
}

const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Label 8-connected foreground components.
///
/// Returns the label image (`0` = background, components numbered from `1`
/// in raster order of their first pixel) and, per component, that first
/// pixel.
pub fn label_components(mask: &BinaryMask) -> (Vec<u32>, Vec<(usize, usize)>) {
    let (w, h) = (mask.width, mask.height);
    let mut labels = vec![0u32; w * h];
    let mut seeds = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if !mask.data[idx] || labels[idx] != 0 {
                continue;
            }
            seeds.push((x, y));
            let label = seeds.len() as u32;
            labels[idx] = label;
            queue.push_back((x, y));
            while let Some((cx, cy)) = queue.pop_front() {
                for (dx, dy) in NEIGHBORS_8 {
                    let (nx, ny) = (cx as i64 + dx, cy as i64 + dy);
                    if !mask.is_set(nx, ny) {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if labels[nidx] == 0 {
                        labels[nidx] = label;
                        queue.push_back((nx as usize, ny as usize));
                    }
                }
            }
        }
    }
    (labels, seeds)
}

// East, South, West, North with y pointing down; index + 1 is a right turn.
const DIRS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Walk the outer pixel-edge boundary of the component containing `start`,
/// which must be that component's first pixel in raster order.
///
/// The walk keeps the component on its right. At each lattice vertex it
/// turns left when the pixel ahead-left belongs to the component (so
/// diagonal neighbours stay on the same boundary), goes straight when only
/// the pixel ahead-right does, and turns right otherwise.
fn trace_outer(
    labels: &[u32],
    width: usize,
    height: usize,
    label: u32,
    start: (usize, usize),
) -> Contour {
    let inside = |x: i32, y: i32| -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < width
            && (y as usize) < height
            && labels[y as usize * width + x as usize] == label
    };

    let origin = PixelPoint::new(start.0 as i32, start.1 as i32);
    let mut vertex = origin;
    let mut dir = 0usize;
    let mut points = Vec::new();

    loop {
        let (dx, dy) = DIRS[dir];
        let (rx, ry) = DIRS[(dir + 1) % 4];
        let next = PixelPoint::new(vertex.x + dx, vertex.y + dy);
        // Pixel spanned from `next` by unit vectors `a` and `b`.
        let pixel = |ax: i32, ay: i32, bx: i32, by: i32| {
            inside(next.x + ax.min(bx).min(0), next.y + ay.min(by).min(0))
        };
        let ahead_right = pixel(dx, dy, rx, ry);
        let ahead_left = pixel(dx, dy, -rx, -ry);

        let new_dir = if ahead_left {
            (dir + 3) % 4
        } else if ahead_right {
            dir
        } else {
            (dir + 1) % 4
        };
        vertex = next;
        if new_dir != dir {
            points.push(vertex);
        }
        dir = new_dir;
        if vertex == origin && dir == 0 {
            break;
        }
    }
    Contour { points }
}

/// Outer boundary of every 8-connected component, in raster order.
pub fn find_contours(mask: &BinaryMask) -> Vec<Contour> {
    let (labels, seeds) = label_components(mask);
    seeds
        .iter()
        .enumerate()
        .map(|(i, &seed)| trace_outer(&labels, mask.width, mask.height, i as u32 + 1, seed))
        .collect()
}

fn largest(candidates: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, area) in candidates {
        match best {
            Some((_, a)) if area <= a => {}
            _ => best = Some((i, area)),
        }
    }
    best.map(|(i, _)| i)
}

/// Pick the object boundary from a filled mask.
///
/// Candidates with `min_area_frac * img_area < area < max_area_frac * img_area`
/// are preferred; among them the largest wins (earliest on ties). If none
/// qualifies, the largest candidate overall is returned as
/// [`Selection::Fallback`]. `None` means the mask has no foreground.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, params), fields(width = mask.width, height = mask.height))
)]
pub fn find_main_contour(
    mask: &BinaryMask,
    img_area: usize,
    params: &ContourParams,
) -> Option<MainContour> {
    let contours = find_contours(mask);
    if contours.is_empty() {
        log::debug!("no contours found");
        return None;
    }

    let img_area_f = img_area as f64;
    let areas: Vec<f64> = contours.iter().map(Contour::area).collect();
    for (i, area) in areas.iter().enumerate() {
        log::debug!(
            "contour {i}: area={area:.0} ({:.1}% of image)",
            100.0 * area / img_area_f.max(1.0)
        );
    }

    let lo = params.min_area_frac * img_area_f;
    let hi = params.max_area_frac * img_area_f;
    let valid = largest(
        areas
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, a)| lo < a && a < hi),
    );
    let (index, selection) = match valid {
        Some(i) => (i, Selection::Valid),
        None => {
            let i = largest(areas.iter().copied().enumerate())?;
            log::warn!(
                "no contour within ({lo:.0}, {hi:.0}) px; falling back to largest (area {:.0})",
                areas[i]
            );
            (i, Selection::Fallback)
        }
    };

    let contour = contours.into_iter().nth(index)?;
    let metrics = ContourMetrics::measure(&contour, mask.width, mask.height);
    log::debug!(
        "main contour: area={:.1} perimeter={:.2} bbox={:?} hull_area={:.1} selection={:?}",
        metrics.area,
        metrics.perimeter,
        metrics.bbox,
        metrics.hull_area,
        selection
    );
    Some(MainContour {
        contour,
        metrics,
        selection,
        candidate_areas: areas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_mask(w: usize, h: usize, x0: usize, y0: usize, rw: usize, rh: usize) -> BinaryMask {
        BinaryMask::from_fn(w, h, |x, y| {
            (x0..x0 + rw).contains(&x) && (y0..y0 + rh).contains(&y)
        })
    }

    #[test]
    fn square_boundary_has_four_corners() {
        let mask = rect_mask(100, 100, 10, 10, 80, 80);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert_eq!(c.len(), 4);
        assert_relative_eq!(c.area(), 6400.0);
        // 79-pixel runs between the corner pixels.
        assert_eq!(c.boundary_pixels().len(), 4 * 79);
    }

    #[test]
    fn boundary_pixels_are_king_moves_apart() {
        let mask = BinaryMask::from_fn(40, 40, |x, y| {
            let (dx, dy) = (x as f64 - 19.5, y as f64 - 19.5);
            (dx * dx + dy * dy <= 144.0 && !(x > 19 && y < 12)) || (x == 8 && y == 30)
        });
        let contours = find_contours(&mask);
        assert!(!contours.is_empty());
        for c in &contours {
            let chain = c.boundary_pixels();
            for (i, p) in chain.iter().enumerate() {
                assert!(mask.is_set(p.x as i64, p.y as i64), "{p:?} is not foreground");
                let q = chain[(i + 1) % chain.len()];
                let d = q - *p;
                if chain.len() > 1 {
                    assert_eq!(d.x.abs().max(d.y.abs()), 1, "{p:?} -> {q:?}");
                }
            }
        }
    }

    #[test]
    fn boundary_pixels_of_tiny_shapes() {
        let dot = BinaryMask::from_fn(5, 5, |x, y| x == 2 && y == 2);
        let c = &find_contours(&dot)[0];
        assert_eq!(c.boundary_pixels(), vec![PixelPoint::new(2, 2)]);

        // A one-pixel-wide bar is walked out along its top and back along its bottom.
        let bar = BinaryMask::from_fn(10, 5, |x, y| (2..7).contains(&x) && y == 2);
        let chain = find_contours(&bar)[0].boundary_pixels();
        assert_eq!(chain.len(), 8);
    }

    #[test]
    fn boundary_area_matches_pixel_count() {
        let mask = BinaryMask::from_fn(60, 60, |x, y| {
            let (dx, dy) = (x as f64 - 29.5, y as f64 - 29.5);
            dx * dx + dy * dy <= 400.0 || (x == 5 && y == 5)
        });
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
        let total: f64 = contours.iter().map(Contour::area).sum();
        assert_relative_eq!(total, mask.count() as f64);
        // The lone pixel comes first in raster order.
        assert_relative_eq!(contours[0].area(), 1.0);
    }

    #[test]
    fn diagonal_neighbours_share_one_boundary() {
        let mask = BinaryMask::from_fn(6, 6, |x, y| (x == 2 && y == 2) || (x == 3 && y == 3));
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_relative_eq!(contours[0].area(), 2.0);
    }

    #[test]
    fn empty_mask_has_no_main_contour() {
        let mask = BinaryMask::new(20, 20);
        assert!(find_main_contour(&mask, 400, &ContourParams::default()).is_none());
    }

    #[test]
    fn area_window_prefers_mid_sized_objects() {
        // Full-frame object and a speck: neither passes, so fall back to the
        // biggest one.
        let full = BinaryMask::from_fn(50, 50, |_, _| true);
        let main = find_main_contour(&full, 2500, &ContourParams::default()).expect("contour");
        assert_eq!(main.selection, Selection::Fallback);
        assert_relative_eq!(main.metrics.area, 2500.0);

        // Speck (area 4 < 1% of 2500) beside a 20x20 block: block is valid.
        let mut mask = rect_mask(50, 50, 25, 25, 20, 20);
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            mask.set(x, y, true);
        }
        let main = find_main_contour(&mask, 2500, &ContourParams::default()).expect("contour");
        assert!(main.selection.is_valid());
        assert_eq!(main.candidate_count(), 2);
        assert_relative_eq!(main.metrics.area, 400.0);
        assert_eq!(
            main.metrics.bbox,
            BoundingBox {
                x: 25,
                y: 25,
                width: 20,
                height: 20
            }
        );
    }

    #[test]
    fn only_small_objects_fall_back_to_largest() {
        let mut mask = rect_mask(100, 100, 10, 10, 5, 5);
        for y in 50..52 {
            for x in 50..52 {
                mask.set(x, y, true);
            }
        }
        let main = find_main_contour(&mask, 10_000, &ContourParams::default()).expect("contour");
        assert_eq!(main.selection, Selection::Fallback);
        assert_relative_eq!(main.metrics.area, 25.0);
    }

    #[test]
    fn rectangle_metrics() {
        let mask = rect_mask(100, 100, 20, 40, 60, 20);
        let main = find_main_contour(&mask, 10_000, &ContourParams::default()).expect("contour");
        let m = &main.metrics;
        assert_relative_eq!(m.area, 1200.0);
        // Outer pixel ring 2 * (59 + 19) steps, four turns, half-pixel offset.
        let expected = 156.0 + 4.0 * silhouette_core::CHAIN_TURN_WEIGHT + std::f64::consts::PI;
        assert_relative_eq!(m.perimeter, expected, epsilon = 1e-9);
        assert_relative_eq!(m.perimeter, 160.0, max_relative = 0.01);
        assert_relative_eq!(m.hull_area, 1200.0);
        assert_eq!((m.bbox.width, m.bbox.height), (60, 20));
        assert_relative_eq!(m.moments.centroid_x, 50.0);
        assert_relative_eq!(m.moments.centroid_y, 50.0);
        assert_eq!((m.mask_width, m.mask_height), (100, 100));
    }
}
