//! Pure geometry helpers shared by layout, hit testing and SVG emission.

use crate::config::LayoutConfig;
use serde::{Deserialize, Serialize};
use wirescope_core::ComponentShape;

const PARALLEL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn or(self, fallback: Point) -> Point {
        Point {
            x: finite_or(self.x, fallback.x),
            y: finite_or(self.y, fallback.y),
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut it = points.into_iter().filter(|p| p.x.is_finite() && p.y.is_finite());
        let first = it.next()?;
        let mut b = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in it {
            b.include_point(p);
        }
        Some(b)
    }

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width.max(0.0),
            max_y: y + height.max(0.0),
        }
    }

    pub fn include_point(&mut self, p: Point) {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return;
        }
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&mut self, other: &Bounds) {
        self.include_point(Point::new(other.min_x, other.min_y));
        self.include_point(Point::new(other.max_x, other.max_y));
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Replaces NaN and infinities with `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Intersection point of segments `(x1,y1)-(x2,y2)` and `(x3,y3)-(x4,y4)`.
///
/// Returns `None` for parallel (or degenerate) segments and when the lines cross outside either
/// segment.
#[allow(clippy::too_many_arguments)]
pub fn segment_intersection(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    x4: f64,
    y4: f64,
) -> Option<Point> {
    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if !denom.is_finite() || denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
}

/// Vertical offset of rail `i` among `total` rails sharing the band between `from_y` and `to_y`.
///
/// Rails are centred on zero. When the band has height, the step shrinks so the outermost rails
/// stay inside it.
pub fn connection_offset(i: usize, total: usize, from_y: f64, to_y: f64, step: f64) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    let center = (total - 1) as f64 / 2.0;
    let mut step = step.abs();
    let half_band = (to_y - from_y).abs() / 2.0;
    if half_band > 0.0 {
        step = step.min(half_band * 0.8 / center);
    }
    finite_or((i as f64 - center) * step, 0.0)
}

/// Distance of rail `i` of `total` from a row whose wires turn outside it, into a gap of `room`.
///
/// The first rail sits `clearance` away from the row; the step shrinks so the last rail keeps the
/// same clearance from the row on the other side of the gap.
pub fn same_row_offset(i: usize, total: usize, clearance: f64, step: f64, room: f64) -> f64 {
    let room = room.max(0.0);
    let clearance = clearance.abs().min(room / 2.0);
    let mut step = step.abs();
    if total > 1 {
        step = step.min((room - 2.0 * clearance) / (total - 1) as f64);
    }
    finite_or(clearance + i as f64 * step, 0.0)
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

pub fn connector_width(label_width: f64, config: &LayoutConfig) -> f64 {
    let label_width = finite_or(label_width, 0.0);
    (label_width + config.connector_padding * 2.0).max(config.connector_min_width)
}

/// Width of a component box: the widest of label, connectors, minimum and fuse column.
pub fn component_width(
    label_width: f64,
    connector_widths: &[f64],
    shape: ComponentShape,
    has_fuse_annotations: bool,
    config: &LayoutConfig,
) -> f64 {
    let label_width = finite_or(label_width, 0.0);
    let label_driven = label_width + config.label_padding * 2.0;

    let connector_driven = match shape {
        ComponentShape::Rectangle if connector_widths.len() > 1 => {
            let sum: f64 = connector_widths.iter().sum();
            let gaps = config.connector_gap * (connector_widths.len() - 1) as f64;
            sum + gaps + config.connector_padding * 2.0
        }
        ComponentShape::Splice => config.splice_radius * 2.0 + config.label_padding,
        _ => connector_widths.iter().copied().fold(0.0, f64::max) + config.connector_padding * 2.0,
    };
    let minimum = match shape {
        ComponentShape::Splice => 0.0,
        _ => config.component_min_width,
    };
    let fuse_driven = if has_fuse_annotations {
        label_driven + config.fuse_annotation_width
    } else {
        0.0
    };

    label_driven.max(connector_driven).max(minimum).max(fuse_driven)
}

/// Left edges of boxes laid out left to right: each x is the start plus all prior widths and gaps.
pub fn row_positions(widths: &[f64], start_x: f64, gap: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(widths.len());
    let mut x = start_x;
    for w in widths {
        out.push(x);
        x += finite_or(*w, 0.0) + gap;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_meet_at_known_point() {
        let p = segment_intersection(0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0).unwrap();
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);

        let p = segment_intersection(0.0, 50.0, 100.0, 50.0, 30.0, 0.0, 30.0, 80.0).unwrap();
        assert!((p.x - 30.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_or_parallel_segments_do_not_intersect() {
        assert!(segment_intersection(0.0, 0.0, 10.0, 0.0, 0.0, 5.0, 10.0, 5.0).is_none());
        assert!(segment_intersection(0.0, 0.0, 1.0, 1.0, 5.0, 0.0, 6.0, -3.0).is_none());
        assert!(segment_intersection(0.0, 0.0, 10.0, 0.0, 20.0, -5.0, 20.0, 5.0).is_none());
        assert!(segment_intersection(0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0).is_none());
    }

    #[test]
    fn offsets_are_centred_and_stay_inside_the_band() {
        assert_eq!(connection_offset(0, 1, 0.0, 100.0, 10.0), 0.0);
        let offsets: Vec<f64> = (0..3).map(|i| connection_offset(i, 3, 0.0, 100.0, 10.0)).collect();
        assert_eq!(offsets, vec![-10.0, 0.0, 10.0]);

        let many: Vec<f64> = (0..41).map(|i| connection_offset(i, 41, 0.0, 100.0, 10.0)).collect();
        assert!(many.iter().all(|o| o.abs() < 50.0));
        assert!(many.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn finite_or_replaces_non_finite() {
        assert_eq!(finite_or(f64::NAN, 3.0), 3.0);
        assert_eq!(finite_or(f64::INFINITY, -1.0), -1.0);
        assert_eq!(finite_or(2.5, 3.0), 2.5);
    }

    #[test]
    fn widths_take_the_largest_driver() {
        let cfg = LayoutConfig::default();
        let narrow = component_width(10.0, &[], ComponentShape::Rectangle, false, &cfg);
        assert_eq!(narrow, cfg.component_min_width);

        let wide_label = component_width(400.0, &[], ComponentShape::Rectangle, false, &cfg);
        assert_eq!(wide_label, 400.0 + cfg.label_padding * 2.0);

        let connectors = [100.0, 100.0, 100.0];
        let many = component_width(10.0, &connectors, ComponentShape::Rectangle, false, &cfg);
        assert_eq!(
            many,
            300.0 + cfg.connector_gap * 2.0 + cfg.connector_padding * 2.0
        );

        let fused = component_width(200.0, &[], ComponentShape::Rectangle, true, &cfg);
        assert_eq!(
            fused,
            200.0 + cfg.label_padding * 2.0 + cfg.fuse_annotation_width
        );
    }

    #[test]
    fn rows_accumulate_prior_widths() {
        assert_eq!(
            row_positions(&[100.0, 50.0, 70.0], 10.0, 20.0),
            vec![10.0, 130.0, 200.0]
        );
    }

    #[test]
    fn same_row_offsets_squeeze_into_the_gap() {
        assert_eq!(same_row_offset(0, 3, 40.0, 10.0, 240.0), 40.0);
        assert_eq!(same_row_offset(2, 3, 40.0, 10.0, 240.0), 60.0);
        let last = same_row_offset(29, 30, 40.0, 10.0, 240.0);
        assert!((last - 200.0).abs() < 1e-9);
        assert_eq!(same_row_offset(1, 2, 40.0, 10.0, 20.0), 10.0);
    }
}
