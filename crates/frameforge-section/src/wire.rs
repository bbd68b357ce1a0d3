//! Planar segments and closed wires.

use std::f64::consts::PI;

use frameforge_math::{cross2, Point2, Tolerance, Vec2};

use crate::SectionError;

/// Pieces per full turn when an arc is flattened for intersection tests.
const ARC_PIECES_PER_TURN: f64 = 64.0;

/// A segment of a section wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A line segment from start to end.
    Line {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
    },
    /// A circular arc from start to end around a center.
    Arc {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
        /// Center of the arc.
        center: Point2,
        /// If true, the arc runs counter-clockwise from start to end.
        ccw: bool,
    },
}

impl Segment {
    /// Start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            Segment::Line { start, .. } | Segment::Arc { start, .. } => *start,
        }
    }

    /// End point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            Segment::Line { end, .. } | Segment::Arc { end, .. } => *end,
        }
    }

    /// Check if this segment is degenerate (zero length or zero radius).
    pub fn is_degenerate(&self) -> bool {
        let tol = Tolerance::DEFAULT;
        match self {
            Segment::Line { start, end } => tol.points2_equal(start, end),
            Segment::Arc {
                start, end, center, ..
            } => {
                let r1 = (start - center).norm();
                let r2 = (end - center).norm();
                r1 < tol.linear || r2 < tol.linear || (end - start).norm() < tol.linear
            }
        }
    }

    /// Length of this segment.
    pub fn length(&self) -> f64 {
        match self {
            Segment::Line { start, end } => (end - start).norm(),
            Segment::Arc { start, center, .. } => (start - center).norm() * self.sweep().abs(),
        }
    }

    /// Signed sweep angle in radians (positive counter-clockwise, 0 for lines).
    pub fn sweep(&self) -> f64 {
        match self {
            Segment::Line { .. } => 0.0,
            Segment::Arc {
                start,
                end,
                center,
                ccw,
            } => {
                let d_start = start - center;
                let d_end = end - center;
                let mut angle = d_end.y.atan2(d_end.x) - d_start.y.atan2(d_start.x);
                if *ccw {
                    if angle <= 0.0 {
                        angle += 2.0 * PI;
                    }
                } else if angle >= 0.0 {
                    angle -= 2.0 * PI;
                }
                angle
            }
        }
    }

    /// The same segment traversed backwards.
    pub fn reversed(&self) -> Self {
        match self {
            Segment::Line { start, end } => Segment::Line {
                start: *end,
                end: *start,
            },
            Segment::Arc {
                start,
                end,
                center,
                ccw,
            } => Segment::Arc {
                start: *end,
                end: *start,
                center: *center,
                ccw: !ccw,
            },
        }
    }

    /// Contribution to `½∮(x dy − y dx)`.
    pub fn area_term(&self) -> f64 {
        match self {
            Segment::Line { start, end } => 0.5 * (start.x * end.y - end.x * start.y),
            Segment::Arc { start, center, .. } => {
                let r = (start - center).norm();
                let (t0, t1) = self.parameter_range();
                0.5 * (r * r * (t1 - t0) + center.x * r * (t1.sin() - t0.sin())
                    - center.y * r * (t1.cos() - t0.cos()))
            }
        }
    }

    /// Contributions to the first moments `(∬x dA, ∬y dA)`.
    pub fn moment_terms(&self) -> (f64, f64) {
        match self {
            Segment::Line { start: a, end: b } => (
                (b.y - a.y) * (a.x * a.x + a.x * b.x + b.x * b.x) / 6.0,
                -(b.x - a.x) * (a.y * a.y + a.y * b.y + b.y * b.y) / 6.0,
            ),
            Segment::Arc { start, center, .. } => {
                let r = (start - center).norm();
                let (cx, cy) = (center.x, center.y);
                let (t0, t1) = self.parameter_range();
                let fx = |t: f64| {
                    cx * cx * r * t.sin()
                        + 2.0 * cx * r * r * (t / 2.0 + (2.0 * t).sin() / 4.0)
                        + r.powi(3) * (t.sin() - t.sin().powi(3) / 3.0)
                };
                let fy = |t: f64| {
                    -cy * cy * r * t.cos()
                        + 2.0 * cy * r * r * (t / 2.0 - (2.0 * t).sin() / 4.0)
                        + r.powi(3) * (-t.cos() + t.cos().powi(3) / 3.0)
                };
                (0.5 * (fx(t1) - fx(t0)), 0.5 * (fy(t1) - fy(t0)))
            }
        }
    }

    /// Start and end angle of an arc, with `end − start` equal to the sweep.
    fn parameter_range(&self) -> (f64, f64) {
        match self {
            Segment::Line { .. } => (0.0, 0.0),
            Segment::Arc { start, center, .. } => {
                let d = start - center;
                let t0 = d.y.atan2(d.x);
                (t0, t0 + self.sweep())
            }
        }
    }

    /// Points along the segment, excluding the end point.
    ///
    /// Lines yield their start only; arcs are flattened to chords.
    pub fn flatten(&self) -> Vec<Point2> {
        match self {
            Segment::Line { start, .. } => vec![*start],
            Segment::Arc { start, center, .. } => {
                let r = (start - center).norm();
                let (t0, t1) = self.parameter_range();
                let pieces = ((t1 - t0).abs() / (2.0 * PI) * ARC_PIECES_PER_TURN)
                    .ceil()
                    .max(2.0) as usize;
                (0..pieces)
                    .map(|i| {
                        let t = t0 + (t1 - t0) * i as f64 / pieces as f64;
                        Point2::new(center.x + r * t.cos(), center.y + r * t.sin())
                    })
                    .collect()
            }
        }
    }

    /// Endpoints plus any axis-extreme points an arc passes through.
    pub fn extreme_points(&self) -> Vec<Point2> {
        let mut pts = vec![self.start(), self.end()];
        if let Segment::Arc { start, center, .. } = self {
            let r = (start - center).norm();
            let (t0, t1) = self.parameter_range();
            let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            let first = (lo / (PI / 2.0)).ceil() as i64;
            let last = (hi / (PI / 2.0)).floor() as i64;
            for k in first..=last {
                let t = k as f64 * PI / 2.0;
                pts.push(Point2::new(center.x + r * t.cos(), center.y + r * t.sin()));
            }
        }
        pts
    }
}

/// A closed chain of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    segments: Vec<Segment>,
}

impl Wire {
    /// Create a wire, checking that it is non-empty, non-degenerate and
    /// closed.
    pub fn new(segments: Vec<Segment>) -> Result<Self, SectionError> {
        if segments.is_empty() {
            return Err(SectionError::EmptyWire);
        }

        for (i, seg) in segments.iter().enumerate() {
            if seg.is_degenerate() {
                return Err(SectionError::DegenerateSegment(i));
            }
        }

        let tol = Tolerance::DEFAULT;
        for (i, seg) in segments.iter().enumerate() {
            let next = &segments[(i + 1) % segments.len()];
            let gap = (next.start() - seg.end()).norm();
            if gap > tol.linear {
                return Err(SectionError::NotClosed(gap));
            }
        }

        Ok(Self { segments })
    }

    /// Closed polygon through `points` (the closing edge is implicit).
    pub fn polygon(points: &[Point2]) -> Result<Self, SectionError> {
        let segments = points
            .iter()
            .enumerate()
            .map(|(i, p)| Segment::Line {
                start: *p,
                end: points[(i + 1) % points.len()],
            })
            .collect();
        Self::new(segments)
    }

    /// Counter-clockwise circle made of two half arcs.
    pub fn circle(center: Point2, radius: f64) -> Result<Self, SectionError> {
        let east = center + Vec2::new(radius, 0.0);
        let west = center - Vec2::new(radius, 0.0);
        Self::new(vec![
            Segment::Arc {
                start: east,
                end: west,
                center,
                ccw: true,
            },
            Segment::Arc {
                start: west,
                end: east,
                center,
                ccw: true,
            },
        ])
    }

    /// The segments in traversal order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a wire holds at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment start points.
    pub fn vertices(&self) -> Vec<Point2> {
        self.segments.iter().map(Segment::start).collect()
    }

    /// Total length of the segments.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Enclosed area, positive for counter-clockwise wires.
    pub fn signed_area(&self) -> f64 {
        self.segments.iter().map(Segment::area_term).sum()
    }

    /// First moments `(∬x dA, ∬y dA)`, signed like [`Wire::signed_area`].
    pub fn first_moments(&self) -> (f64, f64) {
        self.segments
            .iter()
            .map(Segment::moment_terms)
            .fold((0.0, 0.0), |(mx, my), (x, y)| (mx + x, my + y))
    }

    /// True for counter-clockwise winding.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// The wire traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(Segment::reversed).collect(),
        }
    }

    /// Closed polyline approximating the wire (first point not repeated).
    pub fn flatten(&self) -> Vec<Point2> {
        self.segments.iter().flat_map(Segment::flatten).collect()
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Point2, Point2) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in self.segments.iter().flat_map(Segment::extreme_points) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Even-odd point containment against the flattened wire.
    pub fn contains(&self, p: &Point2) -> bool {
        point_in_polyline(&self.flatten(), p)
    }

    /// First pair of non-adjacent flattened pieces that touch or cross.
    pub fn self_intersection(&self) -> Option<(usize, usize)> {
        let pts = self.flatten();
        let n = pts.len();
        if n < 4 {
            return None;
        }
        for i in 0..n {
            let (a0, a1) = (pts[i], pts[(i + 1) % n]);
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if segments_touch(&a0, &a1, &pts[j], &pts[(j + 1) % n]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// True when some piece of `self` touches or crosses a piece of `other`.
    pub fn touches(&self, other: &Wire) -> bool {
        let a = self.flatten();
        let b = other.flatten();
        (0..a.len()).any(|i| {
            let (a0, a1) = (a[i], a[(i + 1) % a.len()]);
            (0..b.len()).any(|j| segments_touch(&a0, &a1, &b[j], &b[(j + 1) % b.len()]))
        })
    }
}

/// Even-odd containment of `p` in the closed polyline `pts`.
pub fn point_in_polyline(pts: &[Point2], p: &Point2) -> bool {
    let mut inside = false;
    let n = pts.len();
    for i in 0..n {
        let (a, b) = (pts[i], pts[(i + 1) % n]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn orientation(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    cross2(&(b - a), &(c - a))
}

fn on_segment(a: &Point2, b: &Point2, p: &Point2, eps: f64) -> bool {
    p.x >= a.x.min(b.x) - eps
        && p.x <= a.x.max(b.x) + eps
        && p.y >= a.y.min(b.y) - eps
        && p.y <= a.y.max(b.y) + eps
}

fn segments_touch(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> bool {
    let scale = (a1 - a0).norm().max((b1 - b0).norm()).max(1.0);
    let eps = 1e-9 * scale * scale;
    let d1 = orientation(b0, b1, a0);
    let d2 = orientation(b0, b1, a1);
    let d3 = orientation(a0, a1, b0);
    let d4 = orientation(a0, a1, b1);

    if ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
    {
        return true;
    }

    let lin = 1e-9 * scale;
    (d1.abs() <= eps && on_segment(b0, b1, a0, lin))
        || (d2.abs() <= eps && on_segment(b0, b1, a1, lin))
        || (d3.abs() <= eps && on_segment(a0, a1, b0, lin))
        || (d4.abs() <= eps && on_segment(a0, a1, b1, lin))
}
