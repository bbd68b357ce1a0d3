//! Polygons with rounded corners.

use frameforge_math::{cross2, left_normal, Point2, Tolerance};

use crate::wire::{Segment, Wire};
use crate::SectionError;

/// A polygon vertex with the fillet radius to apply there (0 = sharp).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Corner {
    pub point: Point2,
    pub radius: f64,
}

impl Corner {
    pub fn sharp(x: f64, y: f64) -> Self {
        Self {
            point: Point2::new(x, y),
            radius: 0.0,
        }
    }

    pub fn round(x: f64, y: f64, radius: f64) -> Self {
        Self {
            point: Point2::new(x, y),
            radius,
        }
    }
}

struct Rounding {
    entry: Point2,
    exit: Point2,
    arc: Option<Segment>,
}

/// Build a closed wire through `corners`, replacing each corner with a
/// tangent arc of its radius.
///
/// Left turns get counter-clockwise arcs and right turns clockwise ones, so a
/// counter-clockwise polygon stays counter-clockwise.
pub(crate) fn filleted_polygon(corners: &[Corner]) -> Result<Wire, SectionError> {
    let n = corners.len();
    if n < 3 {
        return Err(SectionError::EmptyWire);
    }
    let tol = Tolerance::DEFAULT;

    let mut roundings = Vec::with_capacity(n);
    for i in 0..n {
        let prev = corners[(i + n - 1) % n].point;
        let Corner { point, radius } = corners[i];
        let next = corners[(i + 1) % n].point;

        let d_in = (point - prev).normalize();
        let d_out = (next - point).normalize();
        let turn = cross2(&d_in, &d_out).atan2(d_in.dot(&d_out));

        if radius <= tol.linear || turn.abs() < 1e-9 {
            roundings.push(Rounding {
                entry: point,
                exit: point,
                arc: None,
            });
            continue;
        }

        let setback = radius * (turn.abs() / 2.0).tan();
        let entry = point - d_in * setback;
        let exit = point + d_out * setback;
        let ccw = turn > 0.0;
        let side = if ccw { 1.0 } else { -1.0 };
        let center = entry + left_normal(&d_in) * (radius * side);
        roundings.push(Rounding {
            entry,
            exit,
            arc: Some(Segment::Arc {
                start: entry,
                end: exit,
                center,
                ccw,
            }),
        });
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let edge = (corners[j].point - corners[i].point).norm();
        let used = (roundings[i].exit - corners[i].point).norm()
            + (roundings[j].entry - corners[j].point).norm();
        if used > edge + tol.linear {
            return Err(SectionError::FilletTooLarge { corner: i });
        }
    }

    let mut segments = Vec::with_capacity(2 * n);
    for i in 0..n {
        let here = &roundings[i];
        let next = &roundings[(i + 1) % n];
        if let Some(arc) = &here.arc {
            segments.push(arc.clone());
        }
        if (next.entry - here.exit).norm() > tol.linear {
            segments.push(Segment::Line {
                start: here.exit,
                end: next.entry,
            });
        }
    }

    Wire::new(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rounded_rectangle_area() {
        let r = 2.0;
        let wire = filleted_polygon(&[
            Corner::round(0.0, 0.0, r),
            Corner::round(20.0, 0.0, r),
            Corner::round(20.0, 10.0, r),
            Corner::round(0.0, 10.0, r),
        ])
        .unwrap();
        assert_eq!(wire.len(), 8);
        let expected = 200.0 - 4.0 * r * r * (1.0 - PI / 4.0);
        assert!((wire.signed_area() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_concave_corner_gets_clockwise_arc() {
        // L-shape: the corner at (2, 2) turns right
        let wire = filleted_polygon(&[
            Corner::sharp(0.0, 0.0),
            Corner::sharp(10.0, 0.0),
            Corner::sharp(10.0, 2.0),
            Corner::round(2.0, 2.0, 1.0),
            Corner::sharp(2.0, 10.0),
            Corner::sharp(0.0, 10.0),
        ])
        .unwrap();
        let arc = wire
            .segments()
            .iter()
            .find(|s| matches!(s, Segment::Arc { .. }))
            .unwrap();
        assert!(matches!(arc, Segment::Arc { ccw: false, .. }));
        if let Segment::Arc { center, .. } = arc {
            assert!((center - Point2::new(3.0, 3.0)).norm() < 1e-12);
        }
        let sharp_area = 10.0 * 2.0 + 2.0 * 8.0;
        let expected = sharp_area + (1.0 - PI / 4.0);
        assert!((wire.signed_area() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fillet_too_large() {
        let result = filleted_polygon(&[
            Corner::round(0.0, 0.0, 6.0),
            Corner::round(10.0, 0.0, 6.0),
            Corner::sharp(10.0, 10.0),
            Corner::sharp(0.0, 10.0),
        ]);
        assert!(matches!(
            result,
            Err(SectionError::FilletTooLarge { corner: 0 })
        ));
    }

    #[test]
    fn test_fillets_meeting_drop_the_line() {
        // Two radius-5 fillets on a 10 mm edge consume it entirely
        let wire = filleted_polygon(&[
            Corner::round(0.0, 0.0, 5.0),
            Corner::round(10.0, 0.0, 5.0),
            Corner::sharp(10.0, 20.0),
            Corner::sharp(0.0, 20.0),
        ])
        .unwrap();
        let lines = wire
            .segments()
            .iter()
            .filter(|s| matches!(s, Segment::Line { .. }))
            .count();
        assert_eq!(lines, 3);
    }
}
