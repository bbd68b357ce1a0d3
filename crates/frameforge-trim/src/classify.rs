//! Cut-list formatting of bevel and trim angles.

use crate::CutAngle;

/// Prefix of an angle computed from a trim boundary.
pub const TRIM_MARKER: &str = "*";

/// Suffix of an end angle whose cut is rotated 90° about the profile edge.
pub const ROTATED_MARKER: &str = " (r90)";

/// An angle that cannot be reported.
pub const UNKNOWN: &str = "?";

/// Format an angle to one decimal, without a negative zero.
pub fn format_angle(degrees: f64) -> String {
    let rounded = (degrees * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.1}")
}

fn marked(angle: &CutAngle) -> Option<String> {
    match angle {
        CutAngle::Degrees(v) => Some(format!("{TRIM_MARKER}{}", format_angle(*v))),
        CutAngle::Unknown => None,
    }
}

fn sentinel() -> (String, String) {
    (UNKNOWN.to_string(), UNKNOWN.to_string())
}

/// Start and end cutting angles for a cut list.
///
/// `bsc1`/`bsc2` are the start bevels on the first and second axis, and
/// `bec1`/`bec2` the end bevels. Trim angles take precedence as far as they
/// can be combined with the bevels. Unresolvable combinations yield `("?", "?")`.
pub fn classify(
    bsc1: f64,
    bsc2: f64,
    bec1: f64,
    bec2: f64,
    trim_angles: &[CutAngle],
) -> (String, String) {
    match trim_angles {
        [] => classify_bevels(bsc1, bsc2, bec1, bec2),
        [only] => {
            let Some(trim) = marked(only) else {
                return sentinel();
            };
            let bevels: Vec<f64> = [bsc1, bsc2, bec1, bec2]
                .into_iter()
                .filter(|v| *v != 0.0)
                .collect();
            match bevels.as_slice() {
                [] => (format_angle(0.0), trim),
                [bevel] => (format_angle(bevel.abs()), trim),
                _ => sentinel(),
            }
        }
        [first, second] => match (marked(first), marked(second)) {
            (Some(a), Some(b)) => (a, b),
            _ => sentinel(),
        },
        _ => sentinel(),
    }
}

fn classify_bevels(s1: f64, s2: f64, e1: f64, e2: f64) -> (String, String) {
    let axis1_zero = s1 == 0.0 && e1 == 0.0;
    let axis2_zero = s2 == 0.0 && e2 == 0.0;

    if axis1_zero && axis2_zero {
        return (format_angle(0.0), format_angle(0.0));
    }
    if axis2_zero {
        return single_axis(s1, e1, s1 * e1);
    }
    if axis1_zero {
        // start tilts about the second axis are mirrored
        return single_axis(s2, e2, -s2 * e2);
    }

    let diagonal = (s1 == 0.0 && e2 == 0.0) != (s2 == 0.0 && e1 == 0.0);
    if diagonal {
        return (
            format_angle(s1 + s2),
            format!("{}{ROTATED_MARKER}", format_angle(e1 + e2)),
        );
    }

    (
        format!("{}/{}", format_angle(s1), format_angle(s2)),
        format!("{}/{}", format_angle(e1), format_angle(e2)),
    )
}

/// Same cutting direction at both ends reads as unsigned angles.
fn single_axis(start: f64, end: f64, direction: f64) -> (String, String) {
    if direction > 0.0 {
        (format_angle(start.abs()), format_angle(end.abs()))
    } else {
        (format_angle(start), format_angle(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_square_cut() {
        assert_eq!(classify(0.0, 0.0, 0.0, 0.0, &[]), pair("0.0", "0.0"));
    }

    #[test]
    fn test_second_axis_same_direction_is_unsigned() {
        assert_eq!(classify(0.0, 5.0, 0.0, -5.0, &[]), pair("5.0", "5.0"));
        assert_eq!(classify(0.0, 5.0, 0.0, 5.0, &[]), pair("5.0", "5.0"));
        assert_eq!(classify(0.0, -5.0, 0.0, -5.0, &[]), pair("-5.0", "-5.0"));
    }

    #[test]
    fn test_first_axis() {
        assert_eq!(classify(-30.0, 0.0, -30.0, 0.0, &[]), pair("30.0", "30.0"));
        assert_eq!(classify(30.0, 0.0, -30.0, 0.0, &[]), pair("30.0", "-30.0"));
        assert_eq!(classify(22.5, 0.0, 0.0, 0.0, &[]), pair("22.5", "0.0"));
    }

    #[test]
    fn test_diagonal_sums_with_rotation_marker() {
        assert_eq!(classify(0.0, 5.0, 5.0, 0.0, &[]), pair("5.0", "5.0 (r90)"));
        assert_eq!(classify(10.0, 0.0, 0.0, -4.0, &[]), pair("10.0", "-4.0 (r90)"));
    }

    #[test]
    fn test_mixed_axes_are_listed() {
        assert_eq!(
            classify(10.0, 5.0, 0.0, 3.0, &[]),
            pair("10.0/5.0", "0.0/3.0")
        );
    }

    #[test]
    fn test_single_trim_angle() {
        let trim = [CutAngle::Degrees(45.0)];
        assert_eq!(classify(0.0, 0.0, 0.0, 0.0, &trim), pair("0.0", "*45.0"));
        assert_eq!(classify(0.0, -15.0, 0.0, 0.0, &trim), pair("15.0", "*45.0"));
        assert_eq!(classify(10.0, 0.0, 5.0, 0.0, &trim), pair("?", "?"));
    }

    #[test]
    fn test_two_trim_angles() {
        let trims = [CutAngle::Degrees(45.0), CutAngle::Degrees(67.5)];
        assert_eq!(classify(10.0, 0.0, 0.0, 0.0, &trims), pair("*45.0", "*67.5"));
        let unknown = [CutAngle::Unknown, CutAngle::Unknown];
        assert_eq!(classify(0.0, 0.0, 0.0, 0.0, &unknown), pair("?", "?"));
    }

    #[test]
    fn test_too_many_trim_angles() {
        let trims = [CutAngle::Degrees(1.0); 3];
        assert_eq!(classify(0.0, 0.0, 0.0, 0.0, &trims), pair("?", "?"));
    }

    #[test]
    fn test_format_angle_has_no_negative_zero() {
        assert_eq!(format_angle(-0.0), "0.0");
        assert_eq!(format_angle(-0.04), "0.0");
        assert_eq!(format_angle(12.345), "12.3");
    }
}
