//! Per-family cross-section construction.
//!
//! Every generator draws its section in the first quadrant with the
//! bounding-box corner at the origin: width along x, height along y.

use frameforge_math::Point2;
use tracing::debug;

use crate::fillet::{filleted_polygon, Corner};
use crate::spec::{ProfileFamily, ProfileSpec};
use crate::wire::Wire;
use crate::{Section, SectionError};

/// Dimensions in millimeters with fillet radii zeroed for sharp variants.
struct Dims {
    w: f64,
    h: f64,
    t: f64,
    tf: f64,
    big: f64,
    small: f64,
}

impl Dims {
    fn from_spec(spec: &ProfileSpec) -> Self {
        let (big, small) = if spec.fillet {
            (spec.radius_large.max(0.0), spec.radius_small.max(0.0))
        } else {
            (0.0, 0.0)
        };
        Self {
            w: spec.effective_width(),
            h: spec.height,
            t: spec.thickness,
            tf: spec.flange_thickness,
            big,
            small,
        }
    }
}

fn require(name: &'static str, value: f64, ok: bool) -> Result<(), SectionError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(SectionError::InvalidDimension { name, value })
    }
}

/// Generate the cross-section for `spec`.
///
/// Dimensions are converted to millimeters first. Returns
/// [`SectionError`] for invalid dimensions, oversize fillets, or a wire that
/// is not closed and simple.
pub fn generate(spec: &ProfileSpec) -> Result<Section, SectionError> {
    let spec = spec.to_millimeters();
    let d = Dims::from_spec(&spec);

    require("height", d.h, d.h > 0.0)?;
    require("width", d.w, d.w > 0.0)?;
    if spec.family.needs_thickness() {
        require("thickness", d.t, d.t > 0.0)?;
    }
    if spec.family.has_flanges() {
        require("flange thickness", d.tf, d.tf > 0.0)?;
    }

    let section = match spec.family {
        ProfileFamily::EqualAngle | ProfileFamily::UnequalAngle => angle(&d)?,
        ProfileFamily::FlatBar | ProfileFamily::SquareBar => bar(&d)?,
        ProfileFamily::SquareHollow | ProfileFamily::RectangularHollow => hollow(&d)?,
        ProfileFamily::RoundBar => round_bar(&d)?,
        ProfileFamily::Pipe => pipe(&d)?,
        ProfileFamily::Channel => channel(&d, 0.0)?,
        ProfileFamily::TaperedChannel => channel(&d, taper_offset(&d, spec.flange_angle))?,
        ProfileFamily::IBeam => i_beam(&d, 0.0)?,
        ProfileFamily::TaperedIBeam => i_beam(&d, taper_offset(&d, spec.flange_angle))?,
    };

    debug!(
        family = %spec.family,
        fillet = spec.fillet,
        segments = section.segment_count(),
        area = section.area(),
        "generated cross-section"
    );
    Ok(section)
}

/// Flange slope offset at the web/flange junction.
fn taper_offset(d: &Dims, flange_angle: f64) -> f64 {
    d.w / 4.0 * flange_angle.to_radians().tan()
}

fn angle(d: &Dims) -> Result<Section, SectionError> {
    require("thickness", d.t, d.t < d.w && d.t < d.h)?;
    let outer = filleted_polygon(&[
        Corner::sharp(0.0, 0.0),
        Corner::sharp(d.w, 0.0),
        Corner::round(d.w, d.t, d.small),
        Corner::round(d.t, d.t, d.big),
        Corner::round(d.t, d.h, d.small),
        Corner::sharp(0.0, d.h),
    ])?;
    Section::new(outer, None)
}

fn bar(d: &Dims) -> Result<Section, SectionError> {
    Section::new(rounded_rectangle(0.0, 0.0, d.w, d.h, d.big)?, None)
}

fn hollow(d: &Dims) -> Result<Section, SectionError> {
    require("thickness", d.t, 2.0 * d.t < d.w.min(d.h))?;
    let outer = rounded_rectangle(0.0, 0.0, d.w, d.h, d.big)?;
    let inner = rounded_rectangle(d.t, d.t, d.w - d.t, d.h - d.t, d.small)?;
    Section::new(outer, Some(inner))
}

fn round_bar(d: &Dims) -> Result<Section, SectionError> {
    let r = d.h / 2.0;
    Section::new(Wire::circle(Point2::new(r, r), r)?, None)
}

fn pipe(d: &Dims) -> Result<Section, SectionError> {
    let r = d.h / 2.0;
    require("thickness", d.t, d.t < r)?;
    let center = Point2::new(r, r);
    Section::new(
        Wire::circle(center, r)?,
        Some(Wire::circle(center, r - d.t)?),
    )
}

/// Channel opening toward +x: web along the y axis, flanges along x.
fn channel(d: &Dims, yd: f64) -> Result<Section, SectionError> {
    require("thickness", d.t, d.t < d.w)?;
    require("flange thickness", d.tf, d.tf - yd > 0.0 && 2.0 * (d.tf + yd) < d.h)?;
    let outer = filleted_polygon(&[
        Corner::sharp(0.0, 0.0),
        Corner::sharp(d.w, 0.0),
        Corner::round(d.w, d.tf - yd, d.small),
        Corner::round(d.t, d.tf + yd, d.big),
        Corner::round(d.t, d.h - d.tf - yd, d.big),
        Corner::round(d.w, d.h - d.tf + yd, d.small),
        Corner::sharp(d.w, d.h),
        Corner::sharp(0.0, d.h),
    ])?;
    Section::new(outer, None)
}

/// Doubly symmetric I-section with the web centered on x = width/2.
fn i_beam(d: &Dims, yd: f64) -> Result<Section, SectionError> {
    require("thickness", d.t, d.t < d.w)?;
    require("flange thickness", d.tf, d.tf - yd > 0.0 && 2.0 * (d.tf + yd) < d.h)?;
    let web_left = (d.w - d.t) / 2.0;
    let web_right = (d.w + d.t) / 2.0;
    let outer = filleted_polygon(&[
        Corner::sharp(0.0, 0.0),
        Corner::sharp(d.w, 0.0),
        Corner::round(d.w, d.tf - yd, d.small),
        Corner::round(web_right, d.tf + yd, d.big),
        Corner::round(web_right, d.h - d.tf - yd, d.big),
        Corner::round(d.w, d.h - d.tf + yd, d.small),
        Corner::sharp(d.w, d.h),
        Corner::sharp(0.0, d.h),
        Corner::round(0.0, d.h - d.tf + yd, d.small),
        Corner::round(web_left, d.h - d.tf - yd, d.big),
        Corner::round(web_left, d.tf + yd, d.big),
        Corner::round(0.0, d.tf - yd, d.small),
    ])?;
    Section::new(outer, None)
}

fn rounded_rectangle(x0: f64, y0: f64, x1: f64, y1: f64, radius: f64) -> Result<Wire, SectionError> {
    filleted_polygon(&[
        Corner::round(x0, y0, radius),
        Corner::round(x1, y0, radius),
        Corner::round(x1, y1, radius),
        Corner::round(x0, y1, radius),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::LengthUnit;
    use std::f64::consts::PI;

    /// Area a fillet of `radius` adds or removes at a corner turning by `turn`.
    fn fillet_area(radius: f64, turn: f64) -> f64 {
        radius * radius * ((turn / 2.0).tan() - turn / 2.0)
    }

    fn quarter(radius: f64) -> f64 {
        fillet_area(radius, PI / 2.0)
    }

    fn assert_area(spec: &ProfileSpec, expected: f64) {
        let section = generate(spec).unwrap();
        let area = section.area();
        assert!(
            (area - expected).abs() < 1e-6 * expected.max(1.0),
            "{} (fillet = {}): expected area {expected}, got {area}",
            spec.family,
            spec.fillet
        );
    }

    /// A representative spec per family, sharp or filleted.
    fn sample(family: ProfileFamily, fillet: bool) -> ProfileSpec {
        let spec = match family {
            ProfileFamily::EqualAngle => ProfileSpec::new(family, 50.0, 50.0).with_thickness(5.0),
            ProfileFamily::UnequalAngle => ProfileSpec::new(family, 40.0, 60.0).with_thickness(6.0),
            ProfileFamily::FlatBar => ProfileSpec::new(family, 40.0, 8.0),
            ProfileFamily::SquareBar => ProfileSpec::new(family, 0.0, 20.0),
            ProfileFamily::SquareHollow => ProfileSpec::new(family, 40.0, 40.0).with_thickness(3.0),
            ProfileFamily::RectangularHollow => {
                ProfileSpec::new(family, 60.0, 40.0).with_thickness(4.0)
            }
            ProfileFamily::RoundBar => ProfileSpec::new(family, 0.0, 30.0),
            ProfileFamily::Pipe => ProfileSpec::new(family, 0.0, 48.3).with_thickness(3.2),
            ProfileFamily::Channel => ProfileSpec::new(family, 55.0, 100.0)
                .with_thickness(4.5)
                .with_flange_thickness(7.5),
            ProfileFamily::TaperedChannel => ProfileSpec::new(family, 50.0, 100.0)
                .with_thickness(6.0)
                .with_flange_thickness(8.5),
            ProfileFamily::IBeam => ProfileSpec::new(family, 55.0, 100.0)
                .with_thickness(4.1)
                .with_flange_thickness(5.7),
            ProfileFamily::TaperedIBeam => ProfileSpec::new(family, 50.0, 100.0)
                .with_thickness(4.5)
                .with_flange_thickness(6.8),
        };
        if !fillet {
            return spec;
        }
        match family {
            ProfileFamily::EqualAngle => spec.with_fillets(7.0, 3.5),
            ProfileFamily::UnequalAngle => spec.with_fillets(6.0, 3.0),
            ProfileFamily::FlatBar | ProfileFamily::SquareBar => spec.with_fillets(1.5, 0.0),
            ProfileFamily::SquareHollow => spec.with_fillets(6.0, 4.5),
            ProfileFamily::RectangularHollow => spec.with_fillets(8.0, 6.0),
            ProfileFamily::RoundBar | ProfileFamily::Pipe => spec.with_fillets(0.0, 0.0),
            ProfileFamily::Channel => spec.with_fillets(10.0, 0.0),
            ProfileFamily::TaperedChannel => spec.with_fillets(8.5, 4.5),
            ProfileFamily::IBeam => spec.with_fillets(7.0, 0.0),
            ProfileFamily::TaperedIBeam => spec.with_fillets(4.5, 2.7),
        }
    }

    #[test]
    fn test_every_family_is_closed_simple_ccw() {
        for family in ProfileFamily::ALL {
            for fillet in [false, true] {
                let section = generate(&sample(family, fillet)).unwrap();
                assert!(section.outer().is_ccw(), "{family} outer not CCW");
                assert!(section.outer().self_intersection().is_none(), "{family} outer");
                if let Some(inner) = section.inner() {
                    assert!(inner.is_ccw(), "{family} inner not CCW");
                    assert!(inner.self_intersection().is_none(), "{family} inner");
                }
                assert_eq!(section.inner().is_some(), family.is_hollow());
                assert!(section.area() > 0.0);
            }
        }
    }

    #[test]
    fn test_angle_areas() {
        let (w, h, t) = (40.0, 60.0, 6.0);
        let sharp = t * (w + h - t);
        assert_area(&sample(ProfileFamily::UnequalAngle, false), sharp);
        assert_area(
            &sample(ProfileFamily::UnequalAngle, true),
            sharp - 2.0 * quarter(3.0) + quarter(6.0),
        );
        assert_area(&sample(ProfileFamily::EqualAngle, false), 5.0 * 95.0);
        assert_area(
            &sample(ProfileFamily::EqualAngle, true),
            5.0 * 95.0 - 2.0 * quarter(3.5) + quarter(7.0),
        );
    }

    #[test]
    fn test_bar_areas() {
        assert_area(&sample(ProfileFamily::FlatBar, false), 320.0);
        assert_area(&sample(ProfileFamily::FlatBar, true), 320.0 - 4.0 * quarter(1.5));
        assert_area(&sample(ProfileFamily::SquareBar, false), 400.0);
        assert_area(&sample(ProfileFamily::SquareBar, true), 400.0 - 4.0 * quarter(1.5));
    }

    #[test]
    fn test_hollow_areas() {
        let (w, h, t) = (60.0, 40.0, 4.0);
        let sharp = w * h - (w - 2.0 * t) * (h - 2.0 * t);
        assert_area(&sample(ProfileFamily::RectangularHollow, false), sharp);
        assert_area(
            &sample(ProfileFamily::RectangularHollow, true),
            sharp - 4.0 * quarter(8.0) + 4.0 * quarter(6.0),
        );
        let sharp = 1600.0 - 34.0 * 34.0;
        assert_area(&sample(ProfileFamily::SquareHollow, false), sharp);
        assert_area(
            &sample(ProfileFamily::SquareHollow, true),
            sharp - 4.0 * quarter(6.0) + 4.0 * quarter(4.5),
        );
    }

    #[test]
    fn test_round_areas() {
        // round families have no corners to fillet
        for fillet in [false, true] {
            assert_area(&sample(ProfileFamily::RoundBar, fillet), PI * 15.0 * 15.0);
            let (r, t) = (48.3 / 2.0, 3.2);
            assert_area(
                &sample(ProfileFamily::Pipe, fillet),
                PI * (r * r - (r - t) * (r - t)),
            );
        }
    }

    #[test]
    fn test_straight_flange_areas() {
        // IPE 100: 2·b·tf + (h − 2·tf)·tw + (4 − π)·r²
        let (b, h, tw, tf, r) = (55.0, 100.0, 4.1, 5.7, 7.0);
        let ipe = 2.0 * b * tf + (h - 2.0 * tf) * tw;
        assert_area(&sample(ProfileFamily::IBeam, false), ipe);
        assert_area(&sample(ProfileFamily::IBeam, true), ipe + (4.0 - PI) * r * r);

        let (b, tw, tf) = (55.0, 4.5, 7.5);
        let upe = b * h - (b - tw) * (h - 2.0 * tf);
        assert_area(&sample(ProfileFamily::Channel, false), upe);
        assert_area(&sample(ProfileFamily::Channel, true), upe + 2.0 * quarter(10.0));
    }

    #[test]
    fn test_tapered_flange_areas() {
        // The slope keeps the sharp area; fillets meet the flange at 90° − β.
        let (b, h, tw, tf) = (50.0, 100.0, 6.0, 8.5);
        let yd = b / 4.0 * 4.57_f64.to_radians().tan();
        let beta = (2.0 * yd / (b - tw)).atan();
        let turn = PI / 2.0 - beta;
        let sharp = b * h - (b - tw) * (h - 2.0 * tf);
        assert_area(&sample(ProfileFamily::TaperedChannel, false), sharp);
        assert_area(
            &sample(ProfileFamily::TaperedChannel, true),
            sharp + 2.0 * fillet_area(8.5, turn) - 2.0 * fillet_area(4.5, turn),
        );

        let (b, tw, tf) = (50.0, 4.5, 6.8);
        let yd = b / 4.0 * 8.0_f64.to_radians().tan();
        let beta = (2.0 * yd / ((b - tw) / 2.0)).atan();
        let turn = PI / 2.0 - beta;
        let sharp = b * h - (b - tw) * (h - 2.0 * tf);
        assert_area(&sample(ProfileFamily::TaperedIBeam, false), sharp);
        assert_area(
            &sample(ProfileFamily::TaperedIBeam, true),
            sharp + 4.0 * fillet_area(4.5, turn) - 4.0 * fillet_area(2.7, turn),
        );
    }

    #[test]
    fn test_sharp_variant_ignores_radii() {
        let mut spec = sample(ProfileFamily::FlatBar, true);
        spec.fillet = false;
        let section = generate(&spec).unwrap();
        assert_eq!(section.segment_count(), 4);
    }

    #[test]
    fn test_centimeter_spec_is_generated_in_mm() {
        let spec = ProfileSpec::new(ProfileFamily::FlatBar, 4.0, 0.8).with_unit(LengthUnit::Cm);
        assert_area(&spec, 320.0);
    }

    #[test]
    fn test_invalid_dimensions() {
        let no_height = ProfileSpec::new(ProfileFamily::FlatBar, 10.0, 0.0);
        assert!(matches!(
            generate(&no_height),
            Err(SectionError::InvalidDimension { name: "height", .. })
        ));

        let thick_walls = ProfileSpec::new(ProfileFamily::SquareHollow, 20.0, 20.0).with_thickness(10.0);
        assert!(matches!(
            generate(&thick_walls),
            Err(SectionError::InvalidDimension { name: "thickness", .. })
        ));

        let no_flange = ProfileSpec::new(ProfileFamily::IBeam, 55.0, 100.0).with_thickness(4.1);
        assert!(matches!(
            generate(&no_flange),
            Err(SectionError::InvalidDimension { name: "flange thickness", .. })
        ));
    }

    #[test]
    fn test_oversize_fillet_is_rejected() {
        let spec = ProfileSpec::new(ProfileFamily::FlatBar, 10.0, 4.0).with_fillets(3.0, 0.0);
        assert!(matches!(
            generate(&spec),
            Err(SectionError::FilletTooLarge { .. })
        ));
    }
}
