//! Cutting angles along a chain of trims.

use std::fmt;

use frameforge_math::{Dir3, Vec3};
use tracing::warn;

use crate::{BodyRef, ProfileId, TrimArena, TrimError, TrimId, TrimRelation};

/// Surface of a named sub-face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubFace {
    /// Planar, with its normal at the parametric midpoint.
    Planar(Dir3),
    /// Any non-planar surface.
    Curved,
}

/// Edge and face lookups the resolver needs from the host model.
pub trait FrameGeometry {
    /// Reference edge of a profile's path, last vertex minus first vertex.
    fn path_vector(&self, profile: ProfileId) -> Option<Vec3>;

    /// A named face of a body.
    fn sub_face(&self, body: BodyRef, name: &str) -> Option<SubFace>;
}

/// A fabrication cutting angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutAngle {
    /// Angle in degrees.
    Degrees(f64),
    /// Not derivable from the trim boundary.
    Unknown,
}

impl fmt::Display for CutAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutAngle::Degrees(v) => f.write_str(&crate::format_angle(*v)),
            CutAngle::Unknown => f.write_str(crate::UNKNOWN),
        }
    }
}

/// Angles contributed by one trim of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLevel {
    /// The trim.
    pub trim: TrimId,
    /// One angle per planar boundary face, in boundary order.
    pub angles: Vec<CutAngle>,
}

/// Cutting angles of `trim` and every trim beneath it, outer level first.
///
/// Trim types without an angle rule contribute `[Unknown, Unknown]` and are
/// logged. Cycles and dangling references are errors.
pub fn resolve_chain<G: FrameGeometry + ?Sized>(
    arena: &TrimArena,
    geometry: &G,
    trim: TrimId,
) -> Result<Vec<ChainLevel>, TrimError> {
    let chain = arena.chain(trim)?;
    let profile = arena.root_profile(trim)?;
    let direction = geometry
        .path_vector(profile)
        .and_then(|v| v.try_normalize(1e-12))
        .ok_or_else(|| TrimError::MissingReference(format!("path edge of {profile}")))?;

    chain
        .into_iter()
        .map(|id| {
            let relation = arena
                .get(id)
                .ok_or_else(|| TrimError::MissingReference(id.to_string()))?;
            let angles = match level_angles(relation, geometry, &direction) {
                Err(TrimError::UnknownTrimType(kind)) => {
                    warn!(trim = %id, kind = %kind, "no cutting-angle rule, reporting ?");
                    vec![CutAngle::Unknown, CutAngle::Unknown]
                }
                other => other?,
            };
            Ok(ChainLevel { trim: id, angles })
        })
        .collect()
}

fn level_angles<G: FrameGeometry + ?Sized>(
    relation: &TrimRelation,
    geometry: &G,
    direction: &Vec3,
) -> Result<Vec<CutAngle>, TrimError> {
    let divisor = relation
        .trim_type
        .divisor()
        .ok_or_else(|| TrimError::UnknownTrimType(relation.trim_type.to_string()))?;

    let mut angles = Vec::new();
    for boundary in &relation.boundaries {
        for name in &boundary.faces {
            let face = geometry.sub_face(boundary.object, name).ok_or_else(|| {
                TrimError::MissingReference(format!("{name} of {}", boundary.object))
            })?;
            let SubFace::Planar(normal) = face else {
                continue;
            };
            let mut angle = normal.dot(direction).clamp(-1.0, 1.0).acos().to_degrees();
            if angle > 90.0 {
                angle = 180.0 - angle;
            }
            angles.push(CutAngle::Degrees(90.0 - angle / divisor));
        }
    }
    Ok(angles)
}

/// All angles of a resolved chain in order.
pub fn flatten_levels(levels: &[ChainLevel]) -> Vec<CutAngle> {
    levels.iter().flat_map(|l| l.angles.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify, Boundary, TrimType};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Fixture {
        paths: HashMap<ProfileId, Vec3>,
        faces: HashMap<(BodyRef, String), SubFace>,
    }

    impl Fixture {
        fn face(mut self, body: BodyRef, name: &str, face: SubFace) -> Self {
            self.faces.insert((body, name.to_string()), face);
            self
        }
    }

    impl FrameGeometry for Fixture {
        fn path_vector(&self, profile: ProfileId) -> Option<Vec3> {
            self.paths.get(&profile).copied()
        }

        fn sub_face(&self, body: BodyRef, name: &str) -> Option<SubFace> {
            self.faces.get(&(body, name.to_string())).copied()
        }
    }

    const BEAM: ProfileId = ProfileId(0);
    const POST: BodyRef = BodyRef::Profile(ProfileId(1));

    fn planar(degrees_from_axis: f64) -> SubFace {
        let a = degrees_from_axis.to_radians();
        SubFace::Planar(Dir3::new_normalize(Vec3::new(a.sin(), 0.0, a.cos())))
    }

    fn fixture() -> Fixture {
        let mut f = Fixture::default();
        f.paths.insert(BEAM, Vec3::new(0.0, 0.0, 2500.0));
        f.face(POST, "Face1", planar(45.0))
            .face(POST, "Face2", planar(120.0))
            .face(POST, "Face3", SubFace::Curved)
    }

    fn trim(trimmed: BodyRef, faces: &[&str], kind: &str) -> TrimRelation {
        TrimRelation {
            trimmed,
            boundaries: vec![Boundary::new(POST, faces.iter().copied())],
            trim_type: TrimType::from(kind.to_string()),
        }
    }

    fn degrees(angles: &[CutAngle]) -> Vec<f64> {
        angles
            .iter()
            .map(|a| match a {
                CutAngle::Degrees(v) => *v,
                CutAngle::Unknown => f64::NAN,
            })
            .collect()
    }

    #[test]
    fn test_simple_fit_uses_full_angle() {
        let mut arena = TrimArena::new();
        let id = arena
            .add(trim(BodyRef::Profile(BEAM), &["Face1", "Face2"], "Simple fit"))
            .unwrap();
        let levels = resolve_chain(&arena, &fixture(), id).unwrap();
        assert_eq!(levels.len(), 1);
        let got = degrees(&levels[0].angles);
        // 45° stays 45°; 120° folds to 60°
        assert!((got[0] - 45.0).abs() < 1e-9, "{got:?}");
        assert!((got[1] - 30.0).abs() < 1e-9, "{got:?}");
    }

    #[test]
    fn test_end_miter_halves_angle() {
        let mut arena = TrimArena::new();
        let id = arena
            .add(trim(BodyRef::Profile(BEAM), &["Face1"], "End Miter"))
            .unwrap();
        let levels = resolve_chain(&arena, &fixture(), id).unwrap();
        let got = degrees(&levels[0].angles);
        assert!((got[0] - 67.5).abs() < 1e-9, "{got:?}");
    }

    #[test]
    fn test_curved_faces_are_skipped() {
        let mut arena = TrimArena::new();
        let id = arena
            .add(trim(BodyRef::Profile(BEAM), &["Face3", "Face1"], "Simple fit"))
            .unwrap();
        let levels = resolve_chain(&arena, &fixture(), id).unwrap();
        assert_eq!(levels[0].angles.len(), 1);
    }

    #[test]
    fn test_nested_levels_outer_first() {
        let mut arena = TrimArena::new();
        let inner = arena
            .add(trim(BodyRef::Profile(BEAM), &["Face1"], "End Miter"))
            .unwrap();
        let outer = arena
            .add(trim(BodyRef::Trim(inner), &["Face2"], "Simple fit"))
            .unwrap();
        let levels = resolve_chain(&arena, &fixture(), outer).unwrap();
        assert_eq!(levels.iter().map(|l| l.trim).collect::<Vec<_>>(), vec![outer, inner]);
        let flat = degrees(&flatten_levels(&levels));
        assert!((flat[0] - 30.0).abs() < 1e-9 && (flat[1] - 67.5).abs() < 1e-9, "{flat:?}");
    }

    #[test]
    fn test_unknown_trim_type_reports_sentinel() {
        let mut arena = TrimArena::new();
        let id = arena
            .add(trim(BodyRef::Profile(BEAM), &["Face1"], "Coped"))
            .unwrap();
        let levels = resolve_chain(&arena, &fixture(), id).unwrap();
        let angles = flatten_levels(&levels);
        assert_eq!(angles, vec![CutAngle::Unknown, CutAngle::Unknown]);
        assert_eq!(
            classify(0.0, 0.0, 0.0, 0.0, &angles),
            ("?".to_string(), "?".to_string())
        );
    }

    #[test]
    fn test_cycle_is_an_error() {
        let arena = TrimArena::from_relations(vec![
            trim(BodyRef::Trim(TrimId(1)), &["Face1"], "End Miter"),
            trim(BodyRef::Trim(TrimId(0)), &["Face1"], "End Miter"),
        ]);
        assert!(matches!(
            resolve_chain(&arena, &fixture(), TrimId(1)),
            Err(TrimError::Cycle(_))
        ));
    }

    #[test]
    fn test_missing_face_is_an_error() {
        let mut arena = TrimArena::new();
        let id = arena
            .add(trim(BodyRef::Profile(BEAM), &["Face7"], "End Miter"))
            .unwrap();
        assert!(matches!(
            resolve_chain(&arena, &fixture(), id),
            Err(TrimError::MissingReference(_))
        ));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let mut arena = TrimArena::new();
        let id = arena
            .add(trim(BodyRef::Profile(ProfileId(5)), &["Face1"], "End Miter"))
            .unwrap();
        assert!(matches!(
            resolve_chain(&arena, &fixture(), id),
            Err(TrimError::MissingReference(_))
        ));
    }
}
