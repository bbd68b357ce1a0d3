//! Extruded sections clipped by half-spaces.
//!
//! A [`PrismSolid`] is a section swept along the local z axis of its frame
//! between two heights, intersected with any number of half-spaces. That is
//! closed under the operations profile realization performs: extending a
//! prism past its ends (coaxial union) and cutting an end with an oversized
//! box (difference that reduces to one more half-space).

use frameforge_math::{
    cross2, Aabb3, Dir3, Mat3, Plane, Point2, Point3, Tolerance, Transform, Vec2, Vec3,
};
use frameforge_section::{point_in_polyline, Section, Segment, Wire};
use tracing::debug;

use crate::{FaceInfo, GeometryKernel, KernelError, SurfaceKind};

/// Grid resolution of the sampled volume fallback.
const SAMPLES_PER_AXIS: usize = 200;

/// A planar face: a section placed in space.
#[derive(Debug, Clone)]
pub struct PrismFace {
    section: Section,
    frame: Transform,
}

/// An extruded section clipped by half-spaces.
#[derive(Debug, Clone)]
pub struct PrismSolid {
    section: Section,
    /// Local to world; the section lies in the local xy plane.
    frame: Transform,
    z_min: f64,
    z_max: f64,
    /// Local half-spaces; material lies on the non-positive side.
    cuts: Vec<Plane>,
}

/// `z = a·x + b·y + c`
#[derive(Debug, Clone, Copy)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
}

impl Affine {
    fn constant(c: f64) -> Self {
        Self { a: 0.0, b: 0.0, c }
    }

    fn eval(&self, p: &Point2) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }
}

enum Bound {
    Upper(Affine),
    Lower(Affine),
    Lateral,
}

fn classify(cut: &Plane) -> Bound {
    let n = cut.normal.into_inner();
    if n.z.abs() < 1e-12 {
        return Bound::Lateral;
    }
    let k = n.dot(&cut.origin.coords);
    let f = Affine {
        a: -n.x / n.z,
        b: -n.y / n.z,
        c: k / n.z,
    };
    if n.z > 0.0 {
        Bound::Upper(f)
    } else {
        Bound::Lower(f)
    }
}

fn scale_tolerance(scale: f64) -> f64 {
    Tolerance::DEFAULT.linear + 1e-9 * scale
}

impl PrismSolid {
    /// Number of half-space cuts applied so far.
    pub(crate) fn cut_count(&self) -> usize {
        self.cuts.len()
    }

    fn upper_bounds(&self) -> Vec<Affine> {
        let mut bounds = vec![Affine::constant(self.z_max)];
        for cut in &self.cuts {
            if let Bound::Upper(f) = classify(cut) {
                bounds.push(f);
            }
        }
        bounds
    }

    fn lower_bounds(&self) -> Vec<Affine> {
        let mut bounds = vec![Affine::constant(self.z_min)];
        for cut in &self.cuts {
            if let Bound::Lower(f) = classify(cut) {
                bounds.push(f);
            }
        }
        bounds
    }

    fn has_lateral_cuts(&self) -> bool {
        self.cuts.iter().any(|c| matches!(classify(c), Bound::Lateral))
    }

    /// Material interval along local z above `p`, if any.
    fn column(&self, p: &Point2) -> Option<(f64, f64)> {
        let foot = Point3::new(p.x, p.y, 0.0);
        let tol = scale_tolerance(self.local_bounds().diagonal());
        let mut lo = self.z_min;
        let mut hi = self.z_max;
        for cut in &self.cuts {
            match classify(cut) {
                Bound::Upper(f) => hi = hi.min(f.eval(p)),
                Bound::Lower(f) => lo = lo.max(f.eval(p)),
                Bound::Lateral => {
                    if cut.signed_distance(&foot) > tol {
                        return None;
                    }
                }
            }
        }
        (hi - lo > tol).then_some((lo, hi))
    }

    fn local_bounds(&self) -> Aabb3 {
        let (min, max) = self.section.bounds();
        let mut b = Aabb3::empty();
        b.include_point(&Point3::new(min.x, min.y, self.z_min));
        b.include_point(&Point3::new(max.x, max.y, self.z_max));
        b
    }

    fn section_corners(&self) -> [Point2; 4] {
        let (min, max) = self.section.bounds();
        [
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ]
    }

    /// Points that bound the section: segment endpoints, arc samples and
    /// arc extremes.
    fn probe_points(&self) -> Vec<Point2> {
        let mut pts = Vec::new();
        for wire in self.section.wires() {
            pts.extend(wire.flatten());
            pts.extend(wire.segments().iter().flat_map(Segment::extreme_points));
        }
        pts
    }

    fn exact_volume(&self) -> Option<f64> {
        if self.has_lateral_cuts() {
            return None;
        }
        let corners = self.section_corners();
        let hi = dominant(&self.upper_bounds(), &corners, true)?;
        let lo = dominant(&self.lower_bounds(), &corners, false)?;
        if corners.iter().any(|c| hi.eval(c) < lo.eval(c)) {
            return None;
        }
        let c = self.section.centroid();
        Some(self.section.area() * (hi.eval(&c) - lo.eval(&c)))
    }

    fn sampled_volume(&self) -> f64 {
        let (min, max) = self.section.bounds();
        let outer = self.section.outer().flatten();
        let inner = self.section.inner().map(Wire::flatten);
        let dx = (max.x - min.x) / SAMPLES_PER_AXIS as f64;
        let dy = (max.y - min.y) / SAMPLES_PER_AXIS as f64;
        let mut total = 0.0;
        for i in 0..SAMPLES_PER_AXIS {
            for j in 0..SAMPLES_PER_AXIS {
                let p = Point2::new(min.x + (i as f64 + 0.5) * dx, min.y + (j as f64 + 0.5) * dy);
                if !point_in_polyline(&outer, &p)
                    || inner.as_ref().is_some_and(|hole| point_in_polyline(hole, &p))
                {
                    continue;
                }
                if let Some((lo, hi)) = self.column(&p) {
                    total += (hi - lo) * dx * dy;
                }
            }
        }
        total
    }

    fn world_corners(&self) -> [Point3; 8] {
        self.local_bounds().corners().map(|p| self.frame.apply_point(&p))
    }

    /// Outward face planes of an unclipped convex prism, in world space.
    fn world_face_planes(&self) -> Vec<Plane> {
        let mut planes: Vec<Plane> = self
            .section
            .outer()
            .segments()
            .iter()
            .map(|seg| {
                let (s, e) = (seg.start(), seg.end());
                let d = e - s;
                Plane::new(Point3::new(s.x, s.y, 0.0), Vec3::new(d.y, -d.x, 0.0))
            })
            .collect();
        planes.push(Plane::new(Point3::new(0.0, 0.0, self.z_min), -Vec3::z()));
        planes.push(Plane::new(Point3::new(0.0, 0.0, self.z_max), Vec3::z()));
        planes.iter().map(|p| p.transformed(&self.frame)).collect()
    }

    /// Containment test for an unclipped convex prism.
    fn convex_contains_world(&self, p: &Point3, tol: f64) -> bool {
        let Some(inv) = self.frame.inverse() else {
            return false;
        };
        let local = inv.apply_point(p);
        if local.z < self.z_min - tol || local.z > self.z_max + tol {
            return false;
        }
        let q = Point2::new(local.x, local.y);
        self.section.outer().segments().iter().all(|seg| {
            let edge = seg.end() - seg.start();
            cross2(&edge, &(q - seg.start())) >= -tol * edge.norm()
        })
    }

    fn is_convex_polygon(&self) -> bool {
        let segments = self.section.outer().segments();
        self.section.inner().is_none()
            && segments.iter().all(|s| matches!(s, Segment::Line { .. }))
            && (0..segments.len()).all(|i| {
                let a = segments[i].end() - segments[i].start();
                let next = &segments[(i + 1) % segments.len()];
                let b = next.end() - next.start();
                cross2(&a, &b) >= -1e-12 * a.norm() * b.norm()
            })
    }

    /// Offset along the local z axis that maps `other`'s frame onto this one,
    /// if both share section and axis.
    fn coaxial_offset(&self, other: &PrismSolid) -> Option<f64> {
        if self.section != other.section {
            return None;
        }
        if (self.frame.linear_part() - other.frame.linear_part()).amax() > 1e-9 {
            return None;
        }
        let delta = other.frame.origin() - self.frame.origin();
        let axis = self.frame.z_axis();
        let along = delta.dot(&axis);
        let tol = scale_tolerance(self.local_bounds().diagonal());
        ((delta - axis * along).norm() <= tol).then_some(along)
    }
}

/// The bound among `bounds` that is tightest at every corner, if one is.
///
/// All bounds are affine, so tightest at the corners of a convex region
/// means tightest everywhere inside it.
fn dominant(bounds: &[Affine], corners: &[Point2], upper: bool) -> Option<Affine> {
    bounds.iter().copied().find(|f| {
        bounds.iter().all(|g| {
            corners.iter().all(|c| {
                let (fv, gv) = (f.eval(c), g.eval(c));
                if upper {
                    fv <= gv + 1e-9
                } else {
                    fv >= gv - 1e-9
                }
            })
        })
    })
}

/// Reference kernel over [`PrismSolid`].
///
/// Supports coaxial unions and differences with oversized convex tools that
/// reduce to a half-space; anything else is [`KernelError::Unsupported`] or
/// [`KernelError::InvalidShape`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PrismKernel;

impl PrismKernel {
    /// Create the kernel.
    pub fn new() -> Self {
        Self
    }
}

fn is_rigid(t: &Transform) -> bool {
    let m = t.linear_part();
    t.is_finite() && (m.transpose() * m - Mat3::identity()).amax() < 1e-9 && m.determinant() > 0.0
}

impl GeometryKernel for PrismKernel {
    type Face = PrismFace;
    type Solid = PrismSolid;

    fn face(&self, section: &Section, placement: &Transform) -> Result<PrismFace, KernelError> {
        if !is_rigid(placement) {
            return Err(KernelError::Unsupported("non-rigid face placement".into()));
        }
        Ok(PrismFace {
            section: section.clone(),
            frame: placement.clone(),
        })
    }

    fn extrude(&self, face: &PrismFace, vector: &Vec3) -> Result<PrismSolid, KernelError> {
        let length = vector.norm();
        if length < Tolerance::DEFAULT.linear {
            return Err(KernelError::InvalidShape("extrusion vector is zero".into()));
        }
        let axis = face.frame.z_axis();
        if vector.cross(&axis).norm() > 1e-9 * length {
            return Err(KernelError::Unsupported(
                "extrusion must follow the face normal".into(),
            ));
        }
        let depth = vector.dot(&axis);
        Ok(PrismSolid {
            section: face.section.clone(),
            frame: face.frame.clone(),
            z_min: depth.min(0.0),
            z_max: depth.max(0.0),
            cuts: Vec::new(),
        })
    }

    fn make_box(&self, dx: f64, dy: f64, dz: f64) -> Result<PrismSolid, KernelError> {
        if !(dx > 0.0 && dy > 0.0 && dz > 0.0) {
            return Err(KernelError::InvalidShape(format!(
                "box dimensions must be positive: {dx} x {dy} x {dz}"
            )));
        }
        let rect = Wire::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(dx, 0.0),
            Point2::new(dx, dy),
            Point2::new(0.0, dy),
        ])
        .and_then(|w| Section::new(w, None))
        .map_err(|e| KernelError::InvalidShape(e.to_string()))?;
        Ok(PrismSolid {
            section: rect,
            frame: Transform::identity(),
            z_min: 0.0,
            z_max: dz,
            cuts: Vec::new(),
        })
    }

    fn transform(&self, solid: &PrismSolid, t: &Transform) -> PrismSolid {
        PrismSolid {
            frame: t.then(&solid.frame),
            ..solid.clone()
        }
    }

    fn union(&self, a: &PrismSolid, b: &PrismSolid) -> Result<PrismSolid, KernelError> {
        let along = a
            .coaxial_offset(b)
            .ok_or_else(|| KernelError::Unsupported("union of non-coaxial prisms".into()))?;
        let tol = scale_tolerance(a.local_bounds().diagonal().max(b.local_bounds().diagonal()));
        let (b_min, b_max) = (b.z_min + along, b.z_max + along);
        if b_min > a.z_max + tol || a.z_min > b_max + tol {
            return Err(KernelError::Unsupported("union of disjoint prisms".into()));
        }

        let shift = Transform::translation(0.0, 0.0, along);
        let b_cuts: Vec<Plane> = b.cuts.iter().map(|c| c.transformed(&shift)).collect();
        let b_corners = b.local_bounds().corners().map(|p| shift.apply_point(&p));
        let a_corners = a.local_bounds().corners();
        let a_cut_hits_b = a
            .cuts
            .iter()
            .any(|cut| b_corners.iter().any(|p| cut.signed_distance(p) > tol));
        let b_cut_hits_a = b_cuts
            .iter()
            .any(|cut| a_corners.iter().any(|p| cut.signed_distance(p) > tol));
        if a_cut_hits_b || b_cut_hits_a {
            return Err(KernelError::Unsupported(
                "union would cross an existing cut".into(),
            ));
        }

        debug!(from = a.z_min.min(b_min), to = a.z_max.max(b_max), "fused coaxial prisms");
        let mut cuts = a.cuts.clone();
        cuts.extend(b_cuts);
        Ok(PrismSolid {
            section: a.section.clone(),
            frame: a.frame.clone(),
            z_min: a.z_min.min(b_min),
            z_max: a.z_max.max(b_max),
            cuts,
        })
    }

    fn difference(&self, a: &PrismSolid, tool: &PrismSolid) -> Result<PrismSolid, KernelError> {
        if !tool.cuts.is_empty() || !tool.is_convex_polygon() {
            return Err(KernelError::Unsupported(
                "cutting tool must be an unclipped convex prism".into(),
            ));
        }
        let tol = scale_tolerance(a.local_bounds().diagonal().max(tool.local_bounds().diagonal()));
        let corners = a.world_corners();
        let planes = tool.world_face_planes();

        if planes
            .iter()
            .any(|f| corners.iter().all(|p| f.signed_distance(p) >= -tol))
        {
            debug!("cutting tool misses the solid");
            return Ok(a.clone());
        }

        for face in &planes {
            let mut beyond: Vec<Point3> = corners
                .iter()
                .filter(|p| face.signed_distance(p) < 0.0)
                .copied()
                .collect();
            for (i, j) in Aabb3::EDGES {
                if let Some(t) = face.segment_parameter(&corners[i], &corners[j]) {
                    beyond.push(corners[i] + (corners[j] - corners[i]) * t);
                }
            }
            if beyond.iter().all(|p| tool.convex_contains_world(p, tol)) {
                let inv = a
                    .frame
                    .inverse()
                    .ok_or_else(|| KernelError::InvalidShape("singular solid frame".into()))?;
                let mut result = a.clone();
                result.cuts.push(face.flipped().transformed(&inv));
                debug!(cuts = result.cuts.len(), "applied half-space cut");
                return Ok(result);
            }
        }

        Err(KernelError::InvalidShape(
            "cutting tool does not cover the solid beyond any of its faces".into(),
        ))
    }

    fn volume(&self, solid: &PrismSolid) -> f64 {
        solid
            .exact_volume()
            .unwrap_or_else(|| solid.sampled_volume())
    }

    fn is_valid(&self, solid: &PrismSolid) -> bool {
        is_rigid(&solid.frame)
            && solid.z_min.is_finite()
            && solid.z_max.is_finite()
            && solid.z_min < solid.z_max
            && solid
                .cuts
                .iter()
                .all(|c| c.normal.iter().all(|v| v.is_finite()) && c.origin.iter().all(|v| v.is_finite()))
    }

    fn extent_along(&self, solid: &PrismSolid, dir: &Dir3) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in solid.probe_points() {
            if let Some((lo, hi)) = solid.column(&p) {
                for z in [lo, hi] {
                    let world = solid.frame.apply_point(&Point3::new(p.x, p.y, z));
                    let d = dir.dot(&world.coords);
                    min = min.min(d);
                    max = max.max(d);
                }
            }
        }
        if min > max {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }

    /// Side faces in wire order (outer wire first), then the bottom and top
    /// caps when they still bound material, then every cut that does.
    fn faces(&self, solid: &PrismSolid) -> Vec<FaceInfo> {
        let mut found: Vec<(SurfaceKind, Option<(Vec3, Point3)>)> = Vec::new();
        let z_mid = (solid.z_min + solid.z_max) / 2.0;

        for (index, wire) in solid.section.wires().enumerate() {
            let is_outer = index == 0;
            for seg in wire.segments() {
                match seg {
                    Segment::Line { start, end } => {
                        let d: Vec2 = end - start;
                        let n = if is_outer {
                            Vec3::new(d.y, -d.x, 0.0)
                        } else {
                            Vec3::new(-d.y, d.x, 0.0)
                        };
                        let mid = Point3::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0, z_mid);
                        found.push((SurfaceKind::Plane, Some((n, mid))));
                    }
                    Segment::Arc { .. } => found.push((SurfaceKind::Cylinder, None)),
                }
            }
        }

        let center = solid.section.centroid();
        let mut probes = solid.probe_points();
        probes.push(center);
        let columns: Vec<(Point2, (f64, f64))> = probes
            .into_iter()
            .filter_map(|p| solid.column(&p).map(|c| (p, c)))
            .collect();
        let tol = scale_tolerance(solid.local_bounds().diagonal());

        if columns.iter().any(|(_, (lo, _))| (lo - solid.z_min).abs() < tol) {
            let origin = Point3::new(center.x, center.y, solid.z_min);
            found.push((SurfaceKind::Plane, Some((-Vec3::z(), origin))));
        }
        if columns.iter().any(|(_, (_, hi))| (hi - solid.z_max).abs() < tol) {
            let origin = Point3::new(center.x, center.y, solid.z_max);
            found.push((SurfaceKind::Plane, Some((Vec3::z(), origin))));
        }
        for cut in &solid.cuts {
            let (active, origin) = match classify(cut) {
                Bound::Upper(f) => (
                    columns.iter().any(|(p, (_, hi))| (hi - f.eval(p)).abs() < tol),
                    Point3::new(center.x, center.y, f.eval(&center)),
                ),
                Bound::Lower(f) => (
                    columns.iter().any(|(p, (lo, _))| (lo - f.eval(p)).abs() < tol),
                    Point3::new(center.x, center.y, f.eval(&center)),
                ),
                Bound::Lateral => (true, cut.origin),
            };
            if active {
                found.push((SurfaceKind::Plane, Some((cut.normal.into_inner(), origin))));
            }
        }

        found
            .into_iter()
            .enumerate()
            .map(|(i, (kind, plane))| FaceInfo {
                name: format!("Face{}", i + 1),
                kind,
                normal: plane.map(|(n, _)| Dir3::new_normalize(solid.frame.apply_vec(&n))),
                origin: plane.map(|(_, p)| solid.frame.apply_point(&p)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameforge_section::{generate, ProfileFamily, ProfileSpec};

    fn bar(kernel: &PrismKernel, length: f64) -> PrismSolid {
        let section = generate(&ProfileSpec::new(ProfileFamily::FlatBar, 40.0, 10.0)).unwrap();
        let face = kernel.face(&section, &Transform::identity()).unwrap();
        kernel.extrude(&face, &Vec3::new(0.0, 0.0, length)).unwrap()
    }

    /// Cube of edge `size` with its z = 0 face centered on `pivot`, rotated
    /// about y by `degrees`.
    fn cutter(kernel: &PrismKernel, size: f64, pivot: Point3, degrees: f64) -> PrismSolid {
        let cube = kernel.make_box(size, size, size).unwrap();
        let t = Transform::translation(pivot.x, pivot.y, pivot.z)
            .then(&Transform::rotation_y(degrees.to_radians()))
            .then(&Transform::translation(-size / 2.0, -size / 2.0, 0.0));
        kernel.transform(&cube, &t)
    }

    #[test]
    fn test_extrude_volume_and_extent() {
        let k = PrismKernel::new();
        let solid = bar(&k, 500.0);
        assert!(k.is_valid(&solid));
        assert!((k.volume(&solid) - 200_000.0).abs() < 1e-6);
        let (lo, hi) = k.extent_along(&solid, &Vec3::z_axis());
        assert!(lo.abs() < 1e-9 && (hi - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_oblique_extrusion_is_unsupported() {
        let k = PrismKernel::new();
        let section = generate(&ProfileSpec::new(ProfileFamily::SquareBar, 0.0, 10.0)).unwrap();
        let face = k.face(&section, &Transform::identity()).unwrap();
        assert!(matches!(
            k.extrude(&face, &Vec3::new(1.0, 0.0, 10.0)),
            Err(KernelError::Unsupported(_))
        ));
        assert!(matches!(
            k.extrude(&face, &Vec3::zeros()),
            Err(KernelError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_coaxial_union() {
        let k = PrismKernel::new();
        let section = generate(&ProfileSpec::new(ProfileFamily::FlatBar, 40.0, 10.0)).unwrap();
        let base = bar(&k, 100.0);
        let face = k
            .face(&section, &Transform::translation(0.0, 0.0, 100.0))
            .unwrap();
        let extension = k.extrude(&face, &Vec3::new(0.0, 0.0, 50.0)).unwrap();
        let fused = k.union(&base, &extension).unwrap();
        assert!((k.volume(&fused) - 400.0 * 150.0).abs() < 1e-6);

        let shifted = k.transform(&extension, &Transform::translation(5.0, 0.0, 0.0));
        assert!(matches!(
            k.union(&base, &shifted),
            Err(KernelError::Unsupported(_))
        ));
    }

    #[test]
    fn test_bevel_cut_through_centroid_keeps_volume() {
        let k = PrismKernel::new();
        let solid = bar(&k, 150.0);
        let tool = cutter(&k, 400.0, Point3::new(20.0, 5.0, 100.0), 30.0);
        let cut = k.difference(&solid, &tool).unwrap();
        assert_eq!(cut.cut_count(), 1);
        assert!(k.is_valid(&cut));

        let vol = k.volume(&cut);
        assert!((vol - 400.0 * 100.0).abs() < 1e-6, "expected 40000, got {vol}");

        let (_, hi) = k.extent_along(&cut, &Vec3::z_axis());
        let expected = 100.0 + 20.0 * 30.0_f64.to_radians().tan();
        assert!((hi - expected).abs() < 1e-9, "expected {expected}, got {hi}");
    }

    #[test]
    fn test_faces_after_cut() {
        let k = PrismKernel::new();
        let solid = bar(&k, 150.0);
        let tool = cutter(&k, 400.0, Point3::new(20.0, 5.0, 100.0), 30.0);
        let cut = k.difference(&solid, &tool).unwrap();
        let faces = k.faces(&cut);
        // four sides, the bottom cap and the cut; the top cap is gone
        assert_eq!(faces.len(), 6);
        assert_eq!(faces[0].name, "Face1");
        assert!(faces.iter().all(|f| f.kind == SurfaceKind::Plane));

        let side = faces[0].normal.unwrap();
        assert!((side.into_inner() - Vec3::new(0.0, -1.0, 0.0)).norm() < 1e-12);
        let on_side = faces[0].origin.unwrap();
        assert!(on_side.y.abs() < 1e-12, "{on_side}");

        let end = faces[5].normal.unwrap();
        let expected = Transform::rotation_y(30.0_f64.to_radians()).apply_vec(&Vec3::z());
        assert!((end.into_inner() - expected).norm() < 1e-9);
        let on_end = faces[5].origin.unwrap();
        assert!((on_end - Point3::new(20.0, 5.0, 100.0)).dot(&expected).abs() < 1e-9);
    }

    #[test]
    fn test_round_section_has_cylindrical_faces() {
        let k = PrismKernel::new();
        let section = generate(&ProfileSpec::new(ProfileFamily::Pipe, 0.0, 50.0).with_thickness(5.0)).unwrap();
        let face = k.face(&section, &Transform::identity()).unwrap();
        let pipe = k.extrude(&face, &Vec3::new(0.0, 0.0, 10.0)).unwrap();
        let faces = k.faces(&pipe);
        assert_eq!(faces.len(), 6);
        assert_eq!(
            faces.iter().filter(|f| f.kind == SurfaceKind::Cylinder).count(),
            4
        );
    }

    #[test]
    fn test_tool_that_misses_leaves_solid_unchanged() {
        let k = PrismKernel::new();
        let solid = bar(&k, 100.0);
        let far = k.transform(
            &k.make_box(10.0, 10.0, 10.0).unwrap(),
            &Transform::translation(0.0, 0.0, 500.0),
        );
        let result = k.difference(&solid, &far).unwrap();
        assert_eq!(result.cut_count(), 0);
    }

    #[test]
    fn test_small_tool_is_rejected() {
        let k = PrismKernel::new();
        let solid = bar(&k, 100.0);
        let notch = k.transform(
            &k.make_box(5.0, 5.0, 5.0).unwrap(),
            &Transform::translation(10.0, 2.0, 50.0),
        );
        assert!(matches!(
            k.difference(&solid, &notch),
            Err(KernelError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_full_cover_gives_empty_volume() {
        let k = PrismKernel::new();
        let solid = bar(&k, 100.0);
        let cover = k.transform(
            &k.make_box(1000.0, 1000.0, 1000.0).unwrap(),
            &Transform::translation(-500.0, -500.0, -500.0),
        );
        let result = k.difference(&solid, &cover).unwrap();
        assert!(k.volume(&result) < 1e-6);
    }
}
