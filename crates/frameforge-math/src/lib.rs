#![warn(missing_docs)]

//! Math types for frameforge.
//!
//! Thin wrappers around nalgebra: points, vectors, directions, rigid
//! transforms, oriented planes, bounding boxes and tolerance constants.
//! Lengths are millimeters, user-facing angles are degrees.

use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 3x3 matrix (linear part of a transform).
pub type Mat3 = Matrix3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the section plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the section plane.
pub type Vec2 = Vector2<f64>;

/// 2D cross product (z component of the 3D cross product).
pub fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Left-hand normal of a 2D vector, `(x, y) -> (-y, x)`.
pub fn left_normal(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Frame whose local Z axis runs along `direction`, with its origin at
    /// `origin`.
    ///
    /// The local X axis is the horizontal perpendicular (world Z cross
    /// direction) unless the direction is vertical, in which case world X is
    /// used.
    pub fn frame_along(origin: &Point3, direction: &Dir3) -> Self {
        let z = direction.into_inner();
        let up = if z.cross(&Vec3::z()).norm() < 1e-9 {
            Vec3::y()
        } else {
            Vec3::z()
        };
        let x = up.cross(&z).normalize();
        let y = z.cross(&x);
        let mut m = Matrix4::identity();
        for row in 0..3 {
            m[(row, 0)] = x[row];
            m[(row, 1)] = y[row];
            m[(row, 2)] = z[row];
        }
        m[(0, 3)] = origin.x;
        m[(1, 3)] = origin.y;
        m[(2, 3)] = origin.z;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// Applying the result applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Transform a normal vector (uses inverse transpose of upper-left 3x3).
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let m3 = self.linear_part();
        if let Some(inv) = m3.try_inverse() {
            inv.transpose() * n
        } else {
            // Degenerate transform: return input unchanged
            *n
        }
    }

    /// Upper-left 3x3 block (rotation for rigid transforms).
    pub fn linear_part(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Translation column.
    pub fn origin(&self) -> Point3 {
        Point3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// Image of the local Z axis.
    pub fn z_axis(&self) -> Vec3 {
        self.apply_vec(&Vec3::z())
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// True when every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// An oriented plane: a point on it and a unit normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Point on the plane.
    pub origin: Point3,
    /// Unit normal.
    pub normal: Dir3,
}

impl Plane {
    /// Create a plane from a point and a (not necessarily unit) normal.
    pub fn new(origin: Point3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: Dir3::new_normalize(normal),
        }
    }

    /// Signed distance of `p`, positive on the normal side.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.origin))
    }

    /// The same plane with its normal reversed.
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    /// Map the plane through an affine transform.
    pub fn transformed(&self, t: &Transform) -> Self {
        Self::new(t.apply_point(&self.origin), t.apply_normal(&self.normal))
    }

    /// Intersection parameter of the segment `a -> b` with the plane, if the
    /// segment crosses it.
    pub fn segment_parameter(&self, a: &Point3, b: &Point3) -> Option<f64> {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        if (da > 0.0) == (db > 0.0) || (da - db).abs() < f64::EPSILON {
            return None;
        }
        Some(da / (da - db))
    }
}

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// True when no point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Length of the box diagonal (0 for an empty box).
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }

    /// The eight corners.
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }

    /// The twelve edges as corner index pairs into [`Aabb3::corners`].
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default CAD tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two section-plane points are coincident within tolerance.
    pub fn points2_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_y_tilts_z_axis_toward_x() {
        let t = Transform::rotation_y(PI / 6.0);
        let n = t.apply_vec(&Vec3::z());
        assert!((n.x - 0.5).abs() < 1e-12);
        assert!((n.z - (PI / 6.0).cos()).abs() < 1e-12);
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        let rotate = Transform::rotation_z(PI / 2.0);
        let shift = Transform::translation(1.0, 0.0, 0.0);
        // shift first, then rotate: (0,0,0) -> (1,0,0) -> (0,1,0)
        let p = rotate.then(&shift).apply_point(&Point3::origin());
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_along_is_right_handed() {
        let dir = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let f = Transform::frame_along(&Point3::new(5.0, 0.0, 0.0), &dir);
        let x = f.apply_vec(&Vec3::x());
        let y = f.apply_vec(&Vec3::y());
        let z = f.apply_vec(&Vec3::z());
        assert!((z - dir.into_inner()).norm() < 1e-12);
        assert!((x.cross(&y) - z).norm() < 1e-12);
        assert!((f.origin() - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-12);

        let vertical = Transform::frame_along(&Point3::origin(), &Vec3::z_axis());
        assert!((vertical.z_axis() - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::rotation_x(0.3));
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        let result = inv.apply_point(&t.apply_point(&p));
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_plane_transform_and_distance() {
        let plane = Plane::new(Point3::origin(), Vec3::z());
        let moved = plane.transformed(&Transform::translation(0.0, 0.0, 5.0));
        assert!((moved.signed_distance(&Point3::new(3.0, 4.0, 6.0)) - 1.0).abs() < 1e-12);
        assert!((moved.flipped().signed_distance(&Point3::origin()) - 5.0).abs() < 1e-12);

        let t = moved
            .segment_parameter(&Point3::origin(), &Point3::new(0.0, 0.0, 10.0))
            .unwrap();
        assert!((t - 0.5).abs() < 1e-12);
        assert!(moved
            .segment_parameter(&Point3::origin(), &Point3::new(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn test_aabb_corners_and_diagonal() {
        let mut b = Aabb3::empty();
        assert!(b.is_empty());
        assert_eq!(b.diagonal(), 0.0);
        b.include_point(&Point3::new(0.0, 0.0, 0.0));
        b.include_point(&Point3::new(3.0, 4.0, 0.0));
        assert!((b.diagonal() - 5.0).abs() < 1e-12);
        for (i, j) in Aabb3::EDGES {
            let d = (b.corners()[i] - b.corners()[j]).norm();
            assert!(d == 0.0 || d == 3.0 || d == 4.0);
        }
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        assert!(tol.points2_equal(&a, &Point2::new(1.0 + 1e-7, 2.0)));
        assert!(!tol.points2_equal(&a, &Point2::new(1.001, 2.0)));
    }
}
