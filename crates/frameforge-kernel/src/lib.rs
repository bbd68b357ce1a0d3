#![warn(missing_docs)]

//! Geometry kernel seam for frameforge.
//!
//! Profile realization only needs a handful of solid operations: make a face
//! from a cross-section, extrude it, place boxes, fuse and subtract, and ask
//! a few questions of the result. [`GeometryKernel`] names exactly that set
//! so a full B-rep kernel can be plugged in behind it. [`PrismKernel`] is the
//! in-tree implementation: it represents every solid as an extruded section
//! clipped by half-spaces, which is all that beveled profiles require.
//!
//! # Example
//!
//! ```
//! use frameforge_kernel::{GeometryKernel, PrismKernel};
//! use frameforge_math::{Transform, Vec3};
//! use frameforge_section::{generate, ProfileFamily, ProfileSpec};
//!
//! let kernel = PrismKernel::new();
//! let section = generate(&ProfileSpec::new(ProfileFamily::FlatBar, 40.0, 10.0)).unwrap();
//! let face = kernel.face(&section, &Transform::identity()).unwrap();
//! let bar = kernel.extrude(&face, &Vec3::new(0.0, 0.0, 500.0)).unwrap();
//! assert!((kernel.volume(&bar) - 200_000.0).abs() < 1e-6);
//! ```

mod prism;

pub use prism::{PrismFace, PrismKernel, PrismSolid};

use std::fmt;

use frameforge_math::{Dir3, Point3, Transform, Vec3};
use frameforge_section::Section;
use thiserror::Error;

/// Errors reported by a geometry kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// An operation produced or received an invalid shape.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// The kernel cannot represent the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Surface type of a solid face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Planar face.
    Plane,
    /// Cylindrical face (from an arc of the section).
    Cylinder,
}

/// A named face of a solid.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceInfo {
    /// Stable face name (`Face1`, `Face2`, ...).
    pub name: String,
    /// Surface type.
    pub kind: SurfaceKind,
    /// Outward normal at the face's parametric midpoint, planar faces only.
    pub normal: Option<Dir3>,
    /// A point of the face's plane: the side's midpoint, or the point above
    /// the section centroid for caps and end cuts. Planar faces only.
    pub origin: Option<Point3>,
}

/// The solid operations profile realization relies on.
pub trait GeometryKernel {
    /// A planar face with its placement.
    type Face: Clone + fmt::Debug;
    /// A closed solid.
    type Solid: Clone + fmt::Debug;

    /// Face bounded by the section's wires, placed by `placement`.
    fn face(&self, section: &Section, placement: &Transform) -> Result<Self::Face, KernelError>;

    /// Sweep a face along `vector`.
    fn extrude(&self, face: &Self::Face, vector: &Vec3) -> Result<Self::Solid, KernelError>;

    /// Box with one corner at the origin and the opposite one at `(dx, dy, dz)`.
    fn make_box(&self, dx: f64, dy: f64, dz: f64) -> Result<Self::Solid, KernelError>;

    /// Rigidly move a solid.
    fn transform(&self, solid: &Self::Solid, t: &Transform) -> Self::Solid;

    /// Boolean union.
    fn union(&self, a: &Self::Solid, b: &Self::Solid) -> Result<Self::Solid, KernelError>;

    /// Boolean difference (`a − b`).
    fn difference(&self, a: &Self::Solid, b: &Self::Solid) -> Result<Self::Solid, KernelError>;

    /// Enclosed volume.
    fn volume(&self, solid: &Self::Solid) -> f64;

    /// Structural validity check.
    fn is_valid(&self, solid: &Self::Solid) -> bool;

    /// Minimum and maximum of the solid's vertices projected on `dir`.
    fn extent_along(&self, solid: &Self::Solid, dir: &Dir3) -> (f64, f64);

    /// Named faces of the solid.
    fn faces(&self, solid: &Self::Solid) -> Vec<FaceInfo>;
}
