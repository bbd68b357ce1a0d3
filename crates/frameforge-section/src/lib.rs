#![warn(missing_docs)]

//! Parametric cross-sections for structural profiles.
//!
//! A [`ProfileSpec`] names a family and its catalog dimensions;
//! [`generate`] turns it into a [`Section`]: a closed, simple,
//! counter-clockwise outer [`Wire`] and, for tubes, a counter-clockwise
//! inner wire bounding the hole.
//!
//! # Example
//!
//! ```
//! use frameforge_section::{generate, ProfileFamily, ProfileSpec};
//!
//! let spec = ProfileSpec::new(ProfileFamily::RectangularHollow, 60.0, 40.0).with_thickness(4.0);
//! let section = generate(&spec).unwrap();
//! assert!((section.area() - (2400.0 - 52.0 * 32.0)).abs() < 1e-9);
//! ```

mod fillet;
mod generate;
mod spec;
mod wire;

pub use generate::generate;
pub use spec::{LengthUnit, ProfileFamily, ProfileSpec};
pub use wire::{point_in_polyline, Segment, Wire};

use frameforge_math::Point2;
use thiserror::Error;

/// Errors from cross-section construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SectionError {
    /// A dimension is missing, non-positive or inconsistent with the others.
    #[error("invalid {name}: {value}")]
    InvalidDimension {
        /// Name of the offending dimension.
        name: &'static str,
        /// Its value in millimeters.
        value: f64,
    },

    /// A fillet does not fit on the edges adjacent to its corner.
    #[error("fillet at corner {corner} does not fit its edges")]
    FilletTooLarge {
        /// Index of the polygon corner.
        corner: usize,
    },

    /// The wire is not closed (gap between consecutive segments).
    #[error("wire is not closed: gap of {0:.6} mm")]
    NotClosed(f64),

    /// A segment is degenerate (zero length).
    #[error("degenerate segment at index {0}")]
    DegenerateSegment(usize),

    /// The wire has no segments.
    #[error("wire has no segments")]
    EmptyWire,

    /// Two non-adjacent pieces of a wire touch or cross.
    #[error("wire self-intersects between pieces {0} and {1}")]
    SelfIntersecting(usize, usize),

    /// The wire encloses no area.
    #[error("wire encloses no area")]
    ZeroArea,

    /// The inner wire crosses or lies outside the outer wire.
    #[error("inner wire is not strictly inside the outer wire")]
    InnerOutsideOuter,

    /// A catalog family name that maps to no profile family.
    #[error("unknown profile family: {0}")]
    UnknownFamily(String),

    /// A unit string that maps to no length unit.
    #[error("unknown length unit: {0}")]
    UnknownUnit(String),
}

/// A planar profile region: an outer boundary and an optional hole.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    outer: Wire,
    inner: Option<Wire>,
}

impl Section {
    /// Validate and orient a region.
    ///
    /// Both wires are turned counter-clockwise. Fails if either wire
    /// self-intersects or encloses nothing, or if the hole is not strictly
    /// inside the outer boundary.
    pub fn new(outer: Wire, inner: Option<Wire>) -> Result<Self, SectionError> {
        let outer = oriented(outer)?;
        let inner = inner.map(oriented).transpose()?;

        if let Some(hole) = &inner {
            let inside = hole.vertices().iter().all(|p| outer.contains(p));
            if !inside || outer.touches(hole) {
                return Err(SectionError::InnerOutsideOuter);
            }
        }

        Ok(Self { outer, inner })
    }

    /// Outer boundary, counter-clockwise.
    pub fn outer(&self) -> &Wire {
        &self.outer
    }

    /// Hole boundary, counter-clockwise.
    pub fn inner(&self) -> Option<&Wire> {
        self.inner.as_ref()
    }

    /// Both wires, outer first.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        std::iter::once(&self.outer).chain(self.inner.iter())
    }

    /// Total number of segments in both wires.
    pub fn segment_count(&self) -> usize {
        self.wires().map(Wire::len).sum()
    }

    /// Exact enclosed area (outer minus hole).
    pub fn area(&self) -> f64 {
        self.outer.signed_area() - self.inner.as_ref().map_or(0.0, Wire::signed_area)
    }

    /// Length of both boundaries, the painted or coated outline per unit length.
    pub fn perimeter(&self) -> f64 {
        self.wires().map(Wire::length).sum()
    }

    /// Exact area centroid.
    pub fn centroid(&self) -> Point2 {
        let (ox, oy) = self.outer.first_moments();
        let (ix, iy) = self.inner.as_ref().map_or((0.0, 0.0), Wire::first_moments);
        let area = self.area();
        Point2::new((ox - ix) / area, (oy - iy) / area)
    }

    /// Axis-aligned bounds of the outer boundary as `(min, max)`.
    pub fn bounds(&self) -> (Point2, Point2) {
        self.outer.bounds()
    }

    /// True when `p` lies in the material region.
    pub fn contains(&self, p: &Point2) -> bool {
        self.outer.contains(p) && !self.inner.as_ref().is_some_and(|hole| hole.contains(p))
    }
}

fn oriented(wire: Wire) -> Result<Wire, SectionError> {
    let area = wire.signed_area();
    if area.abs() < frameforge_math::Tolerance::DEFAULT.linear {
        return Err(SectionError::ZeroArea);
    }
    let wire = if area < 0.0 { wire.reversed() } else { wire };
    if let Some((i, j)) = wire.self_intersection() {
        return Err(SectionError::SelfIntersecting(i, j));
    }
    Ok(wire)
}
