#![warn(missing_docs)]

//! Extrusion of profile cross-sections with beveled ends.
//!
//! [`realize`] sweeps a [`Section`] along +z for the instance length, then
//! cuts each beveled end with an oversized cube turned about the center of
//! the end footprint. Ends are extended before cutting so the cut plane
//! always lies inside material.
//!
//! Each end has its own frame with +z pointing away from the profile; the
//! start frame is the end frame turned half a turn about x. A cube is first
//! tilted about its frame's y axis by the primary angle, then turned by the
//! secondary angle: about z (the length axis) in [`BevelMode::Combined`],
//! about x in [`BevelMode::Independent`].

use std::f64::consts::PI;

use frameforge_kernel::{GeometryKernel, KernelError};
use frameforge_math::{Plane, Point2, Point3, Transform, Vec3};
use frameforge_section::{ProfileSpec, Section};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Largest bevel or rotation magnitude, in degrees.
pub const MAX_BEVEL: f64 = 60.0;

/// Cube edge as a multiple of the larger section dimension.
const MARGIN_FACTOR: f64 = 10.0;

/// Extension past a beveled end as a fraction of the cube edge.
///
/// A cut plane tilted by both angles at their limits strays about 0.27
/// margins from the end footprint center along the axis.
const EXTENSION_RATIO: f64 = 0.3;

/// Volume below which a realized profile counts as empty (mm³).
const EMPTY_VOLUME: f64 = 1e-6;

/// Errors from profile realization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BevelError {
    /// The kernel rejected a step or produced an invalid solid.
    #[error("geometry kernel failure: {0}")]
    Geometry(#[from] KernelError),

    /// Nothing is left after cutting the ends.
    #[error("beveled profile has no volume left")]
    EmptyResult,
}

/// Clamp a bevel or rotation angle to `[-60°, 60°]`.
pub fn clamp_bevel(degrees: f64) -> f64 {
    degrees.clamp(-MAX_BEVEL, MAX_BEVEL)
}

/// How the end cuts of a profile are specified. Angles are degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BevelMode {
    /// A miter angle per end plus a rotation of the cut about the length axis.
    Combined {
        /// Miter angle at the start.
        start_cut: f64,
        /// Rotation of the start cut about the length axis.
        start_rotate: f64,
        /// Miter angle at the end.
        end_cut: f64,
        /// Rotation of the end cut about the length axis.
        end_rotate: f64,
    },
    /// Two independent tilts per end, about the section's y and x axes.
    Independent {
        /// Start tilt about y.
        start_cut1: f64,
        /// Start tilt about x.
        start_cut2: f64,
        /// End tilt about y.
        end_cut1: f64,
        /// End tilt about x.
        end_cut2: f64,
    },
}

impl Default for BevelMode {
    fn default() -> Self {
        BevelMode::Combined {
            start_cut: 0.0,
            start_rotate: 0.0,
            end_cut: 0.0,
            end_rotate: 0.0,
        }
    }
}

impl BevelMode {
    /// The same mode with every angle clamped.
    pub fn clamped(&self) -> Self {
        match *self {
            BevelMode::Combined {
                start_cut,
                start_rotate,
                end_cut,
                end_rotate,
            } => BevelMode::Combined {
                start_cut: clamp_bevel(start_cut),
                start_rotate: clamp_bevel(start_rotate),
                end_cut: clamp_bevel(end_cut),
                end_rotate: clamp_bevel(end_rotate),
            },
            BevelMode::Independent {
                start_cut1,
                start_cut2,
                end_cut1,
                end_cut2,
            } => BevelMode::Independent {
                start_cut1: clamp_bevel(start_cut1),
                start_cut2: clamp_bevel(start_cut2),
                end_cut1: clamp_bevel(end_cut1),
                end_cut2: clamp_bevel(end_cut2),
            },
        }
    }

    /// Per-axis values `[start1, start2, end1, end2]` as cutting-angle
    /// classification reads them. Combined mode has no second axis.
    pub fn axis_values(&self) -> [f64; 4] {
        match *self {
            BevelMode::Combined {
                start_cut, end_cut, ..
            } => [start_cut, 0.0, end_cut, 0.0],
            BevelMode::Independent {
                start_cut1,
                start_cut2,
                end_cut1,
                end_cut2,
            } => [start_cut1, start_cut2, end_cut1, end_cut2],
        }
    }

    fn start_cut(&self) -> Option<EndCut> {
        match *self {
            BevelMode::Combined {
                start_cut,
                start_rotate,
                ..
            } => EndCut::new(start_cut, start_rotate, SecondaryAxis::Length),
            BevelMode::Independent {
                start_cut1,
                start_cut2,
                ..
            } => EndCut::new(start_cut1, -start_cut2, SecondaryAxis::Cross),
        }
    }

    fn end_cut(&self) -> Option<EndCut> {
        match *self {
            BevelMode::Combined {
                end_cut, end_rotate, ..
            } => EndCut::new(-end_cut, -end_rotate, SecondaryAxis::Length),
            BevelMode::Independent {
                end_cut1, end_cut2, ..
            } => EndCut::new(-end_cut1, end_cut2, SecondaryAxis::Cross),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SecondaryAxis {
    /// End frame z.
    Length,
    /// End frame x.
    Cross,
}

/// Signed angles of one end, in that end's frame.
#[derive(Debug, Clone, Copy)]
struct EndCut {
    primary: f64,
    secondary: f64,
    axis: SecondaryAxis,
}

impl EndCut {
    fn new(primary: f64, secondary: f64, axis: SecondaryAxis) -> Option<Self> {
        (primary != 0.0 || secondary != 0.0).then_some(Self {
            primary,
            secondary,
            axis,
        })
    }

    fn rotation(&self) -> Transform {
        let primary = Transform::rotation_y(self.primary.to_radians());
        let angle = self.secondary.to_radians();
        let secondary = match self.axis {
            SecondaryAxis::Length => Transform::rotation_z(angle),
            SecondaryAxis::Cross => Transform::rotation_x(angle),
        };
        secondary.then(&primary)
    }
}

/// A placed catalog profile: its section parameters, length and end cuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInstance {
    /// Cross-section parameters.
    pub spec: ProfileSpec,
    /// Nominal length along the path, in mm.
    pub length: f64,
    /// Center the section on the path across its width.
    #[serde(default)]
    pub center_width: bool,
    /// Center the section on the path across its height.
    #[serde(default)]
    pub center_height: bool,
    /// End cuts.
    #[serde(default)]
    pub bevel: BevelMode,
}

impl ProfileInstance {
    /// Square-cut, uncentered instance.
    pub fn new(spec: ProfileSpec, length: f64) -> Self {
        Self {
            spec,
            length,
            center_width: false,
            center_height: false,
            bevel: BevelMode::default(),
        }
    }

    /// Set the centering flags.
    pub fn with_centering(mut self, width: bool, height: bool) -> Self {
        self.center_width = width;
        self.center_height = height;
        self
    }

    /// Set the end cuts.
    pub fn with_bevel(mut self, bevel: BevelMode) -> Self {
        self.bevel = bevel;
        self
    }

    /// Section offset applied by the centering flags.
    ///
    /// Round sections are centered on both axes as soon as either flag is set.
    pub fn centering_offset(&self, width: f64, height: f64) -> (f64, f64) {
        if self.spec.family.is_round() {
            let shift = if self.center_width || self.center_height {
                -height / 2.0
            } else {
                0.0
            };
            return (shift, shift);
        }
        let dx = if self.center_width { -width / 2.0 } else { 0.0 };
        let dy = if self.center_height { -height / 2.0 } else { 0.0 };
        (dx, dy)
    }
}

/// Extrude `section` to the instance length and cut its beveled ends.
///
/// The profile runs from z = 0 to z = length before cutting. Every angle is
/// clamped to `[-60°, 60°]` first.
pub fn realize<K: GeometryKernel>(
    kernel: &K,
    section: &Section,
    instance: &ProfileInstance,
) -> Result<K::Solid, BevelError> {
    let length = instance.length;
    if !(length > 0.0 && length.is_finite()) {
        let reason = format!("profile length must be positive, got {length}");
        return Err(KernelError::InvalidShape(reason).into());
    }

    let (min, max) = section.bounds();
    let (width, height) = (max.x - min.x, max.y - min.y);
    let (dx, dy) = instance.centering_offset(width, height);
    let pivot = Point2::new(min.x + width / 2.0 + dx, min.y + height / 2.0 + dy);
    let margin = MARGIN_FACTOR * width.max(height);
    let extension = EXTENSION_RATIO * margin;

    let mut solid = prism(kernel, section, dx, dy, 0.0, length)?;

    let mode = instance.bevel.clamped();
    let start = mode.start_cut();
    let end = mode.end_cut();

    if start.is_some() {
        let piece = prism(kernel, section, dx, dy, -extension, extension)?;
        solid = kernel.union(&solid, &piece)?;
    }
    if end.is_some() {
        let piece = prism(kernel, section, dx, dy, length, extension)?;
        solid = kernel.union(&solid, &piece)?;
    }

    if let Some(cut) = end {
        let frame = Transform::translation(pivot.x, pivot.y, length);
        solid = cut_end(kernel, &solid, margin, &frame, &cut)?;
    }
    if let Some(cut) = start {
        let frame = Transform::translation(pivot.x, pivot.y, 0.0).then(&Transform::rotation_x(PI));
        solid = cut_end(kernel, &solid, margin, &frame, &cut)?;
    }

    let volume = kernel.volume(&solid);
    if volume <= EMPTY_VOLUME {
        return Err(BevelError::EmptyResult);
    }
    debug!(
        family = %instance.spec.family,
        length,
        volume,
        beveled_start = start.is_some(),
        beveled_end = end.is_some(),
        "realized profile"
    );
    Ok(solid)
}

/// Remove the material of `solid` on the normal side of `plane`.
///
/// `stock` is the realized profile `solid` was cut from, `section` its
/// cross-section. Together they size the cutting cube so that it covers
/// end extensions and earlier cuts. A plane that misses the solid leaves it
/// unchanged.
pub fn cut_beyond<K: GeometryKernel>(
    kernel: &K,
    solid: &K::Solid,
    stock: &K::Solid,
    section: &Section,
    plane: &Plane,
) -> Result<K::Solid, BevelError> {
    let axes = [Vec3::x_axis(), Vec3::y_axis(), Vec3::z_axis()];
    let extents = axes.map(|axis| kernel.extent_along(stock, &axis));
    let center = Point3::from(extents.map(|(lo, hi)| (lo + hi) / 2.0));
    let half_diagonal = extents
        .iter()
        .map(|(lo, hi)| (hi - lo) / 2.0)
        .map(|h| h * h)
        .sum::<f64>()
        .sqrt();

    let (min, max) = section.bounds();
    let margin = MARGIN_FACTOR * (max.x - min.x).max(max.y - min.y);
    let distance = plane.signed_distance(&center);
    let foot = center - plane.normal.into_inner() * distance;
    let reach = distance.abs() + half_diagonal + margin;
    let size = 4.0 * reach;

    let cube = kernel.make_box(size, size, size)?;
    let placement = Transform::frame_along(&foot, &plane.normal)
        .then(&Transform::translation(-size / 2.0, -size / 2.0, 0.0));
    let tool = kernel.transform(&cube, &placement);
    let result = kernel.difference(solid, &tool)?;
    if !kernel.is_valid(&result) {
        return Err(KernelError::InvalidShape("plane cut left an invalid solid".into()).into());
    }
    if kernel.volume(&result) <= EMPTY_VOLUME {
        return Err(BevelError::EmptyResult);
    }
    debug!(normal = ?plane.normal.into_inner(), "cut profile at plane");
    Ok(result)
}

/// Section shifted by `(dx, dy)` and swept from `z0` over `depth`.
fn prism<K: GeometryKernel>(
    kernel: &K,
    section: &Section,
    dx: f64,
    dy: f64,
    z0: f64,
    depth: f64,
) -> Result<K::Solid, KernelError> {
    let face = kernel.face(section, &Transform::translation(dx, dy, z0))?;
    kernel.extrude(&face, &Vec3::new(0.0, 0.0, depth))
}

/// Subtract a cube standing outward on `frame`, turned by `cut`.
fn cut_end<K: GeometryKernel>(
    kernel: &K,
    solid: &K::Solid,
    margin: f64,
    frame: &Transform,
    cut: &EndCut,
) -> Result<K::Solid, BevelError> {
    let cube = kernel.make_box(margin, margin, margin)?;
    let placement = frame
        .then(&cut.rotation())
        .then(&Transform::translation(-margin / 2.0, -margin / 2.0, 0.0));
    let tool = kernel.transform(&cube, &placement);
    let result = kernel.difference(solid, &tool)?;
    if !kernel.is_valid(&result) {
        return Err(KernelError::InvalidShape("end cut left an invalid solid".into()).into());
    }
    debug!(primary = cut.primary, secondary = cut.secondary, "cut profile end");
    Ok(result)
}
