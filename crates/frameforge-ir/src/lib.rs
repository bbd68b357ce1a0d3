//! Serializable frame documents.
//!
//! A [`Document`] lists the profile and trim features of a frame. It holds
//! attributes only; solids, angles and cut lists are derived from it by the
//! frame model.
//!
//! Profiles and trims are addressed by their position in the document, which
//! is what [`ProfileId`] and [`TrimId`] index.

use frameforge_bevel::ProfileInstance;
use frameforge_trim::TrimRelation;
use serde::{Deserialize, Serialize};

pub use frameforge_trim::{BodyRef, ProfileId, TrimId};

/// Current document format version.
pub const VERSION: &str = "0.1";

/// 3D vector with f64 components (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The sketch edge a profile follows, from first to last vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEdge {
    /// First vertex.
    pub start: Vec3,
    /// Last vertex.
    pub end: Vec3,
}

impl PathEdge {
    /// Edge between two points.
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Distance between the end points.
    pub fn length(&self) -> f64 {
        let (dx, dy, dz) = (
            self.end.x - self.start.x,
            self.end.y - self.start.y,
            self.end.z - self.start.z,
        );
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A catalog profile placed along a path edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFeature {
    /// Display label.
    pub label: String,
    /// Label of the assembly the profile belongs to, empty at top level.
    #[serde(default)]
    pub parent: String,
    /// Catalog material.
    pub material: String,
    /// Catalog family name (`"IPE"`, `"Square Hollow"`, ...).
    pub family: String,
    /// Catalog size designation.
    pub size: String,
    /// Catalog weight per meter (kg/m).
    #[serde(default)]
    pub weight_per_m: f64,
    /// Whether an extruded cutout was applied to the part.
    #[serde(default)]
    pub cutout: bool,
    /// Edge the profile runs along.
    pub path: PathEdge,
    /// Extra length before the first path vertex (mm).
    #[serde(default)]
    pub offset_start: f64,
    /// Extra length past the last path vertex (mm).
    #[serde(default)]
    pub offset_end: f64,
    /// Section, length and end cuts.
    pub instance: ProfileInstance,
}

/// A trim relation with its display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimFeature {
    /// Display label.
    pub label: String,
    /// Label of the assembly the trimmed part belongs to.
    #[serde(default)]
    pub parent: String,
    /// The relation.
    pub relation: TrimRelation,
}

/// A frameforge document: the `.frame.json` file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// Profiles, indexed by [`ProfileId`].
    #[serde(default)]
    pub profiles: Vec<ProfileFeature>,
    /// Trims, indexed by [`TrimId`].
    #[serde(default)]
    pub trims: Vec<TrimFeature>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            profiles: Vec::new(),
            trims: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a profile and return its id.
    pub fn add_profile(&mut self, profile: ProfileFeature) -> ProfileId {
        self.profiles.push(profile);
        ProfileId(self.profiles.len() as u32 - 1)
    }

    /// Append a trim and return its id.
    pub fn add_trim(&mut self, trim: TrimFeature) -> TrimId {
        self.trims.push(trim);
        TrimId(self.trims.len() as u32 - 1)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
