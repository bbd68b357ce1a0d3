#![warn(missing_docs)]

//! Trim relations between profiles and the cutting angles they imply.
//!
//! A [`TrimRelation`] trims a body (a profile, or the result of another
//! trim) against named planar faces of other bodies. Relations live in a
//! [`TrimArena`] and point at their trimmed body by index, so a chain of
//! trims is a walk through the arena. [`resolve_chain`] turns such a chain
//! into fabrication cutting angles and [`classify`] formats bevel and trim
//! angles for a cut list.

mod classify;
mod resolve;

pub use classify::{classify, format_angle, ROTATED_MARKER, TRIM_MARKER, UNKNOWN};
pub use resolve::{flatten_levels, resolve_chain, ChainLevel, CutAngle, FrameGeometry, SubFace};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from trim bookkeeping and angle resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrimError {
    /// The trim type has no angle rule. Resolution reports it as `?`.
    #[error("no cutting-angle rule for trim type {0:?}")]
    UnknownTrimType(String),

    /// Following trimmed bodies leads back to a trim already visited.
    #[error("trim chain starting at {0} contains a cycle")]
    Cycle(TrimId),

    /// A trim, profile, edge or face reference does not resolve.
    #[error("missing reference: {0}")]
    MissingReference(String),
}

/// Index of a profile in its owning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId(pub u32);

/// Index of a trim relation in a [`TrimArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrimId(pub u32);

impl TrimId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile #{}", self.0)
    }
}

impl fmt::Display for TrimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trim #{}", self.0)
    }
}

/// A body that can be trimmed or trimmed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRef {
    /// A profile.
    Profile(ProfileId),
    /// The output of a trim relation.
    Trim(TrimId),
}

impl fmt::Display for BodyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyRef::Profile(id) => id.fmt(f),
            BodyRef::Trim(id) => id.fmt(f),
        }
    }
}

/// How a trimmed profile meets its boundary.
///
/// Stored as the display string, so unknown types survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrimType {
    /// Two profiles share a miter face; each takes half the angle.
    EndMiter,
    /// The profile is cut flush against the boundary faces.
    SimpleFit,
    /// Any other cut; its angles cannot be derived from the boundary.
    Other(String),
}

impl TrimType {
    /// Divisor applied to the face angle, `None` when no rule applies.
    pub fn divisor(&self) -> Option<f64> {
        match self {
            TrimType::EndMiter => Some(2.0),
            TrimType::SimpleFit => Some(1.0),
            TrimType::Other(_) => None,
        }
    }
}

impl From<String> for TrimType {
    fn from(s: String) -> Self {
        match s.trim() {
            "End Miter" => TrimType::EndMiter,
            "Simple fit" | "Simple Fit" => TrimType::SimpleFit,
            _ => TrimType::Other(s),
        }
    }
}

impl From<TrimType> for String {
    fn from(t: TrimType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TrimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimType::EndMiter => f.write_str("End Miter"),
            TrimType::SimpleFit => f.write_str("Simple fit"),
            TrimType::Other(name) => f.write_str(name),
        }
    }
}

/// Named faces of one body that bound a trim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Body owning the faces.
    pub object: BodyRef,
    /// Face names on that body (`Face1`, `Face2`, ...).
    pub faces: Vec<String>,
}

impl Boundary {
    /// Boundary made of the given faces of `object`.
    pub fn new<S: Into<String>>(object: BodyRef, faces: impl IntoIterator<Item = S>) -> Self {
        Self {
            object,
            faces: faces.into_iter().map(Into::into).collect(),
        }
    }
}

/// One trim operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimRelation {
    /// The body being trimmed.
    pub trimmed: BodyRef,
    /// Boundaries in the order they were picked.
    pub boundaries: Vec<Boundary>,
    /// Kind of cut.
    pub trim_type: TrimType,
}

/// Owner of all trim relations of a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimArena {
    relations: Vec<TrimRelation>,
}

impl TrimArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena over stored relations, e.g. loaded from a document.
    ///
    /// References are not checked here; resolution reports cycles and
    /// dangling indices when it meets them.
    pub fn from_relations(relations: Vec<TrimRelation>) -> Self {
        Self { relations }
    }

    /// Add a relation. A trimmed trim must already exist.
    pub fn add(&mut self, relation: TrimRelation) -> Result<TrimId, TrimError> {
        if let BodyRef::Trim(target) = relation.trimmed {
            self.get(target)
                .ok_or_else(|| TrimError::MissingReference(target.to_string()))?;
        }
        let id = TrimId(self.relations.len() as u32);
        self.relations.push(relation);
        Ok(id)
    }

    /// Point an existing relation at a different trimmed body.
    ///
    /// Leaves the arena unchanged and returns [`TrimError::Cycle`] if the new
    /// link would close a loop.
    pub fn relink(&mut self, id: TrimId, trimmed: BodyRef) -> Result<(), TrimError> {
        let slot = self
            .relations
            .get_mut(id.index())
            .ok_or_else(|| TrimError::MissingReference(id.to_string()))?;
        let previous = std::mem::replace(&mut slot.trimmed, trimmed);
        if let Err(e) = self.chain(id) {
            self.relations[id.index()].trimmed = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Relation by id.
    pub fn get(&self, id: TrimId) -> Option<&TrimRelation> {
        self.relations.get(id.index())
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// True when the arena holds no relation.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Every relation with its id.
    pub fn iter(&self) -> impl Iterator<Item = (TrimId, &TrimRelation)> {
        self.relations
            .iter()
            .enumerate()
            .map(|(i, r)| (TrimId(i as u32), r))
    }

    /// Trims from `start` down to the one that trims a profile, outer first.
    pub fn chain(&self, start: TrimId) -> Result<Vec<TrimId>, TrimError> {
        let mut visited = vec![false; self.relations.len()];
        let mut chain = Vec::new();
        let mut current = start;
        loop {
            let relation = self
                .get(current)
                .ok_or_else(|| TrimError::MissingReference(current.to_string()))?;
            if std::mem::replace(&mut visited[current.index()], true) {
                return Err(TrimError::Cycle(start));
            }
            chain.push(current);
            match relation.trimmed {
                BodyRef::Trim(next) => current = next,
                BodyRef::Profile(_) => return Ok(chain),
            }
        }
    }

    /// The profile at the bottom of the chain starting at `start`.
    pub fn root_profile(&self, start: TrimId) -> Result<ProfileId, TrimError> {
        let chain = self.chain(start)?;
        let last = chain[chain.len() - 1];
        match self.relations[last.index()].trimmed {
            BodyRef::Profile(profile) => Ok(profile),
            BodyRef::Trim(_) => Err(TrimError::MissingReference(last.to_string())),
        }
    }
}
