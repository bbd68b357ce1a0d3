//! Feature arena with epoch-driven recompute.

use std::collections::HashSet;
use std::fmt;

use frameforge_bevel::{cut_beyond, realize, ProfileInstance};
use frameforge_ir::{Document, ProfileFeature, TrimFeature};
use frameforge_kernel::{FaceInfo, GeometryKernel, SurfaceKind};
use frameforge_math::{Dir3, Plane, Point3, Transform, Vec3};
use frameforge_nest::{nest, CutPart, Stock};
use frameforge_section::generate;
use frameforge_trim::{
    classify, flatten_levels, resolve_chain, BodyRef, FrameGeometry, ProfileId, SubFace,
    TrimArena, TrimError, TrimId, TrimRelation, TrimType, UNKNOWN,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Bom, BomRow, FrameError, SkippedPart};

/// Modification counter supplied by the caller.
///
/// Every edit is stamped with an epoch and [`FrameModel::recompute`] stamps
/// what it computes, so a feature is stale when it was computed before its
/// inputs last changed. Epochs must not go backwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The following epoch.
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

#[derive(Debug)]
struct Cached<T> {
    modified_at: Epoch,
    computed_at: Option<Epoch>,
    output: Option<Result<T, FrameError>>,
}

impl<T> Cached<T> {
    fn new(epoch: Epoch) -> Self {
        Self {
            modified_at: epoch,
            computed_at: None,
            output: None,
        }
    }

    fn is_stale(&self, inputs: Epoch) -> bool {
        self.computed_at.map_or(true, |at| at < inputs)
    }

    fn store(&mut self, epoch: Epoch, output: Result<T, FrameError>) {
        self.computed_at = Some(epoch);
        self.output = Some(output);
    }

    fn get(&self) -> Option<Result<&T, &FrameError>> {
        self.output.as_ref().map(Result::as_ref)
    }
}

#[derive(Debug)]
struct ProfileSlot<S> {
    feature: ProfileFeature,
    solid: Cached<S>,
}

#[derive(Debug)]
struct TrimSlot<S> {
    label: String,
    parent: String,
    output: Cached<TrimOutput<S>>,
}

#[derive(Debug)]
struct TrimOutput<S> {
    angles: (String, String),
    solid: S,
}

/// Features refreshed by one [`FrameModel::recompute`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecomputeReport {
    /// Every feature that was stale, in recompute order.
    pub recomputed: Vec<BodyRef>,
    /// Features whose recompute failed, with the error message.
    pub failed: Vec<(BodyRef, String)>,
}

impl RecomputeReport {
    fn record<T>(&mut self, body: BodyRef, output: &Result<T, FrameError>) {
        self.recomputed.push(body);
        if let Err(e) = output {
            warn!(body = %body, error = %e, "feature failed to recompute");
            self.failed.push((body, e.to_string()));
        }
    }
}

/// Profiles and trims of one frame, with their cached outputs.
///
/// Profiles cache their placed solid, trims their cutting angles and the
/// solid left after cutting. A failing feature keeps its error in the
/// cache; other features are unaffected.
pub struct FrameModel<K: GeometryKernel> {
    kernel: K,
    profiles: Vec<ProfileSlot<K::Solid>>,
    trims: Vec<TrimSlot<K::Solid>>,
    arena: TrimArena,
}

impl<K: GeometryKernel> FrameModel<K> {
    /// Empty model over `kernel`.
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            profiles: Vec::new(),
            trims: Vec::new(),
            arena: TrimArena::new(),
        }
    }

    /// Model holding the features of `document`, all modified at `epoch`.
    ///
    /// Trim references are checked when the trims are recomputed.
    pub fn from_document(kernel: K, document: &Document, epoch: Epoch) -> Self {
        let mut model = Self::new(kernel);
        for profile in &document.profiles {
            model.add_profile(profile.clone(), epoch);
        }
        model.arena =
            TrimArena::from_relations(document.trims.iter().map(|t| t.relation.clone()).collect());
        model.trims = document
            .trims
            .iter()
            .map(|t| TrimSlot {
                label: t.label.clone(),
                parent: t.parent.clone(),
                output: Cached::new(epoch),
            })
            .collect();
        model
    }

    /// Features of the model as a document.
    pub fn to_document(&self) -> Document {
        Document {
            profiles: self.profiles.iter().map(|p| p.feature.clone()).collect(),
            trims: self
                .arena
                .iter()
                .zip(&self.trims)
                .map(|((_, relation), slot)| TrimFeature {
                    label: slot.label.clone(),
                    parent: slot.parent.clone(),
                    relation: relation.clone(),
                })
                .collect(),
            ..Document::new()
        }
    }

    /// The geometry kernel.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Add a profile modified at `epoch`.
    pub fn add_profile(&mut self, feature: ProfileFeature, epoch: Epoch) -> ProfileId {
        self.profiles.push(ProfileSlot {
            feature,
            solid: Cached::new(epoch),
        });
        ProfileId(self.profiles.len() as u32 - 1)
    }

    /// Replace a profile's attributes. Its shape is regenerated in full on
    /// the next recompute.
    pub fn update_profile(
        &mut self,
        id: ProfileId,
        feature: ProfileFeature,
        epoch: Epoch,
    ) -> Result<(), FrameError> {
        let slot = self
            .profiles
            .get_mut(id.0 as usize)
            .ok_or(FrameError::MissingProfile(id))?;
        slot.feature = feature;
        slot.solid.modified_at = epoch;
        Ok(())
    }

    /// Add a trim modified at `epoch`. Every body it names must exist.
    pub fn add_trim(&mut self, feature: TrimFeature, epoch: Epoch) -> Result<TrimId, FrameError> {
        self.check_relation(&feature.relation)?;
        let TrimFeature {
            label,
            parent,
            relation,
        } = feature;
        let id = self.arena.add(relation)?;
        self.trims.push(TrimSlot {
            label,
            parent,
            output: Cached::new(epoch),
        });
        Ok(id)
    }

    /// Point a trim at another trimmed body. Refuses links that close a loop.
    pub fn relink_trim(
        &mut self,
        id: TrimId,
        trimmed: BodyRef,
        epoch: Epoch,
    ) -> Result<(), FrameError> {
        self.check_body(trimmed)?;
        let slot = self
            .trims
            .get_mut(id.0 as usize)
            .ok_or(FrameError::MissingTrim(id))?;
        self.arena.relink(id, trimmed)?;
        slot.output.modified_at = epoch;
        Ok(())
    }

    /// Attributes of a profile.
    pub fn profile(&self, id: ProfileId) -> Option<&ProfileFeature> {
        self.profiles.get(id.0 as usize).map(|p| &p.feature)
    }

    /// Relation of a trim.
    pub fn trim(&self, id: TrimId) -> Option<&TrimRelation> {
        self.arena.get(id)
    }

    /// Number of profiles.
    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Number of trims.
    pub fn trim_count(&self) -> usize {
        self.trims.len()
    }

    /// Cached solid of a profile, `None` before its first recompute.
    pub fn solid(&self, id: ProfileId) -> Option<Result<&K::Solid, &FrameError>> {
        self.profiles.get(id.0 as usize)?.solid.get()
    }

    /// Cached cutting angles of a trim, `None` before its first recompute.
    pub fn trim_angles(&self, id: TrimId) -> Option<Result<&(String, String), &FrameError>> {
        let output = self.trims.get(id.0 as usize)?.output.get()?;
        Some(output.map(|o| &o.angles))
    }

    /// Cached solid of a trim, `None` before its first recompute.
    pub fn trim_solid(&self, id: TrimId) -> Option<Result<&K::Solid, &FrameError>> {
        let output = self.trims.get(id.0 as usize)?.output.get()?;
        Some(output.map(|o| &o.solid))
    }

    /// Refresh every stale feature and stamp it with `epoch`.
    ///
    /// Profiles are stale when edited after their last recompute. Trims are
    /// also stale when a trim of their chain or a profile they reference was
    /// edited since.
    pub fn recompute(&mut self, epoch: Epoch) -> RecomputeReport {
        let mut report = RecomputeReport::default();

        for index in 0..self.profiles.len() {
            let cache = &self.profiles[index].solid;
            if !cache.is_stale(cache.modified_at) {
                continue;
            }
            let id = ProfileId(index as u32);
            let output = self.compute_profile(id);
            report.record(BodyRef::Profile(id), &output);
            self.profiles[index].solid.store(epoch, output);
        }

        for index in 0..self.trims.len() {
            let id = TrimId(index as u32);
            let inputs = self.trim_inputs_modified(id);
            if !self.trims[index].output.is_stale(inputs) {
                continue;
            }
            let output = self.compute_angles(BodyRef::Trim(id)).and_then(|angles| {
                Ok(TrimOutput {
                    angles,
                    solid: self.compute_trim(id)?,
                })
            });
            report.record(BodyRef::Trim(id), &output);
            self.trims[index].output.store(epoch, output);
        }

        debug!(
            %epoch,
            recomputed = report.recomputed.len(),
            failed = report.failed.len(),
            "recompute finished"
        );
        report
    }

    /// Generate, extrude, bevel and place a profile.
    ///
    /// The profile runs along its path edge, extended by its start and end
    /// offsets. A degenerate path falls back to the instance length along
    /// +Z.
    pub fn compute_profile(&self, id: ProfileId) -> Result<K::Solid, FrameError> {
        let feature = self.profile(id).ok_or(FrameError::MissingProfile(id))?;
        let (placement, length) = placement(feature);
        let spec = feature.instance.spec.to_millimeters();
        let section = generate(&spec)?;
        let instance = ProfileInstance {
            spec,
            length,
            ..feature.instance.clone()
        };
        let solid = realize(&self.kernel, &section, &instance)?;
        debug!(profile = %id, label = %feature.label, length, "regenerated profile");
        Ok(self.kernel.transform(&solid, &placement))
    }

    /// Cut-list angles of a profile or trim.
    ///
    /// Profiles report their bevels. Trims report the angles of their whole
    /// chain combined with the bevels of the profile at its root.
    pub fn compute_angles(&self, body: BodyRef) -> Result<(String, String), FrameError> {
        let root = self.root_of(body)?;
        let feature = self.profile(root).ok_or(FrameError::MissingProfile(root))?;
        let [s1, s2, e1, e2] = feature.instance.bevel.clamped().axis_values();
        let trim_angles = match body {
            BodyRef::Profile(_) => Vec::new(),
            BodyRef::Trim(id) => flatten_levels(&resolve_chain(&self.arena, self, id)?),
        };
        Ok(classify(s1, s2, e1, e2, &trim_angles))
    }

    /// Cut the trimmed body of a trim, and every trim below it, at their
    /// boundary faces.
    ///
    /// Each planar boundary face cuts off the end of the body nearer to
    /// it. Simple Fit cuts along the face itself. End Miter cuts through the
    /// face's midpoint along the plane halfway between a square cut and the
    /// face. Faces of trim bodies are looked up on their root profile's
    /// solid. Other trim types leave the body as is.
    pub fn compute_trim(&self, id: TrimId) -> Result<K::Solid, FrameError> {
        let chain = self.arena.chain(id)?;
        let root = self.arena.root_profile(id)?;
        let feature = self.profile(root).ok_or(FrameError::MissingProfile(root))?;
        let section = generate(&feature.instance.spec.to_millimeters())?;
        let dir = axis(feature);
        let stock = self.with_solid(root, |solid| solid.clone())?;

        let mut solid = stock.clone();
        for trim in chain.iter().rev() {
            let relation = self.arena.get(*trim).ok_or(FrameError::MissingTrim(*trim))?;
            if let TrimType::Other(kind) = &relation.trim_type {
                warn!(trim = %trim, kind = %kind, "trim type has no cut rule, body left uncut");
                continue;
            }
            for boundary in &relation.boundaries {
                let faces = self.body_faces(boundary.object)?;
                for name in &boundary.faces {
                    let face = faces.iter().find(|f| &f.name == name).ok_or_else(|| {
                        TrimError::MissingReference(format!("{name} of {}", boundary.object))
                    })?;
                    let (Some(normal), Some(origin)) = (face.normal, face.origin) else {
                        continue;
                    };
                    let extent = self.kernel.extent_along(&solid, &dir);
                    let Some(plane) = trim_plane(&relation.trim_type, &dir, extent, normal, origin)
                    else {
                        warn!(trim = %trim, face = %name, "boundary face runs along the profile, skipped");
                        continue;
                    };
                    solid = cut_beyond(&self.kernel, &solid, &stock, &section, &plane)?;
                }
            }
        }
        debug!(trim = %id, levels = chain.len(), "realized trim");
        Ok(solid)
    }

    /// Length of a body measured along its root profile's path.
    pub fn length(&self, body: BodyRef) -> Result<f64, FrameError> {
        let root = self.root_of(body)?;
        let feature = self.profile(root).ok_or(FrameError::MissingProfile(root))?;
        let dir = axis(feature);
        let (lo, hi) = match body {
            BodyRef::Profile(id) => {
                self.with_solid(id, |solid| self.kernel.extent_along(solid, &dir))?
            }
            BodyRef::Trim(id) => {
                self.with_trim_solid(id, |solid| self.kernel.extent_along(solid, &dir))?
            }
        };
        Ok(hi - lo)
    }

    /// One BOM row per finished part.
    ///
    /// A part is a profile no trim applies to, or a trim no other trim
    /// applies to. Angles that cannot be resolved are reported as `?`.
    /// Parts whose root profile or length cannot be resolved are left out
    /// and listed in [`Bom::skipped`]; the other rows are unaffected.
    pub fn bom(&self) -> Bom {
        let trimmed: HashSet<BodyRef> = self.arena.iter().map(|(_, r)| r.trimmed).collect();
        let profiles = (0..self.profiles.len()).map(|i| BodyRef::Profile(ProfileId(i as u32)));
        let trims = (0..self.trims.len()).map(|i| BodyRef::Trim(TrimId(i as u32)));

        let mut bom = Bom::default();
        for body in profiles.chain(trims).filter(|body| !trimmed.contains(body)) {
            match self.bom_row(body) {
                Ok(row) => bom.rows.push(row),
                Err(e) => {
                    warn!(body = %body, error = %e, "part left out of the bill of material");
                    bom.skipped.push(SkippedPart {
                        body,
                        error: e.to_string(),
                    });
                }
            }
        }
        bom
    }

    /// Nest every BOM part onto bars of `stock_length`.
    ///
    /// Parts left out of the BOM are left out of the cut list too.
    pub fn cut_list(&self, stock_length: f64, kerf: f64) -> Result<Vec<Stock>, FrameError> {
        let parts: Vec<CutPart> = self
            .bom()
            .rows
            .into_iter()
            .map(|row| CutPart::new(row.label, row.length, kerf))
            .collect();
        Ok(nest(&parts, stock_length)?)
    }

    fn bom_row(&self, body: BodyRef) -> Result<BomRow, FrameError> {
        let root = self.root_of(body)?;
        let feature = self.profile(root).ok_or(FrameError::MissingProfile(root))?;
        let (label, parent) = match body {
            BodyRef::Trim(id) => {
                let slot = &self.trims[id.0 as usize];
                (slot.label.clone(), slot.parent.clone())
            }
            BodyRef::Profile(_) => (feature.label.clone(), feature.parent.clone()),
        };
        let (cut_angle_1, cut_angle_2) = self.angles_of(body).unwrap_or_else(|e| {
            warn!(body = %body, error = %e, "cutting angles unavailable, reporting ?");
            (UNKNOWN.to_string(), UNKNOWN.to_string())
        });
        let length = self.length(body)?;

        Ok(BomRow {
            parent,
            label,
            family: feature.family.clone(),
            size: feature.size.clone(),
            material: feature.material.clone(),
            length,
            cut_angle_1,
            cut_angle_2,
            cutout: feature.cutout,
            weight: feature.weight_per_m * length / 1000.0,
            quantity: 1,
        })
    }

    /// Cached trim angles when fresh, computed otherwise.
    fn angles_of(&self, body: BodyRef) -> Result<(String, String), FrameError> {
        if let BodyRef::Trim(id) = body {
            let slot = &self.trims[id.0 as usize];
            if !slot.output.is_stale(self.trim_inputs_modified(id)) {
                if let Some(Ok(output)) = slot.output.get() {
                    return Ok(output.angles.clone());
                }
            }
        }
        self.compute_angles(body)
    }

    /// Run `f` on the trim's solid, realizing it when the cache is stale or
    /// holds an error.
    fn with_trim_solid<R>(&self, id: TrimId, f: impl FnOnce(&K::Solid) -> R) -> Result<R, FrameError> {
        let slot = self.trims.get(id.0 as usize).ok_or(FrameError::MissingTrim(id))?;
        if !slot.output.is_stale(self.trim_inputs_modified(id)) {
            if let Some(Ok(output)) = slot.output.get() {
                return Ok(f(&output.solid));
            }
        }
        let solid = self.compute_trim(id)?;
        Ok(f(&solid))
    }

    /// Faces of a body; trims report their root profile's faces.
    fn body_faces(&self, body: BodyRef) -> Result<Vec<FaceInfo>, FrameError> {
        let profile = self.root_of(body)?;
        self.with_solid(profile, |solid| self.kernel.faces(solid))
    }

    /// Run `f` on the profile's solid, regenerating it when the cache is
    /// stale or holds an error.
    fn with_solid<R>(&self, id: ProfileId, f: impl FnOnce(&K::Solid) -> R) -> Result<R, FrameError> {
        let slot = self
            .profiles
            .get(id.0 as usize)
            .ok_or(FrameError::MissingProfile(id))?;
        if !slot.solid.is_stale(slot.solid.modified_at) {
            if let Some(Ok(solid)) = slot.solid.get() {
                return Ok(f(solid));
            }
        }
        let solid = self.compute_profile(id)?;
        Ok(f(&solid))
    }

    fn root_of(&self, body: BodyRef) -> Result<ProfileId, FrameError> {
        match body {
            BodyRef::Profile(id) => {
                self.profile(id).ok_or(FrameError::MissingProfile(id))?;
                Ok(id)
            }
            BodyRef::Trim(id) => {
                self.arena.get(id).ok_or(FrameError::MissingTrim(id))?;
                Ok(self.arena.root_profile(id)?)
            }
        }
    }

    fn check_body(&self, body: BodyRef) -> Result<(), FrameError> {
        match body {
            BodyRef::Profile(id) => self.profile(id).map(|_| ()).ok_or(FrameError::MissingProfile(id)),
            BodyRef::Trim(id) => self.arena.get(id).map(|_| ()).ok_or(FrameError::MissingTrim(id)),
        }
    }

    fn check_relation(&self, relation: &TrimRelation) -> Result<(), FrameError> {
        self.check_body(relation.trimmed)?;
        relation
            .boundaries
            .iter()
            .try_for_each(|b| self.check_body(b.object))
    }

    /// Latest edit among the trims of the chain and the profiles they touch.
    fn trim_inputs_modified(&self, id: TrimId) -> Epoch {
        let mut latest = self.trims[id.0 as usize].output.modified_at;
        let Ok(chain) = self.arena.chain(id) else {
            return latest;
        };
        for trim in chain {
            latest = latest.max(self.trims[trim.0 as usize].output.modified_at);
            let Some(relation) = self.arena.get(trim) else {
                continue;
            };
            let bodies =
                std::iter::once(relation.trimmed).chain(relation.boundaries.iter().map(|b| b.object));
            for body in bodies {
                if let Ok(profile) = self.root_of(body) {
                    latest = latest.max(self.profiles[profile.0 as usize].solid.modified_at);
                }
            }
        }
        latest
    }
}

impl<K: GeometryKernel> FrameGeometry for FrameModel<K> {
    fn path_vector(&self, profile: ProfileId) -> Option<Vec3> {
        self.profile(profile).map(|f| axis(f).into_inner())
    }

    /// Faces of trims are looked up on their root profile's solid.
    fn sub_face(&self, body: BodyRef, name: &str) -> Option<SubFace> {
        let faces = self.body_faces(body).ok()?;
        let face = faces.into_iter().find(|f| f.name == name)?;
        Some(match (face.kind, face.normal) {
            (SurfaceKind::Plane, Some(normal)) => SubFace::Planar(normal),
            _ => SubFace::Curved,
        })
    }
}

fn point(v: &frameforge_ir::Vec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

/// Unit direction of the profile's path, +Z for a degenerate path.
fn axis(feature: &ProfileFeature) -> Dir3 {
    let v = point(&feature.path.end) - point(&feature.path.start);
    Dir3::try_new(v, 1e-9).unwrap_or_else(Vec3::z_axis)
}

/// Plane cutting off the end of a body nearer to a boundary face.
///
/// `extent` is the body's span along `dir` and `origin` the face's
/// midpoint; the normal of the returned plane points into the material to
/// remove. `None` when the plane would run along the profile.
fn trim_plane(
    kind: &TrimType,
    dir: &Dir3,
    extent: (f64, f64),
    normal: Dir3,
    origin: Point3,
) -> Option<Plane> {
    let n = normal.into_inner();
    let at = dir.dot(&origin.coords);
    let (lo, hi) = extent;
    let outward = if at - lo >= hi - at {
        dir.into_inner()
    } else {
        -dir.into_inner()
    };
    match kind {
        TrimType::SimpleFit => {
            let along = n.dot(&outward);
            let side = if along < 0.0 { -n } else { n };
            (along.abs() > 1e-9).then(|| Plane::new(origin, side))
        }
        TrimType::EndMiter => {
            let bisector = outward - n;
            (bisector.dot(&outward) > 1e-9).then(|| Plane::new(origin, bisector))
        }
        TrimType::Other(_) => None,
    }
}

/// Frame of the profile's start and its length including offsets.
fn placement(feature: &ProfileFeature) -> (Transform, f64) {
    let start = point(&feature.path.start);
    let span = point(&feature.path.end) - start;
    let dir = axis(feature);
    let base = if span.norm() > 1e-9 {
        span.norm()
    } else {
        feature.instance.length
    };
    let origin = start - dir.into_inner() * feature.offset_start;
    let length = base + feature.offset_start + feature.offset_end;
    (Transform::frame_along(&origin, &dir), length)
}
