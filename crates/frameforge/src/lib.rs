#![warn(missing_docs)]

//! frameforge: steel frame design from catalog profiles.
//!
//! A [`FrameModel`] holds profile and trim features, regenerates their
//! solids and cutting angles when they go stale, and derives bills of
//! material and stock cut lists from the result.
//!
//! # Example
//!
//! ```rust
//! use frameforge::{Epoch, FrameModel, PrismKernel};
//! use frameforge::ir::{PathEdge, ProfileFeature, Vec3};
//! use frameforge::bevel::ProfileInstance;
//! use frameforge::section::{ProfileFamily, ProfileSpec};
//!
//! let spec = ProfileSpec::new(ProfileFamily::SquareHollow, 40.0, 40.0).with_thickness(4.0);
//! let mut model = FrameModel::new(PrismKernel::new());
//! model.add_profile(
//!     ProfileFeature {
//!         label: "Rail".into(),
//!         parent: String::new(),
//!         material: "Steel".into(),
//!         family: "Square Hollow".into(),
//!         size: "40x40x4".into(),
//!         weight_per_m: 4.39,
//!         cutout: false,
//!         path: PathEdge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1500.0, 0.0, 0.0)),
//!         offset_start: 0.0,
//!         offset_end: 0.0,
//!         instance: ProfileInstance::new(spec, 1500.0),
//!     },
//!     Epoch(1),
//! );
//! let report = model.recompute(Epoch(1));
//! assert!(report.failed.is_empty());
//! let bom = model.bom();
//! assert!(bom.skipped.is_empty());
//! assert!((bom.rows[0].length - 1500.0).abs() < 1e-6);
//! ```

use thiserror::Error;

mod bom;
mod model;

pub use bom::{group_rows, Bom, BomRow, SkippedPart};
pub use model::{Epoch, FrameModel, RecomputeReport};

pub use frameforge_bevel as bevel;
pub use frameforge_catalog as catalog;
pub use frameforge_ir as ir;
pub use frameforge_kernel::{GeometryKernel, PrismKernel};
pub use frameforge_nest as nest;
pub use frameforge_section as section;
pub use frameforge_trim as trim;

use frameforge_bevel::{BevelError, BevelMode, ProfileInstance};
use frameforge_catalog::{Catalog, CatalogError};
use frameforge_ir::{PathEdge, ProfileFeature};
use frameforge_nest::NestError;
use frameforge_section::SectionError;
use frameforge_trim::{ProfileId, TrimError, TrimId};

/// Errors returned by frame model operations.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The cross-section could not be built.
    #[error("section error: {0}")]
    Section(#[from] SectionError),

    /// Extrusion or end cutting failed.
    #[error("bevel error: {0}")]
    Bevel(#[from] BevelError),

    /// A trim chain could not be resolved.
    #[error("trim error: {0}")]
    Trim(#[from] TrimError),

    /// Cut list nesting failed.
    #[error("nesting error: {0}")]
    Nest(#[from] NestError),

    /// Catalog lookup failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// No profile with this id.
    #[error("no {0} in the model")]
    MissingProfile(ProfileId),

    /// No trim with this id.
    #[error("no {0} in the model")]
    MissingTrim(TrimId),
}

/// A profile feature for a catalog size placed along `path`.
///
/// The instance length follows the path edge.
pub fn profile_from_catalog(
    catalog: &Catalog,
    material: &str,
    family: &str,
    size: &str,
    label: impl Into<String>,
    path: PathEdge,
    bevel: BevelMode,
) -> Result<ProfileFeature, FrameError> {
    let resolved = catalog.resolve(material, family, size)?;
    Ok(ProfileFeature {
        label: label.into(),
        parent: String::new(),
        material: material.to_string(),
        family: family.to_string(),
        size: size.to_string(),
        weight_per_m: resolved.weight_per_m,
        cutout: false,
        path,
        offset_start: 0.0,
        offset_end: 0.0,
        instance: ProfileInstance::new(resolved.spec, path.length()).with_bevel(bevel),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameforge_ir::Vec3;

    const STEEL: &str = r#"{
        "Flat Sections": {
            "norm": "EN 10058",
            "fillet": false,
            "sizes": { "40x8": { "Height": 8, "Width": 40, "Weight": 2.51 } }
        }
    }"#;

    #[test]
    fn test_profile_from_catalog() {
        let mut catalog = Catalog::new();
        catalog.insert_json("Steel", STEEL).unwrap();
        let path = PathEdge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(300.0, 400.0, 0.0));
        let feature = profile_from_catalog(
            &catalog,
            "Steel",
            "Flat Sections",
            "40x8",
            "Strap",
            path,
            BevelMode::default(),
        )
        .unwrap();
        assert_eq!(feature.instance.length, 500.0);
        assert_eq!(feature.weight_per_m, 2.51);
        assert_eq!(feature.instance.spec.width, 40.0);
    }

    #[test]
    fn test_catalog_errors_convert() {
        let path = PathEdge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let err = profile_from_catalog(
            &Catalog::new(),
            "Steel",
            "Flat Sections",
            "40x8",
            "Strap",
            path,
            BevelMode::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Catalog(CatalogError::UnknownMaterial(_))));
    }
}
