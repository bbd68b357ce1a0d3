#![warn(missing_docs)]

//! Profile catalog tables.
//!
//! A catalog holds one table per material. Each table maps a catalog family
//! name (`"IPE"`, `"Square Hollow"`, ...) to its norm, unit, fillet flag and
//! sizes:
//!
//! ```json
//! {
//!   "IPE": {
//!     "norm": "EN 10365",
//!     "unit": "mm",
//!     "fillet": true,
//!     "sizes": {
//!       "IPE100": { "Height": 100, "Width": 55, "Thickness": 4.1,
//!                   "Flange Thickness": 5.7, "Radius1": 7, "Weight": "8.1" }
//!     }
//!   }
//! }
//! ```
//!
//! Values may be numbers or numeric strings. [`Catalog::resolve`] turns an
//! entry into a [`ProfileSpec`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use frameforge_section::{LengthUnit, ProfileFamily, ProfileSpec, SectionError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from loading or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A table file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File or directory path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A table is not valid catalog JSON.
    #[error("invalid catalog table: {0}")]
    Json(#[from] serde_json::Error),

    /// No table for this material.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    /// The material table has no such family.
    #[error("material {material} has no family {family}")]
    UnknownFamily {
        /// Material name.
        material: String,
        /// Catalog family name.
        family: String,
    },

    /// The family has no such size.
    #[error("family {family} has no size {size}")]
    UnknownSize {
        /// Catalog family name.
        family: String,
        /// Size designation.
        size: String,
    },

    /// The family name maps to no profile shape.
    #[error(transparent)]
    Section(#[from] SectionError),
}

/// A catalog number, written either as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Number {
    Value(f64),
    Text(String),
}

impl Number {
    fn parse(field: &str, value: Option<Number>) -> Result<f64, String> {
        match value {
            None => Ok(0.0),
            Some(Number::Value(v)) => Ok(v),
            Some(Number::Text(s)) => s
                .trim()
                .replace(',', ".")
                .parse()
                .map_err(|_| format!("{field}: {s:?} is not a number")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSize {
    #[serde(rename = "Size")]
    _size: Option<serde_json::Value>,
    #[serde(rename = "Height")]
    height: Option<Number>,
    #[serde(rename = "Width")]
    width: Option<Number>,
    #[serde(rename = "Thickness")]
    thickness: Option<Number>,
    #[serde(rename = "Flange Thickness")]
    flange_thickness: Option<Number>,
    #[serde(rename = "Radius1")]
    radius1: Option<Number>,
    #[serde(rename = "Radius2")]
    radius2: Option<Number>,
    #[serde(rename = "Weight")]
    weight: Option<Number>,
}

/// Dimensions of one catalog size, in the family's unit. Missing values are 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSize")]
pub struct SizeEntry {
    /// Height or diameter.
    pub height: f64,
    /// Width (0 for square and round sections).
    pub width: f64,
    /// Wall, leg or web thickness.
    pub thickness: f64,
    /// Flange thickness.
    pub flange_thickness: f64,
    /// Large radius.
    pub radius1: f64,
    /// Small radius.
    pub radius2: f64,
    /// Weight per meter (kg/m).
    pub weight: f64,
}

impl TryFrom<RawSize> for SizeEntry {
    type Error = String;

    fn try_from(raw: RawSize) -> Result<Self, Self::Error> {
        Ok(Self {
            height: Number::parse("Height", raw.height)?,
            width: Number::parse("Width", raw.width)?,
            thickness: Number::parse("Thickness", raw.thickness)?,
            flange_thickness: Number::parse("Flange Thickness", raw.flange_thickness)?,
            radius1: Number::parse("Radius1", raw.radius1)?,
            radius2: Number::parse("Radius2", raw.radius2)?,
            weight: Number::parse("Weight", raw.weight)?,
        })
    }
}

fn default_unit() -> String {
    "mm".to_string()
}

/// One family of a material table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FamilyTable {
    /// Standard the sizes follow.
    #[serde(default)]
    pub norm: String,
    /// Unit of every dimension.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Whether sections of this family are drawn with fillets.
    #[serde(default)]
    pub fillet: bool,
    /// Sizes by designation.
    pub sizes: BTreeMap<String, SizeEntry>,
}

/// Families of one material, keyed by catalog family name.
pub type MaterialTable = BTreeMap<String, FamilyTable>;

/// A catalog size turned into section parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    /// Section parameters.
    pub spec: ProfileSpec,
    /// Weight per meter (kg/m).
    pub weight_per_m: f64,
    /// Standard the size follows.
    pub norm: String,
}

/// All material tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    materials: BTreeMap<String, MaterialTable>,
}

impl Catalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a material table from JSON and add it under `material`.
    pub fn insert_json(
        &mut self,
        material: impl Into<String>,
        json: &str,
    ) -> Result<(), CatalogError> {
        let table: MaterialTable = serde_json::from_str(json)?;
        self.materials.insert(material.into(), table);
        Ok(())
    }

    /// Load every `*.json` file of `dir`; the capitalized file stem names the
    /// material (`steel.json` is `Steel`).
    pub fn from_dir(dir: &Path) -> Result<Self, CatalogError> {
        let io = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| CatalogError::Io { path, source }
        };
        let mut catalog = Self::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io(dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let json = fs::read_to_string(&path).map_err(io(&path))?;
            catalog.insert_json(capitalize(stem), &json)?;
            debug!(path = %path.display(), "loaded catalog table");
        }
        Ok(catalog)
    }

    /// Material names.
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    /// Families of a material, sorted by name.
    pub fn families(
        &self,
        material: &str,
    ) -> Result<impl Iterator<Item = (&str, &FamilyTable)>, CatalogError> {
        let table = self
            .materials
            .get(material)
            .ok_or_else(|| CatalogError::UnknownMaterial(material.to_string()))?;
        Ok(table.iter().map(|(name, family)| (name.as_str(), family)))
    }

    /// Family table of a material.
    pub fn family(&self, material: &str, family: &str) -> Result<&FamilyTable, CatalogError> {
        self.materials
            .get(material)
            .ok_or_else(|| CatalogError::UnknownMaterial(material.to_string()))?
            .get(family)
            .ok_or_else(|| CatalogError::UnknownFamily {
                material: material.to_string(),
                family: family.to_string(),
            })
    }

    /// Section parameters and weight of a catalog size.
    ///
    /// The fillet flag comes from the family. Filleted angles and rectangular
    /// tubes listed without radii get `2t` and `1.5t`. Unknown units fall
    /// back to millimeters.
    pub fn resolve(
        &self,
        material: &str,
        family: &str,
        size: &str,
    ) -> Result<ResolvedProfile, CatalogError> {
        let table = self.family(material, family)?;
        let entry = table.sizes.get(size).ok_or_else(|| CatalogError::UnknownSize {
            family: family.to_string(),
            size: size.to_string(),
        })?;
        let kind: ProfileFamily = family.parse()?;
        let unit = table.unit.parse::<LengthUnit>().unwrap_or_else(|_| {
            warn!(unit = %table.unit, family, "unknown catalog unit, assuming mm");
            LengthUnit::Mm
        });

        let mut spec = ProfileSpec::new(kind, entry.width, entry.height)
            .with_thickness(entry.thickness)
            .with_flange_thickness(entry.flange_thickness)
            .with_unit(unit);
        if table.fillet {
            let (mut large, mut small) = (entry.radius1, entry.radius2);
            if kind.derives_radii_from_thickness() && large == 0.0 && small == 0.0 {
                large = 2.0 * entry.thickness;
                small = 1.5 * entry.thickness;
            }
            spec = spec.with_fillets(large, small);
        } else {
            spec.radius_large = entry.radius1;
            spec.radius_small = entry.radius2;
        }

        Ok(ResolvedProfile {
            spec,
            weight_per_m: entry.weight,
            norm: table.norm.clone(),
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
