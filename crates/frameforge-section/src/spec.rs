//! Profile families, units and the resolved profile specification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SectionError;

/// Structural profile family.
///
/// Catalog family names map onto these variants through [`FromStr`]; several
/// catalog names (IPE, HEA, HEB, HEM) share one cross-section shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFamily {
    /// L-section with equal legs.
    EqualAngle,
    /// L-section with unequal legs.
    UnequalAngle,
    /// Solid rectangle.
    FlatBar,
    /// Solid square.
    SquareBar,
    /// Square tube.
    SquareHollow,
    /// Rectangular tube.
    RectangularHollow,
    /// Solid circle.
    RoundBar,
    /// Round tube.
    Pipe,
    /// Channel with parallel flanges (UPE).
    Channel,
    /// Channel with sloped inner flange faces (UPN).
    TaperedChannel,
    /// I-section with parallel flanges (IPE, HEA, HEB, HEM).
    IBeam,
    /// I-section with sloped inner flange faces (IPN).
    TaperedIBeam,
}

impl ProfileFamily {
    /// Every family, in catalog order.
    pub const ALL: [ProfileFamily; 12] = [
        ProfileFamily::EqualAngle,
        ProfileFamily::UnequalAngle,
        ProfileFamily::FlatBar,
        ProfileFamily::SquareBar,
        ProfileFamily::SquareHollow,
        ProfileFamily::RectangularHollow,
        ProfileFamily::RoundBar,
        ProfileFamily::Pipe,
        ProfileFamily::Channel,
        ProfileFamily::TaperedChannel,
        ProfileFamily::IBeam,
        ProfileFamily::TaperedIBeam,
    ];

    /// Default inner flange slope in degrees.
    pub fn default_flange_angle(self) -> f64 {
        match self {
            ProfileFamily::TaperedChannel => 4.57,
            ProfileFamily::TaperedIBeam => 8.0,
            _ => 0.0,
        }
    }

    /// True for families whose section is a circle or annulus.
    pub fn is_round(self) -> bool {
        matches!(self, ProfileFamily::RoundBar | ProfileFamily::Pipe)
    }

    /// True for families with an inner wire.
    pub fn is_hollow(self) -> bool {
        matches!(
            self,
            ProfileFamily::SquareHollow | ProfileFamily::RectangularHollow | ProfileFamily::Pipe
        )
    }

    /// True for families that need a wall, leg or web thickness.
    pub fn needs_thickness(self) -> bool {
        !matches!(
            self,
            ProfileFamily::FlatBar | ProfileFamily::SquareBar | ProfileFamily::RoundBar
        )
    }

    /// True for channels and I-beams, which also need a flange thickness.
    pub fn has_flanges(self) -> bool {
        matches!(
            self,
            ProfileFamily::Channel
                | ProfileFamily::TaperedChannel
                | ProfileFamily::IBeam
                | ProfileFamily::TaperedIBeam
        )
    }

    /// Families whose radii are auto-filled from the wall thickness when a
    /// filleted catalog entry omits them.
    pub fn derives_radii_from_thickness(self) -> bool {
        matches!(
            self,
            ProfileFamily::EqualAngle
                | ProfileFamily::UnequalAngle
                | ProfileFamily::SquareHollow
                | ProfileFamily::RectangularHollow
        )
    }
}

impl fmt::Display for ProfileFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileFamily::EqualAngle => "Equal Leg Angles",
            ProfileFamily::UnequalAngle => "Unequal Leg Angles",
            ProfileFamily::FlatBar => "Flat Sections",
            ProfileFamily::SquareBar => "Square",
            ProfileFamily::SquareHollow => "Square Hollow",
            ProfileFamily::RectangularHollow => "Rectangular Hollow",
            ProfileFamily::RoundBar => "Round Bar",
            ProfileFamily::Pipe => "Pipe",
            ProfileFamily::Channel => "UPE",
            ProfileFamily::TaperedChannel => "UPN",
            ProfileFamily::IBeam => "IPE",
            ProfileFamily::TaperedIBeam => "IPN",
        };
        f.write_str(name)
    }
}

impl FromStr for ProfileFamily {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let family = match s.trim() {
            "Equal Leg Angles" => ProfileFamily::EqualAngle,
            "Unequal Leg Angles" => ProfileFamily::UnequalAngle,
            "Flat Sections" => ProfileFamily::FlatBar,
            "Square" => ProfileFamily::SquareBar,
            "Square Hollow" => ProfileFamily::SquareHollow,
            "Rectangular Hollow" => ProfileFamily::RectangularHollow,
            "Round Bar" => ProfileFamily::RoundBar,
            "Pipe" => ProfileFamily::Pipe,
            "UPE" => ProfileFamily::Channel,
            "UPN" => ProfileFamily::TaperedChannel,
            "IPE" | "HEA" | "HEB" | "HEM" => ProfileFamily::IBeam,
            "IPN" => ProfileFamily::TaperedIBeam,
            other => return Err(SectionError::UnknownFamily(other.to_string())),
        };
        Ok(family)
    }
}

/// Length unit of catalog dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimeters.
    #[default]
    Mm,
    /// Centimeters.
    Cm,
    /// Inches.
    In,
}

impl LengthUnit {
    /// Millimeters per unit.
    pub fn to_mm(self) -> f64 {
        match self {
            LengthUnit::Mm => 1.0,
            LengthUnit::Cm => 10.0,
            LengthUnit::In => 25.4,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mm" | "Metric Unit" | "Metric Units" => Ok(LengthUnit::Mm),
            "cm" => Ok(LengthUnit::Cm),
            "in" | "inch" | "Imperial" => Ok(LengthUnit::In),
            other => Err(SectionError::UnknownUnit(other.to_string())),
        }
    }
}

/// Fully resolved cross-section parameters.
///
/// Populated once from catalog data and never re-inferred afterwards. The
/// `version` field tags the layout so stored documents can be migrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Layout version, [`ProfileSpec::VERSION`] for new specs.
    pub version: u32,
    /// Profile family.
    pub family: ProfileFamily,
    /// Nominal width (flange width, leg along x). 0 means "same as height".
    pub width: f64,
    /// Nominal height (web depth, leg along y, or diameter).
    pub height: f64,
    /// Wall, leg or web thickness.
    #[serde(default)]
    pub thickness: f64,
    /// Flange thickness (channels and I-beams).
    #[serde(default)]
    pub flange_thickness: f64,
    /// Large radius: roots and outer corners.
    #[serde(default)]
    pub radius_large: f64,
    /// Small radius: toes and inner corners.
    #[serde(default)]
    pub radius_small: f64,
    /// Whether corners are rounded.
    #[serde(default)]
    pub fillet: bool,
    /// Inner flange slope in degrees (tapered families only).
    #[serde(default)]
    pub flange_angle: f64,
    /// Unit of every length above.
    #[serde(default)]
    pub unit: LengthUnit,
}

impl ProfileSpec {
    /// Current layout version.
    pub const VERSION: u32 = 1;

    /// A sharp-cornered spec with the family's default flange angle.
    pub fn new(family: ProfileFamily, width: f64, height: f64) -> Self {
        Self {
            version: Self::VERSION,
            family,
            width,
            height,
            thickness: 0.0,
            flange_thickness: 0.0,
            radius_large: 0.0,
            radius_small: 0.0,
            fillet: false,
            flange_angle: family.default_flange_angle(),
            unit: LengthUnit::Mm,
        }
    }

    /// Set the wall, leg or web thickness.
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the flange thickness.
    pub fn with_flange_thickness(mut self, flange_thickness: f64) -> Self {
        self.flange_thickness = flange_thickness;
        self
    }

    /// Enable fillets with the given large and small radii.
    pub fn with_fillets(mut self, radius_large: f64, radius_small: f64) -> Self {
        self.fillet = true;
        self.radius_large = radius_large;
        self.radius_small = radius_small;
        self
    }

    /// Override the flange slope.
    pub fn with_flange_angle(mut self, degrees: f64) -> Self {
        self.flange_angle = degrees;
        self
    }

    /// Set the unit of the dimensions.
    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Width, falling back to the height when unspecified.
    pub fn effective_width(&self) -> f64 {
        if self.width == 0.0 {
            self.height
        } else {
            self.width
        }
    }

    /// Larger of the effective width and the height.
    pub fn max_extent(&self) -> f64 {
        self.effective_width().max(self.height)
    }

    /// Copy with every length converted to millimeters.
    pub fn to_millimeters(&self) -> Self {
        let k = self.unit.to_mm();
        Self {
            width: self.width * k,
            height: self.height * k,
            thickness: self.thickness * k,
            flange_thickness: self.flange_thickness * k,
            radius_large: self.radius_large * k,
            radius_small: self.radius_small * k,
            unit: LengthUnit::Mm,
            ..self.clone()
        }
    }
}
