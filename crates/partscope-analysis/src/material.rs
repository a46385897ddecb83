//! Material catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// A stock material with its density and price.
///
/// Parses from either its key (`stainless-steel`) or display name
/// (`Stainless Steel`), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Material {
    /// Mild steel.
    #[default]
    Steel,
    /// Aluminum alloy.
    Aluminum,
    /// Stainless steel.
    StainlessSteel,
    /// Titanium.
    Titanium,
    /// Brass.
    Brass,
    /// Copper.
    Copper,
    /// ABS plastic.
    Abs,
    /// Nylon.
    Nylon,
}

impl Material {
    /// Every material, in catalog order.
    pub const ALL: [Material; 8] = [
        Material::Steel,
        Material::Aluminum,
        Material::StainlessSteel,
        Material::Titanium,
        Material::Brass,
        Material::Copper,
        Material::Abs,
        Material::Nylon,
    ];

    /// Short key used in configs and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Material::Steel => "steel",
            Material::Aluminum => "aluminum",
            Material::StainlessSteel => "stainless-steel",
            Material::Titanium => "titanium",
            Material::Brass => "brass",
            Material::Copper => "copper",
            Material::Abs => "abs",
            Material::Nylon => "nylon",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Material::Steel => "Steel",
            Material::Aluminum => "Aluminum",
            Material::StainlessSteel => "Stainless Steel",
            Material::Titanium => "Titanium",
            Material::Brass => "Brass",
            Material::Copper => "Copper",
            Material::Abs => "Plastic (ABS)",
            Material::Nylon => "Nylon",
        }
    }

    /// Density in g/cm³.
    pub fn density(self) -> f64 {
        match self {
            Material::Steel => 7.85,
            Material::Aluminum => 2.70,
            Material::StainlessSteel => 8.00,
            Material::Titanium => 4.50,
            Material::Brass => 8.50,
            Material::Copper => 8.96,
            Material::Abs => 1.05,
            Material::Nylon => 1.15,
        }
    }

    /// Price per kilogram, in rupees.
    pub fn cost_per_kg(self) -> f64 {
        match self {
            Material::Steel => 210.0,
            Material::Aluminum => 335.0,
            Material::StainlessSteel => 420.0,
            Material::Titanium => 2900.0,
            Material::Brass => 585.0,
            Material::Copper => 750.0,
            Material::Abs => 290.0,
            Material::Nylon => 375.0,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Material::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(wanted) || m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalysisError::UnknownMaterial(s.to_string()))
    }
}

impl TryFrom<String> for Material {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Material> for String {
    fn from(material: Material) -> Self {
        material.key().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_values() {
        assert_eq!(Material::Steel.density(), 7.85);
        assert_eq!(Material::Steel.cost_per_kg(), 210.0);
        assert_eq!(Material::Titanium.cost_per_kg(), 2900.0);
        assert_eq!(Material::Copper.density(), 8.96);
        assert_eq!(Material::Abs.name(), "Plastic (ABS)");
    }

    #[test]
    fn test_parse_key_or_name() {
        assert_eq!("steel".parse::<Material>(), Ok(Material::Steel));
        assert_eq!("Stainless Steel".parse::<Material>(), Ok(Material::StainlessSteel));
        assert_eq!("STAINLESS-STEEL".parse::<Material>(), Ok(Material::StainlessSteel));
        assert_eq!("plastic (abs)".parse::<Material>(), Ok(Material::Abs));
        assert_eq!(
            "unobtainium".parse::<Material>(),
            Err(AnalysisError::UnknownMaterial("unobtainium".into()))
        );
    }

    #[test]
    fn test_keys_round_trip() {
        for m in Material::ALL {
            assert_eq!(m.key().parse::<Material>(), Ok(m));
        }
    }

    #[test]
    fn test_serde_uses_key() {
        let json = serde_json::to_string(&Material::Nylon).unwrap();
        assert_eq!(json, "\"nylon\"");
        let back: Material = serde_json::from_str("\"Brass\"").unwrap();
        assert_eq!(back, Material::Brass);
        assert!(serde_json::from_str::<Material>("\"wood\"").is_err());
    }
}
