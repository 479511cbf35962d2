//! Coordinate reference systems.
//!
//! A [`Crs`] is the single normalized "target CRS" value used throughout the
//! crate. It can be built from a PROJ4 string, an EPSG code, WKT, or a native
//! [`Projection`](crate::projection::Projection) object, and is validated
//! against PROJ at construction: a `Crs` that exists can always be used for
//! transformation.

pub mod proj_string;
pub mod transform;

use std::fmt;
use std::str::FromStr;

use proj::Proj;

use crate::error::{CartoError, Result};

pub use transform::Transformer;

/// Geographic CRS every definition is checked against.
const GEOGRAPHIC: &str = "EPSG:4326";

/// A validated coordinate reference system.
///
/// Holds the definition PROJ was given. Equality compares definitions, so
/// `EPSG:3857` and its spelled-out PROJ string are distinct values that
/// transform to the same coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crs {
    definition: String,
    epsg: Option<u32>,
}

impl Crs {
    fn from_definition(definition: String, epsg: Option<u32>) -> Result<Self> {
        Proj::new_known_crs(&definition, GEOGRAPHIC, None)
            .map_err(|e| CartoError::invalid_crs(definition.as_str(), e.to_string()))?;
        Ok(Crs { definition, epsg })
    }

    /// WGS84 geographic coordinates (EPSG:4326), longitude first.
    pub fn wgs84() -> Self {
        Crs {
            definition: GEOGRAPHIC.to_string(),
            epsg: Some(4326),
        }
    }

    /// Build a CRS from an EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self> {
        if code == 0 {
            return Err(CartoError::invalid_crs("EPSG:0", "EPSG codes start at 1"));
        }
        Self::from_definition(format!("EPSG:{}", code), Some(code))
    }

    /// Build a CRS from a PROJ4 string.
    pub fn from_proj_str(proj: &str) -> Result<Self> {
        Self::from_definition(proj_string::normalize(proj)?, None)
    }

    /// Build a CRS from WKT (OGC or ESRI flavour, as found in `.prj` files).
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let trimmed = wkt.trim();
        if trimmed.is_empty() {
            return Err(CartoError::invalid_crs(wkt, "empty WKT"));
        }
        Self::from_definition(trimmed.to_string(), None)
    }

    /// Build a CRS from any accepted textual form: `EPSG:3857`, `epsg:3857`,
    /// `3857`, `urn:ogc:def:crs:EPSG::3857`, `OGC:CRS84`, `+init=epsg:3857`,
    /// a PROJ4 string, or anything else PROJ understands (WKT, `ESRI:102003`).
    pub fn from_user_input(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CartoError::invalid_crs(input, "empty CRS"));
        }
        let lower = trimmed.to_ascii_lowercase();

        if lower == "ogc:crs84" || lower.ends_with(":crs:ogc:1.3:crs84") {
            return Ok(Self::wgs84());
        }

        let code = lower
            .strip_prefix("epsg:")
            .or_else(|| lower.strip_prefix("+init=epsg:"))
            .or_else(|| lower.strip_prefix("urn:ogc:def:crs:epsg::"))
            .or_else(|| lower.strip_prefix("urn:ogc:def:crs:epsg:").map(|rest| {
                // urn:ogc:def:crs:EPSG:<version>:<code>
                rest.rsplit(':').next().unwrap_or(rest)
            }))
            .or_else(|| lower.chars().all(|c| c.is_ascii_digit()).then_some(lower.as_str()));

        match code {
            Some(code) => {
                let code = code.trim().parse::<u32>().map_err(|_| {
                    CartoError::invalid_crs(input, "EPSG code must be a positive integer")
                })?;
                Self::from_epsg(code)
            }
            None if trimmed.starts_with('+') => Self::from_proj_str(trimmed),
            None => Self::from_definition(trimmed.to_string(), None),
        }
    }

    /// The definition handed to PROJ.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// EPSG code, when the CRS was built from one.
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Short label: the EPSG authority when known, else the definition.
    pub fn label(&self) -> String {
        match self.epsg {
            Some(code) => format!("EPSG:{}", code),
            None => self.definition.clone(),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Crs {
    type Err = CartoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Crs::from_user_input(s)
    }
}

impl TryFrom<u32> for Crs {
    type Error = CartoError;

    fn try_from(code: u32) -> std::result::Result<Self, Self::Error> {
        Crs::from_epsg(code)
    }
}
