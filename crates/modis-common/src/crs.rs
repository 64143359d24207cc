//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known CRS codes supported by the pipeline.
///
/// MODIS products are delivered on the sinusoidal grid; study-area outputs
/// are reprojected to a UTM zone or kept geographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// MODIS sinusoidal equal-area grid (sphere, R = 6371007.181 m)
    Sinusoidal,
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// ETRS89 / UTM zone 30N (meters)
    Epsg25830,
}

impl CrsCode {
    /// Parse a CRS string.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326" / "epsg:25830"
    /// - "sinusoidal" (the MODIS native grid has no EPSG code)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "SINUSOIDAL" | "SINU" | "SR-ORG:6974" => Ok(CrsCode::Sinusoidal),
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:25830" => Ok(CrsCode::Epsg25830),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// The EPSG code, if the CRS has one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            CrsCode::Sinusoidal => None,
            CrsCode::Epsg4326 => Some(4326),
            CrsCode::Epsg25830 => Some(25830),
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Sinusoidal => "sinusoidal",
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg25830 => "EPSG:25830",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
