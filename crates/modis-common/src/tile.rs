//! MODIS tile identifiers.
//!
//! MODIS sinusoidal products are distributed on a fixed 36x18 tile grid,
//! named `h00v00`..`h35v17` (horizontal index increases eastward, vertical
//! index increases southward).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A MODIS sinusoidal grid tile (`h__v__`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileId {
    /// Horizontal tile index (0..=35)
    pub h: u8,
    /// Vertical tile index (0..=17)
    pub v: u8,
}

impl TileId {
    pub fn new(h: u8, v: u8) -> Result<Self, TileParseError> {
        if h > 35 || v > 17 {
            return Err(TileParseError::OutOfRange { h, v });
        }
        Ok(Self { h, v })
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{:02}v{:02}", self.h, self.v)
    }
}

impl FromStr for TileId {
    type Err = TileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.starts_with('h') || &s[3..4] != "v" {
            return Err(TileParseError::InvalidFormat(s.to_string()));
        }
        let h: u8 = s[1..3]
            .parse()
            .map_err(|_| TileParseError::InvalidFormat(s.to_string()))?;
        let v: u8 = s[4..6]
            .parse()
            .map_err(|_| TileParseError::InvalidFormat(s.to_string()))?;
        Self::new(h, v)
    }
}

impl TryFrom<String> for TileId {
    type Error = TileParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TileId> for String {
    fn from(tile: TileId) -> String {
        tile.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TileParseError {
    #[error("Invalid tile id: {0}. Expected 'h__v__'")]
    InvalidFormat(String),

    #[error("Tile indices out of range: h{h} v{v} (max h35 v17)")]
    OutOfRange { h: u8, v: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile() {
        let tile: TileId = "h17v04".parse().unwrap();
        assert_eq!(tile.h, 17);
        assert_eq!(tile.v, 4);
        assert_eq!(tile.to_string(), "h17v04");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("h17".parse::<TileId>().is_err());
        assert!("x17v04".parse::<TileId>().is_err());
        assert!("h40v04".parse::<TileId>().is_err());
    }
}
