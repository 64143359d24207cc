//! CRS-to-CRS point transformation.
//!
//! All transformations compose through geographic coordinates: the source
//! projection is inverted to lon/lat, then the target projection applied.
//! The small datum shift between the MODIS authalic sphere and GRS80 is
//! ignored, as it is in the proj4 pipeline the tile grid is defined with.

use modis_common::CrsCode;

use crate::sinusoidal::Sinusoidal;
use crate::transverse_mercator::TransverseMercator;

/// A reusable transformer between two CRS codes.
#[derive(Debug, Clone)]
pub struct CrsTransform {
    pub from: CrsCode,
    pub to: CrsCode,
    sinusoidal: Sinusoidal,
    utm30: TransverseMercator,
}

impl CrsTransform {
    pub fn new(from: CrsCode, to: CrsCode) -> Self {
        Self {
            from,
            to,
            sinusoidal: Sinusoidal::modis(),
            utm30: TransverseMercator::utm_north(30),
        }
    }

    /// Transform a single point from the source CRS to the target CRS.
    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        if self.from == self.to {
            return (x, y);
        }
        let (lon, lat) = self.to_geographic(self.from, x, y);
        self.from_geographic(self.to, lon, lat)
    }

    /// Transform a point in the opposite direction (target CRS to source).
    pub fn transform_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        if self.from == self.to {
            return (x, y);
        }
        let (lon, lat) = self.to_geographic(self.to, x, y);
        self.from_geographic(self.from, lon, lat)
    }

    fn to_geographic(&self, crs: CrsCode, x: f64, y: f64) -> (f64, f64) {
        match crs {
            CrsCode::Epsg4326 => (x, y),
            CrsCode::Sinusoidal => self.sinusoidal.inverse(x, y),
            CrsCode::Epsg25830 => self.utm30.inverse(x, y),
        }
    }

    fn from_geographic(&self, crs: CrsCode, lon: f64, lat: f64) -> (f64, f64) {
        match crs {
            CrsCode::Epsg4326 => (lon, lat),
            CrsCode::Sinusoidal => self.sinusoidal.forward(lon, lat),
            CrsCode::Epsg25830 => self.utm30.forward(lon, lat),
        }
    }
}
