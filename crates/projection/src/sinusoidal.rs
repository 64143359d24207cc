//! Sinusoidal (Sanson-Flamsteed) projection.
//!
//! The equal-area projection used for the MODIS land-product tile grid.
//! MODIS uses a spherical earth model with R = 6371007.181 m; the full grid
//! spans 36 horizontal x 18 vertical tiles of 1111950.52 m each.
//!
//! The projection parameters are those of the standard MODIS definition
//! (`+proj=sinu +lon_0=0 +x_0=0 +y_0=0 +a=6371007.181 +b=6371007.181`).

use std::f64::consts::PI;

/// MODIS authalic sphere radius in meters.
pub const MODIS_SPHERE_RADIUS: f64 = 6371007.181;

/// Sinusoidal projection on a sphere.
#[derive(Debug, Clone)]
pub struct Sinusoidal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Sphere radius (meters)
    pub radius: f64,
}

impl Default for Sinusoidal {
    fn default() -> Self {
        Self::modis()
    }
}

impl Sinusoidal {
    /// The MODIS sinusoidal grid (central meridian 0, authalic sphere).
    pub fn modis() -> Self {
        Self {
            lon0: 0.0,
            radius: MODIS_SPHERE_RADIUS,
        }
    }

    /// Convert geographic coordinates (lon/lat in degrees) to projected
    /// meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon_deg * to_rad - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let x = self.radius * dlon * lat.cos();
        let y = self.radius * lat;

        (x, y)
    }

    /// Convert projected meters back to geographic coordinates (lon/lat in
    /// degrees).
    ///
    /// At the poles the meridians converge and the longitude is undefined;
    /// the central meridian is returned there.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let lat = y / self.radius;
        let cos_lat = lat.cos();

        let lon = if cos_lat.abs() < 1e-12 {
            self.lon0
        } else {
            self.lon0 + x / (self.radius * cos_lat)
        };

        (lon * to_deg, lat * to_deg)
    }

    /// Check whether a projected point maps back inside the valid lon/lat
    /// range (the sinusoidal plane is not a full rectangle).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (lon, lat) = self.inverse(x, y);
        (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
    }
}
