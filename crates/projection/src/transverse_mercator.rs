//! Transverse Mercator projection (ellipsoidal).
//!
//! Used for the UTM zones study areas are reprojected to (EPSG:25830 is
//! ETRS89 / UTM zone 30N). The ellipsoidal formulation follows the standard
//! series expansion in terms of the meridional arc, accurate to well under a
//! millimeter within a UTM zone.
//!
//! Projection parameters:
//! - Central meridian (lon0), derived from the UTM zone
//! - Scale factor at the central meridian (k0 = 0.9996 for UTM)
//! - False easting / northing (500 km / 0 for northern-hemisphere UTM)
//! - Ellipsoid semi-major axis and flattening (GRS80 for ETRS89)

use std::f64::consts::PI;

/// GRS80 ellipsoid semi-major axis (meters).
pub const GRS80_A: f64 = 6378137.0;

/// GRS80 inverse flattening.
pub const GRS80_INV_F: f64 = 298.257222101;

/// Ellipsoidal transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Semi-major axis (meters)
    pub a: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
    /// e1 constant for the inverse meridional arc series
    e1: f64,
}

impl TransverseMercator {
    /// Create a transverse Mercator projection on the GRS80 ellipsoid.
    pub fn new(lon0_deg: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let f = 1.0 / GRS80_INV_F;
        let e2 = f * (2.0 - f);
        let ep2 = e2 / (1.0 - e2);
        let sqrt_1me2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);

        Self {
            lon0: lon0_deg * PI / 180.0,
            k0,
            false_easting,
            false_northing,
            a: GRS80_A,
            e2,
            ep2,
            e1,
        }
    }

    /// A northern-hemisphere UTM zone (k0 = 0.9996, 500 km false easting).
    ///
    /// Zone 30 covers 6°W..0° and is the zone of EPSG:25830.
    pub fn utm_north(zone: u8) -> Self {
        let lon0 = zone as f64 * 6.0 - 183.0;
        Self::new(lon0, 0.9996, 500_000.0, 0.0)
    }

    /// Meridional arc length from the equator to the given latitude.
    fn meridional_arc(&self, lat: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }

    /// Convert geographic coordinates (lon/lat in degrees) to projected
    /// easting/northing in meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let tan_lat = lat.tan();

        let n = self.a / (1.0 - self.e2 * sin_lat * sin_lat).sqrt();
        let t = tan_lat * tan_lat;
        let c = self.ep2 * cos_lat * cos_lat;
        let a_ = dlon * cos_lat;

        let a2 = a_ * a_;
        let a3 = a2 * a_;
        let a4 = a3 * a_;
        let a5 = a4 * a_;
        let a6 = a5 * a_;

        let m = self.meridional_arc(lat);

        let x = self.k0
            * n
            * (a_
                + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0)
            + self.false_easting;

        let y = self.k0
            * (m + n
                * tan_lat
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6 / 720.0))
            + self.false_northing;

        (x, y)
    }

    /// Convert projected easting/northing back to geographic coordinates
    /// (lon/lat in degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;
        let e1 = self.e1;
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let m = (y - self.false_northing) / self.k0;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        // Footpoint latitude
        let lat1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin1 = lat1.sin();
        let cos1 = lat1.cos();
        let tan1 = lat1.tan();

        let c1 = self.ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let denom = (1.0 - e2 * sin1 * sin1).sqrt();
        let n1 = self.a / denom;
        let r1 = self.a * (1.0 - e2) / (denom * denom * denom);
        let d = (x - self.false_easting) / (n1 * self.k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let lat = lat1
            - (n1 * tan1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos1;

        (lon * to_deg, lat * to_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm30_central_meridian() {
        let proj = TransverseMercator::utm_north(30);
        assert!((proj.lon0 - (-3.0_f64).to_radians()).abs() < 1e-12);

        // A point on the central meridian projects to the false easting
        let (x, _) = proj.forward(-3.0, 40.0);
        assert!((x - 500_000.0).abs() < 1e-6, "x should be 500km, got {}", x);
    }

    #[test]
    fn test_utm30_known_point() {
        // Madrid (40.4168N, 3.7038W) in EPSG:25830 is approximately
        // (440'000 E, 4'474'500 N)
        let proj = TransverseMercator::utm_north(30);
        let (x, y) = proj.forward(-3.7038, 40.4168);

        assert!((x - 440_328.0).abs() < 200.0, "easting off: {}", x);
        assert!((y - 4_474_500.0).abs() < 300.0, "northing off: {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = TransverseMercator::utm_north(30);

        let (x, y) = proj.forward(-2.25, 43.1);
        let (lon, lat) = proj.inverse(x, y);

        assert!((lon - (-2.25)).abs() < 1e-8, "lon roundtrip: {}", lon);
        assert!((lat - 43.1).abs() < 1e-8, "lat roundtrip: {}", lat);
    }

    #[test]
    fn test_scale_near_central_meridian() {
        let proj = TransverseMercator::utm_north(30);

        // 1 degree of latitude along the central meridian should be close
        // to k0 * meridional degree (~110.6 km)
        let (_, y1) = proj.forward(-3.0, 40.0);
        let (_, y2) = proj.forward(-3.0, 41.0);
        let dy = y2 - y1;
        assert!((110_000.0..112_000.0).contains(&dy), "dy = {}", dy);
    }
}
