//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.

pub mod sinusoidal;
pub mod transform;
pub mod transverse_mercator;

pub use sinusoidal::Sinusoidal;
pub use transform::CrsTransform;
pub use transverse_mercator::TransverseMercator;
