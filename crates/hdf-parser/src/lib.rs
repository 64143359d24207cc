//! MODIS tile file reading.
//!
//! MODIS land products ship as HDF-EOS tiles; libnetcdf opens them directly
//! (the same route the hdf4-enabled netCDF4 bindings take), so this crate
//! reads grids and attributes through the `netcdf` library rather than a
//! separate HDF4 stack.

pub mod attrs;
pub mod error;
pub mod tile;

pub use attrs::{parse_struct_metadata, TileAttributes};
pub use error::{HdfError, HdfResult};
pub use tile::{list_variables, read_tile, read_tile_attributes, silence_hdf5_errors, TileData};
