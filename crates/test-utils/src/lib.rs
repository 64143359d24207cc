//! Shared test utilities for the modis-pipeline workspace.

pub mod fixtures;
pub mod generators;

pub use fixtures::{basin_mask_ascii, struct_metadata_text};
pub use generators::{
    composite_dates, create_constant_grid, create_gradient_grid, create_grid_with_nans,
    create_test_grid,
};
