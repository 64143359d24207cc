//! Per-tile variable reading.

use std::path::Path;
use std::sync::Once;

use tracing::debug;

use crate::attrs::{parse_struct_metadata, TileAttributes};
use crate::error::{HdfError, HdfResult};

/// A tile's grid attributes together with one variable's values.
#[derive(Debug, Clone)]
pub struct TileData {
    pub attrs: TileAttributes,
    /// Row-major values, fill cells as NaN
    pub data: Vec<f32>,
}

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics to stderr even when errors
/// are handled gracefully (e.g. probing for optional attributes). This
/// disables that output via H5Eset_auto2; safe to call repeatedly.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are the
        // documented way to disable automatic error reporting.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Read a tile's grid attributes without loading any data.
pub fn read_tile_attributes(path: &Path) -> HdfResult<TileAttributes> {
    silence_hdf5_errors();

    let file = netcdf::open(path).map_err(|e| HdfError::Open(format!("{}: {}", path.display(), e)))?;
    struct_metadata_attrs(&file)
}

/// Read one variable from a tile file.
///
/// Fill values become NaN; no scale factor is applied here (the product
/// scale factor is applied once over the stacked series).
pub fn read_tile(path: &Path, variable: &str) -> HdfResult<TileData> {
    silence_hdf5_errors();

    let file = netcdf::open(path).map_err(|e| HdfError::Open(format!("{}: {}", path.display(), e)))?;
    let attrs = struct_metadata_attrs(&file)?;

    let var = file
        .variable(variable)
        .ok_or_else(|| HdfError::MissingVariable(variable.to_string()))?;

    // Read through f64 so integer-packed products (i16, u8) and float
    // products go through the same path.
    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| HdfError::Read(format!("{}: {}", variable, e)))?;

    let fill = fill_value(&var);
    let data: Vec<f32> = raw
        .iter()
        .map(|&v| match fill {
            Some(f) if (v - f).abs() < 1e-9 => f32::NAN,
            _ => v as f32,
        })
        .collect();

    debug!(
        path = %path.display(),
        variable = variable,
        ncols = attrs.ncols,
        nrows = attrs.nrows,
        fill = ?fill,
        "Read tile variable"
    );

    if data.len() != attrs.ncols * attrs.nrows {
        return Err(HdfError::Read(format!(
            "{}: expected {} values, found {}",
            variable,
            attrs.ncols * attrs.nrows,
            data.len()
        )));
    }

    Ok(TileData { attrs, data })
}

/// List the data variable names in a tile file (coordinate and metadata
/// variables excluded).
pub fn list_variables(path: &Path) -> HdfResult<Vec<String>> {
    silence_hdf5_errors();

    let file = netcdf::open(path).map_err(|e| HdfError::Open(format!("{}: {}", path.display(), e)))?;
    Ok(file.variables().map(|v| v.name().to_string()).collect())
}

/// Locate and parse the `StructMetadata.0` global attribute.
fn struct_metadata_attrs(file: &netcdf::File) -> HdfResult<TileAttributes> {
    let attr = file
        .attributes()
        .find(|a| a.name() == "StructMetadata.0")
        .ok_or_else(|| HdfError::MissingAttribute("StructMetadata.0".to_string()))?;

    let value = attr
        .value()
        .map_err(|e| HdfError::InvalidStructMetadata(e.to_string()))?;

    match value {
        netcdf::AttributeValue::Str(text) => parse_struct_metadata(&text),
        _ => Err(HdfError::InvalidStructMetadata(
            "StructMetadata.0 is not a string attribute".to_string(),
        )),
    }
}

/// Read a variable's `_FillValue` attribute, if any.
fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    if !var.attributes().any(|a| a.name() == "_FillValue") {
        return None;
    }
    let value = var.attribute_value("_FillValue")?.ok()?;
    f64::try_from(value).ok()
}
