//! NetCDF export and import of aggregated series.
//!
//! One file carries either a single raster (dims `time`/`y`/`x` at the
//! root) or one group per satellite (`Terra`, `Aqua`) with the same layout
//! per group. Time is encoded as days since 1970-01-01; the CRS travels in
//! a `coordinate_system` global attribute.

use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info};

use modis_common::CrsCode;

use crate::error::{RasterError, Result};
use crate::types::Raster3;

/// Epoch for the `time` variable.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

/// LP DAAC data pool the products come from.
const SOURCE_URL: &str = "https://e4ftl01.cr.usgs.gov/";

/// Write a raster series to a netCDF4 file.
pub fn write_series(path: &Path, raster: &Raster3, description: Option<&str>) -> Result<()> {
    let mut file = netcdf::create(path)?;

    write_global_attributes(&mut file, raster.crs, description)?;

    let mut root = file
        .root_mut()
        .ok_or_else(|| RasterError::Netcdf("file has no root group".to_string()))?;
    write_raster_into(&mut root, raster)?;

    info!(path = %path.display(), layers = raster.nt(), "Wrote netCDF series");
    Ok(())
}

/// Write the Terra and Aqua series of a product into one file, one group
/// per satellite.
pub fn write_dual_series(
    path: &Path,
    terra: &Raster3,
    aqua: &Raster3,
    description: Option<&str>,
) -> Result<()> {
    if terra.crs != aqua.crs {
        return Err(RasterError::CrsMismatch {
            expected: terra.crs.to_string(),
            found: aqua.crs.to_string(),
        });
    }

    let mut file = netcdf::create(path)?;
    write_global_attributes(&mut file, terra.crs, description)?;

    for (name, raster) in [("Terra", terra), ("Aqua", aqua)] {
        let mut group = file.add_group(name)?;
        write_raster_into(&mut group, raster)?;
        debug!(group = name, layers = raster.nt(), "Wrote satellite group");
    }

    info!(path = %path.display(), "Wrote dual-satellite netCDF series");
    Ok(())
}

/// Read a raster series from a file written by [`write_series`].
pub fn read_series(path: &Path) -> Result<Raster3> {
    let file = netcdf::open(path)?;
    let crs = read_crs(&file)?;

    let root = file
        .root()
        .ok_or_else(|| RasterError::Netcdf("file has no root group".to_string()))?;
    read_raster_from(&root, crs)
}

/// Read one satellite group from a file written by [`write_dual_series`].
pub fn read_group_series(path: &Path, group: &str) -> Result<Raster3> {
    let file = netcdf::open(path)?;
    let crs = read_crs(&file)?;

    let group = file
        .group(group)?
        .ok_or_else(|| RasterError::Netcdf(format!("missing group: {}", group)))?;
    read_raster_from(&group, crs)
}

fn write_global_attributes(
    file: &mut netcdf::FileMut,
    crs: CrsCode,
    description: Option<&str>,
) -> Result<()> {
    if let Some(desc) = description {
        file.add_attribute("description", desc)?;
    }
    file.add_attribute(
        "history",
        format!("Created {}", Utc::now().format("%Y-%m-%d")).as_str(),
    )?;
    file.add_attribute("source", SOURCE_URL)?;
    file.add_attribute("coordinate_system", crs.to_string().as_str())?;
    Ok(())
}

fn write_raster_into(group: &mut netcdf::GroupMut, raster: &Raster3) -> Result<()> {
    group.add_dimension("time", raster.nt())?;
    group.add_dimension("y", raster.ny())?;
    group.add_dimension("x", raster.nx())?;

    let var_name = raster.variable.clone().unwrap_or_else(|| "data".to_string());

    let mut var = group.add_variable::<f32>(&var_name, &["time", "y", "x"])?;
    if let Some(units) = &raster.units {
        var.put_attribute("units", units.as_str())?;
    }
    var.put_values(&raster.data, ..)?;

    let days: Vec<f64> = raster
        .times
        .iter()
        .map(|&d| (d - epoch()).num_days() as f64)
        .collect();
    let mut time_var = group.add_variable::<f64>("time", &["time"])?;
    time_var.put_attribute("units", "days since 1970-01-01")?;
    time_var.put_attribute("calendar", "gregorian")?;
    time_var.put_values(&days, ..)?;

    let coord_units = if raster.crs.is_geographic() { "degrees" } else { "m" };

    let mut x_var = group.add_variable::<f64>("x", &["x"])?;
    x_var.put_attribute("units", coord_units)?;
    x_var.put_values(&raster.x, ..)?;

    let mut y_var = group.add_variable::<f64>("y", &["y"])?;
    y_var.put_attribute("units", coord_units)?;
    y_var.put_values(&raster.y, ..)?;

    Ok(())
}

fn read_raster_from(group: &netcdf::Group, crs: CrsCode) -> Result<Raster3> {
    // The data variable is the one that isn't a coordinate
    let data_var = group
        .variables()
        .find(|v| !matches!(v.name().as_str(), "time" | "x" | "y"))
        .ok_or_else(|| RasterError::Netcdf("no data variable found".to_string()))?;
    let var_name = data_var.name().to_string();

    let data: Vec<f32> = data_var
        .get_values(..)
        .map_err(|e| RasterError::Netcdf(format!("reading {}: {}", var_name, e)))?;

    let units = data_var
        .attribute_value("units")
        .and_then(|v| v.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Str(s) => Some(s),
            _ => None,
        });

    let x: Vec<f64> = read_coord(group, "x")?;
    let y: Vec<f64> = read_coord(group, "y")?;

    let days: Vec<f64> = read_coord(group, "time")?;
    let times: Vec<NaiveDate> = days
        .iter()
        .map(|&d| epoch() + Duration::days(d.round() as i64))
        .collect();

    let raster = Raster3::new(data, x, y, times, crs)?;
    Ok(raster.with_metadata(Some(var_name), units))
}

fn read_coord(group: &netcdf::Group, name: &str) -> Result<Vec<f64>> {
    let var = group
        .variable(name)
        .ok_or_else(|| RasterError::Netcdf(format!("missing variable: {}", name)))?;
    var.get_values(..)
        .map_err(|e| RasterError::Netcdf(format!("reading {}: {}", name, e)))
}

fn read_crs(file: &netcdf::File) -> Result<CrsCode> {
    let attr = file
        .attributes()
        .find(|a| a.name() == "coordinate_system")
        .ok_or_else(|| RasterError::Netcdf("missing coordinate_system attribute".to_string()))?;

    let value = attr
        .value()
        .map_err(|e| RasterError::Netcdf(e.to_string()))?;

    match value {
        netcdf::AttributeValue::Str(s) => {
            CrsCode::parse(&s).map_err(|e| RasterError::Netcdf(e.to_string()))
        }
        _ => Err(RasterError::Netcdf(
            "coordinate_system is not a string attribute".to_string(),
        )),
    }
}
