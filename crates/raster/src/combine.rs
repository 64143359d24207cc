//! Combining the Terra and Aqua series of a product.
//!
//! The two satellites fly the same instrument on offset schedules; their
//! series complement each other when one misses a composite. Gap filling
//! inserts the other satellite's layer (or a blank one) at missing dates,
//! and combination averages the two series cell by cell.

use chrono::Duration;
use tracing::{debug, info};

use crate::error::{RasterError, Result};
use crate::types::Raster3;

/// Fill composite gaps in each series using the other one.
///
/// A gap is a step between consecutive dates larger than `step_days`. For
/// every date missing inside a gap, the other satellite's layer for that
/// date is inserted when it exists, otherwise an all-NaN layer. Returns the
/// two completed rasters in input order.
pub fn fill_missing(a: &Raster3, b: &Raster3, step_days: i64) -> Result<(Raster3, Raster3)> {
    if step_days < 1 {
        return Err(RasterError::InvalidParameter(format!(
            "step_days must be positive, got {}",
            step_days
        )));
    }
    check_same_grid(a, b)?;

    let a_filled = fill_one(a, b, step_days)?;
    let b_filled = fill_one(b, a, step_days)?;
    Ok((a_filled, b_filled))
}

fn fill_one(target: &Raster3, source: &Raster3, step_days: i64) -> Result<Raster3> {
    let size = target.ny() * target.nx();
    let step = Duration::days(step_days);

    let mut times = Vec::with_capacity(target.nt());
    let mut data: Vec<f32> = Vec::with_capacity(target.data.len());

    for t in 0..target.nt() {
        times.push(target.times[t]);
        data.extend_from_slice(target.layer(t));

        let next = if t + 1 < target.nt() {
            target.times[t + 1]
        } else {
            break;
        };

        // Insert every missing composite date inside the gap
        let mut missing = target.times[t] + step;
        while missing < next {
            match source.times.iter().position(|&d| d == missing) {
                Some(s) => {
                    debug!(date = %missing, "Filling gap from the other satellite");
                    data.extend_from_slice(source.layer(s));
                }
                None => {
                    debug!(date = %missing, "Filling gap with an empty layer");
                    data.extend(std::iter::repeat(f32::NAN).take(size));
                }
            }
            times.push(missing);
            missing += step;
        }
    }

    let filled = times.len();
    if filled > target.nt() {
        info!(
            inserted = filled - target.nt(),
            "Inserted missing composites"
        );
    }

    let out = Raster3::new(data, target.x.clone(), target.y.clone(), times, target.crs)?;
    Ok(out.with_metadata(target.variable.clone(), target.units.clone()))
}

/// Combine two satellite series into one by per-cell NaN-mean.
///
/// The output time axis is the sorted union of both axes; for dates present
/// in only one series that layer is copied through.
pub fn combine(a: &Raster3, b: &Raster3) -> Result<Raster3> {
    check_same_grid(a, b)?;

    let mut times: Vec<_> = a.times.iter().chain(b.times.iter()).copied().collect();
    times.sort();
    times.dedup();

    let size = a.ny() * a.nx();
    let mut data = Vec::with_capacity(times.len() * size);

    for &date in &times {
        let la = a.times.iter().position(|&d| d == date).map(|t| a.layer(t));
        let lb = b.times.iter().position(|&d| d == date).map(|t| b.layer(t));

        match (la, lb) {
            (Some(la), Some(lb)) => {
                for i in 0..size {
                    let (va, vb) = (la[i], lb[i]);
                    let v = match (va.is_nan(), vb.is_nan()) {
                        (false, false) => (va + vb) / 2.0,
                        (false, true) => va,
                        (true, false) => vb,
                        (true, true) => f32::NAN,
                    };
                    data.push(v);
                }
            }
            (Some(l), None) | (None, Some(l)) => data.extend_from_slice(l),
            (None, None) => unreachable!("date came from one of the two axes"),
        }
    }

    let out = Raster3::new(data, a.x.clone(), a.y.clone(), times, a.crs)?;
    Ok(out.with_metadata(a.variable.clone(), a.units.clone()))
}

fn check_same_grid(a: &Raster3, b: &Raster3) -> Result<()> {
    if a.ny() != b.ny() || a.nx() != b.nx() {
        return Err(RasterError::ShapeMismatch(format!(
            "grids differ: {}x{} vs {}x{}",
            a.ny(),
            a.nx(),
            b.ny(),
            b.nx()
        )));
    }
    if a.crs != b.crs {
        return Err(RasterError::CrsMismatch {
            expected: a.crs.to_string(),
            found: b.crs.to_string(),
        });
    }
    Ok(())
}
