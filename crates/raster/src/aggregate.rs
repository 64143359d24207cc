//! Temporal aggregation of composite series.
//!
//! MODIS land products are 8-day or 16-day composites; monthly aggregation
//! first spreads each composite value uniformly over the days it covers,
//! then groups the daily values by calendar month. Daily products group
//! directly.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use modis_common::composite_step_days;

use crate::error::{RasterError, Result};
use crate::types::Raster3;

/// How values are combined within an aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Mean of the period's daily values (rates, indices)
    Mean,
    /// Sum of the period's daily values (accumulations such as ET)
    Sum,
}

/// Inter-annual mean map for each calendar month.
///
/// Output has 12 layers; layer `m` is the NaN-mean of every input layer
/// dated in month `m + 1`. Output dates use a placeholder year (2000).
pub fn monthly_climatology(raster: &Raster3) -> Result<Raster3> {
    let size = raster.ny() * raster.nx();
    let mut data = vec![f32::NAN; 12 * size];

    for (m, chunk) in data.chunks_mut(size).enumerate() {
        let month = m as u32 + 1;
        let layers: Vec<usize> = (0..raster.nt())
            .filter(|&t| raster.times[t].month() == month)
            .collect();
        if layers.is_empty() {
            continue;
        }

        for i in 0..size {
            let mut sum = 0.0f64;
            let mut count = 0u32;
            for &t in &layers {
                let v = raster.layer(t)[i];
                if !v.is_nan() {
                    sum += v as f64;
                    count += 1;
                }
            }
            if count > 0 {
                chunk[i] = (sum / count as f64) as f32;
            }
        }
    }

    let times: Vec<NaiveDate> = (1..=12)
        .map(|m| NaiveDate::from_ymd_opt(2000, m, 1).unwrap())
        .collect();

    let out = Raster3::new(data, raster.x.clone(), raster.y.clone(), times, raster.crs)?;
    Ok(out.with_metadata(raster.variable.clone(), raster.units.clone()))
}

/// Aggregate a composite series into one layer per calendar month.
pub fn monthly_series(raster: &Raster3, agg: Aggregation) -> Result<Raster3> {
    let step = composite_step_days(&raster.times);
    if step < 1 {
        return Err(RasterError::EmptyInput(
            "monthly aggregation needs at least two dates".to_string(),
        ));
    }

    let first = raster.times[0];
    let last = raster.times[raster.nt() - 1];

    // Calendar months spanned by the series
    let months = month_range(first, last);
    let month_of_day = |d: NaiveDate| -> usize {
        let y = d.year() - first.year();
        (y * 12 + d.month() as i32 - first.month() as i32) as usize
    };

    debug!(
        months = months.len(),
        step_days = step,
        "Aggregating to monthly series"
    );

    let size = raster.ny() * raster.nx();
    let mut data = vec![f32::NAN; months.len() * size];

    // Per-cell daily accumulation buffers, reused across cells
    let mut month_sum = vec![0.0f64; months.len()];
    let mut month_count = vec![0u32; months.len()];

    for i in 0..size {
        // Cells without any data stay NaN
        if (0..raster.nt()).all(|t| raster.layer(t)[i].is_nan()) {
            continue;
        }

        month_sum.fill(0.0);
        month_count.fill(0);

        for t in 0..raster.nt() {
            let v = raster.layer(t)[i];
            if v.is_nan() {
                continue;
            }

            if step <= 1 {
                let m = month_of_day(raster.times[t]);
                month_sum[m] += v as f64;
                month_count[m] += 1;
            } else {
                // Spread the composite uniformly over the days it covers
                let span_start = raster.times[t];
                let span_end = if t + 1 < raster.nt() {
                    raster.times[t + 1]
                } else {
                    span_start + Duration::days(step)
                };
                let span_days = (span_end - span_start).num_days().max(1);
                let daily = v as f64 / span_days as f64;

                let mut day = span_start;
                while day < span_end {
                    // The final composite may spill past the series' last
                    // month; those days are dropped
                    let m = month_of_day(day);
                    if m < months.len() {
                        month_sum[m] += daily;
                        month_count[m] += 1;
                    }
                    day += Duration::days(1);
                }
            }
        }

        for (m, (&sum, &count)) in month_sum.iter().zip(month_count.iter()).enumerate() {
            if count == 0 {
                continue;
            }
            data[m * size + i] = match agg {
                Aggregation::Mean => (sum / count as f64) as f32,
                Aggregation::Sum => sum as f32,
            };
        }
    }

    let out = Raster3::new(data, raster.x.clone(), raster.y.clone(), months, raster.crs)?;
    Ok(out.with_metadata(raster.variable.clone(), raster.units.clone()))
}

/// Aggregate a composite series into one layer per calendar year.
///
/// Years contributing fewer than `threshold` layers come out all-NaN (an
/// 8-day product has 46 composites in a complete year). For `Sum` the
/// annual total is estimated as per-cell mean x valid-layer count, which
/// tolerates isolated missing composites.
pub fn annual_series(raster: &Raster3, agg: Aggregation, threshold: usize) -> Result<Raster3> {
    let mut years: Vec<i32> = raster.times.iter().map(|d| d.year()).collect();
    years.dedup();

    let size = raster.ny() * raster.nx();
    let mut data = vec![f32::NAN; years.len() * size];

    for (yi, &year) in years.iter().enumerate() {
        let layers: Vec<usize> = (0..raster.nt())
            .filter(|&t| raster.times[t].year() == year)
            .collect();

        if layers.len() <= threshold {
            debug!(
                year = year,
                layers = layers.len(),
                threshold = threshold,
                "Skipping incomplete year"
            );
            continue;
        }

        let chunk = &mut data[yi * size..(yi + 1) * size];
        for i in 0..size {
            let mut sum = 0.0f64;
            let mut count = 0u32;
            for &t in &layers {
                let v = raster.layer(t)[i];
                if !v.is_nan() {
                    sum += v as f64;
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }
            let mean = sum / count as f64;
            chunk[i] = match agg {
                Aggregation::Mean => mean as f32,
                Aggregation::Sum => (mean * count as f64) as f32,
            };
        }
    }

    let times: Vec<NaiveDate> = years
        .iter()
        .map(|&y| NaiveDate::from_ymd_opt(y, 12, 31).unwrap())
        .collect();

    let out = Raster3::new(data, raster.x.clone(), raster.y.clone(), times, raster.crs)?;
    Ok(out.with_metadata(raster.variable.clone(), raster.units.clone()))
}

/// End-of-month dates from the month of `first` through the month of `last`.
fn month_range(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut year = first.year();
    let mut month = first.month();

    loop {
        months.push(last_day_of_month(year, month));
        if year == last.year() && month == last.month() {
            break;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1).unwrap() - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modis_common::CrsCode;

    fn single_cell(times: Vec<NaiveDate>, values: Vec<f32>) -> Raster3 {
        Raster3::new(values, vec![0.0], vec![0.0], times, CrsCode::Epsg25830).unwrap()
    }

    #[test]
    fn test_month_range() {
        let months = month_range(
            NaiveDate::from_ymd_opt(2003, 11, 15).unwrap(),
            NaiveDate::from_ymd_opt(2004, 2, 3).unwrap(),
        );
        assert_eq!(months.len(), 4);
        assert_eq!(months[0], NaiveDate::from_ymd_opt(2003, 11, 30).unwrap());
        assert_eq!(months[3], NaiveDate::from_ymd_opt(2004, 2, 29).unwrap());
    }

    #[test]
    fn test_monthly_series_daily_input() {
        // Daily values over Jan and Feb 2003
        let times: Vec<NaiveDate> = (0..59)
            .map(|d| NaiveDate::from_ymd_opt(2003, 1, 1).unwrap() + Duration::days(d))
            .collect();
        let values: Vec<f32> = times.iter().map(|d| d.month() as f32).collect();

        let raster = single_cell(times, values);
        let monthly = monthly_series(&raster, Aggregation::Mean).unwrap();

        assert_eq!(monthly.nt(), 2);
        assert!((monthly.get(0, 0, 0) - 1.0).abs() < 1e-6);
        assert!((monthly.get(1, 0, 0) - 2.0).abs() < 1e-6);

        let monthly_sum = monthly_series(&raster, Aggregation::Sum).unwrap();
        assert!((monthly_sum.get(0, 0, 0) - 31.0).abs() < 1e-4);
        assert!((monthly_sum.get(1, 0, 0) - 2.0 * 28.0).abs() < 1e-4);
    }

    #[test]
    fn test_monthly_series_composite_spreading() {
        // Two 8-day composites of 8 mm each, wholly inside January
        let times = vec![
            NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2003, 1, 9).unwrap(),
        ];
        let raster = single_cell(times, vec![8.0, 8.0]);
        let monthly = monthly_series(&raster, Aggregation::Sum).unwrap();

        assert_eq!(monthly.nt(), 1);
        // 16 days at 1 mm/day
        assert!((monthly.get(0, 0, 0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_monthly_series_final_composite_truncated() {
        // Last composite covers Jan 28 .. Feb 5; the series ends in January,
        // so the February days are dropped
        let times = vec![
            NaiveDate::from_ymd_opt(2003, 1, 20).unwrap(),
            NaiveDate::from_ymd_opt(2003, 1, 28).unwrap(),
        ];
        let raster = single_cell(times, vec![8.0, 8.0]);
        let monthly = monthly_series(&raster, Aggregation::Sum).unwrap();

        assert_eq!(monthly.nt(), 1);
        // Jan 20..27 at 1 mm/day plus Jan 28..31 at 1 mm/day
        assert!((monthly.get(0, 0, 0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_monthly_series_composite_straddling_months() {
        // Composites through February; the Jan 28 composite straddles the
        // month boundary and splits 4 mm / 4 mm
        let times = vec![
            NaiveDate::from_ymd_opt(2003, 1, 20).unwrap(),
            NaiveDate::from_ymd_opt(2003, 1, 28).unwrap(),
            NaiveDate::from_ymd_opt(2003, 2, 5).unwrap(),
        ];
        let raster = single_cell(times, vec![8.0, 8.0, 8.0]);
        let monthly = monthly_series(&raster, Aggregation::Sum).unwrap();

        assert_eq!(monthly.nt(), 2);
        // January: Jan 20..27 (8 mm) + Jan 28..31 (4 mm)
        assert!((monthly.get(0, 0, 0) - 12.0).abs() < 1e-4);
        // February: Feb 1..4 (4 mm) + Feb 5..12 (8 mm)
        assert!((monthly.get(1, 0, 0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_annual_series_threshold() {
        // 2003: 45 composites; 2004: 10 composites
        let mut times = Vec::new();
        for k in 0..45 {
            times.push(NaiveDate::from_yo_opt(2003, 1 + 8 * k).unwrap());
        }
        for k in 0..10 {
            times.push(NaiveDate::from_yo_opt(2004, 1 + 8 * k).unwrap());
        }
        let values = vec![2.0f32; times.len()];
        let raster = single_cell(times, values);

        let annual = annual_series(&raster, Aggregation::Mean, 40).unwrap();
        assert_eq!(annual.nt(), 2);
        assert!((annual.get(0, 0, 0) - 2.0).abs() < 1e-6);
        assert!(annual.get(1, 0, 0).is_nan(), "incomplete year must be NaN");
    }

    #[test]
    fn test_annual_sum_scales_by_count() {
        let times: Vec<NaiveDate> = (0..46)
            .map(|k| NaiveDate::from_yo_opt(2003, 1 + 8 * k).unwrap())
            .collect();
        let values = vec![3.0f32; times.len()];
        let raster = single_cell(times, values);

        let annual = annual_series(&raster, Aggregation::Sum, 40).unwrap();
        assert!((annual.get(0, 0, 0) - 3.0 * 46.0).abs() < 1e-4);
    }

    #[test]
    fn test_monthly_climatology() {
        // Three years of one January layer and one July layer each
        let mut times = Vec::new();
        let mut values = Vec::new();
        for year in 2001..=2003 {
            times.push(NaiveDate::from_ymd_opt(year, 1, 15).unwrap());
            values.push(10.0);
            times.push(NaiveDate::from_ymd_opt(year, 7, 15).unwrap());
            values.push(30.0);
        }
        let raster = single_cell(times, values);

        let clim = monthly_climatology(&raster).unwrap();
        assert_eq!(clim.nt(), 12);
        assert!((clim.get(0, 0, 0) - 10.0).abs() < 1e-6);
        assert!((clim.get(6, 0, 0) - 30.0).abs() < 1e-6);
        assert!(clim.get(3, 0, 0).is_nan(), "months without data are NaN");
    }
}
