//! End-to-end checks over the array pipeline: mosaic per-tile grids, stack
//! them into a series, clip to a basin mask, reproject to UTM and
//! aggregate.

use ascii_grid::AsciiGrid;
use chrono::NaiveDate;
use hdf_parser::TileAttributes;
use modis_common::CrsCode;
use raster::{
    annual_series, monthly_series, mosaic, Aggregation, Raster3, ReprojectOptions, TileBlock,
};
use test_utils::{composite_dates, create_constant_grid};

/// Two 8x8 tiles side by side on a 1km sinusoidal grid over Iberia.
fn tile_pair(west_value: f32, east_value: f32) -> Vec<TileBlock> {
    let n = 8usize;
    let size = 1000.0;
    let x0 = -350_000.0;
    let y0 = 4_700_000.0;

    let west = TileBlock {
        attrs: TileAttributes {
            ncols: n,
            nrows: n,
            x_min: x0,
            y_max: y0,
            x_max: x0 + n as f64 * size,
            y_min: y0 - n as f64 * size,
        },
        data: create_constant_grid(n, n, west_value),
    };
    let east = TileBlock {
        attrs: TileAttributes {
            ncols: n,
            nrows: n,
            x_min: x0 + n as f64 * size,
            y_max: y0,
            x_max: x0 + 2.0 * n as f64 * size,
            y_min: y0 - n as f64 * size,
        },
        data: create_constant_grid(n, n, east_value),
    };
    vec![west, east]
}

/// Stack three mosaicked dates into a series.
fn build_series() -> Raster3 {
    let dates: Vec<NaiveDate> = composite_dates(2003, 3);

    let mut data = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (k, _) in dates.iter().enumerate() {
        let m = mosaic(&tile_pair(k as f32 + 1.0, 10.0 * (k as f32 + 1.0))).unwrap();
        data.extend_from_slice(&m.data);
        x = m.x;
        y = m.y;
    }

    Raster3::new(data, x, y, dates, CrsCode::Sinusoidal)
        .unwrap()
        .with_metadata(Some("ET".to_string()), Some("mm/8d".to_string()))
}

#[test]
fn mosaicked_series_has_combined_width() {
    let series = build_series();
    assert_eq!(series.nx(), 16);
    assert_eq!(series.ny(), 8);
    assert_eq!(series.nt(), 3);

    // West half carries the per-date value, east half ten times it
    assert_eq!(series.get(1, 4, 2), 2.0);
    assert_eq!(series.get(1, 4, 12), 20.0);
}

#[test]
fn clip_then_reproject_keeps_values_in_range() {
    let series = build_series();

    // Basin mask over the middle of the mosaic, sinusoidal coordinates,
    // 4x4 cells of 2km with the central 2x2 inside
    let mask = AsciiGrid::parse(&test_utils::basin_mask_ascii(-348_000.0, 4_692_000.0, 2000.0))
        .unwrap();

    let clipped = series.clip(&mask, None).unwrap();
    assert!(clipped.nx() <= series.nx());
    assert!(clipped.ny() <= series.ny());
    // The clip keeps at least the basin cells
    assert!(clipped.data.iter().any(|v| !v.is_nan()));

    let utm = clipped
        .reproject(CrsCode::Epsg25830, &ReprojectOptions::new(1000.0))
        .unwrap();
    assert_eq!(utm.crs, CrsCode::Epsg25830);
    assert_eq!(utm.nt(), 3);

    // Nearest-neighbor reprojection can only carry source values
    let allowed = [1.0, 2.0, 3.0, 10.0, 20.0, 30.0];
    for &v in utm.data.iter().filter(|v| !v.is_nan()) {
        assert!(
            allowed.iter().any(|&a| (v - a).abs() < 1e-6),
            "unexpected value {}",
            v
        );
    }
}

#[test]
fn aggregation_over_pipeline_output() {
    let series = build_series();

    let monthly = monthly_series(&series, Aggregation::Sum).unwrap();
    // Three 8-day composites starting Jan 1 all fall in January
    assert_eq!(monthly.nt(), 1);
    // Composite totals 1 + 2 + 3 spread over their days and re-summed
    let v = monthly.get(0, 4, 2);
    assert!((v - 6.0).abs() < 1e-4, "monthly sum {}", v);

    let monthly_mean = monthly_series(&series, Aggregation::Mean).unwrap();
    // Mean of the daily rates: (1 + 2 + 3) mm over 24 days
    let rate = monthly_mean.get(0, 4, 2);
    assert!((rate - 0.25).abs() < 1e-4, "mean daily rate {}", rate);

    let annual = annual_series(&series, Aggregation::Mean, 2).unwrap();
    assert_eq!(annual.nt(), 1);
    assert!((annual.get(0, 4, 2) - 2.0).abs() < 1e-6);
}
