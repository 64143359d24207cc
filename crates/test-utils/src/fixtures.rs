//! Text fixtures shared across the test suite.

/// A `StructMetadata.0` block in the HDF-EOS layout MODIS land products
/// carry, for an `n x n` tile with the given upper-left corner and cell
/// size.
pub fn struct_metadata_text(n: usize, x_min: f64, y_max: f64, cellsize: f64) -> String {
    let x_max = x_min + n as f64 * cellsize;
    let y_min = y_max - n as f64 * cellsize;
    format!(
        r#"GROUP=SwathStructure
END_GROUP=SwathStructure
GROUP=GridStructure
	GROUP=GRID_1
		GridName="MOD_Grid_Test"
		XDim={n}
		YDim={n}
		UpperLeftPointMtrs=({x_min:.6},{y_max:.6})
		LowerRightMtrs=({x_max:.6},{y_min:.6})
	END_GROUP=GRID_1
END_GROUP=GridStructure
END
"#
    )
}

/// A small basin mask in ESRI ASCII format: a 4x4 grid with the outer ring
/// NODATA and the central 2x2 block inside the basin.
pub fn basin_mask_ascii(xllcorner: f64, yllcorner: f64, cellsize: f64) -> String {
    format!(
        "\
ncols 4
nrows 4
xllcorner {xllcorner}
yllcorner {yllcorner}
cellsize {cellsize}
NODATA_value -9999
-9999 -9999 -9999 -9999
-9999 1 1 -9999
-9999 1 1 -9999
-9999 -9999 -9999 -9999
"
    )
}
