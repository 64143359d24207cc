//! Assembly of MODIS raster series from local files.
//!
//! Two input routes produce the same `Raster3`: per-tile HDF files laid out
//! the way the downloader leaves them (`<base>/<product>/`), and per-date
//! ASCII map exports. Filename parsing lives here too.

pub mod ascii;
pub mod error;
pub mod extract;
pub mod filename;

pub use ascii::{from_ascii_dir, AsciiSeriesOptions, FillValues};
pub use error::{IngestionError, Result};
pub use extract::{extract, ExtractOptions};
pub use filename::{parse_ascii_filename_date, parse_tile_filename, TileFileInfo};
