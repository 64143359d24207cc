//! Metadata extraction from MODIS product filenames.
//!
//! LP DAAC tile files are named
//! `<product>.A<YYYYDDD>.<tile>.<collection>.<production>.hdf`, e.g.
//! `MOD16A2.A2003001.h17v04.105.2017071110106.hdf`. ASCII exports carry the
//! same acquisition token after an underscore, e.g. `mod16a2_A2003001.asc`.

use chrono::NaiveDate;

use modis_common::{parse_yyyyddd, TileId};

/// Information extracted from a tile filename.
#[derive(Debug, Clone, PartialEq)]
pub struct TileFileInfo {
    /// Product short name (e.g. "MOD16A2")
    pub product: String,
    /// Acquisition date (start of the composite period)
    pub date: NaiveDate,
    /// Tile id
    pub tile: TileId,
    /// Collection token (e.g. "105"), when present
    pub collection: Option<String>,
}

/// Parse a MODIS tile filename.
///
/// Returns None for names that don't follow the product naming convention.
pub fn parse_tile_filename(filename: &str) -> Option<TileFileInfo> {
    let mut parts = filename.split('.');

    let product = parts.next()?;
    if product.is_empty() {
        return None;
    }

    let date_token = parts.next()?;
    let date = parse_yyyyddd(date_token.strip_prefix('A')?).ok()?;

    let tile: TileId = parts.next()?.parse().ok()?;

    let collection = parts.next().map(|s| s.to_string());

    Some(TileFileInfo {
        product: product.to_string(),
        date,
        tile,
        collection,
    })
}

/// Parse the acquisition date out of an exported ASCII map filename
/// (`<anything>_A<YYYYDDD>.asc`).
pub fn parse_ascii_filename_date(filename: &str) -> Option<NaiveDate> {
    let stem = filename.strip_suffix(".asc")?;
    let token = stem.split('_').nth(1)?;
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 {
        return None;
    }
    parse_yyyyddd(&digits[..7]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_tile_filename() {
        let info = parse_tile_filename("MOD16A2.A2003001.h17v04.105.2017071110106.hdf").unwrap();
        assert_eq!(info.product, "MOD16A2");
        assert_eq!(
            (info.date.year(), info.date.ordinal()),
            (2003, 1)
        );
        assert_eq!(info.tile.to_string(), "h17v04");
        assert_eq!(info.collection.as_deref(), Some("105"));
    }

    #[test]
    fn test_parse_rejects_other_files() {
        assert!(parse_tile_filename("readme.txt").is_none());
        assert!(parse_tile_filename("MOD16A2.B2003001.h17v04.105.x.hdf").is_none());
        assert!(parse_tile_filename("MOD16A2.A2003001.h99v99.105.x.hdf").is_none());
    }

    #[test]
    fn test_parse_ascii_filename_date() {
        let date = parse_ascii_filename_date("mod16a2_A2003009.asc").unwrap();
        assert_eq!((date.year(), date.ordinal()), (2003, 9));

        assert!(parse_ascii_filename_date("mod16a2_A2003009.tif").is_none());
        assert!(parse_ascii_filename_date("mod16a2.asc").is_none());
    }
}
