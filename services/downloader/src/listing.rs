//! Directory listings scraped from the data pool's HTML index pages.
//!
//! The LP DAAC pool serves plain directory indexes: one anchor per entry,
//! subdirectories with a trailing slash, files with their extension. The
//! product tree is `<base>/<mission>/<product>.<version>/<YYYY.MM.DD>/`.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::earthdata::EarthdataSession;

/// Extract every anchor `href` value from an HTML page.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let mut hrefs = Vec::new();
    let mut rest = html;

    while let Some(pos) = rest.find("href=") {
        rest = &rest[pos + 5..];
        let Some(quote) = rest.chars().next() else {
            break;
        };
        if quote != '"' && quote != '\'' {
            continue;
        }
        rest = &rest[1..];
        let Some(end) = rest.find(quote) else { break };
        let href = &rest[..end];
        if !href.is_empty() {
            hrefs.push(href.to_string());
        }
        rest = &rest[end + 1..];
    }

    hrefs
}

/// Entries of an index page ending in `suffix`, with parent/absolute links
/// dropped.
pub fn filter_entries(hrefs: &[String], suffix: &str) -> Vec<String> {
    hrefs
        .iter()
        .filter(|h| h.ends_with(suffix))
        .filter(|h| !h.starts_with('/') && !h.contains("://") && !h.starts_with('?'))
        .filter(|h| h.trim_end_matches('/') != "..")
        .cloned()
        .collect()
}

/// Parse a date directory name (`YYYY.MM.DD/`).
pub fn parse_date_dir(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name.trim_end_matches('/'), "%Y.%m.%d").ok()
}

/// List the subdirectory names of an index page.
pub async fn list_subdirectories(session: &EarthdataSession, url: &str) -> Result<Vec<String>> {
    let page = session.get(url).await?.text().await?;
    let entries = filter_entries(&extract_hrefs(&page), "/");
    debug!(url = url, entries = entries.len(), "Listed subdirectories");
    Ok(entries)
}

/// List the file names of an index page with the given extension.
pub async fn list_files(
    session: &EarthdataSession,
    url: &str,
    extension: &str,
) -> Result<Vec<String>> {
    let page = session.get(url).await?.text().await?;
    let suffix = format!(".{}", extension);
    let entries = filter_entries(&extract_hrefs(&page), &suffix);
    debug!(url = url, entries = entries.len(), "Listed files");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
<html><body><h1>Index of /MOLT</h1>
<a href="?C=N;O=D">Name</a>
<a href="/icons/back.gif">ignored</a>
<a href="../">Parent Directory</a>
<a href="MOD16A2.061/">MOD16A2.061/</a>
<a href="MOD13Q1.061/">MOD13Q1.061/</a>
<a href='MOD16A2.A2003001.h17v04.061.hdf'>MOD16A2.A2003001.h17v04.061.hdf</a>
<a href="MOD16A2.A2003001.h17v04.061.hdf.xml">metadata</a>
</body></html>
"#;

    #[test]
    fn test_extract_hrefs() {
        let hrefs = extract_hrefs(INDEX);
        assert!(hrefs.contains(&"MOD16A2.061/".to_string()));
        assert!(hrefs.contains(&"MOD16A2.A2003001.h17v04.061.hdf".to_string()));
        assert_eq!(hrefs.len(), 7);
    }

    #[test]
    fn test_filter_directories() {
        let hrefs = extract_hrefs(INDEX);
        let dirs = filter_entries(&hrefs, "/");
        assert_eq!(dirs, vec!["MOD16A2.061/", "MOD13Q1.061/"]);
    }

    #[test]
    fn test_filter_files_by_extension() {
        let hrefs = extract_hrefs(INDEX);
        let files = filter_entries(&hrefs, ".hdf");
        assert_eq!(files, vec!["MOD16A2.A2003001.h17v04.061.hdf"]);

        let xml = filter_entries(&hrefs, ".xml");
        assert_eq!(xml.len(), 1);
    }

    #[test]
    fn test_parse_date_dir() {
        let date = parse_date_dir("2003.01.01/").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2003, 1, 1).unwrap());
        assert!(parse_date_dir("MOD16A2.061/").is_none());
    }
}
