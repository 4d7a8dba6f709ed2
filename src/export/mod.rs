//! Formatting scraped results for output.
//!
//! Turns a completed results mapping into either a row-oriented table (CSV)
//! or a cleaned JSON mapping, ready to be written out by the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::scrapers::ScrapeResult;

/// Metadata fields kept when exporting with essential metadata only.
const ESSENTIAL_METADATA_FIELDS: [&str; 3] = ["url", "title", "content_type"];

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Options controlling what lands in the export.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Include discovered URLs in the output.
    pub include_urls: bool,
    /// Keep only the essential metadata fields (url, title, content_type).
    pub essential_metadata_only: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_urls: false,
            essential_metadata_only: true,
        }
    }
}

/// Formatted export data, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    /// Row-oriented table; the first row is the header.
    Rows(Vec<Vec<String>>),
    /// Cleaned JSON mapping of URL to result.
    Json(Value),
}

/// Format scraped results for output.
///
/// Results are keyed by URL; the `BTreeMap` ordering gives a stable,
/// URL-sorted export.
pub fn format_output(
    results: &BTreeMap<String, ScrapeResult>,
    format: ExportFormat,
    options: &ExportOptions,
) -> ExportData {
    match format {
        ExportFormat::Csv => ExportData::Rows(to_rows(results, options)),
        ExportFormat::Json => ExportData::Json(to_json(results, options)),
    }
}

/// File name for an export created at `now`.
pub fn export_filename(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("scrape_{}.{}", now.format("%Y%m%d_%H%M%S"), format)
}

fn export_metadata(result: &ScrapeResult, options: &ExportOptions) -> Map<String, Value> {
    if options.essential_metadata_only {
        result
            .metadata
            .iter()
            .filter(|(k, _)| ESSENTIAL_METADATA_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    } else {
        result.metadata.clone()
    }
}

fn to_rows(results: &BTreeMap<String, ScrapeResult>, options: &ExportOptions) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(results.len() + 1);

    let header: &[&str] = if options.include_urls {
        &["URL", "Content", "Discovered URLs", "Metadata"]
    } else {
        &["URL", "Content", "Metadata"]
    };
    rows.push(header.iter().map(|s| s.to_string()).collect());

    for (url, result) in results {
        let metadata = Value::Object(export_metadata(result, options));
        let metadata_str = serde_json::to_string(&metadata).unwrap_or_default();

        let mut row = vec![url.clone(), result.content.clone()];
        if options.include_urls {
            row.push(result.discovered_urls.join(", "));
        }
        row.push(metadata_str);
        rows.push(row);
    }

    rows
}

fn to_json(results: &BTreeMap<String, ScrapeResult>, options: &ExportOptions) -> Value {
    let mut map = Map::new();
    for (url, result) in results {
        let mut entry = Map::new();
        entry.insert(
            "metadata".to_string(),
            Value::Object(export_metadata(result, options)),
        );
        entry.insert("content".to_string(), Value::String(result.content.clone()));
        if options.include_urls {
            entry.insert(
                "discovered_urls".to_string(),
                Value::Array(
                    result
                        .discovered_urls
                        .iter()
                        .map(|u| Value::String(u.clone()))
                        .collect(),
                ),
            );
        }
        map.insert(url.clone(), Value::Object(entry));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_results() -> BTreeMap<String, ScrapeResult> {
        let mut results = BTreeMap::new();
        results.insert(
            "https://b.com/page".to_string(),
            ScrapeResult {
                content: "second page".to_string(),
                discovered_urls: vec!["https://b.com/next".to_string()],
                metadata: json!({
                    "url": "https://b.com/page",
                    "title": "B",
                    "content_type": "text/html",
                    "fetch_duration_ms": 120
                })
                .as_object()
                .cloned()
                .unwrap(),
            },
        );
        results.insert(
            "https://a.com/page".to_string(),
            ScrapeResult::new("first page"),
        );
        results
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::from_str("csv").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_str("JSON").unwrap(), ExportFormat::Json);
        assert!(matches!(
            ExportFormat::from_str("xml"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_csv_rows_without_urls() {
        let data = format_output(
            &sample_results(),
            ExportFormat::Csv,
            &ExportOptions::default(),
        );
        let ExportData::Rows(rows) = data else {
            panic!("expected rows");
        };
        assert_eq!(rows[0], vec!["URL", "Content", "Metadata"]);
        assert_eq!(rows.len(), 3);
        // BTreeMap ordering puts a.com first.
        assert_eq!(rows[1][0], "https://a.com/page");
        assert_eq!(rows[2][0], "https://b.com/page");
        assert_eq!(rows[2][1], "second page");
    }

    #[test]
    fn test_csv_rows_with_urls() {
        let options = ExportOptions {
            include_urls: true,
            ..Default::default()
        };
        let data = format_output(&sample_results(), ExportFormat::Csv, &options);
        let ExportData::Rows(rows) = data else {
            panic!("expected rows");
        };
        assert_eq!(rows[0], vec!["URL", "Content", "Discovered URLs", "Metadata"]);
        assert_eq!(rows[2][2], "https://b.com/next");
    }

    #[test]
    fn test_essential_metadata_filtering() {
        let data = format_output(
            &sample_results(),
            ExportFormat::Json,
            &ExportOptions::default(),
        );
        let ExportData::Json(value) = data else {
            panic!("expected json");
        };
        let metadata = &value["https://b.com/page"]["metadata"];
        assert_eq!(metadata["title"], "B");
        assert_eq!(metadata["content_type"], "text/html");
        assert!(metadata.get("fetch_duration_ms").is_none());
    }

    #[test]
    fn test_full_metadata_passes_through() {
        let options = ExportOptions {
            essential_metadata_only: false,
            ..Default::default()
        };
        let data = format_output(&sample_results(), ExportFormat::Json, &options);
        let ExportData::Json(value) = data else {
            panic!("expected json");
        };
        assert_eq!(
            value["https://b.com/page"]["metadata"]["fetch_duration_ms"],
            120
        );
    }

    #[test]
    fn test_json_drops_discovered_urls_by_default() {
        let data = format_output(
            &sample_results(),
            ExportFormat::Json,
            &ExportOptions::default(),
        );
        let ExportData::Json(value) = data else {
            panic!("expected json");
        };
        assert!(value["https://b.com/page"].get("discovered_urls").is_none());
        assert_eq!(value["https://b.com/page"]["content"], "second page");

        let options = ExportOptions {
            include_urls: true,
            ..Default::default()
        };
        let ExportData::Json(value) =
            format_output(&sample_results(), ExportFormat::Json, &options)
        else {
            panic!("expected json");
        };
        assert_eq!(
            value["https://b.com/page"]["discovered_urls"],
            json!(["https://b.com/next"])
        );
    }

    #[test]
    fn test_export_filename() {
        let now = DateTime::parse_from_rfc3339("2026-08-06T12:30:45Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            export_filename(ExportFormat::Csv, now),
            "scrape_20260806_123045.csv"
        );
        assert_eq!(
            export_filename(ExportFormat::Json, now),
            "scrape_20260806_123045.json"
        );
    }
}
