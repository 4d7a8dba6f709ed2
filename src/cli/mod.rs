//! CLI commands implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::export::{self, ExportData, ExportFormat, ExportOptions};
use crate::scrapers::{HttpClient, RateLimiter, ScrapeResult};
use crate::utils::is_media_extension;

#[derive(Parser)]
#[command(name = "webacq")]
#[command(about = "Polite web content acquisition pipeline")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides webacquire.toml discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Format a scraped-results file for output
    Export {
        /// Path to a scraped-results JSON file (URL -> result mapping)
        results: PathBuf,
        /// Output format (csv or json)
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Include discovered URLs in the output
        #[arg(long)]
        include_urls: bool,
        /// Keep all metadata fields instead of the essential subset
        #[arg(long)]
        full_metadata: bool,
        /// Output file (defaults to scrape_<timestamp>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Probe a URL politely and report its content classification
    Probe {
        /// URL to probe
        url: String,
        /// Download the body to this path after probing
        #[arg(long, value_name = "FILE")]
        download: Option<PathBuf>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            results,
            format,
            include_urls,
            full_metadata,
            output,
        } => {
            cmd_export(
                &results,
                &format,
                include_urls,
                full_metadata,
                output.as_deref(),
            )
            .await
        }
        Commands::Probe { url, download } => {
            cmd_probe(&settings, &url, download.as_deref()).await
        }
    }
}

/// Format a results file and write it next to the caller.
async fn cmd_export(
    results_path: &Path,
    format: &str,
    include_urls: bool,
    full_metadata: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let format = ExportFormat::from_str(format)?;
    let raw = tokio::fs::read_to_string(results_path)
        .await
        .with_context(|| format!("Failed to read {}", results_path.display()))?;
    let results: BTreeMap<String, ScrapeResult> = serde_json::from_str(&raw)?;

    let options = ExportOptions {
        include_urls,
        essential_metadata_only: !full_metadata,
    };
    let rendered = match export::format_output(&results, format, &options) {
        ExportData::Rows(rows) => render_csv(&rows),
        ExportData::Json(value) => serde_json::to_string_pretty(&value)?,
    };

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export::export_filename(format, Utc::now())));
    tokio::fs::write(&path, rendered).await?;
    println!("Exported {} results to {}", results.len(), path.display());
    Ok(())
}

/// Polite single-URL probe: rate-limit wait, then classify by content type.
async fn cmd_probe(settings: &Settings, url: &str, download: Option<&Path>) -> anyhow::Result<()> {
    let limiter = RateLimiter::with_config(settings.rate_limit.to_limiter_config());
    let client = HttpClient::with_user_agent(
        settings.request_timeout(),
        limiter,
        settings.user_agent.as_deref(),
    );

    if is_media_extension(url) {
        println!("{}: media asset (by extension)", url);
        if download.is_none() {
            return Ok(());
        }
    } else {
        match client.content_type(url).await? {
            Some(content_type) => {
                let kind = if content_type.starts_with("image/") {
                    "media"
                } else {
                    "document"
                };
                println!("{}: {} ({})", url, kind, content_type);
            }
            None => println!("{}: no Content-Type reported", url),
        }
    }

    if let Some(path) = download {
        let bytes = client.document_bytes(url).await?;
        tokio::fs::write(path, &bytes).await?;
        println!("Saved {} bytes to {}", bytes.len(), path.display());
    }

    Ok(())
}

/// Serialize export rows as CSV text.
fn render_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| escape_csv(cell)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
