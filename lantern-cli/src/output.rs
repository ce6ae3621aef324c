//! Rendering of scan findings
//!
//! Human mode prints a banner and an aligned table; json mode emits a
//! machine-readable report document. Entirely downstream of the crawl
//! engine.

use std::time::Duration;

use chrono::Utc;
use clap::ValueEnum;
use lantern_core::{Finding, ScanTarget};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Human,
    Json,
}

const BANNER: &str = r"
    __            __
   / /___ _____  / /____  _________
  / / __ `/ __ \/ __/ _ \/ ___/ __ \
 / / /_/ / / / / /_/  __/ /  / / / /
/_/\__,_/_/ /_/\__/\___/_/  /_/ /_/
";

pub fn print_banner() {
    println!("{}", BANNER);
    println!("Reconnaissance scanner for Tor hidden services\n");
}

/// Status glyph by response class
fn status_glyph(status: u16) -> &'static str {
    match status {
        200..=299 => "✓",
        300..=399 => "→",
        400..=499 => "⚠",
        _ => "✗",
    }
}

pub fn print_table(target: &ScanTarget, findings: &[Finding]) {
    println!("\n--- Scan Results for {} ---\n", target);

    if findings.is_empty() {
        println!("No significant findings or information gathered for this onion site.");
        return;
    }

    let headers = ["Type", "URL", "Status", "Title/Header", "Description"];
    let rows: Vec<[String; 5]> = findings
        .iter()
        .map(|f| {
            [
                f.kind_label().to_string(),
                f.url().to_string(),
                format!("{} {}", status_glyph(f.status()), f.status()),
                f.detail().to_string(),
                f.description().to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    print_row(&headers.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_row(&rule, &widths);
    for row in &rows {
        print_row(row, &widths);
    }
}

fn print_row(cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", line.trim_end());
}

/// Machine-readable report wrapping the findings with scan metadata
pub fn render_json(
    target: &ScanTarget,
    max_depth: usize,
    findings: &[Finding],
    elapsed: Duration,
) -> serde_json::Result<String> {
    let report = json!({
        "lantern": {
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": Utc::now().to_rfc3339(),
            "scan": {
                "id": Uuid::new_v4().to_string(),
                "target": target.canonical(),
                "max_depth": max_depth,
                "elapsed_seconds": (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            },
            "findings": findings,
        }
    });

    serde_json::to_string_pretty(&report)
}
