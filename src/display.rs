//! Output Formatting and Display Management
//!
//! Renders engine results either as colored terminal text or as JSON for
//! programmatic consumption.
//!
//! ## Report Types
//!
//! - **Summary**: billing period, cluster totals, per-namespace totals, monthly
//!   averages and any methodology-changing upgrades inside the period
//! - **Months**: one line per month, optionally narrowed to a namespace or mount.
//!   Months without data are shown as "no data", never as zero
//! - **Filters**: dropdown vocabularies, stale-selection alerts and search hits
//! - **Window**: unix boundaries of a month

use crate::filters::{DropdownItems, FilterDimension};
use crate::models::{ClientType, ProjectedCounts, VersionHistoryEntry};
use crate::serializer::ActivitySummary;
use crate::stats::MonthlySeriesPoint;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

/// Everything the summary report shows.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    #[serde(flatten)]
    pub summary: ActivitySummary,
    pub upgrades: Vec<VersionHistoryEntry>,
    pub average_clients: Option<u64>,
    pub average_new_clients: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterReport {
    pub dropdown_items: DropdownItems,
    pub alerts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub dimension: FilterDimension,
    pub query: String,
    pub matches: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindowBoundaries {
    pub start: i64,
    pub end: i64,
}

pub struct DisplayManager {
    json_pretty: bool,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DisplayManager {
    pub fn new(json_pretty: bool) -> Self {
        Self { json_pretty }
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("Failed to serialize report to JSON")
    }

    pub fn display_summary(&self, report: &ActivityReport, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(report)?);
            return Ok(());
        }

        print_header("Client Usage Report - Billing Period Summary");
        let summary = &report.summary;
        println!(
            "\n{} {} → {}",
            "📅".bright_blue(),
            summary.start_time.bright_white().bold(),
            summary.end_time.bright_white().bold()
        );

        for upgrade in &report.upgrades {
            println!(
                "{} Upgraded to {} on {}; client counting changed during this period",
                "⚠️".bright_yellow(),
                upgrade.version.bright_yellow().bold(),
                upgrade.timestamp_installed
            );
        }

        println!("\n{} Total Clients:", "📊".bright_yellow());
        print_counts("   ", summary.total.as_ref());
        println!(
            "   Monthly average: {} total, {} new",
            fmt_optional(report.average_clients).bright_white().bold(),
            fmt_optional(report.average_new_clients).bright_white().bold()
        );

        if !summary.by_namespace.is_empty() {
            println!("\n{} By namespace:", "🗂".bright_blue());
            for namespace in &summary.by_namespace {
                println!(
                    "   {}: {} clients ({} mounts)",
                    namespace.label.bright_cyan(),
                    fmt_optional(namespace.counts.and_then(|c| c.clients)).bright_white(),
                    namespace.mounts.len()
                );
            }
        }
        println!();
        Ok(())
    }

    pub fn display_months(&self, series: &[MonthlySeriesPoint], scope: &str, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(&series)?);
            return Ok(());
        }

        print_header(&format!("Client Usage Report - Monthly ({})", scope));
        for point in series {
            match point.counts {
                Some(counts) => println!(
                    "   {}: {} clients, {} new",
                    point.month.bright_white().bold(),
                    fmt_optional(counts.clients).bright_green(),
                    fmt_optional(point.new_clients.and_then(|c| c.clients)).bright_yellow()
                ),
                None => println!("   {}: {}", point.month.bright_white().bold(), "no data".dimmed()),
            }
        }
        println!();
        Ok(())
    }

    pub fn display_filters(&self, report: &FilterReport, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(report)?);
            return Ok(());
        }

        print_header("Client Usage Filters");
        for dimension in FilterDimension::ALL {
            let values = report.dropdown_items.get(dimension);
            println!(
                "   {} ({}): {}",
                dimension.label().bright_cyan(),
                values.len(),
                values.join(", ")
            );
        }
        for alert in &report.alerts {
            println!("{} {}", "⚠️".bright_yellow(), alert.bright_yellow());
        }
        if let Some(search) = &report.search {
            println!(
                "\n{} {} matching \"{}\": {}",
                "🔎".bright_blue(),
                search.dimension.label(),
                search.query,
                search.matches.join(", ")
            );
        }
        println!();
        Ok(())
    }

    pub fn display_window(&self, window: &WindowBoundaries, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(window)?);
        } else {
            println!("start_time={} end_time={}", window.start, window.end);
        }
        Ok(())
    }
}

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(80).bright_cyan());
    println!("{}", title.bright_white().bold());
    println!("{}", "=".repeat(80).bright_cyan());
}

fn print_counts(indent: &str, counts: Option<&ProjectedCounts>) {
    let Some(counts) = counts else {
        println!("{}{}", indent, "no data".dimmed());
        return;
    };
    for kind in ClientType::ALL {
        println!(
            "{}{}: {}",
            indent,
            kind.as_key(),
            fmt_optional(counts.get(kind)).bright_white()
        );
    }
}

fn fmt_optional(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
