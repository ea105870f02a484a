//! Client Count Analysis Engine
//!
//! The [`ClientCountAnalyzer`] is the entry point used by the binary. It reads
//! the inputs supplied by the API collaborators (activity response, version
//! history, per-client export), runs the pure engine functions over them and
//! hands the results to the [`DisplayManager`].
//!
//! Every call recomputes from scratch; nothing is cached between runs.
//!
//! ## Usage Example
//!
//! ```no_run
//! use client_count::{ClientCountAnalyzer, config::Config};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let analyzer = ClientCountAnalyzer::new(&Config::default());
//! let report = analyzer
//!     .build_report(Path::new("activity.json"), Some(Path::new("versions.json")))
//!     .await?;
//! println!("{} months", report.summary.by_month.len());
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::date_window::{month_boundary_unix_time, MonthSelection};
use crate::display::{ActivityReport, DisplayManager, FilterReport, SearchResult, WindowBoundaries};
use crate::export::parse_export;
use crate::filters::{build_dropdown_items, mount_client_rows, search, FilterDimension, FilterSelection};
use crate::models::*;
use crate::serializer::serialize_activity;
use crate::stats::{calculate_average, calculate_new_client_average, monthly_series};
use crate::upgrades::VersionUpgradeCorrelator;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where filter vocabularies are derived from.
#[derive(Debug, Clone)]
pub enum FilterSource {
    /// Per-client export, JSON array or JSON lines
    Export(PathBuf),
    /// Mount rows of an activity response's `by_namespace`
    Activity(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub selection: FilterSelection,
    pub search: Option<(FilterDimension, String)>,
    /// Replaces the months derived from the data
    pub months: Option<Vec<String>>,
}

pub struct ClientCountAnalyzer {
    correlator: VersionUpgradeCorrelator,
    display_manager: DisplayManager,
}

impl Default for ClientCountAnalyzer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl ClientCountAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            correlator: VersionUpgradeCorrelator::new(config.upgrades.notable_versions.clone()),
            display_manager: DisplayManager::new(config.output.json_pretty),
        }
    }

    pub async fn load_activity(path: &Path) -> Result<ActivityResponse> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read activity response: {}", path.display()))?;
        let response: ActivityResponse = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse activity response: {}", path.display()))?;
        Ok(response)
    }

    pub async fn load_version_history(path: Option<&Path>) -> Result<Vec<VersionHistoryEntry>> {
        let Some(path) = path else {
            return Ok(Vec::new());
        };
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read version history: {}", path.display()))?;
        let history: Vec<VersionHistoryEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse version history: {}", path.display()))?;
        Ok(history)
    }

    /// Summary of one activity response, with upgrade warnings when a version
    /// history is supplied. Both files are read concurrently.
    pub async fn build_report(&self, activity: &Path, versions: Option<&Path>) -> Result<ActivityReport> {
        let (response, history) = tokio::try_join!(
            Self::load_activity(activity),
            Self::load_version_history(versions)
        )?;
        Ok(self.analyze(&response, &history))
    }

    pub fn analyze(&self, response: &ActivityResponse, history: &[VersionHistoryEntry]) -> ActivityReport {
        let summary = serialize_activity(response);
        // the response's own period is authoritative, not the requested one
        let upgrades = self
            .correlator
            .filter_version_history(history, &response.start_time, &response.end_time);
        if !upgrades.is_empty() {
            warn!(upgrades = upgrades.len(), "Client counting changed during billing period");
        }

        ActivityReport {
            average_clients: calculate_average(&summary.by_month, ClientType::Clients),
            average_new_clients: calculate_new_client_average(&summary.by_month, ClientType::Clients),
            upgrades,
            summary,
        }
    }

    pub async fn run_summary(&self, activity: &Path, versions: Option<&Path>, json_output: bool) -> Result<()> {
        let report = self.build_report(activity, versions).await?;
        info!(
            months = report.summary.by_month.len(),
            namespaces = report.summary.by_namespace.len(),
            "Built activity summary"
        );
        self.display_manager.display_summary(&report, json_output)
    }

    pub async fn run_months(
        &self,
        activity: &Path,
        namespace: Option<&str>,
        mount: Option<&str>,
        json_output: bool,
    ) -> Result<()> {
        let response = Self::load_activity(activity).await?;
        let summary = serialize_activity(&response);
        let series = monthly_series(&summary.by_month, namespace, mount);

        let scope = match (namespace, mount) {
            (Some(ns), Some(mount)) => format!("{} / {}", ns, mount),
            (Some(ns), None) => ns.to_string(),
            _ => "all namespaces".to_string(),
        };
        self.display_manager.display_months(&series, &scope, json_output)
    }

    pub async fn build_filter_report(&self, source: &FilterSource, options: FilterOptions) -> Result<FilterReport> {
        let mut items = match source {
            FilterSource::Export(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read export: {}", path.display()))?;
                let parsed = parse_export(&content)?;
                if parsed.skipped_lines > 0 {
                    warn!(skipped = parsed.skipped_lines, "Export contained malformed lines");
                }
                build_dropdown_items(&parsed.records)
            }
            FilterSource::Activity(path) => {
                let response = Self::load_activity(path).await?;
                let namespaces = response
                    .by_namespace
                    .as_ref()
                    .and_then(Listing::items)
                    .unwrap_or_default();
                build_dropdown_items(&mount_client_rows(namespaces))
            }
        };

        if let Some(months) = options.months {
            items = items.with_months(months);
        }

        let alerts = options.selection.alerts(&items);
        for alert in &alerts {
            warn!(%alert, "Stale filter selection");
        }

        let search_result = options.search.map(|(dimension, query)| SearchResult {
            matches: search(items.get(dimension), &query, dimension),
            dimension,
            query,
        });

        Ok(FilterReport {
            dropdown_items: items,
            alerts,
            search: search_result,
        })
    }

    pub async fn run_filters(&self, source: &FilterSource, options: FilterOptions, json_output: bool) -> Result<()> {
        let report = self.build_filter_report(source, options).await?;
        self.display_manager.display_filters(&report, json_output)
    }

    pub fn window(selection: MonthSelection) -> Result<WindowBoundaries> {
        Ok(WindowBoundaries {
            start: month_boundary_unix_time(selection, false)?,
            end: month_boundary_unix_time(selection, true)?,
        })
    }

    pub fn run_window(&self, selection: MonthSelection, json_output: bool) -> Result<()> {
        let window = Self::window(selection)?;
        self.display_manager.display_window(&window, json_output)
    }
}
