//! Per-client export parsing
//!
//! The activity export endpoint returns one record per client, either as a
//! JSON array or as JSON lines. Records feed the filter toolbar vocabulary.

use crate::filters::FilterableRow;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    #[serde(default)]
    pub client_id: String,
    /// entity, non-entity-token, pki-acme, secret-sync
    #[serde(default)]
    pub client_type: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub namespace_path: String,
    #[serde(default)]
    pub mount_accessor: String,
    #[serde(default)]
    pub mount_type: String,
    #[serde(default)]
    pub mount_path: String,
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub entity_alias_name: String,
    #[serde(default)]
    pub local_entity_alias: bool,
    #[serde(default)]
    pub timestamp: String,
    /// Only present on sufficiently recent clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_first_used_time: Option<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub entity_metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub entity_group_ids: Vec<String>,
}

impl FilterableRow for ExportRecord {
    fn namespace_path(&self) -> &str {
        &self.namespace_path
    }

    fn mount_path(&self) -> &str {
        &self.mount_path
    }

    fn mount_type(&self) -> &str {
        &self.mount_type
    }

    fn client_first_used_time(&self) -> Option<&str> {
        self.client_first_used_time.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    pub records: Vec<ExportRecord>,
    pub skipped_lines: usize,
}

/// Parse export content given as a JSON array or as JSON lines.
///
/// A JSON array must parse as a whole. In JSON lines, blank lines are ignored
/// and malformed lines are skipped and counted.
pub fn parse_export(content: &str) -> Result<ParsedExport> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let records: Vec<ExportRecord> =
            serde_json::from_str(trimmed).context("Failed to parse export JSON array")?;
        debug!(records = records.len(), "Parsed export array");
        return Ok(ParsedExport { records, skipped_lines: 0 });
    }

    let mut parsed = ParsedExport::default();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ExportRecord>(line) {
            Ok(record) => parsed.records.push(record),
            Err(err) => {
                warn!(line_number = index + 1, error = %err, "Skipping malformed export line");
                parsed.skipped_lines += 1;
            }
        }
    }

    debug!(
        records = parsed.records.len(),
        skipped = parsed.skipped_lines,
        "Parsed export lines"
    );
    Ok(parsed)
}
