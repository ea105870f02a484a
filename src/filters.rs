//! Filter toolbar support
//!
//! Derives dropdown vocabularies from a dataset, flags filter selections that
//! no longer exist in the data (typically stale query parameters), and
//! implements dropdown search.

use crate::counts::project;
use crate::models::{Listing, NamespaceObject, ProjectedCounts};
use crate::timestamp_parser::{format_month_long, TimestampParser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Namespace value used for rows whose namespace path is empty.
pub const ROOT_NAMESPACE_LABEL: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    Namespace,
    MountPath,
    MountType,
    Month,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] = [
        FilterDimension::Namespace,
        FilterDimension::MountPath,
        FilterDimension::MountType,
        FilterDimension::Month,
    ];

    /// Human-readable label, capitalized for alerts.
    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Namespace => "Namespace",
            FilterDimension::MountPath => "Mount path",
            FilterDimension::MountType => "Mount type",
            FilterDimension::Month => "Month",
        }
    }

    /// Query parameter the selection is read from.
    pub fn query_param(self) -> &'static str {
        match self {
            FilterDimension::Namespace => "namespace_path",
            FilterDimension::MountPath => "mount_path",
            FilterDimension::MountType => "mount_type",
            FilterDimension::Month => "month",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterDimension {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "namespace" | "namespace_path" => Ok(FilterDimension::Namespace),
            "mount_path" => Ok(FilterDimension::MountPath),
            "mount_type" => Ok(FilterDimension::MountType),
            "month" => Ok(FilterDimension::Month),
            other => anyhow::bail!("Unknown filter dimension: {}", other),
        }
    }
}

/// A row the vocabulary builder can scan.
pub trait FilterableRow {
    fn namespace_path(&self) -> &str;
    fn mount_path(&self) -> &str;
    fn mount_type(&self) -> &str;

    fn client_first_used_time(&self) -> Option<&str> {
        None
    }
}

/// Per-mount row of the "by mount" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountClientRow {
    pub namespace_path: String,
    pub mount_path: String,
    pub mount_type: String,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
}

impl FilterableRow for MountClientRow {
    fn namespace_path(&self) -> &str {
        &self.namespace_path
    }

    fn mount_path(&self) -> &str {
        &self.mount_path
    }

    fn mount_type(&self) -> &str {
        &self.mount_type
    }
}

/// Flatten namespaces into one row per mount. Namespaces whose mounts are a
/// legacy sentinel contribute no rows.
pub fn mount_client_rows(namespaces: &[NamespaceObject]) -> Vec<MountClientRow> {
    namespaces
        .iter()
        .flat_map(|namespace| {
            let mounts = namespace.mounts.as_ref().and_then(Listing::items).unwrap_or_default();
            mounts.iter().map(move |mount| MountClientRow {
                namespace_path: namespace.namespace_path.clone(),
                mount_path: mount.mount_path.clone(),
                mount_type: mount.mount_type.clone().unwrap_or_default(),
                counts: project(mount.counts.as_ref()),
            })
        })
        .collect()
}

/// Distinct values per filter dimension, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownItems {
    pub namespace: Vec<String>,
    pub mount_path: Vec<String>,
    pub mount_type: Vec<String>,
    pub month: Vec<String>,
}

impl DropdownItems {
    pub fn get(&self, dimension: FilterDimension) -> &[String] {
        match dimension {
            FilterDimension::Namespace => &self.namespace,
            FilterDimension::MountPath => &self.mount_path,
            FilterDimension::MountType => &self.mount_type,
            FilterDimension::Month => &self.month,
        }
    }

    /// Replace the derived months with a caller-supplied list.
    pub fn with_months(mut self, months: Vec<String>) -> Self {
        self.month = months;
        self
    }
}

/// Build dropdown vocabularies in a single pass over `dataset`.
///
/// An empty namespace path is reported as `root`. Months are the first
/// instant of the UTC month of each row's `client_first_used_time`.
pub fn build_dropdown_items<R: FilterableRow>(dataset: &[R]) -> DropdownItems {
    let mut namespaces = BTreeSet::new();
    let mut mount_paths = BTreeSet::new();
    let mut mount_types = BTreeSet::new();
    let mut months = BTreeSet::new();

    for row in dataset {
        let namespace_path = row.namespace_path();
        if namespace_path.is_empty() {
            namespaces.insert(ROOT_NAMESPACE_LABEL.to_string());
        } else {
            namespaces.insert(namespace_path.to_string());
        }

        if !row.mount_path().is_empty() {
            mount_paths.insert(row.mount_path().to_string());
        }
        if !row.mount_type().is_empty() {
            mount_types.insert(row.mount_type().to_string());
        }

        if let Some(first_used) = row.client_first_used_time() {
            let month = TimestampParser::parse(first_used)
                .ok()
                .and_then(TimestampParser::start_of_month);
            match month {
                Some(month) => {
                    months.insert(TimestampParser::to_api_string(month));
                }
                None => debug!(first_used, "Ignoring unparseable client_first_used_time"),
            }
        }
    }

    DropdownItems {
        namespace: namespaces.into_iter().collect(),
        mount_path: mount_paths.into_iter().collect(),
        mount_type: mount_types.into_iter().collect(),
        month: months.into_iter().collect(),
    }
}

/// Whether `selected` is acceptable for `dimension`.
///
/// Empty selections and any month selection are always valid; month filters
/// do not map one-to-one onto the underlying data.
pub fn validate_selection(dimension: FilterDimension, selected: &str, items: &DropdownItems) -> bool {
    if selected.is_empty() || dimension == FilterDimension::Month {
        return true;
    }
    items.get(dimension).iter().any(|item| item == selected)
}

/// Alert text for a selection missing from the vocabulary, if any.
pub fn stale_filter_alert(dimension: FilterDimension, selected: &str, items: &DropdownItems) -> Option<String> {
    if validate_selection(dimension, selected, items) {
        return None;
    }
    Some(format!(
        "{} \"{}\" not found in the current data.",
        dimension.label(),
        selected
    ))
}

/// Case-insensitive substring search over dropdown items.
///
/// Month items also match on their long form, e.g. `January 2024`.
pub fn search(items: &[String], query: &str, dimension: FilterDimension) -> Vec<String> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| {
            if item.to_lowercase().contains(&query) {
                return true;
            }
            dimension == FilterDimension::Month
                && format_month_long(item)
                    .map(|label| label.to_lowercase().contains(&query))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Filter values as read from query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub namespace_path: Option<String>,
    pub mount_path: Option<String>,
    pub mount_type: Option<String>,
    pub month: Option<String>,
}

impl FilterSelection {
    pub fn get(&self, dimension: FilterDimension) -> Option<&str> {
        match dimension {
            FilterDimension::Namespace => self.namespace_path.as_deref(),
            FilterDimension::MountPath => self.mount_path.as_deref(),
            FilterDimension::MountType => self.mount_type.as_deref(),
            FilterDimension::Month => self.month.as_deref(),
        }
    }

    /// Alerts for every selected value missing from `items`.
    pub fn alerts(&self, items: &DropdownItems) -> Vec<String> {
        FilterDimension::ALL
            .into_iter()
            .filter_map(|dimension| {
                let selected = self.get(dimension)?;
                stale_filter_alert(dimension, selected, items)
            })
            .collect()
    }
}
