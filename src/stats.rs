//! Derived statistics over aggregated months.

use crate::models::{ClientType, MonthlyClientRecord, ProjectedCounts};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rounded mean of `kind` across months.
///
/// `None` when no month has data at all. Months without data, or without a
/// value for `kind`, count as zero.
pub fn calculate_average(months: &[MonthlyClientRecord], kind: ClientType) -> Option<u64> {
    average_of(months.iter().map(|m| m.counts), kind)
}

/// Same as [`calculate_average`] over the new-client figures.
pub fn calculate_new_client_average(months: &[MonthlyClientRecord], kind: ClientType) -> Option<u64> {
    average_of(months.iter().map(|m| m.new_clients.counts), kind)
}

fn average_of<I>(counts: I, kind: ClientType) -> Option<u64>
where
    I: ExactSizeIterator<Item = Option<ProjectedCounts>>,
{
    let len = counts.len();
    let mut any_data = false;
    let mut sum: u64 = 0;
    for month in counts {
        if let Some(month) = month {
            any_data = true;
            sum += month.get(kind).unwrap_or(0);
        }
    }
    if !any_data || len == 0 {
        return None;
    }
    Some((sum as f64 / len as f64).round() as u64)
}

/// One point of a per-month chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeriesPoint {
    pub month: String,
    pub timestamp: String,
    pub counts: Option<ProjectedCounts>,
    pub new_clients: Option<ProjectedCounts>,
}

/// Per-month totals, optionally narrowed to one namespace and mount.
///
/// Uses the month indices, so each month is a constant-time lookup. Months
/// where the namespace or mount is absent yield a point without counts. A
/// mount is only honoured together with a namespace.
pub fn monthly_series(
    months: &[MonthlyClientRecord],
    namespace: Option<&str>,
    mount: Option<&str>,
) -> Vec<MonthlySeriesPoint> {
    if mount.is_some() && namespace.is_none() {
        debug!("Mount filter without namespace, showing cluster totals");
    }

    months
        .iter()
        .map(|month| {
            let (counts, new_clients) = match namespace {
                None => (month.counts, month.new_clients.counts),
                Some(ns) => match month.namespaces_by_key.get(ns) {
                    None => (None, None),
                    Some(ns_entry) => match mount {
                        None => (ns_entry.counts, ns_entry.new_clients.counts),
                        Some(mount) => ns_entry
                            .mounts_by_key
                            .get(mount)
                            .map(|m| (m.counts, m.new_clients.counts))
                            .unwrap_or((None, None)),
                    },
                },
            };
            MonthlySeriesPoint {
                month: month.month.clone(),
                timestamp: month.timestamp.clone(),
                counts,
                new_clients,
            }
        })
        .collect()
}
