//! Monthly Aggregation
//!
//! Turns the `months` array of an activity response into chronologically
//! ordered [`MonthlyClientRecord`]s. Each record carries:
//!
//! - the projected total counts for the month
//! - the normalized namespace list (total clients)
//! - a `new_clients` sibling with the same shape for first-time clients
//! - `namespaces_by_key`, a label-keyed index of namespaces, each with its own
//!   label-keyed `mounts_by_key`, with new-client figures merged in
//!
//! The index lets chart components drill down to one namespace or mount
//! without scanning arrays. It is keyed off the total-clients namespaces
//! only; new clients are a subset of total clients, so a namespace present
//! only on the new-clients side is ignored.
//!
//! Matching between the total and new-clients sides is a linear search per
//! namespace and per mount. Namespace counts per tenant are small.

use crate::counts::project;
use crate::models::*;
use crate::namespaces::format_by_namespace;
use crate::timestamp_parser::{format_month_label, TimestampParser};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Aggregate a possibly-absent month collection.
///
/// Non-array input is returned unchanged, as with namespace normalization.
pub fn format_by_months(
    months: Option<&Listing<ActivityMonthBlock>>,
) -> Option<Listing<MonthlyClientRecord>> {
    match months? {
        Listing::Items(items) => Some(Listing::Items(aggregate_months(items))),
        Listing::Opaque(value) => Some(Listing::Opaque(value.clone())),
    }
}

/// Sort and aggregate every month block. The input is not modified.
pub fn aggregate_months(months: &[ActivityMonthBlock]) -> Vec<MonthlyClientRecord> {
    let sorted = sort_months_by_timestamp(months);
    debug!(months = sorted.len(), "Aggregating activity months");
    sorted.into_iter().map(aggregate_month).collect()
}

/// Copy of `months` ordered oldest to newest.
///
/// The sort is stable. Months whose timestamp cannot be parsed sort first.
pub fn sort_months_by_timestamp(months: &[ActivityMonthBlock]) -> Vec<&ActivityMonthBlock> {
    let mut sorted: Vec<&ActivityMonthBlock> = months.iter().collect();
    sorted.sort_by_cached_key(|month| TimestampParser::parse(&month.timestamp).ok());
    sorted
}

pub fn aggregate_month(block: &ActivityMonthBlock) -> MonthlyClientRecord {
    let month = month_label(&block.timestamp);
    let timestamp = block.timestamp.clone();

    let total_by_namespace =
        format_by_namespace(block.namespaces.as_ref()).and_then(Listing::into_items);
    let new_clients = block.new_clients.as_ref();
    let new_by_namespace = format_by_namespace(new_clients.and_then(|n| n.namespaces.as_ref()))
        .and_then(Listing::into_items);

    let namespaces_by_key = namespace_array_to_object(
        total_by_namespace.as_deref(),
        new_by_namespace.as_deref(),
        &month,
        &timestamp,
    );

    MonthlyClientRecord {
        counts: project(block.counts.as_ref()),
        namespaces: total_by_namespace.unwrap_or_default(),
        namespaces_by_key,
        new_clients: MonthlyNewClients {
            month: month.clone(),
            timestamp: timestamp.clone(),
            counts: project(new_clients.and_then(|n| n.counts.as_ref())),
            namespaces: new_by_namespace.unwrap_or_default(),
        },
        month,
        timestamp,
    }
}

/// Build the label-keyed namespace index for one month.
///
/// Returns an empty map when the month has no namespace data.
pub fn namespace_array_to_object(
    total_by_namespace: Option<&[NamespaceClientRecord]>,
    new_by_namespace: Option<&[NamespaceClientRecord]>,
    month: &str,
    timestamp: &str,
) -> BTreeMap<String, NamespaceByKey> {
    let Some(total_by_namespace) = total_by_namespace else {
        return BTreeMap::new();
    };
    let new_by_namespace = new_by_namespace.unwrap_or_default();

    let mut namespaces_by_key = BTreeMap::new();
    for namespace in total_by_namespace {
        let new_namespace = new_by_namespace.iter().find(|n| n.label == namespace.label);
        let new_mounts = new_namespace.map(|n| n.mounts.as_slice()).unwrap_or_default();

        let mut mounts_by_key = BTreeMap::new();
        for mount in &namespace.mounts {
            let new_mount = new_mounts.iter().find(|m| m.label == mount.label);
            mounts_by_key.insert(
                mount.label.clone(),
                MountByKey {
                    month: month.to_string(),
                    timestamp: timestamp.to_string(),
                    label: mount.label.clone(),
                    counts: mount.counts,
                    new_clients: NewClientsEntry {
                        month: month.to_string(),
                        timestamp: timestamp.to_string(),
                        label: new_mount.map(|m| m.label.clone()),
                        counts: new_mount.and_then(|m| m.counts),
                        mounts: None,
                    },
                },
            );
        }

        if namespaces_by_key.contains_key(&namespace.label) {
            warn!(namespace = %namespace.label, month, "Duplicate namespace label, keeping the last entry");
        }
        namespaces_by_key.insert(
            namespace.label.clone(),
            NamespaceByKey {
                month: month.to_string(),
                timestamp: timestamp.to_string(),
                counts: namespace.counts,
                new_clients: NewClientsEntry {
                    month: month.to_string(),
                    timestamp: timestamp.to_string(),
                    label: new_namespace.map(|n| n.label.clone()),
                    counts: new_namespace.and_then(|n| n.counts),
                    mounts: new_namespace.map(|n| n.mounts.clone()),
                },
                mounts_by_key,
            },
        );
    }

    namespaces_by_key
}

fn month_label(timestamp: &str) -> String {
    format_month_label(timestamp).unwrap_or_else(|err| {
        warn!(timestamp, error = %err, "Unparseable month timestamp");
        String::new()
    })
}
