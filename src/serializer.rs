//! Activity response serialization
//!
//! Produces the display-ready view of a whole [`ActivityResponse`]: projected
//! totals, normalized namespaces for the billing period, and the aggregated
//! months.

use crate::aggregator::format_by_months;
use crate::counts::project;
use crate::models::{ActivityResponse, Listing, MonthlyClientRecord, NamespaceClientRecord, ProjectedCounts};
use crate::namespaces::format_by_namespace;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Billing period as returned by the server.
    pub start_time: String,
    pub end_time: String,
    pub total: Option<ProjectedCounts>,
    pub by_namespace: Vec<NamespaceClientRecord>,
    pub by_month: Vec<MonthlyClientRecord>,
}

pub fn serialize_activity(response: &ActivityResponse) -> ActivitySummary {
    let by_namespace = match format_by_namespace(response.by_namespace.as_ref()) {
        Some(Listing::Items(items)) => items,
        Some(Listing::Opaque(value)) => {
            warn!(value = %value, "by_namespace is not an array");
            Vec::new()
        }
        None => Vec::new(),
    };

    let by_month = match format_by_months(response.months.as_ref()) {
        Some(Listing::Items(items)) => items,
        Some(Listing::Opaque(value)) => {
            warn!(value = %value, "months is not an array");
            Vec::new()
        }
        None => Vec::new(),
    };

    debug!(
        start_time = %response.start_time,
        end_time = %response.end_time,
        namespaces = by_namespace.len(),
        months = by_month.len(),
        "Serialized activity response"
    );

    ActivitySummary {
        start_time: response.start_time.clone(),
        end_time: response.end_time.clone(),
        total: project(response.total.as_ref()),
        by_namespace,
        by_month,
    }
}
