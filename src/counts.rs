//! Count projection
//!
//! Reduces a raw [`Counts`] object to the canonical client-type counters.
//! Legacy keys (`distinct_entities`, `non_entity_tokens`) are dropped and never
//! used to fill in their replacements.

use crate::models::{Counts, ProjectedCounts};

/// Project raw counters onto the canonical client types.
///
/// Returns `None` for missing counts so "no data" stays distinguishable from zero.
pub fn project(counts: Option<&Counts>) -> Option<ProjectedCounts> {
    let counts = counts?;
    Some(ProjectedCounts {
        acme_clients: counts.acme_clients,
        clients: counts.clients,
        entity_clients: counts.entity_clients,
        non_entity_clients: counts.non_entity_clients,
        secret_syncs: counts.secret_syncs,
    })
}
