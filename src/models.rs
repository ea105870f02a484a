//! Core Data Models
//!
//! This module defines the data structures that flow through the client count
//! engine, from the raw activity-log response to the normalized per-month
//! records consumed by charts and tables.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`ActivityResponse`] - the activity-log query response, made of
//!    [`ActivityMonthBlock`]s, [`NamespaceObject`]s and [`MountBlock`]s
//! 2. **Projection**: [`ProjectedCounts`] - the canonical client-type counters
//! 3. **Normalization**: [`NamespaceClientRecord`], [`MountClientRecord`]
//! 4. **Aggregation**: [`MonthlyClientRecord`] with nested lookup indices
//!    ([`NamespaceByKey`], [`MountByKey`])
//!
//! ## "No data" versus "empty data"
//!
//! The server distinguishes a month with no data (`counts: null`) from a month
//! with zero clients. Optional fields are therefore kept as [`Option`], and
//! collections that legacy servers may report as a non-array sentinel are
//! modelled with [`Listing`], which keeps the original value around instead of
//! coercing it to an empty list.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical client types, in the order they are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    #[serde(rename = "acme_clients")]
    Acme,
    Clients,
    #[serde(rename = "entity_clients")]
    Entity,
    #[serde(rename = "non_entity_clients")]
    NonEntity,
    SecretSyncs,
}

impl ClientType {
    pub const ALL: [ClientType; 5] = [
        ClientType::Acme,
        ClientType::Clients,
        ClientType::Entity,
        ClientType::NonEntity,
        ClientType::SecretSyncs,
    ];

    /// Key used for this client type in API payloads and projected output.
    pub fn as_key(self) -> &'static str {
        match self {
            ClientType::Acme => "acme_clients",
            ClientType::Clients => "clients",
            ClientType::Entity => "entity_clients",
            ClientType::NonEntity => "non_entity_clients",
            ClientType::SecretSyncs => "secret_syncs",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_key() == key)
    }
}

/// Raw counters as emitted by the server, legacy keys included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    #[serde(default)]
    pub acme_clients: Option<u64>,
    #[serde(default)]
    pub clients: Option<u64>,
    #[serde(default)]
    pub entity_clients: Option<u64>,
    #[serde(default)]
    pub non_entity_clients: Option<u64>,
    #[serde(default)]
    pub secret_syncs: Option<u64>,
    /// Superseded by `entity_clients`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_entities: Option<u64>,
    /// Superseded by `non_entity_clients`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_entity_tokens: Option<u64>,
}

/// The canonical client-type counters and nothing else.
///
/// Every key is always serialized, even when the source payload lacked it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedCounts {
    pub acme_clients: Option<u64>,
    pub clients: Option<u64>,
    pub entity_clients: Option<u64>,
    pub non_entity_clients: Option<u64>,
    pub secret_syncs: Option<u64>,
}

impl ProjectedCounts {
    pub fn get(&self, kind: ClientType) -> Option<u64> {
        match kind {
            ClientType::Acme => self.acme_clients,
            ClientType::Clients => self.clients,
            ClientType::Entity => self.entity_clients,
            ClientType::NonEntity => self.non_entity_clients,
            ClientType::SecretSyncs => self.secret_syncs,
        }
    }
}

/// A collection that is either a real array or some other JSON value.
///
/// Older servers report mounts as a non-array sentinel when per-mount data
/// is unavailable; such values are carried as [`Listing::Opaque`]. The
/// variant is chosen by JSON type: an array with a malformed element is a
/// parse error, never `Opaque`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Items(Vec<T>),
    Opaque(serde_json::Value),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Listing<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            value @ serde_json::Value::Array(_) => serde_json::from_value(value)
                .map(Listing::Items)
                .map_err(de::Error::custom),
            other => Ok(Listing::Opaque(other)),
        }
    }
}

impl<T> Listing<T> {
    pub fn items(&self) -> Option<&[T]> {
        match self {
            Listing::Items(items) => Some(items),
            Listing::Opaque(_) => None,
        }
    }

    pub fn into_items(self) -> Option<Vec<T>> {
        match self {
            Listing::Items(items) => Some(items),
            Listing::Opaque(_) => None,
        }
    }
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Listing::Items(items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountBlock {
    pub mount_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_type: Option<String>,
    #[serde(default)]
    pub counts: Option<Counts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceObject {
    pub namespace_id: String,
    /// Empty for the root namespace.
    pub namespace_path: String,
    #[serde(default)]
    pub counts: Option<Counts>,
    #[serde(default)]
    pub mounts: Option<Listing<MountBlock>>,
}

impl NamespaceObject {
    /// Display label: the path, or the id for the root namespace.
    pub fn label(&self) -> &str {
        if self.namespace_path.is_empty() {
            &self.namespace_id
        } else {
            &self.namespace_path
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewClientsBlock {
    #[serde(default)]
    pub counts: Option<Counts>,
    #[serde(default)]
    pub namespaces: Option<Listing<NamespaceObject>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMonthBlock {
    /// First of the month, UTC.
    pub timestamp: String,
    #[serde(default)]
    pub counts: Option<Counts>,
    #[serde(default)]
    pub namespaces: Option<Listing<NamespaceObject>>,
    #[serde(default)]
    pub new_clients: Option<NewClientsBlock>,
}

/// Response of the activity-log query endpoint.
///
/// `start_time` and `end_time` are the billing period the server actually
/// used, which may be narrower than the requested range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub total: Option<Counts>,
    #[serde(default)]
    pub by_namespace: Option<Listing<NamespaceObject>>,
    #[serde(default)]
    pub months: Option<Listing<ActivityMonthBlock>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHistoryEntry {
    pub version: String,
    #[serde(default)]
    pub previous_version: Option<String>,
    pub timestamp_installed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountClientRecord {
    pub label: String,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceClientRecord {
    pub label: String,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
    pub mounts: Vec<MountClientRecord>,
}

/// New-client figures nested inside an indexed namespace or mount.
///
/// Carries the matched new-clients record when one exists; otherwise only
/// `month` and `timestamp` are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClientsEntry {
    pub month: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounts: Option<Vec<MountClientRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountByKey {
    pub month: String,
    pub timestamp: String,
    pub label: String,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
    pub new_clients: NewClientsEntry,
}

/// Indexed namespace entry. The label lives in the map key and the flat
/// mount list is replaced by `mounts_by_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceByKey {
    pub month: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
    pub new_clients: NewClientsEntry,
    pub mounts_by_key: BTreeMap<String, MountByKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNewClients {
    pub month: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
    pub namespaces: Vec<NamespaceClientRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClientRecord {
    /// Short label such as `4/24`.
    pub month: String,
    pub timestamp: String,
    /// `None` when the server had no data for this month.
    #[serde(flatten)]
    pub counts: Option<ProjectedCounts>,
    pub namespaces: Vec<NamespaceClientRecord>,
    pub namespaces_by_key: BTreeMap<String, NamespaceByKey>,
    pub new_clients: MonthlyNewClients,
}

impl MonthlyClientRecord {
    pub fn has_data(&self) -> bool {
        self.counts.is_some()
    }
}
