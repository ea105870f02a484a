//! Client Count Library
//!
//! Aggregation and filtering engine for a secrets cluster's client activity
//! log. The activity log is a hierarchical, time-bucketed count of distinct
//! clients (month → namespace → mount); this crate turns the raw query
//! response into the aggregates a billing console displays.
//!
//! ## Core Features
//!
//! - **Count projection**: reduces raw counters to the canonical client types,
//!   dropping legacy fields
//! - **Monthly aggregation**: chronological months with total and new-client
//!   views plus label-keyed namespace and mount indices
//! - **Upgrade correlation**: flags methodology-changing upgrades installed
//!   inside the billing period
//! - **Filter vocabularies**: distinct namespaces, mounts, mount types and month
//!   cohorts for filter dropdowns, with stale-selection detection and search
//! - **Date window math**: unix boundaries of a calendar month
//!
//! All engine functions are pure: they never mutate their input and can be
//! re-run whenever the input changes.
//!
//! ## Architecture Overview
//!
//! - [`models`] - Raw API payloads and normalized output records
//! - [`counts`] - Count projection
//! - [`namespaces`] - Namespace and mount normalization
//! - [`aggregator`] - Monthly aggregation and index building
//! - [`upgrades`] - Version upgrade correlation
//! - [`filters`] - Dropdown vocabularies, validation and search
//! - [`date_window`] - Month boundary math
//! - [`serializer`] - Display-ready view of a whole activity response
//! - [`stats`] - Monthly averages and drill-down series
//! - [`export`] - Per-client export parsing
//! - [`analyzer`] - File-driven entry point used by the binary
//! - [`display`] - Terminal and JSON output
//! - [`config`] - Configuration with file and environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//!
//! ## Example
//!
//! ```rust
//! use client_count::aggregator::aggregate_months;
//! use client_count::models::ActivityMonthBlock;
//!
//! let months: Vec<ActivityMonthBlock> = serde_json::from_str(
//!     r#"[{"timestamp": "2024-04-01T00:00:00Z", "counts": null, "namespaces": null, "new_clients": null}]"#,
//! ).unwrap();
//! let records = aggregate_months(&months);
//! assert_eq!(records[0].month, "4/24");
//! assert!(!records[0].has_data());
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod counts;
pub mod date_window;
pub mod display;
pub mod export;
pub mod filters;
pub mod logging;
pub mod models;
pub mod namespaces;
pub mod serializer;
pub mod stats;
pub mod timestamp_parser;
pub mod upgrades;

pub use analyzer::ClientCountAnalyzer;
pub use models::*;
