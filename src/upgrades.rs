//! Version upgrade correlation
//!
//! Some cluster upgrades changed how clients are counted. When one of them
//! was installed inside the queried billing period, the console warns that
//! counts before and after the upgrade are not directly comparable.

use crate::models::VersionHistoryEntry;
use crate::timestamp_parser::TimestampParser;
use tracing::{debug, warn};

/// Minor versions that changed client-counting methodology, in release order.
pub const NOTABLE_UPGRADE_VERSIONS: [&str; 3] = ["1.9", "1.10", "1.17"];

/// Matches version history against a list of notable version prefixes.
#[derive(Debug, Clone)]
pub struct VersionUpgradeCorrelator {
    notable_versions: Vec<String>,
}

impl Default for VersionUpgradeCorrelator {
    fn default() -> Self {
        Self::new(NOTABLE_UPGRADE_VERSIONS.iter().map(|v| v.to_string()).collect())
    }
}

impl VersionUpgradeCorrelator {
    pub fn new(notable_versions: Vec<String>) -> Self {
        Self { notable_versions }
    }

    pub fn notable_versions(&self) -> &[String] {
        &self.notable_versions
    }

    /// Notable upgrades installed within `[start, end]`, inclusive.
    ///
    /// Only the first entry per notable prefix is considered, so later patch
    /// releases of the same minor version are never reported. Results follow
    /// the order of the notable list. `history` is not modified.
    pub fn filter_version_history(
        &self,
        history: &[VersionHistoryEntry],
        start: &str,
        end: &str,
    ) -> Vec<VersionHistoryEntry> {
        if history.is_empty() {
            return Vec::new();
        }

        let mut upgrades: Vec<&VersionHistoryEntry> = Vec::new();
        for prefix in &self.notable_versions {
            let candidate = history.iter().find(|entry| {
                matches_version(&entry.version, prefix)
                    && !upgrades.iter().any(|picked| std::ptr::eq(*picked, *entry))
            });
            if let Some(entry) = candidate {
                upgrades.push(entry);
            }
        }

        if upgrades.is_empty() {
            return Vec::new();
        }

        let (start_dt, end_dt) = match (TimestampParser::parse(start), TimestampParser::parse(end)) {
            (Ok(start_dt), Ok(end_dt)) => (start_dt, end_dt),
            _ => {
                warn!(start, end, "Unparseable activity window, skipping upgrade check");
                return Vec::new();
            }
        };

        let within: Vec<VersionHistoryEntry> = upgrades
            .into_iter()
            .filter(|entry| match TimestampParser::parse(&entry.timestamp_installed) {
                Ok(installed) => installed >= start_dt && installed <= end_dt,
                Err(err) => {
                    warn!(version = %entry.version, error = %err, "Unparseable install timestamp");
                    false
                }
            })
            .cloned()
            .collect();

        debug!(count = within.len(), "Notable upgrades within activity window");
        within
    }
}

/// Filter with the built-in notable version list.
pub fn filter_version_history(
    history: &[VersionHistoryEntry],
    start: &str,
    end: &str,
) -> Vec<VersionHistoryEntry> {
    VersionUpgradeCorrelator::default().filter_version_history(history, start, end)
}

/// `1.10` matches `1.10` and `1.10.x`, but not `1.100` or `11.10`.
fn matches_version(version: &str, prefix: &str) -> bool {
    match version.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('+') || rest.starts_with('-'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str, previous: Option<&str>, installed: &str) -> VersionHistoryEntry {
        VersionHistoryEntry {
            version: version.to_string(),
            previous_version: previous.map(str::to_string),
            timestamp_installed: installed.to_string(),
        }
    }

    fn history() -> Vec<VersionHistoryEntry> {
        vec![
            entry("1.9.0", None, "2023-07-02T00:00:00.000Z"),
            entry("1.9.1", Some("1.9.0"), "2023-08-02T00:00:00.000Z"),
            entry("1.10.1", Some("1.9.1"), "2023-09-02T00:00:00.000Z"),
            entry("1.14.4", Some("1.10.1"), "2023-10-02T00:00:00.000Z"),
            entry("1.16.0", Some("1.14.4"), "2023-11-02T00:00:00.000Z"),
        ]
    }

    #[test]
    fn test_returns_upgrades_within_range() {
        // start equals the first install to catch same-day edge cases
        let result = filter_version_history(&history(), "2023-07-02T00:00:00Z", "2024-03-04T16:14:21.000Z");
        assert_eq!(
            result,
            vec![
                entry("1.9.0", None, "2023-07-02T00:00:00.000Z"),
                entry("1.10.1", Some("1.9.1"), "2023-09-02T00:00:00.000Z"),
            ]
        );
    }

    #[test]
    fn test_dedups_patch_releases() {
        let history = vec![
            entry("1.9.1", None, "2023-06-01"),
            entry("1.9.5", Some("1.9.1"), "2023-08-01"),
        ];
        let result = filter_version_history(&history, "2023-01-01", "2023-12-31");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].version, "1.9.1");
    }

    #[test]
    fn test_window_excluding_everything() {
        let result = filter_version_history(&history(), "2022-01-01", "2022-12-31");
        assert!(result.is_empty());
    }

    #[test]
    fn test_first_match_outside_window_is_not_replaced() {
        // 1.9.0 is the 1.9 candidate even though only 1.9.1 falls in the window
        let result = filter_version_history(&history(), "2023-08-01", "2023-08-31");
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_history() {
        assert!(filter_version_history(&[], "2023-01-01", "2023-12-31").is_empty());
    }

    #[test]
    fn test_invalid_window() {
        assert!(filter_version_history(&history(), "not-a-date", "2023-12-31").is_empty());
    }

    #[test]
    fn test_custom_notable_list() {
        let correlator = VersionUpgradeCorrelator::new(vec!["1.14".to_string()]);
        let result = correlator.filter_version_history(&history(), "2023-01-01", "2023-12-31");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].version, "1.14.4");
    }

    #[test]
    fn test_matches_version_is_dot_bounded() {
        assert!(matches_version("1.9", "1.9"));
        assert!(matches_version("1.9.3", "1.9"));
        assert!(matches_version("1.17.0+ent", "1.17"));
        assert!(!matches_version("1.19.0", "1.1"));
        assert!(!matches_version("1.100.0", "1.10"));
    }
}
