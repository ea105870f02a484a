//! Namespace normalization
//!
//! Maps raw namespace and mount blocks into display records. Order is
//! preserved; nothing is sorted here.

use crate::counts::project;
use crate::models::{
    Listing, MountBlock, MountClientRecord, NamespaceClientRecord, NamespaceObject,
};

/// Normalize a possibly-absent namespace collection.
///
/// Anything that is not an array is handed back unchanged, so a month with
/// no data keeps its `None` instead of turning into an empty list.
pub fn format_by_namespace(
    namespaces: Option<&Listing<NamespaceObject>>,
) -> Option<Listing<NamespaceClientRecord>> {
    match namespaces? {
        Listing::Items(items) => Some(Listing::Items(normalize_namespaces(items))),
        Listing::Opaque(value) => Some(Listing::Opaque(value.clone())),
    }
}

pub fn normalize_namespaces(namespaces: &[NamespaceObject]) -> Vec<NamespaceClientRecord> {
    namespaces.iter().map(normalize_namespace).collect()
}

pub fn normalize_namespace(namespace: &NamespaceObject) -> NamespaceClientRecord {
    let mounts = match namespace.mounts.as_ref().and_then(Listing::items) {
        Some(mounts) => mounts.iter().map(normalize_mount).collect(),
        // pre-granularity data
        None => Vec::new(),
    };

    NamespaceClientRecord {
        label: namespace.label().to_string(),
        counts: project(namespace.counts.as_ref()),
        mounts,
    }
}

pub fn normalize_mount(mount: &MountBlock) -> MountClientRecord {
    MountClientRecord {
        label: mount.mount_path.clone(),
        counts: project(mount.counts.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Counts;
    use serde_json::json;

    fn counts(clients: u64) -> Counts {
        Counts {
            clients: Some(clients),
            entity_clients: Some(clients),
            non_entity_clients: Some(0),
            ..Default::default()
        }
    }

    fn namespace(id: &str, path: &str, mounts: Option<Listing<MountBlock>>) -> NamespaceObject {
        NamespaceObject {
            namespace_id: id.to_string(),
            namespace_path: path.to_string(),
            counts: Some(counts(10)),
            mounts,
        }
    }

    #[test]
    fn test_none_passes_through() {
        assert_eq!(format_by_namespace(None), None);
    }

    #[test]
    fn test_non_array_passes_through() {
        let sentinel = Listing::Opaque(json!("legacy-sentinel-string"));
        assert_eq!(
            format_by_namespace(Some(&sentinel)),
            Some(Listing::Opaque(json!("legacy-sentinel-string")))
        );
    }

    #[test]
    fn test_root_label_and_order() {
        let input = vec![
            namespace("96OwG", "test-ns/", Some(Listing::Items(vec![]))),
            namespace("root", "", Some(Listing::Items(vec![]))),
        ];
        let labels: Vec<String> = normalize_namespaces(&input)
            .into_iter()
            .map(|ns| ns.label)
            .collect();
        assert_eq!(labels, vec!["test-ns/", "root"]);
    }

    #[test]
    fn test_mounts_are_projected() {
        let input = namespace(
            "root",
            "",
            Some(Listing::Items(vec![MountBlock {
                mount_path: "auth/up1/".to_string(),
                mount_type: Some("userpass".to_string()),
                counts: Some(Counts {
                    distinct_entities: Some(7),
                    ..counts(7)
                }),
            }])),
        );
        let record = normalize_namespace(&input);
        assert_eq!(record.mounts.len(), 1);
        assert_eq!(record.mounts[0].label, "auth/up1/");
        assert_eq!(record.mounts[0].counts.unwrap().clients, Some(7));
    }

    #[test]
    fn test_sentinel_mounts_become_empty() {
        let input = namespace("s07UR", "ns1/", Some(Listing::Opaque(json!("no mount accessor"))));
        assert!(normalize_namespace(&input).mounts.is_empty());

        let input = namespace("s07UR", "ns1/", None);
        assert!(normalize_namespace(&input).mounts.is_empty());
    }
}
