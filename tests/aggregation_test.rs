//! End-to-end tests over realistic activity responses

mod common;

use client_count::aggregator::{aggregate_months, format_by_months};
use client_count::analyzer::ClientCountAnalyzer;
use client_count::models::{ActivityResponse, ClientType, Listing};
use client_count::serializer::serialize_activity;
use client_count::stats::monthly_series;
use common::{load_activity_fixture, load_version_history_fixture};

const SINGLE_MONTH_RESPONSE: &str = r#"{
  "start_time": "2023-04-01T00:00:00Z",
  "end_time": "2023-04-30T23:59:59Z",
  "total": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0 },
  "by_namespace": [],
  "months": [
    {
      "timestamp": "2023-04-01T00:00:00Z",
      "counts": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0, "distinct_entities": 0, "non_entity_tokens": 0 },
      "namespaces": [
        {
          "namespace_id": "root",
          "namespace_path": "",
          "counts": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0 },
          "mounts": [
            {
              "mount_path": "auth/userpass-0",
              "counts": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0 }
            }
          ]
        }
      ],
      "new_clients": {
        "counts": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0 },
        "namespaces": [
          {
            "namespace_id": "root",
            "namespace_path": "",
            "counts": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0 },
            "mounts": [
              {
                "mount_path": "auth/userpass-0",
                "counts": { "acme_clients": 0, "clients": 1, "entity_clients": 1, "non_entity_clients": 0, "secret_syncs": 0 }
              }
            ]
          }
        ]
      }
    }
  ]
}"#;

#[test]
fn test_single_month_drill_down() {
    let response: ActivityResponse = serde_json::from_str(SINGLE_MONTH_RESPONSE).unwrap();
    let months = match format_by_months(response.months.as_ref()) {
        Some(Listing::Items(months)) => months,
        other => panic!("expected aggregated months, got {:?}", other),
    };
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].month, "4/23");

    let mount = &months[0].namespaces_by_key["root"].mounts_by_key["auth/userpass-0"];
    assert_eq!(mount.counts.unwrap().clients, Some(1));
    assert_eq!(mount.new_clients.month, "4/23");
    assert_eq!(mount.new_clients.counts.unwrap().clients, Some(1));
}

#[test]
fn test_fixture_months_are_sorted_and_labelled() {
    let response = load_activity_fixture();
    let summary = serialize_activity(&response);

    let labels: Vec<&str> = summary.by_month.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(labels, vec!["8/23", "9/23"]);

    // august has no data and must not look like zero
    assert!(!summary.by_month[0].has_data());
    assert!(summary.by_month[0].namespaces_by_key.is_empty());
    assert_eq!(summary.by_month[1].counts.unwrap().clients, Some(4358));
}

#[test]
fn test_fixture_serialization_shape() {
    let response = load_activity_fixture();
    let summary = serialize_activity(&response);
    let value = serde_json::to_value(&summary).unwrap();

    assert_eq!(value["start_time"], "2023-08-01T00:00:00Z");
    assert_eq!(value["end_time"], "2023-09-30T23:59:59Z");
    assert!(value["total"].get("distinct_entities").is_none());
    assert_eq!(value["total"]["clients"], 35287);

    let labels: Vec<&str> = summary.by_namespace.iter().map(|ns| ns.label.as_str()).collect();
    assert_eq!(labels, vec!["ns1", "root"]);

    let september = &value["by_month"][1];
    assert!(september.get("counts").is_none());
    assert!(september.get("non_entity_tokens").is_none());
    assert_eq!(september["new_clients"]["clients"], 364);
    assert!(september["namespaces_by_key"]["root"].get("label").is_none());
    assert!(september["namespaces_by_key"]["root"].get("mounts").is_none());
    assert_eq!(
        september["namespaces_by_key"]["root"]["mounts_by_key"]["pki-engine-0"]["new_clients"]["acme_clients"],
        98
    );
}

#[test]
fn test_new_clients_merge_only_where_present() {
    let response = load_activity_fixture();
    let summary = serialize_activity(&response);
    let september = &summary.by_month[1];

    let ns1 = &september.namespaces_by_key["ns1"];
    assert_eq!(ns1.counts.unwrap().clients, Some(2034));
    assert_eq!(ns1.new_clients.counts, None);
    assert_eq!(ns1.new_clients.month, "9/23");

    let root = &september.namespaces_by_key["root"];
    assert_eq!(root.new_clients.counts.unwrap().clients, Some(364));
    assert_eq!(root.mounts_by_key.len(), 3);
}

#[test]
fn test_aggregation_is_repeatable() {
    let response = load_activity_fixture();
    let months = response.months.as_ref().and_then(Listing::items).unwrap();
    assert_eq!(aggregate_months(months), aggregate_months(months));
    // input order is untouched
    assert_eq!(months[0].timestamp, "2023-09-01T00:00:00-07:00");
}

#[test]
fn test_report_warns_about_upgrades_in_billing_period() {
    let analyzer = ClientCountAnalyzer::default();
    let report = analyzer.analyze(&load_activity_fixture(), &load_version_history_fixture());

    let versions: Vec<&str> = report.upgrades.iter().map(|u| u.version.as_str()).collect();
    assert_eq!(versions, vec!["1.10.1"]);
    // (0 + 4358) / 2
    assert_eq!(report.average_clients, Some(2179));
    assert_eq!(report.average_new_clients, Some(182));
}

#[test]
fn test_monthly_series_for_mount() {
    let summary = serialize_activity(&load_activity_fixture());
    let series = monthly_series(&summary.by_month, Some("root"), Some("auth/authid/0"));
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].counts, None);
    let september = series[1].counts.unwrap();
    assert_eq!(september.get(ClientType::Entity), Some(573));
    assert_eq!(series[1].new_clients.unwrap().get(ClientType::NonEntity), Some(57));
}
