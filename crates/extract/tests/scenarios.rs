use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use svcinv_extract::{deduplicate, ArtifactCategory, Inventory, TagAccumulator};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn timeseries(query: &str) -> Value {
    json!({
        "id": 1,
        "definition": {
            "type": "timeseries",
            "title": "latency",
            "requests": [{
                "response_format": "timeseries",
                "queries": [{"data_source": "metrics", "name": "query1", "query": query}],
                "formulas": [{"formula": "query1"}]
            }]
        }
    })
}

#[test]
fn metric_widget_scope_yields_service() {
    let mut inventory = Inventory::default();
    inventory.ingest_dashboard(
        "d1",
        &json!({"widgets": [timeseries("avg:system.cpu{service:checkout,env:prod}")]}),
    );

    let scan = inventory.scan(ArtifactCategory::Dashboard);
    assert_eq!(
        scan.tags().get("d1"),
        Some(&["service:checkout,env:prod".to_string()][..])
    );
    let result = inventory.deduplicate(ArtifactCategory::Dashboard);
    assert_eq!(result.services.get("d1"), Some(&set(&["checkout"])));
}

#[test]
fn metric_alert_monitor_yields_service() {
    let mut inventory = Inventory::default();
    inventory.ingest_monitor(&json!({
        "id": 5001,
        "type": "metric alert",
        "name": "slow billing",
        "query": "avg(last_5m):avg:trace.http.request.duration{service:billing} > 1"
    }));

    let scan = inventory.scan(ArtifactCategory::Monitor);
    assert_eq!(
        scan.tags().get("5001"),
        Some(&["service:billing".to_string()][..])
    );
    let result = inventory.deduplicate(ArtifactCategory::Monitor);
    assert_eq!(result.services.get("5001"), Some(&set(&["billing"])));
}

#[test]
fn group_children_contribute_to_parent_dashboard() {
    let mut inventory = Inventory::default();
    inventory.ingest_dashboard(
        "d1",
        &json!({"widgets": [{
            "id": 10,
            "definition": {
                "type": "group",
                "layout_type": "ordered",
                "widgets": [
                    timeseries("avg:requests{service:a}"),
                    timeseries("avg:requests{service:b}")
                ]
            }
        }]}),
    );

    let result = inventory.deduplicate(ArtifactCategory::Dashboard);
    assert_eq!(result.services.get("d1"), Some(&set(&["a", "b"])));
    assert_eq!(result.services.len(), 1);
}

#[test]
fn template_placeholders_contribute_nothing() {
    let mut inventory = Inventory::default();
    inventory.ingest_dashboard(
        "d1",
        &json!({"widgets": [timeseries("avg:requests{service:$service_var}")]}),
    );
    inventory.ingest_notebook(&json!({
        "id": 9,
        "attributes": {"cells": [{"attributes": {"definition": {
            "type": "timeseries",
            "requests": [{"queries": [
                {"data_source": "metrics", "query": "avg:requests{service:$service_var,env:prod}"}
            ]}]
        }}}]}
    }));

    assert!(inventory
        .deduplicate(ArtifactCategory::Dashboard)
        .services
        .is_empty());
    assert!(inventory
        .deduplicate(ArtifactCategory::Notebook)
        .services
        .is_empty());
}

#[test]
fn metric_slo_without_services_is_kept_empty() {
    let mut inventory = Inventory::default();
    inventory.ingest_slo(&json!({
        "id": "slo-1",
        "type": "metric",
        "query": {
            "numerator": "sum:requests.ok{env:prod}.as_count()",
            "denominator": "sum:requests.total{env:prod}.as_count()"
        }
    }));

    let result = inventory.deduplicate(ArtifactCategory::Slo);
    assert_eq!(result.services.get("slo-1"), Some(&BTreeSet::new()));
}

#[test]
fn only_malformed_tokens_omit_all_but_slos() {
    let mut tags = TagAccumulator::new();
    tags.append_or_create("x", vec!["service".to_string(), "servicename".to_string()]);

    for category in [
        ArtifactCategory::Dashboard,
        ArtifactCategory::Notebook,
        ArtifactCategory::Monitor,
    ] {
        assert!(deduplicate(category, &tags).is_empty(), "{category}");
    }
    assert_eq!(
        deduplicate(ArtifactCategory::Slo, &tags).get("x"),
        Some(&BTreeSet::new())
    );
}

#[test]
fn one_malformed_widget_leaves_the_rest_of_the_dashboard() {
    let mut inventory = Inventory::default();
    inventory.ingest_dashboard(
        "d1",
        &json!({"widgets": [
            {"definition": {"type": "check_status"}},
            {"definition": {"type": "trace_service", "service": "payments", "env": "prod"}},
            {"definition": {"type": "image", "url": "https://example.com/logo.png"}},
            {"definition": {"type": "servicemap", "filters": ["env:prod", "service:edge"]}}
        ]}),
    );

    let result = inventory.deduplicate(ArtifactCategory::Dashboard);
    assert_eq!(result.services.get("d1"), Some(&set(&["edge", "payments"])));
    assert_eq!(result.stats.skipped, 1);
    assert_eq!(result.stats.unsupported.get("image"), Some(&1));
}

#[test]
fn dedup_is_stable_across_repeated_runs() {
    let mut inventory = Inventory::default();
    inventory.ingest_dashboard(
        "d1",
        &json!({"widgets": [
            timeseries("avg:a{service:web,env:prod} + avg:b{service:web}"),
            {"definition": {"type": "log_stream", "query": "service:web OR service:api"}}
        ]}),
    );
    let first = inventory.deduplicate(ArtifactCategory::Dashboard);
    let second = inventory.deduplicate(ArtifactCategory::Dashboard);
    assert_eq!(first, second);
    assert_eq!(first.services.get("d1"), Some(&set(&["api", "web"])));
}
