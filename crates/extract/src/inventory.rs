//! Per-run traversal state.
//!
//! An [`Inventory`] owns one [`CategoryScan`] per artifact category. Artifacts
//! are ingested one at a time as fully decoded documents; once a category is
//! complete it is deduplicated into a [`CategoryInventory`].

use crate::accumulator::TagAccumulator;
use crate::config::ScanConfig;
use crate::dedupe::deduplicate;
use crate::dispatch::{dispatch_monitor, dispatch_query, dispatch_widget, Collector};
use crate::document::{array_field, field, id_string, opt_array_field, opt_field, str_field};
use crate::error::ExtractError;
use crate::kinds::GROUP_WIDGET;
use crate::strategies::metric_slo;
use serde_json::Value;
use svcinv_protocol::{ArtifactCategory, CategoryInventory, InventoryReport, ScanStats};

/// Accumulated tokens and counters for one category.
#[derive(Debug, Clone)]
pub struct CategoryScan {
    category: ArtifactCategory,
    tags: TagAccumulator,
    stats: ScanStats,
}

impl CategoryScan {
    pub fn new(category: ArtifactCategory) -> Self {
        Self {
            category,
            tags: TagAccumulator::new(),
            stats: ScanStats::default(),
        }
    }

    pub fn category(&self) -> ArtifactCategory {
        self.category
    }

    pub fn tags(&self) -> &TagAccumulator {
        &self.tags
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    fn collector<'a>(&'a mut self, artifact_id: &'a str) -> Collector<'a> {
        Collector::new(self.category, artifact_id, &mut self.tags, &mut self.stats)
    }

    fn begin_artifact(&mut self) {
        self.stats.artifacts += 1;
    }

    /// Count an artifact that could not be attributed to any id.
    fn reject_artifact(&mut self, err: &ExtractError) {
        self.stats.skipped += 1;
        log::warn!("{}: skipping artifact: {err}", self.category);
    }

    pub fn deduplicate(&self) -> CategoryInventory {
        CategoryInventory {
            category: self.category,
            services: deduplicate(self.category, &self.tags),
            stats: self.stats.clone(),
        }
    }
}

/// Shape of a dashboard widget as far as traversal is concerned.
enum WidgetNode<'v> {
    Leaf(&'v Value),
    Group(&'v [Value]),
}

impl<'v> WidgetNode<'v> {
    fn classify(widget: &'v Value) -> crate::error::Result<Self> {
        let is_group = opt_field(widget, "definition.type").and_then(Value::as_str)
            == Some(GROUP_WIDGET);
        if is_group {
            Ok(WidgetNode::Group(array_field(widget, "definition.widgets")?))
        } else {
            Ok(WidgetNode::Leaf(widget))
        }
    }
}

/// Extraction context for a whole run.
#[derive(Debug, Clone)]
pub struct Inventory {
    config: ScanConfig,
    dashboards: CategoryScan,
    monitors: CategoryScan,
    notebooks: CategoryScan,
    slos: CategoryScan,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl Inventory {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            dashboards: CategoryScan::new(ArtifactCategory::Dashboard),
            monitors: CategoryScan::new(ArtifactCategory::Monitor),
            notebooks: CategoryScan::new(ArtifactCategory::Notebook),
            slos: CategoryScan::new(ArtifactCategory::Slo),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self, category: ArtifactCategory) -> &CategoryScan {
        match category {
            ArtifactCategory::Dashboard => &self.dashboards,
            ArtifactCategory::Monitor => &self.monitors,
            ArtifactCategory::Notebook => &self.notebooks,
            ArtifactCategory::Slo => &self.slos,
        }
    }

    /// Walk a dashboard's widget tree; group widgets contribute their children
    /// to the same dashboard id.
    pub fn ingest_dashboard(&mut self, dashboard_id: &str, dashboard: &Value) {
        let max_depth = self.config.max_group_depth;
        let scan = &mut self.dashboards;
        scan.begin_artifact();
        let widgets = match array_field(dashboard, "widgets") {
            Ok(widgets) => widgets,
            Err(err) => {
                scan.reject_artifact(&err);
                return;
            }
        };
        let mut collector = scan.collector(dashboard_id);
        walk_widgets(widgets, 0, max_depth, &mut collector);
        collector.flush();
        log::debug!("dashboard {dashboard_id}: {} widgets", widgets.len());
    }

    pub fn ingest_monitor(&mut self, monitor: &Value) {
        let scan = &mut self.monitors;
        scan.begin_artifact();
        let id = match id_string(monitor) {
            Ok(id) => id,
            Err(err) => {
                scan.reject_artifact(&err);
                return;
            }
        };
        let mut collector = scan.collector(&id);
        dispatch_monitor(monitor, &mut collector);
        collector.flush();
    }

    /// Notebook cells hold requests; a request either lists its `queries` or
    /// is itself a query.
    pub fn ingest_notebook(&mut self, notebook: &Value) {
        let scan = &mut self.notebooks;
        scan.begin_artifact();
        let parsed = id_string(notebook)
            .and_then(|id| array_field(notebook, "attributes.cells").map(|cells| (id, cells)));
        let (id, cells) = match parsed {
            Ok(found) => found,
            Err(err) => {
                scan.reject_artifact(&err);
                return;
            }
        };
        let mut collector = scan.collector(&id);
        for cell in cells {
            let cell_type = opt_field(cell, "attributes.definition.type")
                .and_then(Value::as_str)
                .unwrap_or_default();
            collector.run_node("cell", cell_type, |c| {
                let definition = field(cell, "attributes.definition")?;
                for request in opt_array_field(definition, "requests")? {
                    if opt_field(request, "queries").is_some() {
                        for query in array_field(request, "queries")? {
                            dispatch_query(query, c);
                        }
                    } else {
                        dispatch_query(request, c);
                    }
                }
                Ok(())
            });
        }
        collector.flush();
    }

    /// Only metric SLOs carry query text; monitor-based SLOs are covered by
    /// their monitors. Every metric SLO is listed, even without services.
    pub fn ingest_slo(&mut self, slo: &Value) {
        let scan = &mut self.slos;
        scan.begin_artifact();
        let slo_type = str_field(slo, "type").unwrap_or_default();
        if slo_type != "metric" {
            scan.stats.record_unsupported(slo_type);
            log::debug!("slo: `{slo_type}` SLOs are reported through their monitors");
            return;
        }
        let id = match id_string(slo) {
            Ok(id) => id,
            Err(err) => {
                scan.reject_artifact(&err);
                return;
            }
        };
        scan.tags.register(&id);
        let mut collector = scan.collector(&id);
        collector.run_node("slo", slo_type, |c| metric_slo(slo, c));
        collector.flush();
    }

    pub fn ingest(&mut self, category: ArtifactCategory, id: Option<&str>, doc: &Value) {
        match category {
            ArtifactCategory::Dashboard => {
                let fallback = id_string(doc).ok();
                match id.or(fallback.as_deref()) {
                    Some(id) => self.ingest_dashboard(id, doc),
                    None => {
                        self.dashboards.begin_artifact();
                        self.dashboards.reject_artifact(&ExtractError::missing("id"));
                    }
                }
            }
            ArtifactCategory::Monitor => self.ingest_monitor(doc),
            ArtifactCategory::Notebook => self.ingest_notebook(doc),
            ArtifactCategory::Slo => self.ingest_slo(doc),
        }
    }

    pub fn deduplicate(&self, category: ArtifactCategory) -> CategoryInventory {
        self.scan(category).deduplicate()
    }

    /// Deduplicate the given categories, in the given order.
    pub fn report(&self, categories: &[ArtifactCategory]) -> InventoryReport {
        InventoryReport {
            categories: categories.iter().map(|c| self.deduplicate(*c)).collect(),
            ..Default::default()
        }
    }

    pub fn finish(self) -> InventoryReport {
        self.report(&ArtifactCategory::ALL)
    }
}

fn walk_widgets(
    widgets: &[Value],
    depth: usize,
    max_depth: usize,
    collector: &mut Collector<'_>,
) {
    for widget in widgets {
        match WidgetNode::classify(widget) {
            Ok(WidgetNode::Leaf(leaf)) => dispatch_widget(leaf, collector),
            Ok(WidgetNode::Group(children)) => {
                collector.run_node("widget", GROUP_WIDGET, |c| {
                    if depth >= max_depth {
                        return Err(ExtractError::DepthExceeded {
                            depth: depth + 1,
                            max: max_depth,
                        });
                    }
                    walk_widgets(children, depth + 1, max_depth, c);
                    Ok(())
                });
            }
            Err(err) => collector.run_node("widget", GROUP_WIDGET, |_| Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn log_widget(service: &str) -> Value {
        json!({"definition": {"type": "log_stream", "query": format!("service:{service}")}})
    }

    #[test]
    fn group_children_flatten_into_parent() {
        let mut inventory = Inventory::default();
        inventory.ingest_dashboard(
            "d1",
            &json!({"widgets": [
                log_widget("top"),
                {"definition": {"type": "group", "widgets": [log_widget("inner")]}}
            ]}),
        );
        let result = inventory.deduplicate(ArtifactCategory::Dashboard);
        assert_eq!(result.services.get("d1"), Some(&set(&["inner", "top"])));
        assert_eq!(result.stats.nodes, 3);
    }

    #[test]
    fn nested_groups_beyond_the_bound_are_skipped() {
        let mut inventory = Inventory::default();
        inventory.ingest_dashboard(
            "d1",
            &json!({"widgets": [
                {"definition": {"type": "group", "widgets": [
                    log_widget("kept"),
                    {"definition": {"type": "group", "widgets": [log_widget("dropped")]}}
                ]}}
            ]}),
        );
        let result = inventory.deduplicate(ArtifactCategory::Dashboard);
        assert_eq!(result.services.get("d1"), Some(&set(&["kept"])));
        assert_eq!(result.stats.skipped, 1);

        let mut deeper = Inventory::new(ScanConfig { max_group_depth: 2 });
        deeper.ingest_dashboard(
            "d1",
            &json!({"widgets": [
                {"definition": {"type": "group", "widgets": [
                    {"definition": {"type": "group", "widgets": [log_widget("reached")]}}
                ]}}
            ]}),
        );
        assert_eq!(
            deeper.deduplicate(ArtifactCategory::Dashboard).services.get("d1"),
            Some(&set(&["reached"]))
        );
    }

    #[test]
    fn group_without_children_is_skipped() {
        let mut inventory = Inventory::default();
        inventory.ingest_dashboard(
            "d1",
            &json!({"widgets": [{"definition": {"type": "group"}}, log_widget("web")]}),
        );
        let result = inventory.deduplicate(ArtifactCategory::Dashboard);
        assert_eq!(result.services.get("d1"), Some(&set(&["web"])));
        assert_eq!(result.stats.skipped, 1);
    }

    #[test]
    fn dashboard_without_widgets_is_rejected() {
        let mut inventory = Inventory::default();
        inventory.ingest_dashboard("d1", &json!({"title": "empty"}));
        let scan = inventory.scan(ArtifactCategory::Dashboard);
        assert!(scan.tags().is_empty());
        assert_eq!(scan.stats().artifacts, 1);
        assert_eq!(scan.stats().skipped, 1);
    }

    #[test]
    fn monitor_ids_may_be_numbers() {
        let mut inventory = Inventory::default();
        inventory.ingest_monitor(&json!({
            "id": 1234,
            "type": "log alert",
            "query": "logs(\"service:api\").rollup(\"count\") > 1"
        }));
        inventory.ingest_monitor(&json!({"type": "log alert", "query": "service:orphan"}));
        let result = inventory.deduplicate(ArtifactCategory::Monitor);
        assert_eq!(result.services.get("1234"), Some(&set(&["api"])));
        assert_eq!(result.services.len(), 1);
        assert_eq!(result.stats.skipped, 1);
    }

    #[test]
    fn notebook_requests_with_and_without_queries() {
        let mut inventory = Inventory::default();
        inventory.ingest_notebook(&json!({
            "id": 77,
            "attributes": {"cells": [
                {"attributes": {"definition": {"type": "markdown", "text": "service:docs"}}},
                {"attributes": {"definition": {"type": "timeseries", "requests": [
                    {"queries": [{"data_source": "metrics", "query": "avg:cpu{service:web,env:prod}"}]},
                    {"data_source": "spans", "search": {"query": "service:api"}}
                ]}}},
                {"attributes": {}}
            ]}
        }));
        let result = inventory.deduplicate(ArtifactCategory::Notebook);
        assert_eq!(result.services.get("77"), Some(&set(&["api", "web"])));
        assert_eq!(result.stats.skipped, 1);
    }

    #[test]
    fn only_metric_slos_are_inspected() {
        let mut inventory = Inventory::default();
        inventory.ingest_slo(&json!({
            "id": "slo-a", "type": "metric",
            "query": {"numerator": "sum:hits{service:web,code:2xx}", "denominator": "sum:hits{service:web}"}
        }));
        inventory.ingest_slo(&json!({"id": "slo-b", "type": "monitor", "monitor_ids": [1]}));
        let result = inventory.deduplicate(ArtifactCategory::Slo);
        assert_eq!(result.services.get("slo-a"), Some(&set(&["web"])));
        assert_eq!(result.services.get("slo-b"), None);
        assert_eq!(result.stats.unsupported.get("monitor"), Some(&1));
    }

    #[test]
    fn categories_never_leak() {
        let mut inventory = Inventory::default();
        inventory.ingest_dashboard("shared", &json!({"widgets": [log_widget("dash")]}));
        inventory.ingest_monitor(
            &json!({"id": "shared", "type": "metric alert", "query": "avg:x{service:mon}"}),
        );
        let report = inventory.finish();
        let dashboards = report.category(ArtifactCategory::Dashboard).unwrap();
        let monitors = report.category(ArtifactCategory::Monitor).unwrap();
        assert_eq!(dashboards.services.get("shared"), Some(&set(&["dash"])));
        assert_eq!(monitors.services.get("shared"), Some(&set(&["mon"])));
        assert_eq!(report.categories.len(), 4);
    }

    #[test]
    fn ingest_uses_document_id_for_dashboards() {
        let mut inventory = Inventory::default();
        inventory.ingest(
            ArtifactCategory::Dashboard,
            None,
            &json!({"id": "abc-123", "widgets": [log_widget("web")]}),
        );
        inventory.ingest(ArtifactCategory::Dashboard, None, &json!({"widgets": []}));
        let result = inventory.deduplicate(ArtifactCategory::Dashboard);
        assert_eq!(result.services.get("abc-123"), Some(&set(&["web"])));
        assert_eq!(result.stats.artifacts, 2);
        assert_eq!(result.stats.skipped, 1);
    }
}
