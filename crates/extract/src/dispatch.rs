//! Routing of widgets, queries and monitors to their strategies.

use crate::accumulator::TagAccumulator;
use crate::document::{field, opt_field};
use crate::error::ExtractError;
use crate::kinds::{
    DataSource, MonitorKind, MonitorStrategy, QueryStrategy, WidgetKind, WidgetStrategy,
};
use serde_json::Value;
use svcinv_protocol::{ArtifactCategory, ScanStats};

/// Collects the tokens of one artifact while its nodes are dispatched.
///
/// Tokens are buffered until [`Collector::flush`], so a node that fails half
/// way can roll back whatever it pushed.
pub struct Collector<'a> {
    category: ArtifactCategory,
    artifact_id: &'a str,
    tags: &'a mut TagAccumulator,
    stats: &'a mut ScanStats,
    pending: Vec<String>,
}

impl<'a> Collector<'a> {
    pub fn new(
        category: ArtifactCategory,
        artifact_id: &'a str,
        tags: &'a mut TagAccumulator,
        stats: &'a mut ScanStats,
    ) -> Self {
        Self {
            category,
            artifact_id,
            tags,
            stats,
            pending: Vec::new(),
        }
    }

    pub fn category(&self) -> ArtifactCategory {
        self.category
    }

    pub fn artifact_id(&self) -> &str {
        self.artifact_id
    }

    pub fn push(&mut self, tokens: impl IntoIterator<Item = String>) {
        self.pending.extend(tokens);
    }

    /// Hand the buffered tokens to the category accumulator.
    pub fn flush(&mut self) {
        let tokens = std::mem::take(&mut self.pending);
        self.tags.append_or_create(self.artifact_id, tokens);
    }

    /// Run `apply` as one dispatch-table node, rolling back its tokens and
    /// counting it as skipped when it fails.
    pub(crate) fn run_node(
        &mut self,
        node: &str,
        discriminator: &str,
        apply: impl FnOnce(&mut Self) -> crate::error::Result<()>,
    ) {
        self.stats.nodes += 1;
        let mark = self.pending.len();
        if let Err(err) = apply(self) {
            self.pending.truncate(mark);
            self.skip(node, discriminator, &err);
        }
    }

    pub(crate) fn skip(&mut self, node: &str, discriminator: &str, err: &ExtractError) {
        self.stats.skipped += 1;
        log::warn!(
            "{} {}: skipping {node} `{discriminator}`: {err}",
            self.category,
            self.artifact_id
        );
    }

    fn unsupported(&mut self, node: &str, discriminator: &str) {
        self.stats.record_unsupported(discriminator);
        log::debug!(
            "{} {}: unsupported {node} `{discriminator}`",
            self.category,
            self.artifact_id
        );
    }
}

fn discriminator<'v>(doc: &'v Value, path: &str) -> &'v str {
    opt_field(doc, path).and_then(Value::as_str).unwrap_or_default()
}

/// Route a dashboard leaf widget by `definition.type`.
pub fn dispatch_widget(widget: &Value, collector: &mut Collector<'_>) {
    let kind = WidgetKind::parse(discriminator(widget, "definition.type"));
    let strategy = kind.strategy();
    collector.run_node("widget", kind.as_str(), |c| {
        if strategy == WidgetStrategy::Unsupported {
            c.unsupported("widget", kind.as_str());
            return Ok(());
        }
        let definition = field(widget, "definition")?;
        strategy.apply(definition, c)
    });
}

/// Route a query by `data_source`.
pub fn dispatch_query(query: &Value, collector: &mut Collector<'_>) {
    let source = DataSource::parse(discriminator(query, "data_source"));
    let strategy = source.strategy();
    collector.run_node("query", source.as_str(), |c| {
        if strategy == QueryStrategy::Unsupported {
            c.unsupported("query", source.as_str());
            return Ok(());
        }
        strategy.apply(query, c)
    });
}

/// Route a monitor by its `type`.
pub fn dispatch_monitor(monitor: &Value, collector: &mut Collector<'_>) {
    let kind = MonitorKind::parse(discriminator(monitor, "type"));
    let strategy = kind.strategy();
    collector.run_node("monitor", kind.as_str(), |c| {
        if strategy == MonitorStrategy::Unsupported {
            c.unsupported("monitor", kind.as_str());
            return Ok(());
        }
        strategy.apply(monitor, c)
    });
}
