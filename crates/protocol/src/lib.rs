use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Kind of saved platform object scanned for service references.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    Dashboard,
    Monitor,
    Notebook,
    Slo,
}

impl ArtifactCategory {
    /// Every category, in the order a full run visits them.
    pub const ALL: [ArtifactCategory; 4] = [
        ArtifactCategory::Notebook,
        ArtifactCategory::Monitor,
        ArtifactCategory::Slo,
        ArtifactCategory::Dashboard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ArtifactCategory::Dashboard => "dashboard",
            ArtifactCategory::Monitor => "monitor",
            ArtifactCategory::Notebook => "notebook",
            ArtifactCategory::Slo => "slo",
        }
    }

    /// Section heading used by the text report.
    pub const fn label(self) -> &'static str {
        match self {
            ArtifactCategory::Dashboard => "DASHBOARDS",
            ArtifactCategory::Monitor => "MONITORS",
            ArtifactCategory::Notebook => "NOTEBOOKS",
            ArtifactCategory::Slo => "SLOS",
        }
    }

    /// Whether artifacts with no surviving service names stay in the result.
    ///
    /// Only SLOs are kept: a metric SLO that references no service is still
    /// worth listing, while an empty dashboard or monitor is noise.
    pub const fn keeps_empty_artifacts(self) -> bool {
        matches!(self, ArtifactCategory::Slo)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "dashboards" => Some(ArtifactCategory::Dashboard),
            "monitor" | "monitors" => Some(ArtifactCategory::Monitor),
            "notebook" | "notebooks" => Some(ArtifactCategory::Notebook),
            "slo" | "slos" => Some(ArtifactCategory::Slo),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected while one category is traversed.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct ScanStats {
    /// Artifacts handed to the engine.
    pub artifacts: usize,
    /// Widgets, queries and monitors routed through a dispatch table.
    pub nodes: usize,
    /// Nodes abandoned because an expected field was missing or malformed.
    pub skipped: usize,
    /// Discriminator -> number of times it was routed to the no-op strategy.
    #[serde(default)]
    pub unsupported: BTreeMap<String, usize>,
}

impl ScanStats {
    pub fn record_unsupported(&mut self, discriminator: &str) {
        *self
            .unsupported
            .entry(discriminator.to_string())
            .or_insert(0) += 1;
    }

    pub fn unsupported_total(&self) -> usize {
        self.unsupported.values().sum()
    }
}

/// Deduplicated services for every artifact of one category.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct CategoryInventory {
    pub category: ArtifactCategory,
    /// Artifact id -> canonical service names.
    pub services: BTreeMap<String, BTreeSet<String>>,
    pub stats: ScanStats,
}

impl CategoryInventory {
    pub fn new(category: ArtifactCategory) -> Self {
        Self {
            category,
            services: BTreeMap::new(),
            stats: ScanStats::default(),
        }
    }

    /// Every distinct service referenced anywhere in this category.
    pub fn distinct_services(&self) -> BTreeSet<&str> {
        self.services
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct InventoryReport {
    pub schema_version: u32,
    pub categories: Vec<CategoryInventory>,
}

impl Default for InventoryReport {
    fn default() -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            categories: Vec::new(),
        }
    }
}

impl InventoryReport {
    pub fn category(&self, category: ArtifactCategory) -> Option<&CategoryInventory> {
        self.categories.iter().find(|c| c.category == category)
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// JSON Schema describing [`InventoryReport`].
pub fn report_schema() -> Result<String> {
    let schema = schemars::schema_for!(InventoryReport);
    serialize_json_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn category_parse_accepts_singular_and_plural() {
        assert_eq!(ArtifactCategory::parse("SLOs"), Some(ArtifactCategory::Slo));
        assert_eq!(
            ArtifactCategory::parse(" dashboard "),
            Some(ArtifactCategory::Dashboard)
        );
        assert_eq!(ArtifactCategory::parse("synthetics"), None);
    }

    #[test]
    fn only_slos_keep_empty_artifacts() {
        let keeping: Vec<_> = ArtifactCategory::ALL
            .into_iter()
            .filter(|c| c.keeps_empty_artifacts())
            .collect();
        assert_eq!(keeping, vec![ArtifactCategory::Slo]);
    }

    #[test]
    fn report_serializes_categories_in_snake_case() {
        let mut monitors = CategoryInventory::new(ArtifactCategory::Monitor);
        monitors.services.insert(
            "42".to_string(),
            BTreeSet::from(["billing".to_string()]),
        );
        monitors.stats.record_unsupported("composite");
        let report = InventoryReport {
            categories: vec![monitors],
            ..Default::default()
        };

        let value: serde_json::Value =
            serde_json::from_str(&serialize_json(&report).unwrap()).unwrap();
        assert_eq!(value["schema_version"], REPORT_SCHEMA_VERSION);
        assert_eq!(value["categories"][0]["category"], "monitor");
        assert_eq!(value["categories"][0]["services"]["42"][0], "billing");
        assert_eq!(value["categories"][0]["stats"]["unsupported"]["composite"], 1);
    }

    #[test]
    fn distinct_services_spans_artifacts() {
        let mut dashboards = CategoryInventory::new(ArtifactCategory::Dashboard);
        dashboards.services.insert(
            "d1".to_string(),
            BTreeSet::from(["a".to_string(), "b".to_string()]),
        );
        dashboards
            .services
            .insert("d2".to_string(), BTreeSet::from(["b".to_string()]));
        assert_eq!(
            dashboards.distinct_services().into_iter().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn schema_mentions_report_fields() {
        let schema = report_schema().unwrap();
        assert!(schema.contains("schema_version"));
        assert!(schema.contains("categories"));
    }
}
