//! Type discriminators and the dispatch tables that route them.
//!
//! Each discriminator string is parsed into a closed enum with an explicit
//! `Unknown` case; an exhaustive `match` then binds every kind to the strategy
//! that handles it. Adding support for a new widget, monitor or data source
//! means adding a variant here and an arm in the matching `strategy()`.

use std::fmt;

/// Discriminator of a dashboard widget that only contains other widgets.
pub const GROUP_WIDGET: &str = "group";

/// Strategy bound to a widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetStrategy {
    Timeseries,
    CheckStatus,
    Events,
    Hostmap,
    ListStream,
    LogStream,
    ManageStatus,
    Scatterplot,
    ServiceMap,
    TopologyMap,
    TraceService,
    Unsupported,
}

/// Strategy bound to a monitor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorStrategy {
    GenericAlert,
    SyntheticsAlert,
    RumAlert,
    Unsupported,
}

/// Strategy bound to a query data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStrategy {
    Metrics,
    Search,
    RumIssueStream,
    Process,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Change,
    CheckStatus,
    Distribution,
    EventStream,
    EventTimeline,
    Funnel,
    Geomap,
    Heatmap,
    Hostmap,
    ListStream,
    LogStream,
    ManageStatus,
    QueryTable,
    QueryValue,
    Scatterplot,
    Servicemap,
    SloList,
    Sunburst,
    Timeseries,
    Toplist,
    TopologyMap,
    TraceService,
    Treemap,
    Unknown(String),
}

impl WidgetKind {
    /// Every discriminator with a registered strategy.
    pub const KNOWN: &'static [&'static str] = &[
        "change",
        "check_status",
        "distribution",
        "event_stream",
        "event_timeline",
        "funnel",
        "geomap",
        "heatmap",
        "hostmap",
        "list_stream",
        "log_stream",
        "manage_status",
        "query_table",
        "query_value",
        "scatterplot",
        "servicemap",
        "slo_list",
        "sunburst",
        "timeseries",
        "toplist",
        "topology_map",
        "trace_service",
        "treemap",
    ];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "change" => Self::Change,
            "check_status" => Self::CheckStatus,
            "distribution" => Self::Distribution,
            "event_stream" => Self::EventStream,
            "event_timeline" => Self::EventTimeline,
            "funnel" => Self::Funnel,
            "geomap" => Self::Geomap,
            "heatmap" => Self::Heatmap,
            "hostmap" => Self::Hostmap,
            "list_stream" => Self::ListStream,
            "log_stream" => Self::LogStream,
            "manage_status" => Self::ManageStatus,
            "query_table" => Self::QueryTable,
            "query_value" => Self::QueryValue,
            "scatterplot" => Self::Scatterplot,
            "servicemap" => Self::Servicemap,
            "slo_list" => Self::SloList,
            "sunburst" => Self::Sunburst,
            "timeseries" => Self::Timeseries,
            "toplist" => Self::Toplist,
            "topology_map" => Self::TopologyMap,
            "trace_service" => Self::TraceService,
            "treemap" => Self::Treemap,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Change => "change",
            Self::CheckStatus => "check_status",
            Self::Distribution => "distribution",
            Self::EventStream => "event_stream",
            Self::EventTimeline => "event_timeline",
            Self::Funnel => "funnel",
            Self::Geomap => "geomap",
            Self::Heatmap => "heatmap",
            Self::Hostmap => "hostmap",
            Self::ListStream => "list_stream",
            Self::LogStream => "log_stream",
            Self::ManageStatus => "manage_status",
            Self::QueryTable => "query_table",
            Self::QueryValue => "query_value",
            Self::Scatterplot => "scatterplot",
            Self::Servicemap => "servicemap",
            Self::SloList => "slo_list",
            Self::Sunburst => "sunburst",
            Self::Timeseries => "timeseries",
            Self::Toplist => "toplist",
            Self::TopologyMap => "topology_map",
            Self::TraceService => "trace_service",
            Self::Treemap => "treemap",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn strategy(&self) -> WidgetStrategy {
        match self {
            Self::Change
            | Self::Distribution
            | Self::Funnel
            | Self::Geomap
            | Self::Heatmap
            | Self::QueryTable
            | Self::QueryValue
            | Self::Sunburst
            | Self::Timeseries
            | Self::Toplist
            | Self::Treemap => WidgetStrategy::Timeseries,
            Self::CheckStatus => WidgetStrategy::CheckStatus,
            Self::EventStream | Self::EventTimeline => WidgetStrategy::Events,
            Self::Hostmap => WidgetStrategy::Hostmap,
            Self::ListStream | Self::SloList => WidgetStrategy::ListStream,
            Self::LogStream => WidgetStrategy::LogStream,
            Self::ManageStatus => WidgetStrategy::ManageStatus,
            Self::Scatterplot => WidgetStrategy::Scatterplot,
            Self::Servicemap => WidgetStrategy::ServiceMap,
            Self::TopologyMap => WidgetStrategy::TopologyMap,
            Self::TraceService => WidgetStrategy::TraceService,
            Self::Unknown(_) => WidgetStrategy::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonitorKind {
    AuditAlert,
    Composite,
    ErrorTrackingAlert,
    EventV2Alert,
    LogAlert,
    MetricAlert,
    ProcessAlert,
    QueryAlert,
    RumAlert,
    ServiceCheck,
    SloAlert,
    SyntheticsAlert,
    TraceAnalyticsAlert,
    Unknown(String),
}

impl MonitorKind {
    pub const KNOWN: &'static [&'static str] = &[
        "audit alert",
        "composite",
        "error-tracking alert",
        "event-v2 alert",
        "log alert",
        "metric alert",
        "process alert",
        "query alert",
        "rum alert",
        "service check",
        "slo alert",
        "synthetics alert",
        "trace-analytics alert",
    ];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "audit alert" => Self::AuditAlert,
            "composite" => Self::Composite,
            "error-tracking alert" => Self::ErrorTrackingAlert,
            "event-v2 alert" => Self::EventV2Alert,
            "log alert" => Self::LogAlert,
            "metric alert" => Self::MetricAlert,
            "process alert" => Self::ProcessAlert,
            "query alert" => Self::QueryAlert,
            "rum alert" => Self::RumAlert,
            "service check" => Self::ServiceCheck,
            "slo alert" => Self::SloAlert,
            "synthetics alert" => Self::SyntheticsAlert,
            "trace-analytics alert" => Self::TraceAnalyticsAlert,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AuditAlert => "audit alert",
            Self::Composite => "composite",
            Self::ErrorTrackingAlert => "error-tracking alert",
            Self::EventV2Alert => "event-v2 alert",
            Self::LogAlert => "log alert",
            Self::MetricAlert => "metric alert",
            Self::ProcessAlert => "process alert",
            Self::QueryAlert => "query alert",
            Self::RumAlert => "rum alert",
            Self::ServiceCheck => "service check",
            Self::SloAlert => "slo alert",
            Self::SyntheticsAlert => "synthetics alert",
            Self::TraceAnalyticsAlert => "trace-analytics alert",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn strategy(&self) -> MonitorStrategy {
        match self {
            Self::AuditAlert
            | Self::ErrorTrackingAlert
            | Self::EventV2Alert
            | Self::LogAlert
            | Self::MetricAlert
            | Self::ProcessAlert
            | Self::QueryAlert
            | Self::ServiceCheck
            | Self::TraceAnalyticsAlert => MonitorStrategy::GenericAlert,
            Self::SyntheticsAlert => MonitorStrategy::SyntheticsAlert,
            Self::RumAlert => MonitorStrategy::RumAlert,
            // Composite monitors only reference other monitors by id, and SLO
            // alerts reference an SLO; neither carries query text.
            Self::Composite | Self::SloAlert => MonitorStrategy::Unsupported,
            Self::Unknown(_) => MonitorStrategy::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    AppSecSpans,
    Audit,
    CiPipelines,
    CiTests,
    CloudCost,
    DatabaseQueries,
    Events,
    IncidentAnalytics,
    Logs,
    Metrics,
    Network,
    NetworkDeviceFlows,
    Process,
    Profiles,
    Rum,
    RumIssueStream,
    SecuritySignals,
    Spans,
    SyntheticsBatches,
    SyntheticsTestRuns,
    Unknown(String),
}

impl DataSource {
    pub const KNOWN: &'static [&'static str] = &[
        "app_sec_spans",
        "audit",
        "ci_pipelines",
        "ci_tests",
        "cloud_cost",
        "database_queries",
        "events",
        "incident_analytics",
        "logs",
        "metrics",
        "network",
        "network_device_flows",
        "process",
        "profiles",
        "rum",
        "rum_issue_stream",
        "security_signals",
        "spans",
        "synthetics_batches",
        "synthetics_test_runs",
    ];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "app_sec_spans" => Self::AppSecSpans,
            "audit" => Self::Audit,
            "ci_pipelines" => Self::CiPipelines,
            "ci_tests" => Self::CiTests,
            "cloud_cost" => Self::CloudCost,
            "database_queries" => Self::DatabaseQueries,
            "events" => Self::Events,
            "incident_analytics" => Self::IncidentAnalytics,
            "logs" => Self::Logs,
            "metrics" => Self::Metrics,
            "network" => Self::Network,
            "network_device_flows" => Self::NetworkDeviceFlows,
            "process" => Self::Process,
            "profiles" => Self::Profiles,
            "rum" => Self::Rum,
            "rum_issue_stream" => Self::RumIssueStream,
            "security_signals" => Self::SecuritySignals,
            "spans" => Self::Spans,
            "synthetics_batches" => Self::SyntheticsBatches,
            "synthetics_test_runs" => Self::SyntheticsTestRuns,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AppSecSpans => "app_sec_spans",
            Self::Audit => "audit",
            Self::CiPipelines => "ci_pipelines",
            Self::CiTests => "ci_tests",
            Self::CloudCost => "cloud_cost",
            Self::DatabaseQueries => "database_queries",
            Self::Events => "events",
            Self::IncidentAnalytics => "incident_analytics",
            Self::Logs => "logs",
            Self::Metrics => "metrics",
            Self::Network => "network",
            Self::NetworkDeviceFlows => "network_device_flows",
            Self::Process => "process",
            Self::Profiles => "profiles",
            Self::Rum => "rum",
            Self::RumIssueStream => "rum_issue_stream",
            Self::SecuritySignals => "security_signals",
            Self::Spans => "spans",
            Self::SyntheticsBatches => "synthetics_batches",
            Self::SyntheticsTestRuns => "synthetics_test_runs",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn strategy(&self) -> QueryStrategy {
        match self {
            Self::Metrics | Self::CloudCost => QueryStrategy::Metrics,
            Self::AppSecSpans
            | Self::Audit
            | Self::CiPipelines
            | Self::CiTests
            | Self::DatabaseQueries
            | Self::Events
            | Self::IncidentAnalytics
            | Self::Logs
            | Self::Network
            | Self::NetworkDeviceFlows
            | Self::Profiles
            | Self::Rum
            | Self::SecuritySignals
            | Self::Spans
            | Self::SyntheticsBatches
            | Self::SyntheticsTestRuns => QueryStrategy::Search,
            Self::RumIssueStream => QueryStrategy::RumIssueStream,
            Self::Process => QueryStrategy::Process,
            Self::Unknown(_) => QueryStrategy::Unsupported,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widgets_round_trip_and_are_routed() {
        for raw in WidgetKind::KNOWN {
            let kind = WidgetKind::parse(raw);
            assert_eq!(kind.as_str(), *raw);
            assert_ne!(kind.strategy(), WidgetStrategy::Unsupported, "{raw}");
        }
    }

    #[test]
    fn known_monitors_round_trip() {
        for raw in MonitorKind::KNOWN {
            let kind = MonitorKind::parse(raw);
            assert!(!matches!(kind, MonitorKind::Unknown(_)), "{raw}");
            assert_eq!(kind.as_str(), *raw);
        }
    }

    #[test]
    fn composite_and_slo_alert_are_registered_no_ops() {
        assert_eq!(MonitorKind::parse("composite"), MonitorKind::Composite);
        assert_eq!(
            MonitorKind::Composite.strategy(),
            MonitorStrategy::Unsupported
        );
        assert_eq!(MonitorKind::SloAlert.strategy(), MonitorStrategy::Unsupported);
    }

    #[test]
    fn known_data_sources_round_trip_and_are_routed() {
        for raw in DataSource::KNOWN {
            let source = DataSource::parse(raw);
            assert_eq!(source.as_str(), *raw);
            assert_ne!(source.strategy(), QueryStrategy::Unsupported, "{raw}");
        }
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(
            WidgetKind::parse("Timeseries"),
            WidgetKind::Unknown("Timeseries".to_string())
        );
        assert_eq!(
            DataSource::parse(" metrics").strategy(),
            QueryStrategy::Unsupported
        );
        assert_eq!(
            MonitorKind::parse("metric").strategy(),
            MonitorStrategy::Unsupported
        );
    }

    #[test]
    fn group_is_not_a_leaf_kind() {
        assert_eq!(
            WidgetKind::parse(GROUP_WIDGET).strategy(),
            WidgetStrategy::Unsupported
        );
    }

    #[test]
    fn family_sizes() {
        let timeseries = WidgetKind::KNOWN
            .iter()
            .filter(|raw| WidgetKind::parse(raw).strategy() == WidgetStrategy::Timeseries)
            .count();
        assert_eq!(timeseries, 11);
        let generic = MonitorKind::KNOWN
            .iter()
            .filter(|raw| MonitorKind::parse(raw).strategy() == MonitorStrategy::GenericAlert)
            .count();
        assert_eq!(generic, 9);
        let metrics = DataSource::KNOWN
            .iter()
            .filter(|raw| DataSource::parse(raw).strategy() == QueryStrategy::Metrics)
            .count();
        assert_eq!(metrics, 2);
    }
}
