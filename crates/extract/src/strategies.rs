//! Field extraction strategies.
//!
//! Each strategy knows which fields of its sub-type hold query or filter text
//! and which matcher understands that text. Any missing field fails the whole
//! node; the dispatcher then rolls back what the node pushed.

use crate::dispatch::{dispatch_query, Collector};
use crate::document::{array_field, opt_array_field, opt_field, str_field, str_list};
use crate::error::Result;
use crate::kinds::{MonitorStrategy, QueryStrategy, WidgetStrategy};
use crate::matchers::{extract_braced, extract_service_token};
use serde_json::Value;

fn service_tokens_at(doc: &Value, path: &str, collector: &mut Collector<'_>) -> Result<()> {
    let text = str_field(doc, path)?;
    collector.push(extract_service_token(text));
    Ok(())
}

fn braced_at(doc: &Value, path: &str, collector: &mut Collector<'_>) -> Result<()> {
    let text = str_field(doc, path)?;
    collector.push(extract_braced(text));
    Ok(())
}

/// Match every element of a string list independently.
fn service_tokens_in_list(doc: &Value, path: &str, collector: &mut Collector<'_>) -> Result<()> {
    for item in str_list(doc, path)? {
        collector.push(extract_service_token(item));
    }
    Ok(())
}

/// A bare service name becomes a literal `service:<name>` token.
fn literal_service_at(doc: &Value, path: &str, collector: &mut Collector<'_>) -> Result<()> {
    let name = str_field(doc, path)?;
    collector.push([format!("service:{name}")]);
    Ok(())
}

impl WidgetStrategy {
    /// Apply to a widget `definition`.
    pub fn apply(self, definition: &Value, collector: &mut Collector<'_>) -> Result<()> {
        match self {
            WidgetStrategy::Timeseries => {
                for request in array_field(definition, "requests")? {
                    for query in opt_array_field(request, "queries")? {
                        dispatch_query(query, collector);
                    }
                }
                Ok(())
            }
            WidgetStrategy::CheckStatus => service_tokens_in_list(definition, "tags", collector),
            WidgetStrategy::Events | WidgetStrategy::LogStream | WidgetStrategy::ManageStatus => {
                service_tokens_at(definition, "query", collector)
            }
            WidgetStrategy::Hostmap => {
                braced_at(definition, "requests.fill.q", collector)?;
                if opt_field(definition, "scope").is_some() {
                    service_tokens_in_list(definition, "scope", collector)?;
                }
                Ok(())
            }
            WidgetStrategy::ListStream => {
                for request in array_field(definition, "requests")? {
                    service_tokens_at(request, "query.query_string", collector)?;
                }
                Ok(())
            }
            WidgetStrategy::Scatterplot => {
                let Some(table) = opt_field(definition, "requests.table") else {
                    return Ok(());
                };
                for query in opt_array_field(table, "queries")? {
                    dispatch_query(query, collector);
                }
                Ok(())
            }
            WidgetStrategy::ServiceMap => service_tokens_in_list(definition, "filters", collector),
            WidgetStrategy::TopologyMap => {
                literal_service_at(definition, "requests.0.query.service", collector)
            }
            WidgetStrategy::TraceService => literal_service_at(definition, "service", collector),
            WidgetStrategy::Unsupported => Ok(()),
        }
    }
}

impl QueryStrategy {
    pub fn apply(self, query: &Value, collector: &mut Collector<'_>) -> Result<()> {
        match self {
            QueryStrategy::Metrics => braced_at(query, "query", collector),
            QueryStrategy::Search => service_tokens_at(query, "search.query", collector),
            QueryStrategy::RumIssueStream => {
                service_tokens_at(query, "search.query.query_string", collector)
            }
            QueryStrategy::Process => service_tokens_at(query, "query_filter", collector),
            QueryStrategy::Unsupported => Ok(()),
        }
    }
}

impl MonitorStrategy {
    pub fn apply(self, monitor: &Value, collector: &mut Collector<'_>) -> Result<()> {
        match self {
            MonitorStrategy::GenericAlert => service_tokens_at(monitor, "query", collector),
            MonitorStrategy::SyntheticsAlert => service_tokens_in_list(monitor, "tags", collector),
            MonitorStrategy::RumAlert => match opt_field(monitor, "variables") {
                Some(_) => {
                    for variable in array_field(monitor, "variables")? {
                        service_tokens_at(variable, "search.query", collector)?;
                    }
                    Ok(())
                }
                None => service_tokens_at(monitor, "query", collector),
            },
            MonitorStrategy::Unsupported => Ok(()),
        }
    }
}

/// Metric SLOs keep their service filters in the numerator and denominator.
pub(crate) fn metric_slo(slo: &Value, collector: &mut Collector<'_>) -> Result<()> {
    service_tokens_at(slo, "query.denominator", collector)?;
    service_tokens_at(slo, "query.numerator", collector)
}
