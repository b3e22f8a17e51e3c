//! Token extractors for query text.

use once_cell::sync::Lazy;
use regex::Regex;

static BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(.*?)\}").expect("valid regex"));
static SERVICE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"service:\w+").expect("valid regex"));

/// Every substring enclosed in `{ ... }`, shortest match first, left to right.
///
/// Metric queries carry their scope as a brace-wrapped filter clause, e.g.
/// `avg:system.cpu{service:checkout,env:prod}` yields
/// `service:checkout,env:prod`.
pub fn extract_braced(text: &str) -> Vec<String> {
    BRACED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Every non-overlapping `service:<word chars>` token, left to right.
pub fn extract_service_token(text: &str) -> Vec<String> {
    SERVICE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
