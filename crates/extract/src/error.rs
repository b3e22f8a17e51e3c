use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures local to a single widget, query or monitor.
///
/// None of these abort a scan: the traversal logs them, counts the node as
/// skipped and moves on to the next sibling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// An expected field is absent
    #[error("missing field `{path}`")]
    MissingField { path: String },

    /// A field exists but holds the wrong JSON type
    #[error("field `{path}` is not {expected}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
    },

    /// Group widgets nested deeper than the configured bound
    #[error("group widget nesting depth {depth} exceeds maximum {max}")]
    DepthExceeded { depth: usize, max: usize },
}

impl ExtractError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    pub fn unexpected(path: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedType {
            path: path.into(),
            expected,
        }
    }
}
