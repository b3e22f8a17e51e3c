use serde::{Deserialize, Serialize};

/// Tunables for a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// How many levels of `group` widgets are flattened into their dashboard.
    /// Platform dashboards only nest one level.
    pub max_group_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_group_depth: 1 }
    }
}

impl ScanConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_group_depth > 8 {
            return Err(format!(
                "max_group_depth ({}) cannot exceed 8",
                self.max_group_depth
            ));
        }
        Ok(())
    }
}
