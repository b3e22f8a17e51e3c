//! # Service tag extraction
//!
//! Finds which services saved observability artifacts (dashboards, monitors,
//! notebooks, SLOs) reference, by scanning their query and filter text.
//!
//! ## Architecture
//!
//! ```text
//! Artifact document (serde_json::Value)
//!     │
//!     ├──> Traversal (Inventory)
//!     │    └─> dashboards flatten `group` widgets into the parent id
//!     │
//!     ├──> Dispatch tables (widget kind / monitor kind / data source)
//!     │    └─> unknown discriminators fall through to a no-op
//!     │
//!     ├──> Field extraction strategies
//!     │    ├─> braced clauses:  avg:cpu{service:web,env:prod}
//!     │    └─> service tokens:  service:web
//!     │
//!     ├──> Tag accumulator (raw tokens per artifact id)
//!     │
//!     └──> Deduplicator (canonical service names per artifact id)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use svcinv_extract::{ArtifactCategory, Inventory};
//!
//! let mut inventory = Inventory::default();
//! inventory.ingest_monitor(&json!({
//!     "id": 1,
//!     "type": "metric alert",
//!     "query": "avg(last_5m):avg:trace.http.request.duration{service:billing} > 1"
//! }));
//!
//! let monitors = inventory.deduplicate(ArtifactCategory::Monitor);
//! assert!(monitors.services["1"].contains("billing"));
//! ```

mod accumulator;
mod config;
mod dedupe;
mod dispatch;
mod document;
mod error;
mod inventory;
mod kinds;
mod matchers;
mod strategies;

pub use accumulator::TagAccumulator;
pub use config::ScanConfig;
pub use dedupe::{deduplicate, TokenShape, TEMPLATE_MARKER};
pub use dispatch::{dispatch_monitor, dispatch_query, dispatch_widget, Collector};
pub use error::{ExtractError, Result};
pub use inventory::{CategoryScan, Inventory};
pub use kinds::{
    DataSource, MonitorKind, MonitorStrategy, QueryStrategy, WidgetKind, WidgetStrategy,
    GROUP_WIDGET,
};
pub use matchers::{extract_braced, extract_service_token};
pub use svcinv_protocol::{ArtifactCategory, CategoryInventory, InventoryReport, ScanStats};
