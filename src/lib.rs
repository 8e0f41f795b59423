//! ESC-M: Ethical Supply Chain Mapper
//!
//! Ingests a supplier CSV, assigns each supplier a heuristic ESG risk tier,
//! shows a simulated multi-tier supply graph, checks sanctions and news
//! feeds for alerts, requests an AI risk narrative per supplier and exports
//! a compliance report.
//!
//! # Components
//!
//! - [`supplier`]: CSV Loader, supplier records and the Risk Scorer
//! - [`graph`]: Graph Builder, force-directed layout and SVG renderer
//! - [`alerts`]: sanctions and news lookups per supplier
//! - [`narrative`]: prompt template and chat-completion client
//! - [`report`]: paged PDF compliance report and raw-data export
//! - [`session`] / [`view`]: per-session state and the five dashboard stages
//! - [`http`]: the dashboard server
//!
//! ## Example Usage
//!
//! ```rust
//! use escm::supplier::{CsvLoader, RiskTier};
//! use escm::graph::build_multi_tier_graph;
//!
//! let csv = "exported by\nsupplier portal\nid;PRINCIPLE_1;PRINCIPLE_2\nA;5;3\nB;15;10\n";
//! let mut table = CsvLoader::new().load(csv.as_bytes()).unwrap();
//! table.score();
//!
//! assert_eq!(table.get("A").unwrap().predicted_risk, Some(RiskTier::Low));
//! assert_eq!(table.get("B").unwrap().predicted_risk, Some(RiskTier::High));
//!
//! let graph = build_multi_tier_graph(&table, 3);
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod alerts;
pub mod config;
pub mod graph;
pub mod http;
pub mod narrative;
pub mod report;
pub mod session;
pub mod supplier;
pub mod view;

// Re-export main types for convenience
pub use supplier::{
    CsvLoader, FieldValue, LoadError, LoadResult, RiskInputs, RiskTier, SupplierRecord,
    SupplierTable,
};

pub use graph::{
    build_multi_tier_graph, render_svg, spring_layout, GraphError, GraphResult, Layout,
    RiskDistribution, SupplyGraph,
};

pub use alerts::{
    AlertError, AlertLevel, AlertRecord, AlertResult, AlertsEngine, NewsArticle, NewsSource,
    SanctionsMatch, SanctionsSource,
};

pub use narrative::{NarrativeConfig, NarrativeError, NarrativeGenerator, NarrativeResult};

pub use report::{ComplianceReport, ReportError, ReportResult};

pub use session::{AiReportStore, SessionContext};

pub use view::{Dashboard, Stage, ViewError, ViewResult};

pub use config::AppConfig;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
