//! Multi-tier supply graph
//!
//! This module covers:
//! - The directed [`SupplyGraph`] of `Supplier_<id>` nodes with tier-tagged edges
//! - The Graph Builder chaining rows i, i+1, i+2 into tiers 1, 2 and 3
//! - A seeded force-directed layout and an SVG renderer coloring edges by risk
//! - The risk distribution chart shown next to the graph

pub mod builder;
pub mod distribution;
pub mod layout;
pub mod render;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::{build_multi_tier_graph, DEFAULT_TIERS};
pub use distribution::RiskDistribution;
pub use layout::{spring_layout, Layout, LAYOUT_SEED};
pub use render::{edge_color, render_svg};
pub use store::{GraphError, GraphResult, SupplyEdge, SupplyGraph, SupplyNode};
pub use types::{EdgeId, NodeId};
