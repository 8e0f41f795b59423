//! Graph Builder
//!
//! Each row becomes a tier-1 node. The next row is linked as its tier-2
//! supplier and the row after that as tier 3, reached through the tier-2
//! node. Every edge carries the risk of the tier-1 row it was derived from.
//! This is a demonstration fixture; no supplier relationship column is read.

use super::store::SupplyGraph;
use super::types::supplier_node_name;
use crate::supplier::SupplierTable;
use tracing::debug;

pub const DEFAULT_TIERS: usize = 3;

/// Build the demonstration graph. `tiers` is recorded on the graph but the
/// chain is always two hops deep.
pub fn build_multi_tier_graph(table: &SupplierTable, tiers: usize) -> SupplyGraph {
    let mut graph = SupplyGraph::new(tiers);
    let rows = table.rows();

    for (i, row) in rows.iter().enumerate() {
        let supplier = graph.add_node(&supplier_node_name(&row.id), 1, row.predicted_risk);

        if let Some(next) = rows.get(i + 1) {
            let t2 = graph.ensure_node(&supplier_node_name(&next.id));
            // Both ids were just produced by this graph
            let _ = graph.add_edge(supplier, t2, 2, row.predicted_risk);

            if let Some(after) = rows.get(i + 2) {
                let t3 = graph.ensure_node(&supplier_node_name(&after.id));
                let _ = graph.add_edge(t2, t3, 3, row.predicted_risk);
            }
        }
    }

    debug!(
        "Built supply graph: {} nodes, {} edges (tiers = {})",
        graph.node_count(),
        graph.edge_count(),
        tiers
    );
    graph
}
