//! Seeded force-directed (Fruchterman-Reingold) layout
//!
//! Edges are treated as undirected springs. Positions are centered on the
//! origin and scaled so the largest coordinate magnitude is 1.

use super::store::SupplyGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Seed used by the dashboard so the same table always draws the same way
pub const LAYOUT_SEED: u64 = 42;

const ITERATIONS: usize = 50;
const MIN_DISTANCE: f64 = 0.01;

/// Node positions indexed by `NodeId`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub positions: Vec<(f64, f64)>,
}

impl Layout {
    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        self.positions.get(index).copied()
    }
}

pub fn spring_layout(graph: &SupplyGraph, seed: u64) -> Layout {
    let n = graph.node_count();
    if n == 0 {
        return Layout { positions: Vec::new() };
    }
    if n == 1 {
        return Layout {
            positions: vec![(0.0, 0.0)],
        };
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let mut adjacent = vec![vec![false; n]; n];
    for edge in graph.edges() {
        let (s, t) = (edge.source.as_usize(), edge.target.as_usize());
        adjacent[s][t] = true;
        adjacent[t][s] = true;
    }

    let k = (1.0 / n as f64).sqrt();
    let mut temperature = 0.1 * span(&pos);
    let cooling = temperature / (ITERATIONS as f64 + 1.0);

    for _ in 0..ITERATIONS {
        let mut displacement = vec![[0.0f64; 2]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                let force = k * k / (distance * distance) - attraction;
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
            }
        }
        for i in 0..n {
            let [dx, dy] = displacement[i];
            let length = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            pos[i][0] += dx * temperature / length;
            pos[i][1] += dy * temperature / length;
        }
        temperature -= cooling;
    }

    Layout {
        positions: rescale(pos),
    }
}

/// Larger of the x and y extents
fn span(pos: &[[f64; 2]]) -> f64 {
    let extent = |axis: usize| {
        let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        hi - lo
    };
    extent(0).max(extent(1))
}

fn rescale(pos: Vec<[f64; 2]>) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let cx = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = pos.iter().map(|p| p[1]).sum::<f64>() / n;
    let centered: Vec<(f64, f64)> = pos.iter().map(|p| (p[0] - cx, p[1] - cy)).collect();
    let limit = centered
        .iter()
        .fold(0.0f64, |acc, (x, y)| acc.max(x.abs()).max(y.abs()));
    if limit > 0.0 {
        centered.into_iter().map(|(x, y)| (x / limit, y / limit)).collect()
    } else {
        centered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> SupplyGraph {
        let mut graph = SupplyGraph::new(3);
        let ids: Vec<_> = (0..n).map(|i| graph.ensure_node(&format!("Supplier_{}", i))).collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1], 2, None).unwrap();
        }
        graph
    }

    #[test]
    fn test_layout_is_deterministic_for_a_seed() {
        let graph = chain(6);
        assert_eq!(spring_layout(&graph, LAYOUT_SEED), spring_layout(&graph, LAYOUT_SEED));
        assert_ne!(spring_layout(&graph, LAYOUT_SEED), spring_layout(&graph, 7));
    }

    #[test]
    fn test_positions_are_normalised() {
        let layout = spring_layout(&chain(5), LAYOUT_SEED);
        assert_eq!(layout.positions.len(), 5);
        let max = layout
            .positions
            .iter()
            .fold(0.0f64, |acc, (x, y)| acc.max(x.abs()).max(y.abs()));
        assert!((max - 1.0).abs() < 1e-9);
        assert!(layout.positions.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn test_trivial_graphs() {
        assert!(spring_layout(&SupplyGraph::new(3), LAYOUT_SEED).positions.is_empty());
        assert_eq!(spring_layout(&chain(1), LAYOUT_SEED).positions, vec![(0.0, 0.0)]);
    }
}
