use crate::algorithms::common::{path_length, SearchResult};
use crate::grid::{Environment, Node};
use pathfinding::prelude::dijkstra;
use std::fmt;
use std::time::Duration;

/// Edge costs are scaled to integers for the reference search.
const COST_SCALE: f64 = 1_000_000.0;

/// Length of a shortest collision-free route, found by exhaustive Dijkstra
/// over the same move costs the engines use. `None` if the goal is unreachable.
pub fn reference_optimal_length(env: &Environment, start: Node, goal: Node) -> Option<f64> {
    dijkstra(
        &start,
        |&node| {
            env.neighbors(node)
                .filter_map(|next| {
                    let cost = env.edge_cost(node, next);
                    cost.is_finite()
                        .then(|| (next, (cost * COST_SCALE).round() as u64))
                })
                .collect::<Vec<_>>()
        },
        |&node| node == goal,
    )
    .map(|(path, _)| path_length(&path))
}

#[derive(Debug, Clone)]
pub struct Statistics {
    pub algorithm: String,
    pub operation: usize,
    pub storage: usize,
    pub length: f64,
    pub path_nodes: usize,
    pub optimal_length: Option<f64>,
    pub route_efficiency: f64,
    pub elapsed: Duration,
}

impl Statistics {
    pub fn new(
        algorithm: &str,
        result: &SearchResult,
        optimal_length: Option<f64>,
        elapsed: Duration,
    ) -> Self {
        let mut stats = Statistics {
            algorithm: algorithm.to_string(),
            operation: result.operation,
            storage: result.storage,
            length: result.length,
            path_nodes: result.path.len(),
            optimal_length,
            route_efficiency: 0.0,
            elapsed,
        };
        stats.calculate_efficiency();
        stats
    }

    /// Ratio of reported length to the reference optimum; 1.0 means optimal.
    pub fn calculate_efficiency(&mut self) {
        self.route_efficiency = match self.optimal_length {
            Some(optimal) if optimal > 0.0 => self.length / optimal,
            Some(_) => 1.0,
            None => 0.0,
        };
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        writeln!(f, "Operation (expansions): {}", self.operation)?;
        writeln!(f, "Storage (costed nodes): {}", self.storage)?;
        writeln!(f, "Path length: {:.3} ({} nodes)", self.length, self.path_nodes)?;
        match self.optimal_length {
            Some(optimal) => {
                writeln!(f, "Reference optimal length: {:.3}", optimal)?;
                writeln!(f, "Route efficiency: {:.3}", self.route_efficiency)?;
                if self.route_efficiency > 1.0 + 1e-9 {
                    let extra = (self.route_efficiency - 1.0) * 100.0;
                    writeln!(f, "Note: {:.1}% longer than the reference route", extra)?;
                }
            }
            None => writeln!(f, "Reference optimal length: unavailable")?,
        }
        writeln!(f, "Search time: {:.2?}", self.elapsed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::VerticalBarrier;

    #[test]
    fn test_reference_on_open_grid_is_octile() {
        let env = Environment::new([0, 21], [0, 21], vec![], vec![]).unwrap();
        let length = reference_optimal_length(&env, Node::new(2, 2), Node::new(7, 4)).unwrap();
        let octile = 3.0 + 2.0 * std::f64::consts::SQRT_2;
        assert!((length - octile).abs() < 1e-9);
    }

    #[test]
    fn test_reference_unreachable() {
        let env = Environment::new(
            [0, 21],
            [0, 21],
            vec![],
            vec![VerticalBarrier::from_triple([10, 0, 20])],
        )
        .unwrap();
        assert!(reference_optimal_length(&env, Node::new(5, 5), Node::new(15, 5)).is_none());
    }

    #[test]
    fn test_efficiency() {
        let result = SearchResult {
            operation: 10,
            storage: 30,
            length: 12.0,
            path: vec![Node::new(0, 0)],
            visited: vec![],
            waypoints_used: None,
        };
        let stats = Statistics::new("a_star", &result, Some(10.0), Duration::ZERO);
        assert!((stats.route_efficiency - 1.2).abs() < 1e-12);
        assert!(stats.to_string().contains("20.0% longer"));

        let unknown = Statistics::new("a_star", &result, None, Duration::ZERO);
        assert_eq!(unknown.route_efficiency, 0.0);
    }
}
