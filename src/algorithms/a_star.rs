use crate::algorithms::common::{Frontier, PathfindingAlgorithm, SearchLimits, SearchResult};
use crate::error::{PathfindingError, Result};
use crate::grid::{Environment, Node};
use log::{debug, trace};

/// Supplies heuristic estimates to a best-first search and may retarget them as nodes close.
pub(crate) trait Guide {
    fn estimate(&self, node: Node) -> f64;

    /// Called after `node` is closed. Returns true when estimates changed and
    /// the open set must be re-keyed.
    fn on_closed(&mut self, _node: Node, _frontier: &Frontier) -> bool {
        false
    }
}

/// Squared Euclidean distance to the goal.
struct SquaredDistance {
    goal: Node,
}

impl Guide for SquaredDistance {
    fn estimate(&self, node: Node) -> f64 {
        node.distance_squared(self.goal)
    }
}

/// How candidate neighbors are produced before costing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NeighborMode {
    /// Drop neighbors that fail `is_within_bounds`.
    WithinBounds,
    /// Cost all eight moves; `edge_cost` rejects invalid ones.
    Unfiltered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Ready,
    Running,
    Succeeded,
    Failed,
}

/// Single-frontier best-first search shared by the unidirectional and waypoint engines.
pub(crate) struct BestFirstSearch<'a, G> {
    env: &'a Environment,
    goal: Node,
    guide: G,
    neighbors: NeighborMode,
    limits: SearchLimits,
    frontier: Frontier,
    state: SearchState,
}

impl<'a, G: Guide> BestFirstSearch<'a, G> {
    pub(crate) fn new(
        env: &'a Environment,
        start: Node,
        goal: Node,
        guide: G,
        neighbors: NeighborMode,
        limits: SearchLimits,
    ) -> Self {
        let frontier = Frontier::new(start, guide.estimate(start));
        BestFirstSearch {
            env,
            goal,
            guide,
            neighbors,
            limits,
            frontier,
            state: SearchState::Ready,
        }
    }

    /// Drives the search to completion. On success returns the path and the
    /// frontier it was grown from.
    pub(crate) fn run(mut self) -> Result<(Vec<Node>, Frontier, G)> {
        self.state = SearchState::Running;
        trace!(
            "[BestFirst] start=({},{}) goal=({},{})",
            self.frontier.origin().x,
            self.frontier.origin().y,
            self.goal.x,
            self.goal.y
        );

        while self.state == SearchState::Running {
            self.limits.check(self.frontier.closed_len())?;
            self.state = self.step();
        }

        let expanded = self.frontier.closed_len();
        match self.state {
            SearchState::Succeeded => {
                let path = self.frontier.path_to(self.goal);
                debug!(
                    "[BestFirst] reached goal: {} expansions, {} path nodes",
                    expanded,
                    path.len()
                );
                Ok((path, self.frontier, self.guide))
            }
            _ => {
                debug!("[BestFirst] FAILED: open set exhausted after {} expansions", expanded);
                Err(PathfindingError::NoPathFound { expanded })
            }
        }
    }

    /// Expands one node.
    fn step(&mut self) -> SearchState {
        let Some(s) = self.frontier.pop() else {
            return SearchState::Failed;
        };
        if s == self.goal {
            return SearchState::Succeeded;
        }

        if self.guide.on_closed(s, &self.frontier) {
            let guide = &self.guide;
            self.frontier.rekey(|n| guide.estimate(n));
        }

        let env = self.env;
        let candidates: Vec<Node> = match self.neighbors {
            NeighborMode::WithinBounds => env.neighbors_within_bounds(s).collect(),
            NeighborMode::Unfiltered => env.neighbors(s).collect(),
        };
        for s_n in candidates {
            if self.frontier.is_closed(s_n) {
                continue;
            }
            let cost = env.edge_cost(s, s_n);
            let h = self.guide.estimate(s_n);
            self.frontier.relax(s, s_n, cost, h);
        }
        SearchState::Running
    }
}

/// Unidirectional best-first search with a squared-distance heuristic.
///
/// The heuristic overestimates whenever the remaining distance exceeds one
/// cell, so the search prunes hard and may return a longer path than the
/// optimum. Use the waypoint engine without waypoints for an admissible search.
#[derive(Debug, Clone, Default)]
pub struct AStar {
    limits: SearchLimits,
}

impl AStar {
    pub fn new() -> Self {
        AStar::default()
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        AStar { limits }
    }
}

impl PathfindingAlgorithm for AStar {
    fn name(&self) -> &'static str {
        "a_star"
    }

    fn find_path(&self, env: &Environment, start: Node, goal: Node) -> Result<SearchResult> {
        env.validate_endpoints(start, goal)?;

        let search = BestFirstSearch::new(
            env,
            start,
            goal,
            SquaredDistance { goal },
            NeighborMode::WithinBounds,
            self.limits,
        );
        let (path, frontier, _) = search.run()?;
        Ok(SearchResult::new(
            path,
            frontier.visited(),
            frontier.costed().len(),
        ))
    }
}
