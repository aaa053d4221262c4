use crate::algorithms::common::{Frontier, PathfindingAlgorithm, SearchLimits, SearchResult};
use crate::error::{PathfindingError, Result};
use crate::grid::{Environment, Node};
use log::{debug, trace};
use rustc_hash::FxHashSet;

/// Best meeting point seen so far and the total cost through it.
#[derive(Debug, Clone, Copy)]
struct Meeting {
    node: Node,
    cost: f64,
}

/// Bidirectional best-first search: one frontier from the start, one from the goal.
///
/// Each round expands one node per frontier. Whenever a relaxed node already
/// has a g-cost in the opposite frontier it becomes a meeting candidate, and
/// the search stops at the end of the first round that produced one. The
/// cheapest candidate of that round wins; no later round is run to prove it
/// globally minimal, so the returned path can be longer than the optimum.
#[derive(Debug, Clone, Default)]
pub struct Bidirectional {
    limits: SearchLimits,
}

impl Bidirectional {
    pub fn new() -> Self {
        Bidirectional::default()
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        Bidirectional { limits }
    }
}

/// Expands one node of `own`, recording meeting candidates against `other`.
/// Returns false if `own` had nothing left to expand.
fn expand(
    env: &Environment,
    own: &mut Frontier,
    other: &Frontier,
    target: Node,
    best: &mut Option<Meeting>,
) -> bool {
    let Some(s) = own.pop() else {
        return false;
    };

    for s_n in env.neighbors_within_bounds(s) {
        if own.is_closed(s_n) {
            continue;
        }
        let cost = env.edge_cost(s, s_n);
        let Some(g_own) = own.relax(s, s_n, cost, s_n.distance(target)) else {
            continue;
        };
        if let Some(g_other) = other.g(s_n) {
            let candidate = g_own + g_other;
            if best.map_or(true, |m| candidate < m.cost) {
                trace!(
                    "[Bidirectional] meeting candidate ({},{}) cost {:.3}",
                    s_n.x,
                    s_n.y,
                    candidate
                );
                *best = Some(Meeting {
                    node: s_n,
                    cost: candidate,
                });
            }
        }
    }
    true
}

impl PathfindingAlgorithm for Bidirectional {
    fn name(&self) -> &'static str {
        "bidirectional"
    }

    fn find_path(&self, env: &Environment, start: Node, goal: Node) -> Result<SearchResult> {
        env.validate_endpoints(start, goal)?;

        let mut forward = Frontier::new(start, start.distance(goal));
        let mut backward = Frontier::new(goal, goal.distance(start));
        let mut best = (start == goal).then_some(Meeting {
            node: start,
            cost: 0.0,
        });

        while best.is_none() {
            self.limits
                .check(forward.closed_len() + backward.closed_len())?;

            let forward_alive = expand(env, &mut forward, &backward, goal, &mut best);
            let backward_alive = expand(env, &mut backward, &forward, start, &mut best);

            if !forward_alive && !backward_alive {
                let expanded = forward.closed_len() + backward.closed_len();
                debug!(
                    "[Bidirectional] FAILED: both frontiers exhausted after {} expansions",
                    expanded
                );
                return Err(PathfindingError::NoPathFound { expanded });
            }
        }

        let meeting = best.map(|m| m.node).unwrap_or(start);
        let mut path = forward.path_to(meeting);
        let goal_side = backward.path_to(meeting);
        path.extend(goal_side.into_iter().rev().skip(1));

        let visited: FxHashSet<Node> = forward
            .closed()
            .union(backward.closed())
            .copied()
            .collect();
        let mut visited: Vec<Node> = visited.into_iter().collect();
        visited.sort_unstable();
        let storage = forward.costed().union(backward.costed()).count();

        debug!(
            "[Bidirectional] met at ({},{}): {} expansions, {} path nodes",
            meeting.x,
            meeting.y,
            forward.closed_len() + backward.closed_len(),
            path.len()
        );

        let mut result = SearchResult::new(path, visited, storage);
        result.operation = forward.closed_len() + backward.closed_len();
        Ok(result)
    }
}
