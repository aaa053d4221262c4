use crate::algorithms::a_star::{BestFirstSearch, Guide, NeighborMode};
use crate::algorithms::common::{Frontier, PathfindingAlgorithm, SearchLimits, SearchResult};
use crate::error::Result;
use crate::grid::{Environment, Node};
use clap::ValueEnum;
use log::{debug, trace, warn};

/// Where the waypoint engine's heuristic points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SubgoalPolicy {
    /// Aim at the pending waypoint, then on to the goal; advance once the waypoint is closed.
    #[default]
    Sequential,
    /// Always aim at the final goal. Waypoints are validated and reported only.
    #[value(name = "goal_only")]
    GoalOnly,
}

/// Drops waypoints on obstructed cells or outside the one-cell interior margin,
/// then makes sure the list starts at `start` and ends at `goal`.
pub fn filter_waypoints(env: &Environment, start: Node, goal: Node, raw: &[Node]) -> Vec<Node> {
    let (x_min, x_max) = env.range_x();
    let (y_min, y_max) = env.range_y();

    let mut targets: Vec<Node> = raw
        .iter()
        .copied()
        .filter(|&n| {
            let inside = x_min + 1 < n.x && n.x < x_max - 1 && y_min + 1 < n.y && n.y < y_max - 1;
            let keep = inside && !env.is_obstructed(n);
            if !keep {
                warn!("[Waypoint] discarding ({},{})", n.x, n.y);
            }
            keep
        })
        .collect();

    if targets.first() != Some(&start) {
        targets.insert(0, start);
    }
    if targets.last() != Some(&goal) {
        targets.push(goal);
    }
    targets
}

/// Heuristic that walks through the finalized waypoint list.
struct SubgoalGuide {
    targets: Vec<Node>,
    pointer: usize,
    goal: Node,
    policy: SubgoalPolicy,
}

impl SubgoalGuide {
    fn new(targets: Vec<Node>, goal: Node, policy: SubgoalPolicy) -> Self {
        let pointer = 1.min(targets.len() - 1);
        SubgoalGuide {
            targets,
            pointer,
            goal,
            policy,
        }
    }

    fn current(&self) -> Node {
        self.targets[self.pointer]
    }
}

impl Guide for SubgoalGuide {
    fn estimate(&self, node: Node) -> f64 {
        match self.policy {
            SubgoalPolicy::GoalOnly => node.distance(self.goal),
            SubgoalPolicy::Sequential => {
                let target = self.current();
                node.distance(target) + target.distance(self.goal)
            }
        }
    }

    fn on_closed(&mut self, _node: Node, frontier: &Frontier) -> bool {
        if self.policy == SubgoalPolicy::GoalOnly {
            return false;
        }
        let before = self.pointer;
        while self.pointer + 1 < self.targets.len() && frontier.is_closed(self.current()) {
            self.pointer += 1;
        }
        if self.pointer != before {
            let next = self.current();
            trace!(
                "[Waypoint] sub-goal {} reached, now targeting ({},{})",
                before,
                next.x,
                next.y
            );
            return true;
        }
        false
    }
}

/// Best-first search seeded with an externally supplied waypoint list.
///
/// Uses the true Euclidean distance (admissible on its own) and costs all
/// eight moves without bounds pruning, leaving `edge_cost` to reject invalid ones.
#[derive(Debug, Clone, Default)]
pub struct WaypointSearch {
    waypoints: Vec<Node>,
    policy: SubgoalPolicy,
    limits: SearchLimits,
}

impl WaypointSearch {
    pub fn new(waypoints: Vec<Node>) -> Self {
        WaypointSearch {
            waypoints,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: SubgoalPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl PathfindingAlgorithm for WaypointSearch {
    fn name(&self) -> &'static str {
        "waypoint"
    }

    fn find_path(&self, env: &Environment, start: Node, goal: Node) -> Result<SearchResult> {
        env.validate_endpoints(start, goal)?;

        let targets = filter_waypoints(env, start, goal, &self.waypoints);
        debug!(
            "[Waypoint] {} of {} suggested waypoints kept, policy {:?}",
            targets.len().saturating_sub(2),
            self.waypoints.len(),
            self.policy
        );

        let guide = SubgoalGuide::new(targets, goal, self.policy);
        let search = BestFirstSearch::new(
            env,
            start,
            goal,
            guide,
            NeighborMode::Unfiltered,
            self.limits,
        );
        let (path, frontier, guide) = search.run()?;

        let mut result = SearchResult::new(path, frontier.visited(), frontier.costed().len());
        result.waypoints_used = Some(guide.targets);
        Ok(result)
    }
}
