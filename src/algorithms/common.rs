use crate::error::{PathfindingError, Result};
use crate::grid::{Environment, Node};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

pub trait PathfindingAlgorithm: Send + Sync {
    /// Short identifier used in logs, tables and CSV output.
    fn name(&self) -> &'static str;

    /// Runs one complete search over `env`. All frontier state lives and dies inside this call.
    fn find_path(&self, env: &Environment, start: Node, goal: Node) -> Result<SearchResult>;
}

/// Everything a finished search reports, independent of any renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Number of expansions (closed-set size).
    pub operation: usize,
    /// Number of distinct nodes whose move cost was evaluated.
    pub storage: usize,
    /// Sum of Euclidean distances between consecutive path nodes.
    pub length: f64,
    pub path: Vec<Node>,
    pub visited: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints_used: Option<Vec<Node>>,
}

impl SearchResult {
    pub(crate) fn new(path: Vec<Node>, visited: Vec<Node>, storage: usize) -> Self {
        SearchResult {
            operation: visited.len(),
            storage,
            length: path_length(&path),
            path,
            visited,
            waypoints_used: None,
        }
    }
}

pub fn path_length(path: &[Node]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Optional caller-supplied budget, checked at the top of every expansion loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    pub max_expansions: Option<usize>,
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Sets a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub(crate) fn check(&self, expanded: usize) -> Result<()> {
        let over_budget = self.max_expansions.is_some_and(|max| expanded >= max);
        let past_deadline = self.deadline.is_some_and(|d| Instant::now() >= d);
        if over_budget || past_deadline {
            return Err(PathfindingError::BudgetExhausted { expanded });
        }
        Ok(())
    }
}

/// Open-set entry. `Ord` is reversed so `BinaryHeap` pops the smallest f first;
/// equal f pops the lexicographically smallest coordinate first.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    node: Node,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Open/closed/g/parent state growing from a single origin.
///
/// Improved nodes are pushed again rather than decreased in place; stale
/// heap entries are skipped on pop once their node is closed.
#[derive(Debug)]
pub struct Frontier {
    origin: Node,
    open: BinaryHeap<OpenEntry>,
    closed: FxHashSet<Node>,
    g: FxHashMap<Node, f64>,
    parent: FxHashMap<Node, Node>,
    costed: FxHashSet<Node>,
}

impl Frontier {
    pub fn new(origin: Node, h_origin: f64) -> Self {
        let mut frontier = Frontier {
            origin,
            open: BinaryHeap::new(),
            closed: FxHashSet::default(),
            g: FxHashMap::default(),
            parent: FxHashMap::default(),
            costed: FxHashSet::default(),
        };
        frontier.g.insert(origin, 0.0);
        frontier.costed.insert(origin);
        frontier.open.push(OpenEntry {
            f: h_origin,
            node: origin,
        });
        frontier
    }

    pub fn origin(&self) -> Node {
        self.origin
    }

    /// Pops the best open node and closes it. Returns `None` once the open set is exhausted.
    pub fn pop(&mut self) -> Option<Node> {
        while let Some(entry) = self.open.pop() {
            if self.closed.insert(entry.node) {
                return Some(entry.node);
            }
        }
        None
    }

    pub fn is_closed(&self, node: Node) -> bool {
        self.closed.contains(&node)
    }

    /// Best known cost from the origin, if one has been established.
    pub fn g(&self, node: Node) -> Option<f64> {
        self.g.get(&node).copied()
    }

    /// Relaxes the move `from -> to` with edge cost `cost`.
    ///
    /// Closed targets are ignored. An infinite cost marks `to` as costed but
    /// never assigns it a g-cost. Returns the new g-cost when it improved.
    pub fn relax(&mut self, from: Node, to: Node, cost: f64, h: f64) -> Option<f64> {
        if self.closed.contains(&to) {
            return None;
        }
        self.costed.insert(to);
        if !cost.is_finite() {
            return None;
        }

        let new_cost = self.g(from)? + cost;
        if new_cost < self.g(to).unwrap_or(f64::INFINITY) {
            self.g.insert(to, new_cost);
            self.parent.insert(to, from);
            self.open.push(OpenEntry {
                f: new_cost + h,
                node: to,
            });
            return Some(new_cost);
        }
        None
    }

    /// Recomputes every open priority with a new heuristic, dropping stale duplicates.
    pub fn rekey(&mut self, h: impl Fn(Node) -> f64) {
        let mut seen = FxHashSet::default();
        let entries: Vec<OpenEntry> = self
            .open
            .drain()
            .filter(|e| !self.closed.contains(&e.node) && seen.insert(e.node))
            .map(|e| OpenEntry {
                f: self.g.get(&e.node).copied().unwrap_or(f64::INFINITY) + h(e.node),
                node: e.node,
            })
            .collect();
        self.open = entries.into_iter().collect();
    }

    /// Walks parents from `node` back to the origin. Returned path runs origin..=node.
    ///
    /// Parents always carry a strictly smaller g-cost, so the walk is bounded
    /// by the number of recorded parents.
    pub fn path_to(&self, node: Node) -> Vec<Node> {
        let mut path = vec![node];
        let mut current = node;
        while current != self.origin && path.len() <= self.parent.len() {
            match self.parent.get(&current) {
                Some(&prev) => {
                    path.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    pub fn closed(&self) -> &FxHashSet<Node> {
        &self.closed
    }

    pub fn costed(&self) -> &FxHashSet<Node> {
        &self.costed
    }

    /// Closed nodes in ascending coordinate order.
    pub fn visited(&self) -> Vec<Node> {
        let mut visited: Vec<Node> = self.closed.iter().copied().collect();
        visited.sort_unstable();
        visited
    }
}
