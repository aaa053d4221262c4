use crate::error::{PathfindingError, Result};
use crate::geometry::segments_intersect;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Integer lattice coordinate. Ordering is lexicographic on (x, y).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Node {
    pub x: i32,
    pub y: i32,
}

impl Node {
    pub const fn new(x: i32, y: i32) -> Self {
        Node { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Node::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Node) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }

    pub fn distance_squared(self, other: Node) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx * dx + dy * dy
    }
}

impl From<[i32; 2]> for Node {
    fn from([x, y]: [i32; 2]) -> Self {
        Node::new(x, y)
    }
}

impl From<Node> for [i32; 2] {
    fn from(node: Node) -> Self {
        [node.x, node.y]
    }
}

/// Segment at fixed `y` spanning `x_min..=x_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalBarrier {
    pub y: i32,
    pub x_min: i32,
    pub x_max: i32,
}

impl HorizontalBarrier {
    /// Builds from the wire triple `[y, x_min, x_max]`.
    pub fn from_triple([y, a, b]: [i32; 3]) -> Self {
        HorizontalBarrier {
            y,
            x_min: a.min(b),
            x_max: a.max(b),
        }
    }

    /// The part of the barrier inside the closed box, if any.
    fn clipped(self, (x0, x1): (i32, i32), (y0, y1): (i32, i32)) -> Option<Self> {
        let (x_min, x_max) = (self.x_min.max(x0), self.x_max.min(x1));
        (y0 <= self.y && self.y <= y1 && x_min <= x_max).then_some(HorizontalBarrier {
            y: self.y,
            x_min,
            x_max,
        })
    }

    fn endpoints(&self) -> (Node, Node) {
        (Node::new(self.x_min, self.y), Node::new(self.x_max, self.y))
    }
}

/// Segment at fixed `x` spanning `y_min..=y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalBarrier {
    pub x: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl VerticalBarrier {
    /// Builds from the wire triple `[x, y_min, y_max]`.
    pub fn from_triple([x, a, b]: [i32; 3]) -> Self {
        VerticalBarrier {
            x,
            y_min: a.min(b),
            y_max: a.max(b),
        }
    }

    fn clipped(self, (x0, x1): (i32, i32), (y0, y1): (i32, i32)) -> Option<Self> {
        let (y_min, y_max) = (self.y_min.max(y0), self.y_max.min(y1));
        (x0 <= self.x && self.x <= x1 && y_min <= y_max).then_some(VerticalBarrier {
            x: self.x,
            y_min,
            y_max,
        })
    }

    fn endpoints(&self) -> (Node, Node) {
        (Node::new(self.x, self.y_min), Node::new(self.x, self.y_max))
    }
}

/// Largest accepted extent of either axis, in cells.
pub const MAX_SPAN: i64 = 1 << 16;

/// `[min, max_exclusive]` to the inclusive `(min, max)` used everywhere else.
fn adjusted_range(axis: &str, [lo, hi]: [i32; 2]) -> Result<(i32, i32)> {
    let max = i64::from(hi) - 1;
    let span = max - i64::from(lo);
    if span < 2 {
        return Err(PathfindingError::invalid(format!(
            "{} range [{}, {}] leaves no interior cells",
            axis, lo, hi
        )));
    }
    if span > MAX_SPAN {
        return Err(PathfindingError::invalid(format!(
            "{} range [{}, {}] exceeds {} cells",
            axis, lo, hi, MAX_SPAN
        )));
    }
    // lo + 2 <= max < hi, so max fits in i32.
    Ok((lo, max as i32))
}

/// Relative moves of the 8-connected neighborhood.
pub const MOTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// The static scene shared read-only by every search over it.
///
/// Bounds are stored already adjusted: a query range `[min, max_exclusive]`
/// becomes `min..=max_exclusive - 1`, and the lines at both ends of that
/// range are the domain boundary edges.
#[derive(Debug, Clone)]
pub struct Environment {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    horizontal: Vec<HorizontalBarrier>,
    vertical: Vec<VerticalBarrier>,
    obstacles: FxHashSet<Node>,
}

impl Environment {
    /// Barriers are clipped to the adjusted box; only moves inside it are ever tested.
    pub fn new(
        range_x: [i32; 2],
        range_y: [i32; 2],
        horizontal: Vec<HorizontalBarrier>,
        vertical: Vec<VerticalBarrier>,
    ) -> Result<Self> {
        let (x_min, x_max) = adjusted_range("x", range_x)?;
        let (y_min, y_max) = adjusted_range("y", range_y)?;
        let (bx, by) = ((x_min, x_max), (y_min, y_max));

        let mut env = Environment {
            x_min,
            x_max,
            y_min,
            y_max,
            horizontal: horizontal.into_iter().filter_map(|h| h.clipped(bx, by)).collect(),
            vertical: vertical.into_iter().filter_map(|v| v.clipped(bx, by)).collect(),
            obstacles: FxHashSet::default(),
        };
        env.obstacles = env.build_obstacle_index();
        Ok(env)
    }

    /// Cells on the domain border plus every lattice point covered by a barrier.
    fn build_obstacle_index(&self) -> FxHashSet<Node> {
        let mut obstacles = FxHashSet::default();
        for x in self.x_min..=self.x_max {
            obstacles.insert(Node::new(x, self.y_min));
            obstacles.insert(Node::new(x, self.y_max));
        }
        for y in self.y_min..=self.y_max {
            obstacles.insert(Node::new(self.x_min, y));
            obstacles.insert(Node::new(self.x_max, y));
        }
        for h in &self.horizontal {
            obstacles.extend((h.x_min..=h.x_max).map(|x| Node::new(x, h.y)));
        }
        for v in &self.vertical {
            obstacles.extend((v.y_min..=v.y_max).map(|y| Node::new(v.x, y)));
        }
        obstacles
    }

    /// Adjusted inclusive x range.
    pub fn range_x(&self) -> (i32, i32) {
        (self.x_min, self.x_max)
    }

    /// Adjusted inclusive y range.
    pub fn range_y(&self) -> (i32, i32) {
        (self.y_min, self.y_max)
    }

    pub fn horizontal_barriers(&self) -> &[HorizontalBarrier] {
        &self.horizontal
    }

    pub fn vertical_barriers(&self) -> &[VerticalBarrier] {
        &self.vertical
    }

    pub fn obstacles(&self) -> &FxHashSet<Node> {
        &self.obstacles
    }

    pub fn is_obstructed(&self, node: Node) -> bool {
        self.obstacles.contains(&node)
    }

    /// Neighbor pruning check. Deliberately independent of barriers;
    /// `blocks_move` is the collision authority.
    pub fn is_within_bounds(&self, node: Node) -> bool {
        self.x_min <= node.x && node.x < self.x_max && self.y_min <= node.y && node.y < self.y_max
    }

    fn boundary_edges(&self) -> [(Node, Node); 4] {
        let (x0, x1, y0, y1) = (self.x_min, self.x_max, self.y_min, self.y_max);
        [
            (Node::new(x0, y0), Node::new(x0, y1)),
            (Node::new(x1, y0), Node::new(x1, y1)),
            (Node::new(x0, y0), Node::new(x1, y0)),
            (Node::new(x0, y1), Node::new(x1, y1)),
        ]
    }

    /// True if the straight move from `a` to `b` touches any barrier or boundary edge.
    pub fn blocks_move(&self, a: Node, b: Node) -> bool {
        self.horizontal
            .iter()
            .map(HorizontalBarrier::endpoints)
            .chain(self.vertical.iter().map(VerticalBarrier::endpoints))
            .chain(self.boundary_edges())
            .any(|(b1, b2)| segments_intersect(a, b, b1, b2))
    }

    /// Euclidean length of the move, or infinity if it is blocked.
    pub fn edge_cost(&self, a: Node, b: Node) -> f64 {
        if self.blocks_move(a, b) {
            f64::INFINITY
        } else {
            a.distance(b)
        }
    }

    /// All eight candidate moves from `node`, without any filtering.
    pub fn neighbors(&self, node: Node) -> impl Iterator<Item = Node> {
        MOTIONS.into_iter().map(move |(dx, dy)| node.offset(dx, dy))
    }

    /// Candidate moves from `node` that pass the bounds check.
    pub fn neighbors_within_bounds(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.neighbors(node).filter(|n| self.is_within_bounds(*n))
    }

    /// Rejects start/goal pairs that no search could begin from.
    pub fn validate_endpoints(&self, start: Node, goal: Node) -> Result<()> {
        for (label, node) in [("start", start), ("goal", goal)] {
            if !self.is_within_bounds(node) {
                return Err(PathfindingError::invalid(format!(
                    "{} ({}, {}) is outside x {:?} y {:?}",
                    label,
                    node.x,
                    node.y,
                    self.range_x(),
                    self.range_y()
                )));
            }
            if self.is_obstructed(node) {
                return Err(PathfindingError::invalid(format!(
                    "{} ({}, {}) lies on an obstructed cell",
                    label, node.x, node.y
                )));
            }
        }
        Ok(())
    }
}
