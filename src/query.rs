use crate::error::Result;
use crate::grid::{Environment, HorizontalBarrier, Node, VerticalBarrier};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Structured scene description as handed over by the query provider.
///
/// Barrier triples are `[y, x_min, x_max]` for horizontal and
/// `[x, y_min, y_max]` for vertical segments; ranges are `[min, max_exclusive]`.
/// Unknown fields (such as a redundant `size`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub start: Node,
    pub goal: Node,
    #[serde(default)]
    pub horizontal_barriers: Vec<[i32; 3]>,
    #[serde(default)]
    pub vertical_barriers: Vec<[i32; 3]>,
    pub range_x: [i32; 2],
    pub range_y: [i32; 2],
}

impl Query {
    /// The two-room scene used when no query file is given.
    pub fn demo() -> Self {
        Query {
            start: Node::new(10, 5),
            goal: Node::new(10, 15),
            horizontal_barriers: vec![[10, 0, 25], [15, 30, 50]],
            vertical_barriers: vec![[25, 10, 22]],
            range_x: [0, 51],
            range_y: [0, 31],
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Builds the shared environment. Bounds are adjusted here and nowhere else.
    pub fn environment(&self) -> Result<Environment> {
        Environment::new(
            self.range_x,
            self.range_y,
            self.horizontal_barriers
                .iter()
                .copied()
                .map(HorizontalBarrier::from_triple)
                .collect(),
            self.vertical_barriers
                .iter()
                .copied()
                .map(VerticalBarrier::from_triple)
                .collect(),
        )
    }
}
