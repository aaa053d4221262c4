//! Waypoint provider boundary.
//!
//! Suggestions may come from anywhere (a file, a model call made by the
//! caller, a hand-written list). The search core only ever sees the
//! resulting coordinate list.

use crate::error::{PathfindingError, Result};
use crate::grid::Node;
use crate::query::Query;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

pub trait WaypointProvider {
    fn suggest(&self, query: &Query) -> Result<Vec<Node>>;
}

/// Provides nothing; the waypoint engine then searches start to goal directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWaypoints;

impl WaypointProvider for NoWaypoints {
    fn suggest(&self, _query: &Query) -> Result<Vec<Node>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixedWaypoints(pub Vec<Node>);

impl WaypointProvider for FixedWaypoints {
    fn suggest(&self, _query: &Query) -> Result<Vec<Node>> {
        Ok(self.0.clone())
    }
}

/// Reads a saved response (JSON or free text) and extracts its coordinate pairs.
#[derive(Debug, Clone)]
pub struct TextFileWaypoints {
    pub path: PathBuf,
}

impl WaypointProvider for TextFileWaypoints {
    fn suggest(&self, _query: &Query) -> Result<Vec<Node>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            PathfindingError::WaypointProvider(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(parse_waypoint_list(&text))
    }
}

/// Asks `provider` for suggestions, treating any failure as an empty list.
pub fn waypoints_or_empty(provider: &dyn WaypointProvider, query: &Query) -> Vec<Node> {
    match provider.suggest(query) {
        Ok(nodes) => {
            info!("Waypoint provider suggested {} points", nodes.len());
            nodes
        }
        Err(e) => {
            warn!("{}; continuing without waypoints", e);
            Vec::new()
        }
    }
}

/// Extracts every `[x, y]` pair from `text`, ignoring surrounding prose and
/// outer list brackets. Non-integral numbers are rounded to the nearest cell.
pub fn parse_waypoint_list(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        rest = &rest[open + 1..];
        let Some(close) = rest.find(']') else {
            break;
        };
        let inner = &rest[..close];
        if inner.contains('[') {
            // Outer bracket of a nested list; the inner pairs come next.
            continue;
        }

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if let [x, y] = parts.as_slice() {
            if let (Ok(x), Ok(y)) = (x.parse::<f64>(), y.parse::<f64>()) {
                if x.is_finite() && y.is_finite() {
                    nodes.push(Node::new(x.round() as i32, y.round() as i32));
                }
            }
        }
        rest = &rest[close + 1..];
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_list() {
        let nodes = parse_waypoint_list("[[10, 5], [28, 8], [28,25], [10, 15]]");
        assert_eq!(
            nodes,
            vec![
                Node::new(10, 5),
                Node::new(28, 8),
                Node::new(28, 25),
                Node::new(10, 15)
            ]
        );
    }

    #[test]
    fn test_parse_with_prose() {
        let text = "Sure! A good route is: Generated Path: [[3, 4], [7.0, 8.4]]. Hope that helps.";
        assert_eq!(
            parse_waypoint_list(text),
            vec![Node::new(3, 4), Node::new(7, 8)]
        );
    }

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let text = "[[1, 2, 3], [a, b], [4, 5], []]";
        assert_eq!(parse_waypoint_list(text), vec![Node::new(4, 5)]);
        assert!(parse_waypoint_list("no coordinates here").is_empty());
        assert!(parse_waypoint_list("[[1, 2").is_empty());
    }

    struct Failing;

    impl WaypointProvider for Failing {
        fn suggest(&self, _query: &Query) -> Result<Vec<Node>> {
            Err(PathfindingError::WaypointProvider("model unavailable".into()))
        }
    }

    #[test]
    fn test_provider_failure_degrades_to_empty() {
        let query = Query::demo();
        assert!(waypoints_or_empty(&Failing, &query).is_empty());
        assert!(waypoints_or_empty(&NoWaypoints, &query).is_empty());
        let fixed = FixedWaypoints(vec![Node::new(28, 8)]);
        assert_eq!(waypoints_or_empty(&fixed, &query), vec![Node::new(28, 8)]);
    }

    #[test]
    fn test_missing_file_is_provider_error() {
        let provider = TextFileWaypoints {
            path: PathBuf::from("/nonexistent/waypoints.txt"),
        };
        assert!(matches!(
            provider.suggest(&Query::demo()),
            Err(PathfindingError::WaypointProvider(_))
        ));
    }
}
