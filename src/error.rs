//! Error types for guided_pathfinding

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathfindingError {
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("No path found after expanding {expanded} nodes")]
    NoPathFound { expanded: usize },

    #[error("Search budget exhausted after expanding {expanded} nodes")]
    BudgetExhausted { expanded: usize },

    #[error("Waypoint provider failed: {0}")]
    WaypointProvider(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PathfindingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PathfindingError::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Number of nodes expanded before the search gave up, if this is a search failure.
    pub fn expanded(&self) -> Option<usize> {
        match self {
            PathfindingError::NoPathFound { expanded }
            | PathfindingError::BudgetExhausted { expanded } => Some(*expanded),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PathfindingError>;
