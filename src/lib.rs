//! Guided shortest-path search on a bounded integer grid with axis-aligned
//! barrier segments.
//!
//! Three engines share one [`grid::Environment`]: best-first A*, a
//! bidirectional variant that stops at the first meeting, and a
//! waypoint-seeded search that steers through externally suggested cells.

pub mod algorithms;
pub mod batch_simulation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod query;
pub mod render;
pub mod simulation;
pub mod statistics;
pub mod waypoints;

pub use error::{PathfindingError, Result};
