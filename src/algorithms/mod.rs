pub mod a_star;
pub mod bidirectional;
pub mod common;
pub mod waypoint;
