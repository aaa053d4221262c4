use crate::algorithms::common::SearchLimits;
use crate::algorithms::waypoint::SubgoalPolicy;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmKind {
    #[value(name = "a_star")]
    AStar,
    Bidirectional,
    Waypoint,
    All,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmKind::AStar => "a_star",
            AlgorithmKind::Bidirectional => "bidirectional",
            AlgorithmKind::Waypoint => "waypoint",
            AlgorithmKind::All => "all",
        };
        f.write_str(name)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// JSON query file; the built-in demo scene is used when omitted
    #[arg(long)]
    pub query: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = AlgorithmKind::AStar)]
    pub algorithm: AlgorithmKind,

    /// File holding a waypoint suggestion (JSON list or free text with [x, y] pairs)
    #[arg(long)]
    pub waypoints: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = SubgoalPolicy::Sequential)]
    pub subgoal_policy: SubgoalPolicy,

    #[arg(long)]
    pub max_expansions: Option<usize>,

    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print the scene, visited cells and path as ASCII
    #[arg(long, default_value_t = false)]
    pub render: bool,

    /// Write the result JSON here
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub batch_mode: bool,

    #[arg(long, default_value_t = 10)]
    pub num_simulations: usize,

    #[arg(long, default_value_t = 51)]
    pub grid_width: i32,

    #[arg(long, default_value_t = 31)]
    pub grid_height: i32,

    #[arg(long, default_value_t = 4)]
    pub num_barriers: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads for batch mode
    #[arg(long, default_value_t = 4)]
    pub threads: usize,

    #[arg(long, default_value = "batch_results.csv")]
    pub output_file: PathBuf,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Fresh limits; any deadline starts counting from this call.
    pub fn search_limits(&self) -> SearchLimits {
        let mut limits = SearchLimits::unlimited();
        if let Some(max) = self.max_expansions {
            limits = limits.with_max_expansions(max);
        }
        if let Some(ms) = self.timeout_ms {
            limits = limits.with_timeout(Duration::from_millis(ms));
        }
        limits
    }
}
