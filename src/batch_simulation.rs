use crate::algorithms::a_star::AStar;
use crate::algorithms::bidirectional::Bidirectional;
use crate::algorithms::common::PathfindingAlgorithm;
use crate::algorithms::waypoint::WaypointSearch;
use crate::config::{AlgorithmKind, Config};
use crate::error::{PathfindingError, Result};
use crate::grid::{Environment, Node};
use crate::query::Query;
use crate::statistics::reference_optimal_length;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;

const MAX_SCENE_ATTEMPTS: usize = 50;
const MAX_CELL_ATTEMPTS: usize = 200;
const MIN_SIDE: i32 = 8;

/// Random scene generator. Every scene it returns has a reachable goal.
pub struct SceneGenerator {
    width: i32,
    height: i32,
    num_barriers: usize,
}

impl SceneGenerator {
    pub fn new(width: i32, height: i32, num_barriers: usize) -> Result<Self> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(PathfindingError::invalid(format!(
                "batch grid {}x{} is smaller than {}x{}",
                width, height, MIN_SIDE, MIN_SIDE
            )));
        }
        Ok(SceneGenerator {
            width,
            height,
            num_barriers,
        })
    }

    /// Draws scenes until one has a route from start to goal.
    pub fn generate(&self, rng: &mut StdRng) -> Option<Query> {
        for attempt in 0..MAX_SCENE_ATTEMPTS {
            let mut query = self.random_barriers(rng);
            let Ok(env) = query.environment() else {
                continue;
            };
            let start = random_free_cell(&env, rng);
            let goal = random_free_cell(&env, rng);
            let (Some(start), Some(goal)) = (start, goal) else {
                continue;
            };
            if start == goal || reference_optimal_length(&env, start, goal).is_none() {
                debug!("Scene attempt {} has no route, regenerating", attempt);
                continue;
            }
            query.start = start;
            query.goal = goal;
            return Some(query);
        }
        None
    }

    fn random_barriers(&self, rng: &mut StdRng) -> Query {
        let (w, h) = (self.width - 1, self.height - 1);
        let mut horizontal = Vec::new();
        let mut vertical = Vec::new();

        for _ in 0..self.num_barriers {
            if rng.gen_bool(0.5) {
                let y = rng.gen_range(2..h - 1);
                let x0 = rng.gen_range(0..w);
                let len = rng.gen_range(2..=(w / 2).max(2));
                horizontal.push([y, x0, (x0 + len).min(w)]);
            } else {
                let x = rng.gen_range(2..w - 1);
                let y0 = rng.gen_range(0..h);
                let len = rng.gen_range(2..=(h / 2).max(2));
                vertical.push([x, y0, (y0 + len).min(h)]);
            }
        }

        Query {
            start: Node::default(),
            goal: Node::default(),
            horizontal_barriers: horizontal,
            vertical_barriers: vertical,
            range_x: [0, self.width],
            range_y: [0, self.height],
        }
    }
}

fn random_free_cell(env: &Environment, rng: &mut StdRng) -> Option<Node> {
    let (x_min, x_max) = env.range_x();
    let (y_min, y_max) = env.range_y();
    (0..MAX_CELL_ATTEMPTS)
        .map(|_| Node::new(rng.gen_range(x_min + 1..x_max), rng.gen_range(y_min + 1..y_max)))
        .find(|&node| env.is_within_bounds(node) && !env.is_obstructed(node))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub algorithm: String,
    pub grid_width: i32,
    pub grid_height: i32,
    pub num_barriers: usize,
    pub success: bool,
    pub operation: usize,
    pub storage: usize,
    pub length: f64,
    pub optimal_length: f64,
    pub route_efficiency: f64,
    pub execution_time_us: u64,
}

/// One whole search handed to a worker.
struct Job {
    simulation_id: usize,
    query: Arc<Query>,
    optimal_length: f64,
    algorithm: AlgorithmKind,
}

fn build_algorithm(kind: AlgorithmKind, config: &Config) -> Box<dyn PathfindingAlgorithm> {
    let limits = config.search_limits();
    match kind {
        AlgorithmKind::Bidirectional => Box::new(Bidirectional::with_limits(limits)),
        AlgorithmKind::Waypoint => Box::new(
            WaypointSearch::new(Vec::new())
                .with_policy(config.subgoal_policy)
                .with_limits(limits),
        ),
        AlgorithmKind::AStar | AlgorithmKind::All => Box::new(AStar::with_limits(limits)),
    }
}

fn run_job(job: &Job, config: &Config) -> BatchResult {
    let algorithm = build_algorithm(job.algorithm, config);
    let started = Instant::now();
    let outcome = job
        .query
        .environment()
        .and_then(|env| algorithm.find_path(&env, job.query.start, job.query.goal));
    let execution_time_us = started.elapsed().as_micros() as u64;

    let (success, operation, storage, length) = match &outcome {
        Ok(result) => (true, result.operation, result.storage, result.length),
        Err(e) => {
            debug!("Simulation {} {}: {}", job.simulation_id, algorithm.name(), e);
            (false, e.expanded().unwrap_or(0), 0, 0.0)
        }
    };
    let route_efficiency = if success && job.optimal_length > 0.0 {
        length / job.optimal_length
    } else {
        0.0
    };

    BatchResult {
        simulation_id: job.simulation_id,
        algorithm: algorithm.name().to_string(),
        grid_width: config.grid_width,
        grid_height: config.grid_height,
        num_barriers: config.num_barriers,
        success,
        operation,
        storage,
        length,
        optimal_length: job.optimal_length,
        route_efficiency,
        execution_time_us,
    }
}

pub struct BatchSimulation {
    config: Config,
    results: Vec<BatchResult>,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        BatchSimulation {
            config,
            results: Vec::new(),
            start_time: Instant::now(),
            batch_size: 100,
            total_results_written: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn run(&mut self) -> Result<()> {
        self.initialize_csv_file()?;
        if !self.config.quiet {
            println!("=== BATCH SIMULATION STARTED ===");
            println!("Grid size: {}x{}", self.config.grid_width, self.config.grid_height);
            println!("Barriers per scene: {}", self.config.num_barriers);
            println!("Simulations: {}", self.config.num_simulations);
            println!("Algorithm: {}", self.config.algorithm);
            println!("Worker threads: {}", self.config.threads.max(1));
            println!("Output file: {}", self.config.output_file.display());
            println!();
        }

        self.results = self.collect_results()?;

        for start in (0..self.results.len()).step_by(self.batch_size) {
            let end = (start + self.batch_size).min(self.results.len());
            self.flush_results_to_csv(start..end)?;
        }

        if !self.config.quiet {
            println!("\n=== BATCH SIMULATION COMPLETED ===");
            println!("Total results collected: {}", self.results.len());
            println!("Results saved to: {}", self.config.output_file.display());
            println!("Total time: {:.2?}", self.start_time.elapsed());
        } else {
            println!(
                "Batch simulation completed: {} results in {:.1}s -> {}",
                self.results.len(),
                self.start_time.elapsed().as_secs_f64(),
                self.config.output_file.display()
            );
        }
        Ok(())
    }

    /// Generates every scene, runs all jobs on the worker pool, and returns the
    /// results ordered by simulation id and algorithm.
    pub fn collect_results(&self) -> Result<Vec<BatchResult>> {
        let jobs = self.generate_jobs()?;
        let total_jobs = jobs.len();
        let threads = self.config.threads.max(1).min(total_jobs.max(1));
        info!("Dispatching {} searches to {} workers", total_jobs, threads);

        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let job_rx = Mutex::new(job_rx);
        let (result_tx, result_rx) = mpsc::channel::<BatchResult>();

        for job in jobs {
            job_tx.send(job).ok();
        }
        drop(job_tx);

        let mut results = thread::scope(|scope| {
            for _ in 0..threads {
                let job_rx = &job_rx;
                let result_tx = result_tx.clone();
                let config = &self.config;
                scope.spawn(move || loop {
                    let next = match job_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok(job) = next else {
                        break;
                    };
                    if result_tx.send(run_job(&job, config)).is_err() {
                        break;
                    }
                });
            }
            drop(result_tx);
            result_rx.iter().collect::<Vec<_>>()
        });

        if results.len() != total_jobs {
            warn!("{} of {} searches returned no result", total_jobs - results.len(), total_jobs);
        }

        let order = |name: &str| match name {
            "a_star" => 0,
            "bidirectional" => 1,
            _ => 2,
        };
        results.sort_by(|a, b| {
            a.simulation_id
                .cmp(&b.simulation_id)
                .then_with(|| order(&a.algorithm).cmp(&order(&b.algorithm)))
        });
        Ok(results)
    }

    fn generate_jobs(&self) -> Result<Vec<Job>> {
        let generator = SceneGenerator::new(
            self.config.grid_width,
            self.config.grid_height,
            self.config.num_barriers,
        )?;
        let base_seed = self.config.seed.unwrap_or_else(rand::random::<u64>);
        info!("Batch seed: {} (for reproducibility)", base_seed);

        let kinds: &[AlgorithmKind] = match self.config.algorithm {
            AlgorithmKind::All => &[
                AlgorithmKind::AStar,
                AlgorithmKind::Bidirectional,
                AlgorithmKind::Waypoint,
            ],
            AlgorithmKind::AStar => &[AlgorithmKind::AStar],
            AlgorithmKind::Bidirectional => &[AlgorithmKind::Bidirectional],
            AlgorithmKind::Waypoint => &[AlgorithmKind::Waypoint],
        };

        let mut jobs = Vec::new();
        for simulation_id in 0..self.config.num_simulations {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(simulation_id as u64));
            let Some(query) = generator.generate(&mut rng) else {
                warn!(
                    "Simulation {}: no solvable scene after {} attempts",
                    simulation_id, MAX_SCENE_ATTEMPTS
                );
                continue;
            };
            let env = query.environment()?;
            let optimal_length =
                reference_optimal_length(&env, query.start, query.goal).unwrap_or(0.0);
            let query = Arc::new(query);
            jobs.extend(kinds.iter().map(|&algorithm| Job {
                simulation_id,
                query: Arc::clone(&query),
                optimal_length,
                algorithm,
            }));
        }
        Ok(jobs)
    }

    fn flush_results_to_csv(&mut self, range: std::ops::Range<usize>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.output_file)?;

        for result in &self.results[range.clone()] {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{:.6},{:.6},{:.6},{}",
                result.simulation_id,
                result.algorithm,
                result.grid_width,
                result.grid_height,
                result.num_barriers,
                result.success,
                result.operation,
                result.storage,
                result.length,
                result.optimal_length,
                result.route_efficiency,
                result.execution_time_us
            )?;
        }

        self.total_results_written += range.len();
        if !self.config.quiet {
            println!(
                "Flushed {} results to CSV (total: {})",
                range.len(),
                self.total_results_written
            );
        }
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<()> {
        let mut file = std::fs::File::create(&self.config.output_file)?;
        writeln!(
            file,
            "simulation_id,algorithm,grid_width,grid_height,num_barriers,success,operation,storage,length,optimal_length,route_efficiency,execution_time_us"
        )?;
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SIMULATION SUMMARY ===");

        let mut algorithm_groups: FxHashMap<&str, Vec<&BatchResult>> = FxHashMap::default();
        for result in &self.results {
            algorithm_groups
                .entry(result.algorithm.as_str())
                .or_default()
                .push(result);
        }
        let mut names: Vec<&str> = algorithm_groups.keys().copied().collect();
        names.sort_unstable();

        for algorithm in names {
            let results = &algorithm_groups[algorithm];
            println!("\n{} Algorithm Results:", algorithm);
            let successful: Vec<&&BatchResult> = results.iter().filter(|r| r.success).collect();
            let total = results.len();
            let success_rate = (successful.len() as f64 / total as f64) * 100.0;

            println!("  Success rate: {}/{} ({:.1}%)", successful.len(), total, success_rate);

            if !successful.is_empty() {
                let n = successful.len() as f64;
                let avg_operation = successful.iter().map(|r| r.operation as f64).sum::<f64>() / n;
                let avg_efficiency = successful.iter().map(|r| r.route_efficiency).sum::<f64>() / n;
                let avg_time =
                    successful.iter().map(|r| r.execution_time_us as f64).sum::<f64>() / n;

                println!("  Average expansions: {:.1}", avg_operation);
                println!("  Average efficiency: {:.3}", avg_efficiency);
                println!("  Average search time: {:.1}us", avg_time);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn batch_config(extra: &[&str]) -> Config {
        let mut args = vec![
            "guided_pathfinding",
            "--quiet",
            "--batch-mode",
            "--grid-width",
            "21",
            "--grid-height",
            "17",
            "--num-barriers",
            "3",
            "--num-simulations",
            "4",
            "--seed",
            "7",
            "--threads",
            "3",
        ];
        args.extend_from_slice(extra);
        Config::parse_from(args)
    }

    #[test]
    fn test_generated_scenes_are_solvable() {
        let generator = SceneGenerator::new(21, 17, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5 {
            let query = generator.generate(&mut rng).unwrap();
            let env = query.environment().unwrap();
            assert!(env.validate_endpoints(query.start, query.goal).is_ok());
            assert!(reference_optimal_length(&env, query.start, query.goal).is_some());
        }
    }

    #[test]
    fn test_generator_rejects_tiny_grid() {
        assert!(SceneGenerator::new(4, 20, 1).is_err());
    }

    #[test]
    fn test_same_seed_same_results() {
        let config = batch_config(&["--algorithm", "all"]);
        let first = BatchSimulation::new(config.clone()).collect_results().unwrap();
        let second = BatchSimulation::new(config).collect_results().unwrap();
        assert_eq!(first.len(), 12);

        let strip = |rs: &[BatchResult]| {
            rs.iter()
                .map(|r| (r.simulation_id, r.algorithm.clone(), r.operation, r.storage))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
        assert!(first.iter().all(|r| r.success));
        assert_eq!(first[0].algorithm, "a_star");
        assert_eq!(first[1].algorithm, "bidirectional");
        assert_eq!(first[2].algorithm, "waypoint");
    }

    #[test]
    fn test_waypoint_engine_matches_reference_in_batch() {
        let results = BatchSimulation::new(batch_config(&["--algorithm", "waypoint"]))
            .collect_results()
            .unwrap();
        for result in results {
            assert!(result.success);
            assert!((result.length - result.optimal_length).abs() < 1e-4);
        }
    }

    #[test]
    fn test_run_writes_csv_in_batches() {
        let path = std::env::temp_dir().join(format!(
            "guided_pathfinding_batch_{}.csv",
            std::process::id()
        ));
        let path_arg = path.to_string_lossy().into_owned();
        let config = batch_config(&["--algorithm", "all", "--output-file", &path_arg]);

        let mut batch = BatchSimulation::new(config).with_batch_size(5);
        batch.run().unwrap();
        assert_eq!(batch.results().len(), 12);
        assert_eq!(batch.total_results_written, 12);

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("simulation_id,algorithm,"));
        assert!(lines[1].starts_with("0,a_star,21,17,3,true,"));
    }
}
