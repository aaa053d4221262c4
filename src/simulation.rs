use crate::algorithms::a_star::AStar;
use crate::algorithms::bidirectional::Bidirectional;
use crate::algorithms::common::{PathfindingAlgorithm, SearchLimits, SearchResult};
use crate::algorithms::waypoint::{SubgoalPolicy, WaypointSearch};
use crate::config::{AlgorithmKind, Config};
use crate::error::Result;
use crate::grid::{Environment, Node};
use crate::query::Query;
use crate::render::{Renderer, Scene};
use crate::statistics::{reference_optimal_length, Statistics};
use crate::waypoints::{waypoints_or_empty, NoWaypoints, TextFileWaypoints, WaypointProvider};
use log::info;
use std::time::Instant;

/// Builds a ready-to-run engine for one named algorithm.
pub struct AlgorithmRunner {
    pub name: String,
    pub create_algorithm: Box<dyn Fn(SearchLimits) -> Box<dyn PathfindingAlgorithm>>,
}

impl AlgorithmRunner {
    pub fn new<F>(name: &str, create_fn: F) -> Self
    where
        F: Fn(SearchLimits) -> Box<dyn PathfindingAlgorithm> + 'static,
    {
        AlgorithmRunner {
            name: name.to_string(),
            create_algorithm: Box::new(create_fn),
        }
    }

    /// The runners selected by `kind`; `All` yields every engine in a fixed order.
    pub fn for_kind(
        kind: AlgorithmKind,
        waypoints: Vec<Node>,
        policy: SubgoalPolicy,
    ) -> Vec<Self> {
        let a_star =
            || AlgorithmRunner::new("a_star", |limits| Box::new(AStar::with_limits(limits)));
        let bidirectional = || {
            AlgorithmRunner::new("bidirectional", |limits| {
                Box::new(Bidirectional::with_limits(limits))
            })
        };
        let waypoint = move || {
            let waypoints = waypoints.clone();
            AlgorithmRunner::new("waypoint", move |limits| {
                Box::new(
                    WaypointSearch::new(waypoints.clone())
                        .with_policy(policy)
                        .with_limits(limits),
                )
            })
        };

        match kind {
            AlgorithmKind::AStar => vec![a_star()],
            AlgorithmKind::Bidirectional => vec![bidirectional()],
            AlgorithmKind::Waypoint => vec![waypoint()],
            AlgorithmKind::All => vec![a_star(), bidirectional(), waypoint()],
        }
    }
}

#[derive(Debug)]
pub struct AlgorithmResult {
    pub name: String,
    pub outcome: Result<SearchResult>,
    pub statistics: Option<Statistics>,
}

impl AlgorithmResult {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// One query, its environment, and the waypoint suggestion obtained for it.
pub struct Simulation {
    config: Config,
    query: Query,
    environment: Environment,
    waypoints: Vec<Node>,
    optimal_length: Option<f64>,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self> {
        let query = match &config.query {
            Some(path) => Query::load(path)?,
            None => Query::demo(),
        };
        let provider: Box<dyn WaypointProvider> = match &config.waypoints {
            Some(path) => Box::new(TextFileWaypoints { path: path.clone() }),
            None => Box::new(NoWaypoints),
        };
        Self::with_provider(config, query, provider.as_ref())
    }

    pub fn with_provider(
        config: Config,
        query: Query,
        provider: &dyn WaypointProvider,
    ) -> Result<Self> {
        let environment = query.environment()?;
        environment.validate_endpoints(query.start, query.goal)?;

        let waypoints = match config.algorithm {
            AlgorithmKind::Waypoint | AlgorithmKind::All => waypoints_or_empty(provider, &query),
            _ => Vec::new(),
        };
        let optimal_length = reference_optimal_length(&environment, query.start, query.goal);

        Ok(Simulation {
            config,
            query,
            environment,
            waypoints,
            optimal_length,
        })
    }

    /// Runs every engine selected by the configuration against the same environment.
    pub fn run(&self) -> Vec<AlgorithmResult> {
        let runners = AlgorithmRunner::for_kind(
            self.config.algorithm,
            self.waypoints.clone(),
            self.config.subgoal_policy,
        );

        if !self.config.quiet {
            println!(
                "Start: ({}, {}), Goal: ({}, {}), Barriers: {} horizontal, {} vertical",
                self.query.start.x,
                self.query.start.y,
                self.query.goal.x,
                self.query.goal.y,
                self.query.horizontal_barriers.len(),
                self.query.vertical_barriers.len()
            );
        }

        runners
            .iter()
            .map(|runner| self.run_one(runner))
            .collect()
    }

    fn run_one(&self, runner: &AlgorithmRunner) -> AlgorithmResult {
        let algorithm = (runner.create_algorithm)(self.config.search_limits());
        let started = Instant::now();
        let outcome = algorithm.find_path(&self.environment, self.query.start, self.query.goal);
        let elapsed = started.elapsed();

        let statistics = outcome
            .as_ref()
            .ok()
            .map(|result| Statistics::new(&runner.name, result, self.optimal_length, elapsed));
        match &outcome {
            Ok(result) => info!(
                "{}: length {:.3}, {} expansions in {:.2?}",
                runner.name, result.length, result.operation, elapsed
            ),
            Err(e) => info!("{}: {}", runner.name, e),
        }

        AlgorithmResult {
            name: runner.name.clone(),
            outcome,
            statistics,
        }
    }

    /// Hands each successful result to `renderer`.
    pub fn render_results(
        &self,
        results: &[AlgorithmResult],
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        for result in results {
            if let Ok(search) = &result.outcome {
                let scene = Scene::new(
                    &result.name,
                    &self.environment,
                    self.query.start,
                    self.query.goal,
                    &search.visited,
                    &search.path,
                );
                renderer.render(&scene)?;
            }
        }
        Ok(())
    }

    /// Print comparison results in a table
    pub fn print_comparison_results(results: &[AlgorithmResult]) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===");
        println!();
        println!(
            "{:<15} {:<8} {:<12} {:<10} {:<12} {:<12} {:<12}",
            "Algorithm", "Success", "Operation", "Storage", "Length", "Efficiency", "Time"
        );
        println!("{}", "-".repeat(85));

        for result in results {
            match (&result.outcome, &result.statistics) {
                (Ok(_), Some(stats)) => println!(
                    "{:<15} {:<8} {:<12} {:<10} {:<12.3} {:<12.3} {:<12}",
                    result.name,
                    "✓",
                    stats.operation,
                    stats.storage,
                    stats.length,
                    stats.route_efficiency,
                    format!("{:.2?}", stats.elapsed)
                ),
                (outcome, _) => {
                    let expanded = outcome
                        .as_ref()
                        .err()
                        .and_then(|e| e.expanded())
                        .map_or_else(|| "-".to_string(), |n| n.to_string());
                    println!(
                        "{:<15} {:<8} {:<12} {:<10} {:<12} {:<12} {:<12}",
                        result.name, "✗", expanded, "-", "-", "-", "-"
                    );
                }
            }
        }

        let successful: Vec<&Statistics> = results
            .iter()
            .filter_map(|r| r.statistics.as_ref())
            .collect();
        if successful.len() > 1 {
            println!();
            println!("=== PERFORMANCE ANALYSIS ===");
            if let Some(shortest) = successful.iter().min_by(|a, b| a.length.total_cmp(&b.length)) {
                println!("Shortest path: {} ({:.3})", shortest.algorithm, shortest.length);
            }
            if let Some(fewest) = successful.iter().min_by_key(|s| s.operation) {
                println!("Fewest expansions: {} ({})", fewest.algorithm, fewest.operation);
            }
            if let Some(fastest) = successful.iter().min_by_key(|s| s.elapsed) {
                println!("Fastest search: {} ({:.2?})", fastest.algorithm, fastest.elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::AsciiRenderer;
    use crate::waypoints::FixedWaypoints;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        let mut full = vec!["guided_pathfinding", "--quiet"];
        full.extend_from_slice(args);
        Config::parse_from(full)
    }

    #[test]
    fn test_run_all_on_demo() {
        let simulation = Simulation::with_provider(
            config(&["--algorithm", "all"]),
            Query::demo(),
            &FixedWaypoints(vec![Node::new(28, 8), Node::new(28, 25)]),
        )
        .unwrap();
        let results = simulation.run();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a_star", "bidirectional", "waypoint"]);
        assert!(results.iter().all(AlgorithmResult::success));

        for result in &results {
            let stats = result.statistics.as_ref().unwrap();
            assert!(stats.route_efficiency >= 1.0 - 1e-4);
        }
    }

    #[test]
    fn test_waypoints_only_fetched_when_needed() {
        let simulation = Simulation::with_provider(
            config(&[]),
            Query::demo(),
            &FixedWaypoints(vec![Node::new(28, 8)]),
        )
        .unwrap();
        assert!(simulation.waypoints.is_empty());
    }

    #[test]
    fn test_invalid_query_rejected() {
        let mut query = Query::demo();
        query.start = Node::new(12, 10);
        assert!(Simulation::with_provider(config(&[]), query, &NoWaypoints).is_err());
    }

    #[test]
    fn test_budget_failure_reported() {
        let simulation = Simulation::with_provider(
            config(&["--max-expansions", "3"]),
            Query::demo(),
            &NoWaypoints,
        )
        .unwrap();
        let results = simulation.run();
        assert_eq!(results.len(), 1);
        assert!(!results[0].success());
        assert!(results[0].statistics.is_none());
    }

    #[test]
    fn test_render_results() {
        let simulation =
            Simulation::with_provider(config(&[]), Query::demo(), &NoWaypoints).unwrap();
        let results = simulation.run();
        let mut renderer = AsciiRenderer::new(Vec::new());
        simulation.render_results(&results, &mut renderer).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.contains("=== a_star ==="));
        assert!(text.contains('S') && text.contains('G') && text.contains('*'));
    }
}
