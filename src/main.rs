use clap::Parser;
use env_logger::Env;
use serde_json::json;

use guided_pathfinding::batch_simulation::BatchSimulation;
use guided_pathfinding::config::{AlgorithmKind, Config};
use guided_pathfinding::render::AsciiRenderer;
use guided_pathfinding::simulation::{AlgorithmResult, Simulation};
use guided_pathfinding::Result;
use std::fs;
use std::io;

fn main() {
    let config = Config::parse();

    let default_level = if config.verbose {
        "debug"
    } else if config.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if config.batch_mode {
        let mut batch_sim = BatchSimulation::new(config.clone());
        match batch_sim.run() {
            Ok(()) => {
                if !config.quiet {
                    batch_sim.print_summary();
                }
            }
            Err(e) => {
                eprintln!("Batch simulation failed: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Err(e) = run_single(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_single(config: Config) -> Result<()> {
    let simulation = Simulation::new(config.clone())?;
    let results = simulation.run();

    if config.algorithm == AlgorithmKind::All {
        Simulation::print_comparison_results(&results);
    } else {
        for result in &results {
            println!("\n=== FINAL RESULTS ===");
            match (&result.outcome, &result.statistics) {
                (Ok(_), Some(stats)) => println!("{}", stats),
                (Ok(_), None) => println!("{}: path found", result.name),
                (Err(e), _) => println!("{}: {}", result.name, e),
            }
        }
    }

    if config.render {
        let mut renderer = AsciiRenderer::new(io::stdout().lock());
        simulation.render_results(&results, &mut renderer)?;
    }

    if let Some(path) = &config.output {
        fs::write(path, serde_json::to_string_pretty(&results_json(&results))?)?;
        if !config.quiet {
            println!("Results written to {}", path.display());
        }
    }

    if results.iter().any(AlgorithmResult::success) {
        Ok(())
    } else {
        // Report the first failure as the process error.
        results
            .into_iter()
            .find_map(|r| r.outcome.err())
            .map_or(Ok(()), Err)
    }
}

fn results_json(results: &[AlgorithmResult]) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = results
        .iter()
        .map(|result| match &result.outcome {
            Ok(search) => json!({
                "algorithm": result.name,
                "success": true,
                "result": search,
            }),
            Err(e) => json!({
                "algorithm": result.name,
                "success": false,
                "error": e.to_string(),
            }),
        })
        .collect();
    serde_json::Value::Array(entries)
}
