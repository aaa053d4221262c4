use approx::assert_relative_eq;
use guided_pathfinding::algorithms::a_star::AStar;
use guided_pathfinding::algorithms::bidirectional::Bidirectional;
use guided_pathfinding::algorithms::common::{path_length, PathfindingAlgorithm, SearchResult};
use guided_pathfinding::algorithms::waypoint::{filter_waypoints, SubgoalPolicy, WaypointSearch};
use guided_pathfinding::grid::{Environment, Node};
use guided_pathfinding::query::Query;
use guided_pathfinding::statistics::reference_optimal_length;
use guided_pathfinding::waypoints::parse_waypoint_list;
use std::collections::HashSet;

fn assert_collision_free(env: &Environment, path: &[Node]) {
    for pair in path.windows(2) {
        assert!(
            env.edge_cost(pair[0], pair[1]).is_finite(),
            "blocked move {:?} -> {:?}",
            pair[0],
            pair[1]
        );
    }
}

fn open_env() -> Environment {
    Environment::new([0, 31], [0, 31], vec![], vec![]).unwrap()
}

#[test]
fn demo_scene_routes_around_the_wall() {
    let query = Query::demo();
    let env = query.environment().unwrap();
    let result = AStar::new().find_path(&env, query.start, query.goal).unwrap();

    assert_eq!(result.path.first(), Some(&query.start));
    assert_eq!(result.path.last(), Some(&query.goal));
    assert!(result.path.iter().any(|n| n.x > 25));
    assert_collision_free(&env, &result.path);
    assert_relative_eq!(result.length, path_length(&result.path), epsilon = 1e-12);
    assert!(result.storage >= result.operation);
}

#[test]
fn every_engine_is_collision_free_on_demo() {
    let query = Query::demo();
    let env = query.environment().unwrap();
    let engines: Vec<Box<dyn PathfindingAlgorithm>> = vec![
        Box::new(AStar::new()),
        Box::new(Bidirectional::new()),
        Box::new(WaypointSearch::new(vec![Node::new(28, 8), Node::new(28, 25)])),
    ];
    for engine in engines {
        let result = engine.find_path(&env, query.start, query.goal).unwrap();
        assert_collision_free(&env, &result.path);
        assert_eq!(result.path.first(), Some(&query.start), "{}", engine.name());
        assert_eq!(result.path.last(), Some(&query.goal), "{}", engine.name());
    }
}

#[test]
fn waypoint_search_is_optimal_on_open_grid() {
    let env = open_env();
    let (start, goal) = (Node::new(3, 4), Node::new(20, 11));
    let reference = reference_optimal_length(&env, start, goal).unwrap();
    let octile = 10.0 + 7.0 * std::f64::consts::SQRT_2;
    assert_relative_eq!(reference, octile, epsilon = 1e-9);

    for policy in [SubgoalPolicy::Sequential, SubgoalPolicy::GoalOnly] {
        let result = WaypointSearch::new(Vec::new())
            .with_policy(policy)
            .find_path(&env, start, goal)
            .unwrap();
        assert_relative_eq!(result.length, octile, epsilon = 1e-9);
    }
}

#[test]
fn bidirectional_stays_close_to_optimal_on_open_grid() {
    let env = Environment::new([0, 41], [0, 41], vec![], vec![]).unwrap();
    let cases = [
        (Node::new(2, 2), Node::new(30, 17)),
        (Node::new(3, 30), Node::new(35, 4)),
    ];
    for (start, goal) in cases {
        let result = Bidirectional::new().find_path(&env, start, goal).unwrap();
        let optimal = reference_optimal_length(&env, start, goal).unwrap();

        // The first meeting stops early, so the route may run a few percent long.
        assert!(result.length >= optimal - 1e-4);
        assert!(result.length <= optimal * 1.05, "{} vs {}", result.length, optimal);

        let distinct: HashSet<Node> = result.path.iter().copied().collect();
        assert_eq!(distinct.len(), result.path.len());
        assert_collision_free(&env, &result.path);
    }
}

#[test]
fn parsed_response_feeds_the_filter() {
    let query = Query::demo();
    let env = query.environment().unwrap();
    let response = "Suggested route: [[12, 10], [28, 8], [28.4, 25.2], [0, 3]]";
    let raw = parse_waypoint_list(response);
    assert_eq!(raw.len(), 4);

    let filtered = filter_waypoints(&env, query.start, query.goal, &raw);
    assert_eq!(
        filtered,
        vec![query.start, Node::new(28, 8), Node::new(28, 25), query.goal]
    );
}

#[test]
fn search_result_json_round_trip() {
    let query = Query::demo();
    let env = query.environment().unwrap();
    let result = WaypointSearch::new(vec![Node::new(28, 8)])
        .find_path(&env, query.start, query.goal)
        .unwrap();

    let text = serde_json::to_string(&result).unwrap();
    assert!(text.contains("\"waypoints_used\""));
    let back: SearchResult = serde_json::from_str(&text).unwrap();
    assert_eq!(back.path, result.path);
    assert_eq!(back.operation, result.operation);
}

#[test]
fn query_json_accepts_extra_fields() {
    let text = r#"{
        "start": [2, 2],
        "goal": [8, 8],
        "horizontal_barriers": [[5, 0, 6]],
        "range_x": [0, 11],
        "range_y": [0, 11],
        "size": [11, 11]
    }"#;
    let query = Query::from_json(text).unwrap();
    assert!(query.vertical_barriers.is_empty());
    let env = query.environment().unwrap();
    let result = AStar::new().find_path(&env, query.start, query.goal).unwrap();
    assert_collision_free(&env, &result.path);
}

#[test]
fn batch_run_is_reproducible_with_seed() {
    use clap::Parser;
    use guided_pathfinding::batch_simulation::BatchSimulation;
    use guided_pathfinding::config::Config;

    let config = Config::parse_from([
        "guided_pathfinding",
        "--quiet",
        "--batch-mode",
        "--algorithm",
        "a_star",
        "--grid-width",
        "25",
        "--grid-height",
        "19",
        "--num-simulations",
        "3",
        "--seed",
        "2024",
        "--threads",
        "2",
    ]);
    let first = BatchSimulation::new(config.clone()).collect_results().unwrap();
    let second = BatchSimulation::new(config).collect_results().unwrap();

    assert_eq!(first.len(), 3);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.simulation_id, b.simulation_id);
        assert_eq!(a.operation, b.operation);
        assert_relative_eq!(a.length, b.length);
        assert!(a.success);
        assert!(a.route_efficiency >= 1.0 - 1e-4);
    }
}
