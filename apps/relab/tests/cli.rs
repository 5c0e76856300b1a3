use std::ffi::OsStr;

use clap::{CommandFactory, Parser};

use relab::{Args, Command, compare_params, compare_selection, execute};
use relab_config::Config;
use relab_domain::{ParameterSet, Strategy};
use relab_testkit::{MockBackend, Reply};

fn parse(argv: &[&str]) -> Args {
	Args::try_parse_from(argv).expect("Failed to parse arguments.")
}

fn config_for(mock: &MockBackend) -> Config {
	relab_config::resolve(None, Some(&mock.base_url())).expect("Failed to resolve config.")
}

#[test]
fn api_url_flag_reads_the_override_variable() {
	let command = Args::command();
	let api_url = command
		.get_arguments()
		.find(|arg| arg.get_id() == "api_url")
		.expect("Missing --api-url argument.");

	assert_eq!(api_url.get_env(), Some(OsStr::new(relab_config::API_URL_ENV)));
}

#[test]
fn compare_selection_applies_toggles_in_order() {
	let args = parse(&["relab", "compare", "python developer", "-t", "bm25", "-t", "keyword"]);
	let Command::Compare(compare) = &args.command else {
		panic!("Expected the compare subcommand.");
	};
	let selection = compare_selection(&Config::default(), compare).expect("invalid selection");

	assert_eq!(selection.strategies(), &[Strategy::Vector, Strategy::Bm25]);
}

#[test]
fn explicit_strategies_replace_the_configured_set() {
	let args = parse(&["relab", "compare", "rust", "--strategies", "hybrid,agentic_tool"]);
	let Command::Compare(compare) = &args.command else {
		panic!("Expected the compare subcommand.");
	};
	let selection = compare_selection(&Config::default(), compare).expect("invalid selection");

	assert_eq!(selection.strategies(), &[Strategy::Hybrid, Strategy::AgenticTool]);
}

#[test]
fn single_mode_strategies_cannot_be_compared() {
	let args = parse(&["relab", "compare", "rust", "--strategies", "keyword,filter"]);
	let Command::Compare(compare) = &args.command else {
		panic!("Expected the compare subcommand.");
	};

	assert!(compare_selection(&Config::default(), compare).is_err());
}

#[test]
fn unknown_strategies_are_rejected_while_parsing() {
	assert!(Args::try_parse_from(["relab", "search", "rust", "--strategy", "semantic"]).is_err());
	assert!(Args::try_parse_from(["relab", "evaluate", "not-a-uuid"]).is_err());
}

#[test]
fn compare_params_target_one_strategy() {
	let params = compare_params(
		ParameterSet::default(),
		&["hybrid.rrf_k=30".to_string(), "adaptive-fusion.fusion_method=rrf".to_string()],
	)
	.expect("assign failed");

	assert_eq!(params.hybrid.rrf_k, 30);
	assert_eq!(params.adaptive_fusion.fusion_method.as_str(), "rrf");
	assert!(compare_params(ParameterSet::default(), &["rrf_k=30".to_string()]).is_err());
	assert!(compare_params(ParameterSet::default(), &["hybrid.rrf_k=abc".to_string()]).is_err());
}

#[tokio::test]
async fn compare_renders_each_column() {
	let mock = MockBackend::builder()
		.optimize(Reply::ok(serde_json::json!({ "optimization": null })))
		.strategy("keyword", Reply::candidates(2))
		.strategy("vector", Reply::candidates(0))
		.start()
		.await
		.expect("Failed to start mock backend.");
	let args = parse(&["relab", "compare", "python developer"]);
	let output = execute(&args, config_for(&mock)).await.expect("compare failed");

	assert!(!output.contains("Query Optimized by AI"));
	assert!(output.contains("== Keyword Search Results"));
	assert!(output.contains("#2 Candidate 2"));
	assert!(output.contains("== Vector Search Results"));
	assert!(output.contains("No results found\n"));
}

#[tokio::test]
async fn search_json_reports_metrics() {
	let mock = MockBackend::builder()
		.strategy("hybrid", Reply::candidates(1))
		.start()
		.await
		.expect("Failed to start mock backend.");
	let args = parse(&[
		"relab",
		"search",
		"rust",
		"--strategy",
		"hybrid",
		"-p",
		"vector_weight=0.7",
		"--json",
	]);
	let output = execute(&args, config_for(&mock)).await.expect("search failed");
	let state: serde_json::Value = serde_json::from_str(&output).expect("output is not JSON");

	assert_eq!(state["mode"], "single");
	assert_eq!(state["results"].as_array().map(Vec::len), Some(1));
	assert!(state["metrics"]["hybrid"].is_number());
	assert_eq!(mock.bodies_for("/api/search/hybrid")[0]["vector_weight"], 0.7);
}

#[tokio::test]
async fn search_with_preset_starts_from_published_parameters() {
	let mock = MockBackend::builder()
		.presets(Reply::ok(serde_json::json!({
			"presets": {
				"keyword_focused": {
					"name": "Keyword Focused",
					"description": "Favour exact terms",
					"use_when": "Specific skills",
					"parameters": { "bm25_weight": 0.8, "vector_weight": 0.2, "fusion_method": "rrf" }
				}
			}
		})))
		.strategy("adaptive-fusion", Reply::candidates(1))
		.start()
		.await
		.expect("Failed to start mock backend.");
	let args = parse(&[
		"relab",
		"search",
		"rust",
		"--strategy",
		"adaptive-fusion",
		"--preset",
		"keyword_focused",
		"-p",
		"recency_boost=0.4",
	]);

	execute(&args, config_for(&mock)).await.expect("search failed");

	let sent = mock.bodies_for("/api/search/adaptive-fusion");

	assert_eq!(sent[0]["bm25_weight"], 0.8);
	assert_eq!(sent[0]["fusion_method"], "rrf");
	assert_eq!(sent[0]["recency_boost"], 0.4);
}

#[tokio::test]
async fn evaluation_failure_renders_the_server_detail() {
	let mock = MockBackend::builder()
		.evaluate(Reply::Json {
			status: 404,
			body: serde_json::json!({ "detail": "Student not found" }),
		})
		.start()
		.await
		.expect("Failed to start mock backend.");
	let args = parse(&["relab", "evaluate", "8d7f3f8e-2f7a-4c55-9d2c-6b1e4c4b9a10"]);
	let output = execute(&args, config_for(&mock)).await.expect("evaluate failed");

	assert_eq!(output, "Error: Student not found\n");
}

#[tokio::test]
async fn blank_query_is_refused() {
	let mock = MockBackend::builder().start().await.expect("Failed to start mock backend.");
	let args = parse(&["relab", "search", "   "]);

	assert!(execute(&args, config_for(&mock)).await.is_err());
	assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn blank_query_with_preset_sends_nothing() {
	let mock = MockBackend::builder().start().await.expect("Failed to start mock backend.");
	let args = parse(&[
		"relab",
		"search",
		"   ",
		"--strategy",
		"adaptive-fusion",
		"--preset",
		"balanced",
	]);

	assert!(execute(&args, config_for(&mock)).await.is_err());
	assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn out_of_range_preset_is_rejected_before_searching() {
	let mock = MockBackend::builder()
		.presets(Reply::ok(serde_json::json!({
			"presets": {
				"broken": {
					"name": "Broken",
					"description": "Weight above one",
					"use_when": "",
					"parameters": { "bm25_weight": 1.5 }
				}
			}
		})))
		.strategy("adaptive-fusion", Reply::candidates(1))
		.start()
		.await
		.expect("Failed to start mock backend.");
	let args =
		parse(&["relab", "search", "rust", "--strategy", "adaptive-fusion", "--preset", "broken"]);

	assert!(execute(&args, config_for(&mock)).await.is_err());
	assert!(mock.bodies_for("/api/search/adaptive-fusion").is_empty());
}
