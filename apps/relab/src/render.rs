//! Plain-text views. Every function returns the finished block so callers decide where it goes.

use std::collections::BTreeMap;

use relab_domain::{
	Candidate, EvaluationReport, Insight, Optimization, PresetCatalog, Strategy, StrategyParams,
	display,
};
use relab_service::{LabState, StrategySlot};

pub const NO_RESULTS: &str = "No results found";
pub const NO_RESULTS_HINT: &str = "No results found. Try adjusting your query or strategy.";

const BODY_GRAPHEMES: usize = 320;
const DETAIL_GRAPHEMES: usize = 160;
const SKELETON_ROWS: usize = 3;

/// Strategy selector: the static catalog, one line per strategy.
pub fn strategies(selected: Option<Strategy>) -> String {
	let mut out = String::new();

	for strategy in Strategy::ALL {
		let marker = if Some(strategy) == selected { '*' } else { ' ' };
		let scope = if strategy.is_comparable() { "" } else { "  [single only]" };
		out.push_str(&format!(
			"{marker} {:<18} {:<24} {}{scope}\n",
			strategy.id(),
			strategy.label(),
			strategy.description()
		));
	}

	out
}

/// Parameters panel for `strategy`, including its informational note when it has one.
pub fn parameters(strategy: Strategy, limit: u32, params: &StrategyParams) -> String {
	let mut out = format!("Parameters ({})\n  limit = {limit}\n", strategy.label());

	for (key, value) in params.fields() {
		let value = if value.is_empty() { "-".to_string() } else { value };
		out.push_str(&format!("  {key} = {value}\n"));
	}

	if let Some(note) = strategy_note(strategy) {
		out.push_str(&format!("  note: {note}\n"));
	}

	out
}

fn strategy_note(strategy: Strategy) -> Option<&'static str> {
	match strategy {
		Strategy::Fts => Some(
			"Full Text Search uses PostgreSQL's native tsvector and tsquery capabilities.",
		),
		Strategy::Fuzzy =>
			Some("Fuzzy Search uses pg_trgm trigram similarity to find approximate matches."),
		Strategy::Agentic => Some(
			"Agentic Search re-ranks candidates retrieved by Hybrid search with an LLM and explains each match.",
		),
		Strategy::Bm25 => Some(
			"BM25 uses probabilistic term weighting (TF-IDF) to find relevant documents based on exact keyword matches.",
		),
		_ => None,
	}
}

pub fn result_card(candidate: &Candidate, rank: usize) -> String {
	let meta = &candidate.metadata;
	let name = meta.name().unwrap_or_else(|| "Candidate".to_string());
	let mut out = format!("#{rank} {name}");

	if let Some(score) = candidate.score {
		out.push_str(&format!("  Score: {}", display::format_score(score)));
	}

	out.push('\n');

	match candidate.insight() {
		Some(Insight::AiReasoning(reasoning)) => {
			out.push_str(&format!("  AI REASONING: \"{reasoning}\"\n"));
		},
		Some(Insight::MatchReason(reason)) => {
			out.push_str(&format!("  MATCH INSIGHT: {reason}\n"));
		},
		None => {},
	}

	out.push_str(&format!(
		"  Role: {}  Location: {}\n",
		meta.role().as_deref().unwrap_or("N/A"),
		meta.location().as_deref().unwrap_or("N/A")
	));

	if let Some(experience) = meta.experience() {
		out.push_str(&format!("  Exp: {experience}\n"));
	}

	let body = display::strip_markup(candidate.body());

	if !body.trim().is_empty() {
		out.push_str(&format!("  {}\n", display::truncate(body.trim(), BODY_GRAPHEMES)));
	}
	if !candidate.matched_keywords.is_empty() {
		out.push_str(&format!("  Keywords: {}\n", candidate.matched_keywords.join(", ")));
	}
	if let Some(skills) = meta.skills_text() {
		out.push_str(&format!("  Skills: {}\n", display::truncate(&skills, DETAIL_GRAPHEMES)));
	}
	if let Some(projects) = meta.projects_text() {
		out.push_str(&format!(
			"  Projects: {}\n",
			display::truncate(&projects, DETAIL_GRAPHEMES)
		));
	}

	out
}

/// Single-mode results.
pub fn results_grid(results: &[Candidate], loading: bool) -> String {
	if loading {
		return skeleton();
	}
	if results.is_empty() {
		return format!("{NO_RESULTS_HINT}\n");
	}

	cards(results)
}

pub fn optimization_banner(optimization: &Optimization) -> String {
	let mut out = String::from("Query Optimized by AI\n");
	out.push_str(&format!("  Rewritten: \"{}\"\n", optimization.rewritten_query));

	if let Some(filters) = optimization.active_filters() {
		out.push_str(&format!("  Filters: {}\n", serde_json::Value::Object(filters.clone())));
	}
	if let Some(reasoning) =
		optimization.reasoning.as_deref().filter(|text| !text.trim().is_empty())
	{
		out.push_str(&format!("  \"{reasoning}\"\n"));
	}

	out
}

pub fn comparison_view(state: &LabState) -> String {
	let mut out = String::new();

	if state.comparison.is_empty() {
		return out;
	}
	if let Some(optimization) = &state.optimization {
		out.push_str(&optimization_banner(optimization));
		out.push('\n');
	}

	for slot in &state.comparison {
		out.push_str(&comparison_column(slot));
		out.push('\n');
	}

	out
}

fn comparison_column(slot: &StrategySlot) -> String {
	let mut out = format!("== {} Results", slot.strategy.label());

	if let Some(seconds) = slot.elapsed_seconds {
		out.push_str(&format!(" ({})", display::format_seconds(seconds)));
	}

	out.push_str(" ==\n");

	if slot.loading {
		out.push_str(&skeleton());

		return out;
	}

	match slot.results.as_deref() {
		Some(results) if !results.is_empty() => out.push_str(&cards(results)),
		_ => {
			out.push_str(&format!("{NO_RESULTS}\n"));
		},
	}

	out
}

/// Hidden (empty) when nothing was measured yet.
pub fn performance_metrics(metrics: &BTreeMap<String, f64>) -> String {
	if metrics.is_empty() {
		return String::new();
	}

	let entries: Vec<_> = metrics
		.iter()
		.map(|(key, millis)| format!("{key}: {}", display::format_millis(*millis)))
		.collect();

	format!("Performance Metrics\n  {}\n", entries.join("  "))
}

pub fn single_view(state: &LabState) -> String {
	let mut out = results_grid(&state.results, state.loading);
	let metrics = performance_metrics(&state.metrics);

	if !metrics.is_empty() {
		out.push('\n');
		out.push_str(&metrics);
	}

	out
}

pub fn evaluation_panel(outcome: Result<&EvaluationReport, &str>) -> String {
	let report = match outcome {
		Ok(report) => report,
		Err(message) => return format!("Error: {message}\n"),
	};
	let mut out = format!("{}\n", report.message);

	if report.chunks.is_empty() {
		return out;
	}

	out.push_str("Generated Chunks:\n");

	for (kind, content) in &report.chunks {
		let pretty = serde_json::to_string_pretty(content).unwrap_or_else(|_| content.to_string());
		out.push_str(&format!("[{}]\n", kind.to_uppercase()));

		for line in pretty.lines() {
			out.push_str(&format!("  {line}\n"));
		}
	}

	out
}

pub fn presets(catalog: &PresetCatalog) -> String {
	if catalog.presets.is_empty() {
		return "No presets published.\n".to_string();
	}

	let mut out = String::new();

	for (key, preset) in &catalog.presets {
		let params = &preset.parameters;
		out.push_str(&format!("{key}: {}\n", preset.name));
		out.push_str(&format!("  {}\n", preset.description));

		if !preset.use_when.is_empty() {
			out.push_str(&format!("  Use when: {}\n", preset.use_when));
		}

		out.push_str(&format!(
			"  bm25_weight={} vector_weight={} skill_proficiency_boost={} recency_boost={} bm25_k1={} bm25_b={} fusion_method={}\n",
			params.bm25_weight,
			params.vector_weight,
			params.skill_proficiency_boost,
			params.recency_boost,
			params.bm25_k1,
			params.bm25_b,
			params.fusion_method
		));
	}

	out
}

fn cards(results: &[Candidate]) -> String {
	results
		.iter()
		.enumerate()
		.map(|(index, candidate)| result_card(candidate, index + 1))
		.collect::<Vec<_>>()
		.join("\n")
}

fn skeleton() -> String {
	"  ....\n".repeat(SKELETON_ROWS)
}
