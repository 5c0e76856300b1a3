//! Strategy parameters.
//!
//! Every strategy owns a typed parameter record. [`ParameterSet`] keeps one record per family
//! so switching strategies does not lose edits, and [`ParameterSet::for_strategy`] is the single
//! place that decides which record a strategy sends.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::strategy::Strategy;

pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound the fusion route accepts for `top_k`.
const MAX_TOP_K: u32 = 100;

const UNIT_RANGE: RangeInclusive<f64> = 0.0..=1.0;
const BM25_K1_RANGE: RangeInclusive<f64> = 1.0..=3.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
	#[error("Strategy {strategy} has no parameter named {key:?}.")]
	UnknownKey { strategy: Strategy, key: String },
	#[error("{key} must be a number, got {raw:?}.")]
	NotANumber { key: String, raw: String },
	#[error("{key} must be a whole number, got {raw:?}.")]
	NotAnInteger { key: String, raw: String },
	#[error("{key} must be in the range {min}-{max}, got {value}.")]
	OutOfRange { key: String, min: f64, max: f64, value: f64 },
	#[error("{key} must be greater than zero.")]
	Zero { key: String },
	#[error("{key} must be one of {allowed}, got {raw:?}.")]
	InvalidChoice { key: String, allowed: &'static str, raw: String },
	#[error("custom_pattern is not a valid regular expression: {message}")]
	InvalidPattern { message: String },
	#[error("Expected KEY=VALUE, got {raw:?}.")]
	MalformedAssignment { raw: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
	pub limit: u32,
	pub hybrid: HybridParams,
	pub filter: FilterParams,
	pub pattern: PatternParams,
	pub skills: SkillsParams,
	pub adaptive_fusion: FusionParams,
}
impl ParameterSet {
	pub fn for_strategy(&self, strategy: Strategy) -> StrategyParams {
		match strategy {
			Strategy::Hybrid => StrategyParams::Hybrid(self.hybrid.clone()),
			Strategy::Filter => StrategyParams::Filter(self.filter.clone()),
			Strategy::Pattern => StrategyParams::Pattern(self.pattern.clone()),
			Strategy::Skills => StrategyParams::Skills(self.skills.clone()),
			Strategy::AdaptiveFusion => StrategyParams::AdaptiveFusion(self.adaptive_fusion.clone()),
			Strategy::Keyword
			| Strategy::Vector
			| Strategy::Fts
			| Strategy::Fuzzy
			| Strategy::Agentic
			| Strategy::AgenticTool
			| Strategy::AgenticAnalysis
			| Strategy::Stm
			| Strategy::Bm25 => StrategyParams::Plain,
		}
	}

	/// Applies a raw `KEY=VALUE` form entry for `strategy`.
	pub fn assign(&mut self, strategy: Strategy, assignment: &str) -> Result<(), ParamError> {
		let (key, raw) = assignment
			.split_once('=')
			.ok_or_else(|| ParamError::MalformedAssignment { raw: assignment.to_string() })?;

		self.set(strategy, key.trim(), raw)
	}

	/// Coerces `raw` into the typed field `key` of the record `strategy` uses.
	pub fn set(&mut self, strategy: Strategy, key: &str, raw: &str) -> Result<(), ParamError> {
		if key == "limit" {
			let limit = parse_u32(key, raw)?;

			if limit == 0 {
				return Err(ParamError::Zero { key: key.to_string() });
			}

			self.limit = limit;

			return Ok(());
		}

		let unknown = || ParamError::UnknownKey { strategy, key: key.to_string() };

		match strategy {
			Strategy::Hybrid => match key {
				"vector_weight" => self.hybrid.vector_weight = parse_in_range(key, raw, UNIT_RANGE)?,
				"rrf_k" => {
					let rrf_k = parse_u32(key, raw)?;

					if rrf_k == 0 {
						return Err(ParamError::Zero { key: key.to_string() });
					}

					self.hybrid.rrf_k = rrf_k;
				},
				_ => return Err(unknown()),
			},
			Strategy::Filter => match key {
				"role" => self.filter.role = non_blank(raw),
				"skills" => self.filter.skills = split_list(raw),
				_ => return Err(unknown()),
			},
			Strategy::Pattern => match key {
				"pattern_type" => self.pattern.pattern_type = PatternType::parse_optional(raw)?,
				"custom_pattern" => {
					let pattern = non_blank(raw);

					if let Some(pattern) = pattern.as_deref() {
						Regex::new(pattern)
							.map_err(|err| ParamError::InvalidPattern { message: err.to_string() })?;
					}

					self.pattern.custom_pattern = pattern;
				},
				_ => return Err(unknown()),
			},
			Strategy::Skills => match key {
				"required_skills" => self.skills.required_skills = split_list(raw),
				"preferred_skills" => self.skills.preferred_skills = split_list(raw),
				_ => return Err(unknown()),
			},
			Strategy::AdaptiveFusion => {
				let fusion = &mut self.adaptive_fusion;

				match key {
					"bm25_weight" => fusion.bm25_weight = parse_in_range(key, raw, UNIT_RANGE)?,
					"vector_weight" => fusion.vector_weight = parse_in_range(key, raw, UNIT_RANGE)?,
					"skill_proficiency_boost" =>
						fusion.skill_proficiency_boost = parse_in_range(key, raw, UNIT_RANGE)?,
					"recency_boost" => fusion.recency_boost = parse_in_range(key, raw, UNIT_RANGE)?,
					"bm25_k1" => fusion.bm25_k1 = parse_in_range(key, raw, BM25_K1_RANGE)?,
					"bm25_b" => fusion.bm25_b = parse_in_range(key, raw, UNIT_RANGE)?,
					"fusion_method" => fusion.fusion_method = raw.parse()?,
					_ => return Err(unknown()),
				}
			},
			Strategy::Keyword
			| Strategy::Vector
			| Strategy::Fts
			| Strategy::Fuzzy
			| Strategy::Agentic
			| Strategy::AgenticTool
			| Strategy::AgenticAnalysis
			| Strategy::Stm
			| Strategy::Bm25 => return Err(unknown()),
		}

		Ok(())
	}

	/// Re-checks values that did not come through [`ParameterSet::set`], e.g. config files.
	pub fn validate(&self) -> Result<(), ParamError> {
		if self.limit == 0 {
			return Err(ParamError::Zero { key: "limit".to_string() });
		}
		if self.hybrid.rrf_k == 0 {
			return Err(ParamError::Zero { key: "rrf_k".to_string() });
		}

		check_range("hybrid.vector_weight", self.hybrid.vector_weight, UNIT_RANGE)?;
		self.adaptive_fusion.validate()?;

		if let Some(pattern) = self.pattern.custom_pattern.as_deref() {
			Regex::new(pattern)
				.map_err(|err| ParamError::InvalidPattern { message: err.to_string() })?;
		}

		Ok(())
	}

	/// Builds the JSON request body: `{query, limit, ...strategy params}`.
	///
	/// Adaptive fusion also carries its record under `parameters` and the limit as `top_k`,
	/// which is where the fusion route reads them.
	pub fn request_body(&self, strategy: Strategy, query: &str) -> Map<String, Value> {
		let mut body = Map::new();

		body.insert("query".to_string(), Value::String(query.to_string()));
		body.insert("limit".to_string(), Value::from(self.limit));

		if let Value::Object(fields) = self.for_strategy(strategy).to_value() {
			if strategy == Strategy::AdaptiveFusion {
				body.insert("parameters".to_string(), Value::Object(fields.clone()));
				body.insert("top_k".to_string(), Value::from(self.limit.min(MAX_TOP_K)));
			}

			body.extend(fields);
		}

		body
	}
}
impl Default for ParameterSet {
	fn default() -> Self {
		Self {
			limit: DEFAULT_LIMIT,
			hybrid: HybridParams::default(),
			filter: FilterParams::default(),
			pattern: PatternParams::default(),
			skills: SkillsParams::default(),
			adaptive_fusion: FusionParams::default(),
		}
	}
}

/// Parameter record sent by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyParams {
	Plain,
	Hybrid(HybridParams),
	Filter(FilterParams),
	Pattern(PatternParams),
	Skills(SkillsParams),
	AdaptiveFusion(FusionParams),
}
impl StrategyParams {
	pub fn to_value(&self) -> Value {
		let value = match self {
			Self::Plain => Ok(Value::Object(Map::new())),
			Self::Hybrid(params) => serde_json::to_value(params),
			Self::Filter(params) => serde_json::to_value(params),
			Self::Pattern(params) => serde_json::to_value(params),
			Self::Skills(params) => serde_json::to_value(params),
			Self::AdaptiveFusion(params) => serde_json::to_value(params),
		};

		value.unwrap_or_else(|_| Value::Object(Map::new()))
	}

	/// Editable fields as `(key, rendered value)` pairs, in form order.
	pub fn fields(&self) -> Vec<(&'static str, String)> {
		match self {
			Self::Plain => Vec::new(),
			Self::Hybrid(params) => vec![
				("vector_weight", params.vector_weight.to_string()),
				("rrf_k", params.rrf_k.to_string()),
			],
			Self::Filter(params) => vec![
				("role", params.role.clone().unwrap_or_default()),
				("skills", params.skills.join(", ")),
			],
			Self::Pattern(params) => vec![
				(
					"pattern_type",
					params.pattern_type.map(|kind| kind.as_str()).unwrap_or("custom").to_string(),
				),
				("custom_pattern", params.custom_pattern.clone().unwrap_or_default()),
			],
			Self::Skills(params) => vec![
				("required_skills", params.required_skills.join(", ")),
				("preferred_skills", params.preferred_skills.join(", ")),
			],
			Self::AdaptiveFusion(params) => vec![
				("bm25_weight", params.bm25_weight.to_string()),
				("vector_weight", params.vector_weight.to_string()),
				("skill_proficiency_boost", params.skill_proficiency_boost.to_string()),
				("recency_boost", params.recency_boost.to_string()),
				("bm25_k1", params.bm25_k1.to_string()),
				("bm25_b", params.bm25_b.to_string()),
				("fusion_method", params.fusion_method.to_string()),
			],
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridParams {
	pub vector_weight: f64,
	pub rrf_k: u32,
}
impl Default for HybridParams {
	fn default() -> Self {
		Self { vector_weight: 0.5, rrf_k: 60 }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternParams {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pattern_type: Option<PatternType>,
	/// Ignored by the backend whenever `pattern_type` is set.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub custom_pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
	Email,
	Phone,
}
impl PatternType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Email => "email",
			Self::Phone => "phone",
		}
	}

	/// Blank or `custom` means "use the custom regex".
	fn parse_optional(raw: &str) -> Result<Option<Self>, ParamError> {
		match raw.trim() {
			"" | "custom" => Ok(None),
			"email" => Ok(Some(Self::Email)),
			"phone" => Ok(Some(Self::Phone)),
			other => Err(ParamError::InvalidChoice {
				key: "pattern_type".to_string(),
				allowed: "email, phone, or custom",
				raw: other.to_string(),
			}),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsParams {
	pub required_skills: Vec<String>,
	pub preferred_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionParams {
	pub bm25_weight: f64,
	pub vector_weight: f64,
	pub skill_proficiency_boost: f64,
	pub recency_boost: f64,
	pub bm25_k1: f64,
	pub bm25_b: f64,
	pub fusion_method: FusionMethod,
}
impl FusionParams {
	pub fn validate(&self) -> Result<(), ParamError> {
		check_range("adaptive_fusion.bm25_weight", self.bm25_weight, UNIT_RANGE)?;
		check_range("adaptive_fusion.vector_weight", self.vector_weight, UNIT_RANGE)?;
		check_range(
			"adaptive_fusion.skill_proficiency_boost",
			self.skill_proficiency_boost,
			UNIT_RANGE,
		)?;
		check_range("adaptive_fusion.recency_boost", self.recency_boost, UNIT_RANGE)?;
		check_range("adaptive_fusion.bm25_k1", self.bm25_k1, BM25_K1_RANGE)?;
		check_range("adaptive_fusion.bm25_b", self.bm25_b, UNIT_RANGE)?;

		Ok(())
	}
}
impl Default for FusionParams {
	fn default() -> Self {
		Self {
			bm25_weight: 0.5,
			vector_weight: 0.5,
			skill_proficiency_boost: 0.3,
			recency_boost: 0.1,
			bm25_k1: 1.5,
			bm25_b: 0.6,
			fusion_method: FusionMethod::WeightedSum,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
	#[default]
	WeightedSum,
	Multiplicative,
	Rrf,
}
impl FusionMethod {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::WeightedSum => "weighted_sum",
			Self::Multiplicative => "multiplicative",
			Self::Rrf => "rrf",
		}
	}
}
impl fmt::Display for FusionMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for FusionMethod {
	type Err = ParamError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim() {
			"weighted_sum" => Ok(Self::WeightedSum),
			"multiplicative" => Ok(Self::Multiplicative),
			"rrf" => Ok(Self::Rrf),
			other => Err(ParamError::InvalidChoice {
				key: "fusion_method".to_string(),
				allowed: "weighted_sum, multiplicative, or rrf",
				raw: other.to_string(),
			}),
		}
	}
}

/// Splits a comma-separated form value into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

fn non_blank(raw: &str) -> Option<String> {
	let trimmed = raw.trim();

	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

fn parse_u32(key: &str, raw: &str) -> Result<u32, ParamError> {
	raw.trim()
		.parse()
		.map_err(|_| ParamError::NotAnInteger { key: key.to_string(), raw: raw.to_string() })
}

fn parse_in_range(key: &str, raw: &str, range: RangeInclusive<f64>) -> Result<f64, ParamError> {
	let value: f64 = raw
		.trim()
		.parse()
		.map_err(|_| ParamError::NotANumber { key: key.to_string(), raw: raw.to_string() })?;

	check_range(key, value, range)?;

	Ok(value)
}

fn check_range(key: &str, value: f64, range: RangeInclusive<f64>) -> Result<(), ParamError> {
	if !value.is_finite() || !range.contains(&value) {
		return Err(ParamError::OutOfRange {
			key: key.to_string(),
			min: *range.start(),
			max: *range.end(),
			value,
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn split_list_trims_and_drops_blanks() {
		assert_eq!(split_list(" Python ,React,, "), vec!["Python", "React"]);
		assert!(split_list("").is_empty());
	}

	#[test]
	fn plain_strategies_send_only_query_and_limit() {
		let params = ParameterSet::default();
		let body = params.request_body(Strategy::Keyword, "python developer");

		assert_eq!(
			Value::Object(body),
			serde_json::json!({ "query": "python developer", "limit": 10 })
		);
	}

	#[test]
	fn hybrid_body_carries_weight_and_rrf_k() {
		let mut params = ParameterSet::default();

		params.set(Strategy::Hybrid, "vector_weight", "0.7").expect("set vector_weight");
		params.set(Strategy::Hybrid, "rrf_k", " 30 ").expect("set rrf_k");

		let body = params.request_body(Strategy::Hybrid, "rust");

		assert_eq!(body.get("rrf_k"), Some(&Value::from(30)));
		assert!(
			(body["vector_weight"].as_f64().unwrap_or_default() - 0.7).abs() < 1e-6,
			"unexpected body: {body:?}"
		);
	}

	#[test]
	fn fusion_body_nests_parameters_and_caps_top_k() {
		let mut params = ParameterSet::default();

		params.set(Strategy::AdaptiveFusion, "bm25_weight", "0.9").expect("set bm25_weight");
		params.set(Strategy::AdaptiveFusion, "limit", "250").expect("set limit");

		let body = params.request_body(Strategy::AdaptiveFusion, "rust");

		assert_eq!(body["parameters"]["bm25_weight"], 0.9);
		assert_eq!(body["parameters"]["fusion_method"], body["fusion_method"]);
		assert_eq!(body["bm25_weight"], 0.9);
		assert_eq!(body["top_k"], 100);
		assert_eq!(body["limit"], 250);
		assert!(params.request_body(Strategy::Hybrid, "rust").get("parameters").is_none());
	}

	#[test]
	fn numeric_fields_reject_garbage() {
		let mut params = ParameterSet::default();
		let err = params.set(Strategy::Hybrid, "rrf_k", "sixty").expect_err("expected error");

		assert!(matches!(err, ParamError::NotAnInteger { .. }), "unexpected error: {err}");

		let err = params.set(Strategy::AdaptiveFusion, "bm25_k1", "4.0").expect_err("expected error");

		assert!(matches!(err, ParamError::OutOfRange { .. }), "unexpected error: {err}");
	}

	#[test]
	fn keys_belong_to_their_strategy() {
		let mut params = ParameterSet::default();
		let err = params.set(Strategy::Vector, "rrf_k", "10").expect_err("expected error");

		assert_eq!(err, ParamError::UnknownKey { strategy: Strategy::Vector, key: "rrf_k".to_string() });
	}

	#[test]
	fn filter_lists_are_split_before_send() {
		let mut params = ParameterSet::default();

		params.assign(Strategy::Filter, "skills=Python, React ,SQL").expect("assign skills");
		params.assign(Strategy::Filter, "role=  ").expect("assign role");

		let body = params.request_body(Strategy::Filter, "q");

		assert_eq!(body["skills"], serde_json::json!(["Python", "React", "SQL"]));
		assert!(!body.contains_key("role"));
	}

	#[test]
	fn custom_pattern_must_compile() {
		let mut params = ParameterSet::default();
		let err =
			params.set(Strategy::Pattern, "custom_pattern", "(unclosed").expect_err("expected error");

		assert!(matches!(err, ParamError::InvalidPattern { .. }), "unexpected error: {err}");

		params.set(Strategy::Pattern, "pattern_type", "email").expect("set pattern_type");

		assert_eq!(params.pattern.pattern_type, Some(PatternType::Email));
	}

	#[test]
	fn fusion_defaults_match_backend_defaults() {
		let body = ParameterSet::default().request_body(Strategy::AdaptiveFusion, "q");

		assert_eq!(body["fusion_method"], "weighted_sum");
		assert_eq!(body.len(), 11);
	}

	#[test]
	fn assignment_requires_equals_sign() {
		let mut params = ParameterSet::default();
		let err = params.assign(Strategy::Keyword, "limit").expect_err("expected error");

		assert!(matches!(err, ParamError::MalformedAssignment { .. }));
	}
}
