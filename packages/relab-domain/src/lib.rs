pub mod candidate;
pub mod display;
pub mod evaluation;
pub mod optimization;
pub mod params;
pub mod strategy;

pub use candidate::{Candidate, CandidateMetadata, Insight};
pub use evaluation::{EvaluationReport, FusionPreset, PresetCatalog};
pub use optimization::{Optimization, query_for};
pub use params::{
	FilterParams, FusionMethod, FusionParams, HybridParams, ParamError, ParameterSet,
	PatternParams, PatternType, SkillsParams, StrategyParams,
};
pub use strategy::{COMPARABLE, DEFAULT_COMPARE, Strategy, UnknownStrategy};

/// A submitted query. Holds the text exactly as typed; only blank input is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);
impl SearchQuery {
	pub fn new(raw: impl Into<String>) -> Option<Self> {
		let raw = raw.into();

		if raw.trim().is_empty() { None } else { Some(Self(raw)) }
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
