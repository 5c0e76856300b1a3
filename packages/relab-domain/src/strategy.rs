use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Strategies the compare picker offers, in display order.
pub const COMPARABLE: [Strategy; 11] = [
	Strategy::AdaptiveFusion,
	Strategy::Keyword,
	Strategy::Vector,
	Strategy::Hybrid,
	Strategy::Fts,
	Strategy::Fuzzy,
	Strategy::Agentic,
	Strategy::AgenticTool,
	Strategy::AgenticAnalysis,
	Strategy::Stm,
	Strategy::Bm25,
];

pub const DEFAULT_COMPARE: [Strategy; 2] = [Strategy::Keyword, Strategy::Vector];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
	AdaptiveFusion,
	Keyword,
	Vector,
	Hybrid,
	Filter,
	Pattern,
	Skills,
	Fts,
	Fuzzy,
	Agentic,
	AgenticTool,
	AgenticAnalysis,
	Stm,
	Bm25,
}
impl Strategy {
	pub const ALL: [Strategy; 14] = [
		Strategy::AdaptiveFusion,
		Strategy::Keyword,
		Strategy::Vector,
		Strategy::Hybrid,
		Strategy::Filter,
		Strategy::Pattern,
		Strategy::Skills,
		Strategy::Fts,
		Strategy::Fuzzy,
		Strategy::Agentic,
		Strategy::AgenticTool,
		Strategy::AgenticAnalysis,
		Strategy::Stm,
		Strategy::Bm25,
	];

	/// Path segment of the backend endpoint, `/api/search/{id}`.
	pub fn id(self) -> &'static str {
		match self {
			Self::AdaptiveFusion => "adaptive-fusion",
			Self::Keyword => "keyword",
			Self::Vector => "vector",
			Self::Hybrid => "hybrid",
			Self::Filter => "filter",
			Self::Pattern => "pattern",
			Self::Skills => "skills",
			Self::Fts => "fts",
			Self::Fuzzy => "fuzzy",
			Self::Agentic => "agentic",
			Self::AgenticTool => "agentic_tool",
			Self::AgenticAnalysis => "agentic_analysis",
			Self::Stm => "stm",
			Self::Bm25 => "bm25",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::AdaptiveFusion => "Adaptive Fusion (Mega)",
			Self::Keyword => "Keyword Search",
			Self::Vector => "Vector Search",
			Self::Hybrid => "Hybrid Search",
			Self::Filter => "Metadata Filter",
			Self::Pattern => "Pattern Match",
			Self::Skills => "Skill Search",
			Self::Fts => "Full Text Search",
			Self::Fuzzy => "Fuzzy Search",
			Self::Agentic => "Agentic Search",
			Self::AgenticTool => "Agentic (Tool Use)",
			Self::AgenticAnalysis => "Agentic (Analysis)",
			Self::Stm => "STM (Dual Search)",
			Self::Bm25 => "BM25 Search",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Self::AdaptiveFusion => "Tunable multi-strategy fusion",
			Self::Keyword => "Exact match & frequency",
			Self::Vector => "Semantic similarity",
			Self::Hybrid => "Vector + Keyword (RRF)",
			Self::Filter => "Structured filtering",
			Self::Pattern => "Regex patterns",
			Self::Skills => "Required & Preferred",
			Self::Fts => "Postgres Native FTS",
			Self::Fuzzy => "Trigram Similarity",
			Self::Agentic => "AI Re-ranking",
			Self::AgenticTool => "AI selects search tool",
			Self::AgenticAnalysis => "AI rewrites query",
			Self::Stm => "Vector + FTS on Chunks",
			Self::Bm25 => "Probabilistic keyword ranking",
		}
	}

	/// Agentic strategies do their own query analysis, so they always get the user's raw
	/// query instead of the optimizer's rewrite.
	pub fn wants_original_query(self) -> bool {
		matches!(self, Self::Agentic | Self::AgenticTool | Self::AgenticAnalysis)
	}

	pub fn is_comparable(self) -> bool {
		COMPARABLE.contains(&self)
	}
}
impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}
impl FromStr for Strategy {
	type Err = UnknownStrategy;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let needle = raw.trim();

		Self::ALL
			.into_iter()
			.find(|strategy| strategy.id() == needle)
			.ok_or_else(|| UnknownStrategy { name: needle.to_string() })
	}
}
impl Serialize for Strategy {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.id())
	}
}
impl<'de> Deserialize<'de> for Strategy {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown strategy {name:?}.")]
pub struct UnknownStrategy {
	pub name: String,
}
