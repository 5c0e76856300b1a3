use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::strategy::Strategy;

/// Output of the query optimizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
	#[serde(default)]
	pub rewritten_query: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<Map<String, Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoning: Option<String>,
}
impl Optimization {
	/// The rewrite, if the optimizer produced a usable one.
	pub fn rewritten(&self) -> Option<&str> {
		Some(self.rewritten_query.as_str()).filter(|query| !query.trim().is_empty())
	}

	pub fn active_filters(&self) -> Option<&Map<String, Value>> {
		self.filters.as_ref().filter(|filters| !filters.is_empty())
	}
}

/// Picks the query text a strategy is sent during a comparison run.
pub fn query_for<'a>(
	strategy: Strategy,
	original: &'a str,
	optimization: Option<&'a Optimization>,
) -> &'a str {
	if strategy.wants_original_query() {
		return original;
	}

	optimization.and_then(Optimization::rewritten).unwrap_or(original)
}
