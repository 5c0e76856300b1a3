use serde::{Deserialize, Serialize};

use relab_domain::{DEFAULT_COMPARE, ParameterSet, Strategy};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub search: Search,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
	/// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `relab_service=debug`.
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backend {
	pub base_url: String,
	/// Per-request timeout. Zero leaves requests unbounded.
	pub timeout_ms: u64,
}
impl Backend {
	pub fn timeout_ms(&self) -> Option<u64> {
		(self.timeout_ms > 0).then_some(self.timeout_ms)
	}
}
impl Default for Backend {
	fn default() -> Self {
		Self { base_url: DEFAULT_BASE_URL.to_string(), timeout_ms: 0 }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_strategy: Strategy,
	pub compare_strategies: Vec<Strategy>,
	pub params: ParameterSet,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_strategy: Strategy::Keyword,
			compare_strategies: DEFAULT_COMPARE.to_vec(),
			params: ParameterSet::default(),
		}
	}
}
