use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::FusionParams;

/// Response of the STM evaluation worker: one generated chunk per chunk type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub chunks: BTreeMap<String, Value>,
}

/// Named adaptive-fusion parameter set published by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionPreset {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub use_when: String,
	#[serde(default)]
	pub parameters: FusionParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalog {
	#[serde(default)]
	pub presets: BTreeMap<String, FusionPreset>,
}
impl PresetCatalog {
	pub fn get(&self, key: &str) -> Option<&FusionPreset> {
		self.presets.get(key.trim())
	}
}
