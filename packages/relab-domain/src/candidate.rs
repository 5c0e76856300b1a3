use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One ranked record returned by a strategy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Value>,
	#[serde(default)]
	pub score: Option<f64>,
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub highlighted_text: Option<String>,
	#[serde(default, deserialize_with = "deserialize_metadata")]
	pub metadata: CandidateMetadata,
	#[serde(default)]
	pub ai_reasoning: Option<String>,
	#[serde(default)]
	pub match_reason: Option<String>,
	#[serde(default, deserialize_with = "deserialize_keywords")]
	pub matched_keywords: Vec<String>,
}
impl Candidate {
	/// AI reasoning wins over the match insight when both are present.
	pub fn insight(&self) -> Option<Insight<'_>> {
		if let Some(reasoning) = non_empty(self.ai_reasoning.as_deref()) {
			return Some(Insight::AiReasoning(reasoning));
		}

		non_empty(self.match_reason.as_deref()).map(Insight::MatchReason)
	}

	/// Highlighted text when the backend produced it, otherwise the plain text.
	pub fn body(&self) -> &str {
		non_empty(self.highlighted_text.as_deref())
			.or(self.text.as_deref())
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insight<'a> {
	AiReasoning(&'a str),
	MatchReason(&'a str),
}

/// Candidate profile metadata. Backends send it either as an object or as a JSON-encoded
/// string; both end up here as a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateMetadata(pub Map<String, Value>);
impl CandidateMetadata {
	pub fn parse(value: Value) -> Self {
		match value {
			Value::Object(map) => Self(map),
			Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
				Ok(Value::Object(map)) => Self(map),
				_ => Self::default(),
			},
			_ => Self::default(),
		}
	}

	pub fn field(&self, key: &str) -> Option<String> {
		match self.0.get(key)? {
			Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
			Value::Number(number) => Some(number.to_string()),
			Value::Bool(flag) => Some(flag.to_string()),
			_ => None,
		}
	}

	pub fn name(&self) -> Option<String> {
		self.field("name")
	}

	pub fn role(&self) -> Option<String> {
		self.field("role")
	}

	pub fn location(&self) -> Option<String> {
		self.field("location")
	}

	pub fn experience(&self) -> Option<String> {
		self.field("experience")
	}

	pub fn skills_text(&self) -> Option<String> {
		self.field("skills_text")
	}

	pub fn projects_text(&self) -> Option<String> {
		self.field("projects_text")
	}
}

fn deserialize_metadata<'de, D>(deserializer: D) -> Result<CandidateMetadata, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;

	Ok(value.map(CandidateMetadata::parse).unwrap_or_default())
}

fn deserialize_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Vec<Value>>::deserialize(deserializer)?;

	Ok(value
		.unwrap_or_default()
		.into_iter()
		.filter_map(|item| match item {
			Value::String(text) => Some(text),
			Value::Number(number) => Some(number.to_string()),
			_ => None,
		})
		.collect())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|text| !text.trim().is_empty())
}
