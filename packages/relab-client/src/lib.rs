mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde_json::{Map, Value};

use relab_domain::{Candidate, EvaluationReport, Optimization, PresetCatalog, Strategy};

const EVALUATION_FAILED: &str = "Evaluation failed";

/// Thin client for the retrieval backend's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpBackend {
	base_url: Url,
	client: Client,
}
impl HttpBackend {
	pub fn new(cfg: &relab_config::Backend) -> Result<Self> {
		let base_url = Url::parse(&cfg.base_url)
			.map_err(|err| Error::InvalidBaseUrl { message: err.to_string() })?;

		if base_url.cannot_be_a_base() {
			return Err(Error::InvalidBaseUrl {
				message: format!("{} cannot be used as a base URL.", cfg.base_url),
			});
		}

		let mut builder = Client::builder();

		if let Some(timeout_ms) = cfg.timeout_ms() {
			builder = builder.timeout(Duration::from_millis(timeout_ms));
		}

		Ok(Self { base_url, client: builder.build()? })
	}

	pub fn base_url(&self) -> &str {
		self.base_url.as_str()
	}

	/// `POST /api/search/optimize`. `Ok(None)` when the optimizer answered without a payload.
	pub async fn optimize(&self, query: &str) -> Result<Option<Optimization>> {
		let url = self.endpoint(&["api", "search", "optimize"])?;

		tracing::debug!(%url, "Requesting query optimization.");

		let res = self.client.post(url).json(&serde_json::json!({ "query": query })).send().await?;
		let json: Value = ensure_success(res).await?.json().await?;

		parse_optimize_response(json)
	}

	/// `POST /api/search/{strategy}` with `{query, ...params}` as the body.
	pub async fn search(
		&self,
		strategy: Strategy,
		body: &Map<String, Value>,
	) -> Result<Vec<Candidate>> {
		let url = self.endpoint(&["api", "search", strategy.id()])?;

		tracing::debug!(%url, %strategy, "Requesting strategy candidates.");

		let res = self.client.post(url).json(body).send().await?;
		let json: Value = ensure_success(res).await?.json().await?;

		parse_search_response(json)
	}

	/// `POST /api/stm/evaluate/{student_id}`. Failures carry the server's `detail` message.
	pub async fn evaluate(&self, student_id: &str) -> Result<EvaluationReport> {
		let url = self.endpoint(&["api", "stm", "evaluate", student_id])?;
		let res = self
			.client
			.post(url)
			.json(&serde_json::json!({ "student_id": student_id }))
			.send()
			.await?;

		if !res.status().is_success() {
			let body = res.text().await.unwrap_or_default();

			return Err(Error::Evaluation { message: evaluation_error_message(&body) });
		}

		Ok(res.json().await?)
	}

	/// `GET /api/search/adaptive-fusion/presets`.
	pub async fn fusion_presets(&self) -> Result<PresetCatalog> {
		let url = self.endpoint(&["api", "search", "adaptive-fusion", "presets"])?;
		let res = self.client.get(url).send().await?;

		Ok(ensure_success(res).await?.json().await?)
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| Error::InvalidBaseUrl {
				message: format!("{} cannot be used as a base URL.", self.base_url),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}
}

async fn ensure_success(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();

	Err(Error::Status { status: status.as_u16(), body })
}

fn parse_optimize_response(json: Value) -> Result<Option<Optimization>> {
	match json.get("optimization") {
		None | Some(Value::Null) => Ok(None),
		Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
	}
}

fn parse_search_response(json: Value) -> Result<Vec<Candidate>> {
	let results = json
		.get("results")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Search response is missing results array.".to_string(),
		})?;
	let mut candidates = Vec::with_capacity(results.len());

	for item in results {
		candidates.push(serde_json::from_value(item.clone())?);
	}

	Ok(candidates)
}

fn evaluation_error_message(body: &str) -> String {
	let Ok(json) = serde_json::from_str::<Value>(body) else {
		return EVALUATION_FAILED.to_string();
	};

	match json.get("detail") {
		Some(Value::String(detail)) if !detail.trim().is_empty() => detail.clone(),
		Some(Value::Null) | None => EVALUATION_FAILED.to_string(),
		Some(Value::String(_)) => EVALUATION_FAILED.to_string(),
		Some(other) => other.to_string(),
	}
}
