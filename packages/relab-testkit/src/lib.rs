//! In-process stand-in for the retrieval backend.
//!
//! Tests script a [`Reply`] per endpoint, point the client at [`MockBackend::base_url`] and
//! afterwards inspect the request bodies the mock recorded.

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	future::IntoFuture,
	net::SocketAddr,
	sync::{Arc, Mutex},
	time::Duration,
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing,
};
use serde_json::Value;
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

const OPTIMIZE_KEY: &str = "optimize";
const PRESETS_KEY: &str = "presets";
const EVALUATE_KEY: &str = "evaluate";

/// Scripted response for one endpoint.
#[derive(Clone, Debug)]
pub enum Reply {
	Json { status: u16, body: Value },
	Text { status: u16, body: String },
	Delayed { delay: Duration, reply: Box<Reply> },
	/// Never answers; the connection stays open until the server shuts down.
	Hang,
}
impl Reply {
	pub fn ok(body: Value) -> Self {
		Self::Json { status: 200, body }
	}

	pub fn status(status: u16, body: impl Into<String>) -> Self {
		Self::Text { status, body: body.into() }
	}

	/// `{"results": [...]}` with `count` minimal candidates.
	pub fn candidates(count: usize) -> Self {
		let results: Vec<_> = (0..count)
			.map(|index| {
				serde_json::json!({
					"id": index + 1,
					"score": 1.0 - index as f64 * 0.1,
					"text": format!("Candidate profile {}", index + 1),
					"metadata": { "name": format!("Candidate {}", index + 1) }
				})
			})
			.collect();

		Self::ok(serde_json::json!({ "results": results }))
	}

	pub fn after(self, delay: Duration) -> Self {
		Self::Delayed { delay, reply: Box::new(self) }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
	pub path: String,
	pub body: Value,
}

#[derive(Default)]
struct MockState {
	replies: HashMap<String, Reply>,
	recorded: Mutex<Vec<RecordedRequest>>,
}
impl MockState {
	fn record(&self, path: String, body: Value) {
		let mut recorded = self.recorded.lock().unwrap_or_else(|err| err.into_inner());

		recorded.push(RecordedRequest { path, body });
	}
}

#[derive(Default)]
pub struct MockBackendBuilder {
	replies: HashMap<String, Reply>,
}
impl MockBackendBuilder {
	pub fn optimize(mut self, reply: Reply) -> Self {
		self.replies.insert(OPTIMIZE_KEY.to_string(), reply);

		self
	}

	/// Reply for `POST /api/search/{strategy_id}`.
	pub fn strategy(mut self, strategy_id: &str, reply: Reply) -> Self {
		self.replies.insert(format!("search:{strategy_id}"), reply);

		self
	}

	pub fn evaluate(mut self, reply: Reply) -> Self {
		self.replies.insert(EVALUATE_KEY.to_string(), reply);

		self
	}

	pub fn presets(mut self, reply: Reply) -> Self {
		self.replies.insert(PRESETS_KEY.to_string(), reply);

		self
	}

	pub async fn start(self) -> Result<MockBackend> {
		let state = Arc::new(MockState { replies: self.replies, recorded: Mutex::default() });
		let app = Router::new()
			.route("/api/search/optimize", routing::post(optimize_handler))
			.route("/api/search/adaptive-fusion/presets", routing::get(presets_handler))
			.route("/api/search/{strategy}", routing::post(search_handler))
			.route("/api/stm/evaluate/{student_id}", routing::post(evaluate_handler))
			.with_state(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(MockBackend { addr, state, shutdown: Some(tx) })
	}
}

pub struct MockBackend {
	addr: SocketAddr,
	state: Arc<MockState>,
	shutdown: Option<Sender<()>>,
}
impl MockBackend {
	pub fn builder() -> MockBackendBuilder {
		MockBackendBuilder::default()
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.state.recorded.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	/// Bodies recorded for `path`, oldest first.
	pub fn bodies_for(&self, path: &str) -> Vec<Value> {
		self.requests()
			.into_iter()
			.filter(|request| request.path == path)
			.map(|request| request.body)
			.collect()
	}

	pub fn shutdown(mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}
impl Drop for MockBackend {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

async fn optimize_handler(
	State(state): State<Arc<MockState>>,
	Json(body): Json<Value>,
) -> Response {
	state.record("/api/search/optimize".to_string(), body);

	respond(state.replies.get(OPTIMIZE_KEY).cloned()).await
}

async fn presets_handler(State(state): State<Arc<MockState>>) -> Response {
	state.record("/api/search/adaptive-fusion/presets".to_string(), Value::Null);

	respond(state.replies.get(PRESETS_KEY).cloned()).await
}

async fn search_handler(
	State(state): State<Arc<MockState>>,
	Path(strategy): Path<String>,
	Json(body): Json<Value>,
) -> Response {
	state.record(format!("/api/search/{strategy}"), body);

	respond(state.replies.get(&format!("search:{strategy}")).cloned()).await
}

async fn evaluate_handler(
	State(state): State<Arc<MockState>>,
	Path(student_id): Path<String>,
	Json(body): Json<Value>,
) -> Response {
	state.record(format!("/api/stm/evaluate/{student_id}"), body);

	respond(state.replies.get(EVALUATE_KEY).cloned()).await
}

async fn respond(reply: Option<Reply>) -> Response {
	let mut reply = match reply {
		Some(reply) => reply,
		None => return (StatusCode::NOT_FOUND, "No reply scripted.").into_response(),
	};

	loop {
		match reply {
			Reply::Json { status, body } =>
				return (status_code(status), Json(body)).into_response(),
			Reply::Text { status, body } => return (status_code(status), body).into_response(),
			Reply::Delayed { delay, reply: inner } => {
				tokio::time::sleep(delay).await;

				reply = *inner;
			},
			Reply::Hang => {
				tokio::time::sleep(Duration::from_secs(3_600)).await;

				return StatusCode::GATEWAY_TIMEOUT.into_response();
			},
		}
	}
}

fn status_code(status: u16) -> StatusCode {
	StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
