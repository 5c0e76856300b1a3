//! Query dispatch for single and compare mode.
//!
//! Every accepted submission takes the next [`Generation`](crate::Generation) under the state
//! lock. Strategy tasks report back through [`SettledEvent`]s and the run's reducer loop applies
//! them, so a newer submission turns every in-flight event of an older one into a no-op.

use std::{
	sync::{Arc, Mutex, MutexGuard, PoisonError},
	time::Instant,
};

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use relab_domain::{EvaluationReport, ParameterSet, PresetCatalog, SearchQuery, Strategy, query_for};

use crate::{
	CompareSelection, Error, Result, SearchBackend,
	state::{LabState, Outcome, SettledEvent},
};

/// Receives a state snapshot whenever a run makes progress.
pub trait Observer
where
	Self: Send + Sync,
{
	fn on_update(&self, state: &LabState);
}
impl<F> Observer for F
where
	F: Fn(&LabState) + Send + Sync,
{
	fn on_update(&self, state: &LabState) {
		self(state)
	}
}

pub struct Lab {
	backend: Arc<dyn SearchBackend>,
	params: ParameterSet,
	state: Mutex<LabState>,
}
impl Lab {
	pub fn new(backend: Arc<dyn SearchBackend>, params: ParameterSet) -> Self {
		Self { backend, params, state: Mutex::new(LabState::default()) }
	}

	pub fn params(&self) -> &ParameterSet {
		&self.params
	}

	pub fn state(&self) -> LabState {
		self.lock().clone()
	}

	/// Single mode. Returns `None` without touching state when the query is blank.
	pub async fn search(&self, raw_query: &str, strategy: Strategy) -> Option<LabState> {
		let query = SearchQuery::new(raw_query)?;
		let generation = {
			let mut state = self.lock();
			let generation = state.generation.next();

			state.begin_single(generation, query.as_str(), strategy);

			generation
		};
		let body = self.params.request_body(strategy, query.as_str());
		let outcome = run_strategy(self.backend.as_ref(), strategy, &body).await;
		let mut state = self.lock();

		state.apply(SettledEvent { generation, strategy, outcome });

		Some(state.clone())
	}

	/// Compare mode with no progress reporting.
	pub async fn compare(
		&self,
		raw_query: &str,
		selection: &CompareSelection,
	) -> Result<Option<LabState>> {
		self.compare_observed(raw_query, selection, &|_: &LabState| {}).await
	}

	/// Compare mode. Optimizes the query once, then fans out one task per selected strategy.
	///
	/// Returns `Ok(None)` without touching state when the query is blank. The snapshot returned
	/// belongs to whichever run is current once this run's events are drained; compare its
	/// `generation` to tell whether this run was superseded.
	pub async fn compare_observed(
		&self,
		raw_query: &str,
		selection: &CompareSelection,
		observer: &dyn Observer,
	) -> Result<Option<LabState>> {
		let Some(query) = SearchQuery::new(raw_query) else {
			return Ok(None);
		};

		if selection.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Select at least one strategy to compare.".to_string(),
			});
		}

		let generation = {
			let mut state = self.lock();
			let generation = state.generation.next();

			state.begin_compare(generation, query.as_str(), selection.strategies());
			observer.on_update(&state);

			generation
		};
		let optimization = match self.backend.optimize(query.as_str()).await {
			Ok(optimization) => optimization,
			Err(err) => {
				tracing::warn!(
					error = %err,
					"Query optimization failed. Using the original query."
				);

				None
			},
		};

		{
			let mut state = self.lock();

			if state.apply_optimization(generation, optimization.clone()) {
				observer.on_update(&state);
			}
		}

		let (tx, mut rx) = mpsc::unbounded_channel();

		for &strategy in selection.strategies() {
			let backend = Arc::clone(&self.backend);
			let text = query_for(strategy, query.as_str(), optimization.as_ref());
			let body = self.params.request_body(strategy, text);
			let tx = tx.clone();

			tokio::spawn(async move {
				let outcome = run_strategy(backend.as_ref(), strategy, &body).await;

				let _ = tx.send(SettledEvent { generation, strategy, outcome });
			});
		}

		drop(tx);

		while let Some(event) = rx.recv().await {
			let mut state = self.lock();

			if state.apply(event) {
				observer.on_update(&state);
			}
		}

		let mut state = self.lock();

		state.settle_remaining(generation);

		Ok(Some(state.clone()))
	}

	/// Runs the STM evaluation for one student. Failures carry the backend's message.
	pub async fn evaluate(&self, student_id: &str) -> Result<EvaluationReport> {
		let student_id = student_id.trim();

		if student_id.is_empty() {
			return Err(Error::InvalidRequest {
				message: "student_id must be non-empty.".to_string(),
			});
		}

		self.backend.evaluate(student_id).await.map_err(|err| match err {
			relab_client::Error::Evaluation { message } => Error::Evaluation { message },
			other => Error::Evaluation { message: other.to_string() },
		})
	}

	pub async fn fusion_presets(&self) -> Result<PresetCatalog> {
		Ok(self.backend.fusion_presets().await?)
	}

	fn lock(&self) -> MutexGuard<'_, LabState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

async fn run_strategy(
	backend: &dyn SearchBackend,
	strategy: Strategy,
	body: &Map<String, Value>,
) -> Outcome {
	let started = Instant::now();

	match backend.search(strategy, body).await {
		Ok(results) => {
			let elapsed = started.elapsed();

			tracing::debug!(%strategy, results = results.len(), ?elapsed, "Strategy settled.");

			Outcome::Succeeded { results, elapsed }
		},
		Err(err) => {
			tracing::warn!(%strategy, error = %err, "Strategy request failed. Showing no results.");

			Outcome::Failed { elapsed: started.elapsed() }
		},
	}
}
