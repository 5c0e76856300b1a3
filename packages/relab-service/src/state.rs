use std::{collections::BTreeMap, time::Duration};

use serde::Serialize;

use relab_domain::{Candidate, Optimization, Strategy};

/// Identifies one accepted submission. Strictly increasing per [`crate::Lab`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);
impl Generation {
	pub fn value(self) -> u64 {
		self.0
	}

	pub(crate) fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	#[default]
	Single,
	Compare,
}

/// How one strategy request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Succeeded { results: Vec<Candidate>, elapsed: Duration },
	Failed { elapsed: Duration },
}
impl Outcome {
	pub fn elapsed(&self) -> Duration {
		match self {
			Self::Succeeded { elapsed, .. } | Self::Failed { elapsed } => *elapsed,
		}
	}
}

/// Emitted by a strategy task when its request settles.
#[derive(Debug, Clone, PartialEq)]
pub struct SettledEvent {
	pub generation: Generation,
	pub strategy: Strategy,
	pub outcome: Outcome,
}

/// One column of a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySlot {
	pub strategy: Strategy,
	/// `None` until the request settles.
	pub results: Option<Vec<Candidate>>,
	pub loading: bool,
	/// Wall-clock seconds of a successful request.
	pub elapsed_seconds: Option<f64>,
}
impl StrategySlot {
	fn pending(strategy: Strategy) -> Self {
		Self { strategy, results: None, loading: true, elapsed_seconds: None }
	}
}

/// Everything a renderer needs. Only [`LabState::apply`] and the submission entry points mutate
/// it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabState {
	pub generation: Generation,
	pub mode: Mode,
	pub query: String,
	pub strategy: Option<Strategy>,
	pub loading: bool,
	pub results: Vec<Candidate>,
	pub comparison: Vec<StrategySlot>,
	pub optimization: Option<Optimization>,
	/// Single-mode wall-clock milliseconds keyed by strategy id.
	pub metrics: BTreeMap<String, f64>,
}
impl LabState {
	pub fn slot(&self, strategy: Strategy) -> Option<&StrategySlot> {
		self.comparison.iter().find(|slot| slot.strategy == strategy)
	}

	/// True once every request of the current generation has settled.
	pub fn is_settled(&self) -> bool {
		!self.loading && self.comparison.iter().all(|slot| !slot.loading)
	}

	/// Starts a comparison run. Drops everything from earlier runs, metrics included.
	pub(crate) fn begin_compare(
		&mut self,
		generation: Generation,
		query: &str,
		strategies: &[Strategy],
	) {
		*self = Self {
			generation,
			mode: Mode::Compare,
			query: query.to_string(),
			strategy: None,
			loading: false,
			results: Vec::new(),
			comparison: strategies.iter().copied().map(StrategySlot::pending).collect(),
			optimization: None,
			metrics: BTreeMap::new(),
		};
	}

	/// Starts a single-strategy run. Results and metrics of earlier runs are dropped.
	pub(crate) fn begin_single(&mut self, generation: Generation, query: &str, strategy: Strategy) {
		*self = Self {
			generation,
			mode: Mode::Single,
			query: query.to_string(),
			strategy: Some(strategy),
			loading: true,
			..Self::default()
		};
	}

	/// Returns `false` when `generation` is stale and nothing changed.
	pub(crate) fn apply_optimization(
		&mut self,
		generation: Generation,
		optimization: Option<Optimization>,
	) -> bool {
		if generation != self.generation {
			tracing::debug!(
				stale = generation.value(),
				current = self.generation.value(),
				"Discarding stale optimization."
			);

			return false;
		}

		self.optimization = optimization;

		true
	}

	/// The reducer. Returns `false` when the event was discarded.
	pub fn apply(&mut self, event: SettledEvent) -> bool {
		if event.generation != self.generation {
			tracing::debug!(
				strategy = %event.strategy,
				stale = event.generation.value(),
				current = self.generation.value(),
				"Discarding stale settled event."
			);

			return false;
		}

		match self.mode {
			Mode::Single => self.apply_single(event),
			Mode::Compare => self.apply_compare(event),
		}
	}

	fn apply_single(&mut self, event: SettledEvent) -> bool {
		if self.strategy != Some(event.strategy) || !self.loading {
			return false;
		}

		let millis = event.outcome.elapsed().as_secs_f64() * 1_000.0;

		self.results = match event.outcome {
			Outcome::Succeeded { results, .. } => results,
			Outcome::Failed { .. } => Vec::new(),
		};
		self.metrics.insert(event.strategy.id().to_string(), millis);
		self.loading = false;

		true
	}

	fn apply_compare(&mut self, event: SettledEvent) -> bool {
		let Some(slot) = self.comparison.iter_mut().find(|slot| slot.strategy == event.strategy)
		else {
			return false;
		};

		if !slot.loading {
			return false;
		}

		match event.outcome {
			Outcome::Succeeded { results, elapsed } => {
				slot.results = Some(results);
				slot.elapsed_seconds = Some(elapsed.as_secs_f64());
			},
			Outcome::Failed { .. } => slot.results = Some(Vec::new()),
		}

		slot.loading = false;

		true
	}

	/// Settles whatever is still loading in `generation` with an empty result. Used when a
	/// strategy task vanished without reporting.
	pub(crate) fn settle_remaining(&mut self, generation: Generation) {
		if generation != self.generation {
			return;
		}

		for slot in self.comparison.iter_mut().filter(|slot| slot.loading) {
			tracing::warn!(strategy = %slot.strategy, "Strategy task ended without a result.");

			slot.results = Some(Vec::new());
			slot.loading = false;
		}
	}
}
