pub mod dispatch;
pub mod selection;
pub mod state;

mod error;

pub use dispatch::{Lab, Observer};
pub use error::{Error, Result};
pub use selection::CompareSelection;
pub use state::{Generation, LabState, Mode, Outcome, SettledEvent, StrategySlot};

use std::{future::Future, pin::Pin};

use serde_json::{Map, Value};

use relab_client::HttpBackend;
use relab_domain::{Candidate, EvaluationReport, Optimization, PresetCatalog, Strategy};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The retrieval backend as seen by the dispatcher.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn optimize<'a>(
		&'a self,
		query: &'a str,
	) -> BoxFuture<'a, relab_client::Result<Option<Optimization>>>;

	fn search<'a>(
		&'a self,
		strategy: Strategy,
		body: &'a Map<String, Value>,
	) -> BoxFuture<'a, relab_client::Result<Vec<Candidate>>>;

	fn evaluate<'a>(
		&'a self,
		student_id: &'a str,
	) -> BoxFuture<'a, relab_client::Result<EvaluationReport>>;

	fn fusion_presets(&self) -> BoxFuture<'_, relab_client::Result<PresetCatalog>>;
}

impl SearchBackend for HttpBackend {
	fn optimize<'a>(
		&'a self,
		query: &'a str,
	) -> BoxFuture<'a, relab_client::Result<Option<Optimization>>> {
		Box::pin(HttpBackend::optimize(self, query))
	}

	fn search<'a>(
		&'a self,
		strategy: Strategy,
		body: &'a Map<String, Value>,
	) -> BoxFuture<'a, relab_client::Result<Vec<Candidate>>> {
		Box::pin(HttpBackend::search(self, strategy, body))
	}

	fn evaluate<'a>(
		&'a self,
		student_id: &'a str,
	) -> BoxFuture<'a, relab_client::Result<EvaluationReport>> {
		Box::pin(HttpBackend::evaluate(self, student_id))
	}

	fn fusion_presets(&self) -> BoxFuture<'_, relab_client::Result<PresetCatalog>> {
		Box::pin(HttpBackend::fusion_presets(self))
	}
}
