pub mod render;

use std::{
	collections::HashSet,
	path::PathBuf,
	sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use relab_client::HttpBackend;
use relab_config::Config;
use relab_domain::{ParameterSet, SearchQuery, Strategy, display};
use relab_service::{CompareSelection, Lab, LabState, Observer};

#[derive(Debug, Parser)]
#[command(
	version = relab_cli::VERSION,
	rename_all = "kebab",
	styles = relab_cli::styles(),
	after_help = relab_cli::strategy_help(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,
	/// Backend base URL. Overrides `backend.base_url`.
	#[arg(long, value_name = "URL", env = relab_config::API_URL_ENV, global = true)]
	pub api_url: Option<String>,
	/// Print the final state as JSON.
	#[arg(long, global = true)]
	pub json: bool,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// List every retrieval strategy.
	Strategies,
	/// Run one strategy.
	Search(SearchArgs),
	/// Run several strategies side by side.
	Compare(CompareArgs),
	/// Run the STM evaluation worker for one student.
	Evaluate(EvaluateArgs),
	/// List the adaptive-fusion presets the backend publishes.
	Presets,
}

#[derive(Debug, clap::Args)]
pub struct SearchArgs {
	pub query: String,
	/// Defaults to `search.default_strategy`.
	#[arg(long, short = 's', value_name = "STRATEGY")]
	pub strategy: Option<Strategy>,
	/// Strategy parameter, e.g. `-p vector_weight=0.7`. Repeatable.
	#[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
	pub params: Vec<String>,
	/// Adaptive-fusion preset to start from. Applied before `--param`.
	#[arg(long, value_name = "NAME")]
	pub preset: Option<String>,
	/// Print the parameters panel before the results.
	#[arg(long)]
	pub show_params: bool,
}

#[derive(Debug, clap::Args)]
pub struct CompareArgs {
	pub query: String,
	/// Replaces `search.compare_strategies`.
	#[arg(long, short = 's', value_name = "STRATEGY", value_delimiter = ',')]
	pub strategies: Vec<Strategy>,
	/// Flips one strategy in or out of the selection. Repeatable.
	#[arg(long, short = 't', value_name = "STRATEGY")]
	pub toggle: Vec<Strategy>,
	/// Per-strategy parameter, e.g. `-p hybrid.rrf_k=30`. Repeatable.
	#[arg(long = "param", short = 'p', value_name = "STRATEGY.KEY=VALUE")]
	pub params: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct EvaluateArgs {
	pub student_id: Uuid,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = relab_config::resolve(args.config.as_deref(), args.api_url.as_deref())?;

	init_tracing(&config);

	let output = execute(&args, config).await?;

	print!("{output}");

	Ok(())
}

/// Runs one subcommand and returns what should go to stdout.
pub async fn execute(args: &Args, config: Config) -> color_eyre::Result<String> {
	match &args.command {
		Command::Strategies => strategies(args.json, config.search.default_strategy),
		Command::Search(search) => run_search(args.json, search, config).await,
		Command::Compare(compare) => run_compare(args.json, compare, config).await,
		Command::Evaluate(evaluate) => run_evaluate(args.json, evaluate, config).await,
		Command::Presets => run_presets(args.json, config).await,
	}
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn strategies(json: bool, default_strategy: Strategy) -> color_eyre::Result<String> {
	if json {
		let catalog: Vec<_> = Strategy::ALL
			.into_iter()
			.map(|strategy| {
				serde_json::json!({
					"id": strategy.id(),
					"label": strategy.label(),
					"description": strategy.description(),
					"comparable": strategy.is_comparable(),
				})
			})
			.collect();

		return Ok(format!("{}\n", serde_json::to_string_pretty(&catalog)?));
	}

	Ok(render::strategies(Some(default_strategy)))
}

async fn run_search(json: bool, args: &SearchArgs, config: Config) -> color_eyre::Result<String> {
	if SearchQuery::new(&args.query).is_none() {
		return Err(eyre::eyre!("Query must be non-empty."));
	}

	let strategy = args.strategy.unwrap_or(config.search.default_strategy);
	let backend = Arc::new(HttpBackend::new(&config.backend)?);
	let mut params = config.search.params;

	if let Some(name) = args.preset.as_deref() {
		if strategy != Strategy::AdaptiveFusion {
			return Err(eyre::eyre!("--preset only applies to the adaptive-fusion strategy."));
		}

		let catalog = backend.fusion_presets().await?;
		let preset = catalog
			.get(name)
			.ok_or_else(|| eyre::eyre!("Unknown adaptive-fusion preset {name:?}."))?;

		preset.parameters.validate()?;

		params.adaptive_fusion = preset.parameters.clone();
	}

	for assignment in &args.params {
		params.assign(strategy, assignment)?;
	}

	let panel = render::parameters(strategy, params.limit, &params.for_strategy(strategy));
	let lab = Lab::new(backend, params);
	let Some(state) = lab.search(&args.query, strategy).await else {
		return Err(eyre::eyre!("Query must be non-empty."));
	};

	if json {
		return Ok(format!("{}\n", serde_json::to_string_pretty(&state)?));
	}

	let mut out = String::new();

	if args.show_params {
		out.push_str(&panel);
		out.push('\n');
	}

	out.push_str(&render::single_view(&state));

	Ok(out)
}

async fn run_compare(json: bool, args: &CompareArgs, config: Config) -> color_eyre::Result<String> {
	let selection = compare_selection(&config, args)?;
	let params = compare_params(config.search.params, &args.params)?;
	let backend = Arc::new(HttpBackend::new(&config.backend)?);
	let lab = Lab::new(backend, params);
	let progress = Progress::default();
	let quiet = |_: &LabState| {};
	let observer: &dyn Observer = if json { &quiet } else { &progress };
	let Some(state) = lab.compare_observed(&args.query, &selection, observer).await? else {
		return Err(eyre::eyre!("Query must be non-empty."));
	};

	if json {
		return Ok(format!("{}\n", serde_json::to_string_pretty(&state)?));
	}

	Ok(render::comparison_view(&state))
}

async fn run_evaluate(
	json: bool,
	args: &EvaluateArgs,
	config: Config,
) -> color_eyre::Result<String> {
	let lab = Lab::new(Arc::new(HttpBackend::new(&config.backend)?), config.search.params);
	let student_id = args.student_id.to_string();
	let outcome = lab.evaluate(&student_id).await;

	if json {
		let value = match &outcome {
			Ok(report) => serde_json::to_value(report)?,
			Err(err) => serde_json::json!({ "error": err.to_string() }),
		};

		return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
	}

	match &outcome {
		Ok(report) => Ok(render::evaluation_panel(Ok(report))),
		Err(err) => Ok(render::evaluation_panel(Err(&err.to_string()))),
	}
}

async fn run_presets(json: bool, config: Config) -> color_eyre::Result<String> {
	let lab = Lab::new(Arc::new(HttpBackend::new(&config.backend)?), config.search.params);
	let catalog = lab.fusion_presets().await?;

	if json {
		return Ok(format!("{}\n", serde_json::to_string_pretty(&catalog)?));
	}

	Ok(render::presets(&catalog))
}

/// Starts from `--strategies` or the configured set, then applies each `--toggle` in order.
pub fn compare_selection(
	config: &Config,
	args: &CompareArgs,
) -> color_eyre::Result<CompareSelection> {
	let base = if args.strategies.is_empty() {
		config.search.compare_strategies.clone()
	} else {
		args.strategies.clone()
	};
	let mut selection = CompareSelection::from_strategies(base)?;

	for strategy in &args.toggle {
		selection.toggle(*strategy)?;
	}

	Ok(selection)
}

/// Applies `STRATEGY.KEY=VALUE` assignments on top of the configured parameters.
pub fn compare_params(
	mut params: ParameterSet,
	assignments: &[String],
) -> color_eyre::Result<ParameterSet> {
	for assignment in assignments {
		let (target, raw) = assignment
			.split_once('=')
			.ok_or_else(|| eyre::eyre!("Expected STRATEGY.KEY=VALUE, got {assignment:?}."))?;
		let (strategy, key) = target
			.split_once('.')
			.ok_or_else(|| eyre::eyre!("Expected STRATEGY.KEY=VALUE, got {assignment:?}."))?;
		let strategy: Strategy = strategy.parse()?;

		params.set(strategy, key.trim(), raw)?;
	}

	Ok(params)
}

/// Streams one stderr line per settled strategy while a comparison runs.
#[derive(Default)]
struct Progress {
	reported: Mutex<HashSet<Strategy>>,
}
impl Observer for Progress {
	fn on_update(&self, state: &LabState) {
		let mut reported = self.reported.lock().unwrap_or_else(|err| err.into_inner());

		for slot in state.comparison.iter().filter(|slot| !slot.loading) {
			if !reported.insert(slot.strategy) {
				continue;
			}

			let count = slot.results.as_ref().map(Vec::len).unwrap_or_default();
			let elapsed = slot
				.elapsed_seconds
				.map(display::format_seconds)
				.unwrap_or_else(|| "failed".to_string());

			eprintln!("{:<18} {count:>3} results  {elapsed}", slot.strategy.id());
		}
	}
}
