use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use relab_config::{Config, DEFAULT_BASE_URL, Error};
use relab_domain::{FusionMethod, Strategy};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml() -> String {
	SAMPLE_CONFIG_TEMPLATE_TOML.to_string()
}

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("relab_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> relab_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = relab_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn loads_and_normalizes_sample_config() {
	let cfg = load_payload(sample_toml()).expect("Expected sample config to load.");

	assert_eq!(cfg.backend.base_url, "http://127.0.0.1:8000");
	assert_eq!(cfg.backend.timeout_ms(), None);
	assert_eq!(cfg.search.default_strategy, Strategy::Hybrid);
	assert_eq!(
		cfg.search.compare_strategies,
		vec![Strategy::Keyword, Strategy::Vector, Strategy::Agentic]
	);
	assert_eq!(cfg.search.params.limit, 5);
	assert_eq!(cfg.search.params.hybrid.vector_weight, 0.7);
	assert_eq!(cfg.search.params.adaptive_fusion.fusion_method, FusionMethod::Rrf);
	assert_eq!(cfg.search.params.adaptive_fusion.recency_boost, 0.1);
}

#[test]
fn empty_file_yields_defaults() {
	let cfg = load_payload(String::new()).expect("Expected empty config to load.");

	assert_eq!(cfg, Config::default());
	assert_eq!(cfg.backend.base_url, DEFAULT_BASE_URL);
	assert_eq!(cfg.search.compare_strategies, vec![Strategy::Keyword, Strategy::Vector]);
}

#[test]
fn unknown_strategy_fails_to_parse() {
	let payload =
		sample_toml_with("search", "default_strategy", Value::String("semantic".to_string()));
	let err = load_payload(payload).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn compare_strategies_must_be_comparable() {
	let payload = sample_toml_with(
		"search",
		"compare_strategies",
		Value::Array(vec![Value::String("keyword".to_string()), Value::String("filter".to_string())]),
	);
	let err = load_payload(payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(message.contains("cannot include filter"), "Unexpected error message: {message}");
}

#[test]
fn compare_strategies_must_be_unique() {
	let payload = sample_toml_with(
		"search",
		"compare_strategies",
		Value::Array(vec![Value::String("bm25".to_string()), Value::String("bm25".to_string())]),
	);
	let err = load_payload(payload).expect_err("Expected validation error.");

	assert!(err.to_string().contains("more than once"), "Unexpected error: {err}");
}

#[test]
fn base_url_must_be_http() {
	let payload =
		sample_toml_with("backend", "base_url", Value::String("localhost:8000".to_string()));
	let err = load_payload(payload).expect_err("Expected validation error.");

	assert!(
		err.to_string().contains("backend.base_url must start with http:// or https://."),
		"Unexpected error: {err}"
	);
}

#[test]
fn out_of_range_params_are_rejected() {
	let payload = sample_toml_with("search.params.hybrid", "vector_weight", Value::Float(1.5));
	let err = load_payload(payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(message.starts_with("search.params:"), "Unexpected error message: {message}");
	assert!(message.contains("hybrid.vector_weight"), "Unexpected error message: {message}");
}

#[test]
fn timeout_is_opt_in() {
	let payload = sample_toml_with("backend", "timeout_ms", Value::Integer(2_500));
	let cfg = load_payload(payload).expect("Expected config to load.");

	assert_eq!(cfg.backend.timeout_ms(), Some(2_500));
}

#[test]
fn override_replaces_file_base_url() {
	let path = write_temp_config(sample_toml());
	let result = relab_config::resolve(Some(&path), Some("https://search.example.com/"));

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected config to resolve.");

	assert_eq!(cfg.backend.base_url, "https://search.example.com");
}

#[test]
fn resolve_without_file_uses_defaults_and_ignores_blank_override() {
	let cfg = relab_config::resolve(None, Some("  ")).expect("Expected defaults to resolve.");

	assert_eq!(cfg.backend.base_url, DEFAULT_BASE_URL);
}
