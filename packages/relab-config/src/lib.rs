mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, DEFAULT_BASE_URL, Search, Service};

use std::{collections::HashSet, fs, path::Path};

/// Environment variable that overrides `backend.base_url`.
pub const API_URL_ENV: &str = "RELAB_API_URL";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Loads `path` when given, otherwise starts from defaults, then applies the base URL override.
///
/// The override is the only way besides the file to point the lab at another backend; the CLI
/// feeds it from `--api-url` / `RELAB_API_URL`.
pub fn resolve(path: Option<&Path>, base_url_override: Option<&str>) -> Result<Config> {
	let mut cfg = match path {
		Some(path) => load(path)?,
		None => Config::default(),
	};

	if let Some(base_url) = base_url_override.filter(|url| !url.trim().is_empty()) {
		cfg.backend.base_url = base_url.to_string();
	}

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.backend.base_url.is_empty() {
		return Err(Error::Validation {
			message: "backend.base_url must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.base_url.starts_with("http://") && !cfg.backend.base_url.starts_with("https://")
	{
		return Err(Error::Validation {
			message: "backend.base_url must start with http:// or https://.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for strategy in &cfg.search.compare_strategies {
		if !strategy.is_comparable() {
			return Err(Error::Validation {
				message: format!(
					"search.compare_strategies cannot include {strategy}; it is only available in single mode."
				),
			});
		}
		if !seen.insert(*strategy) {
			return Err(Error::Validation {
				message: format!("search.compare_strategies lists {strategy} more than once."),
			});
		}
	}

	cfg.search.params.validate()?;

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.backend.base_url.trim().trim_end_matches('/').to_string();

	cfg.backend.base_url = trimmed;

	if cfg.search.params.filter.role.as_deref().map(|role| role.trim().is_empty()).unwrap_or(false)
	{
		cfg.search.params.filter.role = None;
	}
	if cfg
		.search
		.params
		.pattern
		.custom_pattern
		.as_deref()
		.map(|pattern| pattern.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.search.params.pattern.custom_pattern = None;
	}
}
