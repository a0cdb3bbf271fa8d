mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Cache, Config, Metrics, Search};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.backend.endpoint.trim().is_empty() {
		return Err(Error::Validation {
			message: "backend.endpoint must be non-empty.".to_string(),
		});
	}
	if cfg.backend.index.trim().is_empty() {
		return Err(Error::Validation { message: "backend.index must be non-empty.".to_string() });
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backend.stats_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.stats_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backend.stats_timeout_ms >= cfg.backend.timeout_ms {
		return Err(Error::Validation {
			message: "backend.stats_timeout_ms must be less than backend.timeout_ms.".to_string(),
		});
	}
	if cfg.search.max_result_window == 0 {
		return Err(Error::Validation {
			message: "search.max_result_window must be greater than zero.".to_string(),
		});
	}
	if cfg.search.vector_dim == 0 {
		return Err(Error::Validation {
			message: "search.vector_dim must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in
		[("vector_weight", cfg.search.vector_weight), ("text_weight", cfg.search.text_weight)]
	{
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("search.{label} must be a finite number."),
			});
		}
		if weight < 0.0 {
			return Err(Error::Validation {
				message: format!("search.{label} must be zero or greater."),
			});
		}
	}

	if cfg.search.vector_weight + cfg.search.text_weight <= 0.0 {
		return Err(Error::Validation {
			message: "search.vector_weight and search.text_weight must not both be zero."
				.to_string(),
		});
	}
	if cfg.cache.enabled {
		if cfg.cache.max_entries == 0 {
			return Err(Error::Validation {
				message: "cache.max_entries must be greater than zero.".to_string(),
			});
		}
		if cfg.cache.max_bytes == 0 {
			return Err(Error::Validation {
				message: "cache.max_bytes must be greater than zero.".to_string(),
			});
		}
		if cfg.cache.ttl_secs == 0 {
			return Err(Error::Validation {
				message: "cache.ttl_secs must be greater than zero.".to_string(),
			});
		}
	}
	if cfg.metrics.window == 0 {
		return Err(Error::Validation {
			message: "metrics.window must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.backend.endpoint.trim_end_matches('/');

	if trimmed.len() != cfg.backend.endpoint.len() {
		cfg.backend.endpoint = trimmed.to_string();
	}
}
