mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Escalation, ExtractionProviderConfig, LlmProviderConfig,
	Objects, Postgres, Providers, Qdrant, Resolution, Retrieval, Scratch, Security, Service,
	Storage, Synthesis,
};

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
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection_prefix.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection_prefix must be non-empty.".to_string(),
		});
	}
	if cfg.storage.scratch.dir.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.scratch.dir must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.fetch_k < cfg.retrieval.top_k {
		return Err(Error::Validation {
			message: "retrieval.fetch_k must be greater than or equal to retrieval.top_k."
				.to_string(),
		});
	}
	if !cfg.retrieval.diversity.is_finite() {
		return Err(Error::Validation {
			message: "retrieval.diversity must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.retrieval.diversity) {
		return Err(Error::Validation {
			message: "retrieval.diversity must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.synthesis.max_history_turns == 0 {
		return Err(Error::Validation {
			message: "synthesis.max_history_turns must be greater than zero.".to_string(),
		});
	}

	for (label, key, timeout_ms) in [
		("embedding", &cfg.providers.embedding.api_key, cfg.providers.embedding.timeout_ms),
		("synthesizer", &cfg.providers.synthesizer.api_key, cfg.providers.synthesizer.timeout_ms),
		("grader", &cfg.providers.grader.api_key, cfg.providers.grader.timeout_ms),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if let Some(extraction) = cfg.providers.extraction.as_ref() {
		if extraction.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "Provider extraction api_key must be non-empty.".to_string(),
			});
		}
		if extraction.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "Provider extraction timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

pub fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
	if cfg.storage.objects.base_url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(false) {
		cfg.storage.objects.base_url = None;
	}
	if let Some(base_url) = cfg.storage.objects.base_url.as_mut() {
		let trimmed = base_url.trim_end_matches('/').len();

		base_url.truncate(trimmed);
	}
}
