use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub synthesis: Synthesis,
	#[serde(default)]
	pub escalation: Escalation,
	#[serde(default)]
	pub resolution: Resolution,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
	pub scratch: Scratch,
	#[serde(default)]
	pub objects: Objects,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	/// Knowledge store `<id>` is searched in collection `<collection_prefix>_<id>`.
	pub collection_prefix: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Scratch {
	pub dir: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Objects {
	/// Optional. HTTP gateway that serves `s3://bucket/key` locators as `<base_url>/bucket/key`.
	pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub synthesizer: LlmProviderConfig,
	pub grader: LlmProviderConfig,
	pub extraction: Option<ExtractionProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	pub fetch_k: u32,
	/// MMR lambda. 1.0 ranks purely by relevance, 0.0 purely by novelty.
	pub diversity: f32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: 4, fetch_k: 10, diversity: 0.9 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Synthesis {
	pub max_history_turns: u32,
}
impl Default for Synthesis {
	fn default() -> Self {
		Self { max_history_turns: 20 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Escalation {
	pub enabled: bool,
	/// Feed the rejected chunk-based answer and its verdict into the whole-document pass.
	pub include_prior_feedback: bool,
}
impl Default for Escalation {
	fn default() -> Self {
		Self { enabled: true, include_prior_feedback: false }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Resolution {
	pub concurrent_stores: bool,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub api_auth_token: Option<String>,
}
