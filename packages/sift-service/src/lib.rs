pub mod aggregate;
pub mod escalation;
pub mod grading;
pub mod index;
pub mod prompts;
pub mod query;
pub mod retrieval;
pub mod source_documents;
pub mod synthesis;
pub mod whole_document;

mod error;
mod resolve;

pub use error::{Error, Result};
pub use escalation::{Escalation, ResolutionOutcome, SkipReason, Stage};
pub use prompts::PromptSet;
pub use query::{KnowledgeStoreRef, Query, Response};
pub use retrieval::{Evidence, EvidenceChunk, IndexSearch};
pub use synthesis::SynthesisInput;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use sift_config::{Config, EmbeddingProviderConfig, ExtractionProviderConfig, LlmProviderConfig};
use sift_domain::DocumentId;
use sift_providers::{
	chat::{self, ChatMessage, ResponseSchema},
	embedding, extraction,
};
use sift_storage::{db::Db, qdrant::QdrantStore, scratch::ScratchArea};

use crate::{
	grading::Grader, index::QdrantIndex, source_documents::SourceDocuments, synthesis::Synthesizer,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// A prompt-driven model. Synthesis and grading each hold their own instance so a deployment can
/// pair a fast synthesizer with a stricter judge.
pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<String>>;

	fn complete_structured<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
		schema: &'a ResponseSchema,
	) -> BoxFuture<'a, Result<Value>>;
}

pub trait ExtractionProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a ExtractionProviderConfig,
		file_name: &'a str,
		bytes: Vec<u8>,
	) -> BoxFuture<'a, Result<String>>;
}

/// Diversified similarity search over one knowledge store.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, request: IndexSearch<'a>) -> BoxFuture<'a, Result<Vec<EvidenceChunk>>>;
}

pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn source_locator<'a>(&'a self, document_id: DocumentId) -> BoxFuture<'a, Result<String>>;

	/// Full plain text of the document behind `locator`. OCR and format parsing happen here.
	fn fetch_full_text<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub synthesizer: Arc<dyn ChatProvider>,
	pub grader: Arc<dyn ChatProvider>,
	pub extraction: Arc<dyn ExtractionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		synthesizer: Arc<dyn ChatProvider>,
		grader: Arc<dyn ChatProvider>,
		extraction: Arc<dyn ExtractionProvider>,
	) -> Self {
		Self { embedding, synthesizer, grader, extraction }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			embedding: provider.clone(),
			synthesizer: provider.clone(),
			grader: provider.clone(),
			extraction: provider,
		}
	}
}

pub struct SiftService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub documents: Arc<dyn DocumentStore>,
	pub providers: Providers,
	pub prompts: PromptSet,
}
impl SiftService {
	pub fn new(
		cfg: Config,
		index: Arc<dyn VectorIndex>,
		documents: Arc<dyn DocumentStore>,
		providers: Providers,
		prompts: PromptSet,
	) -> Self {
		Self { cfg, index, documents, providers, prompts }
	}

	pub async fn connect(cfg: Config) -> Result<Self> {
		Self::connect_with_providers(cfg, Providers::default()).await
	}

	/// Wires the Postgres, Qdrant, and scratch-area collaborators and loads the stored prompts.
	pub async fn connect_with_providers(cfg: Config, providers: Providers) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema(cfg.storage.qdrant.vector_dim).await?;

		let prompts = PromptSet::load(&db.pool).await;
		let qdrant = QdrantStore::new(&cfg.storage.qdrant)?;
		let scratch = ScratchArea::new(&cfg.storage)?;
		let index = QdrantIndex::new(
			db.pool.clone(),
			qdrant,
			cfg.providers.embedding.clone(),
			providers.embedding.clone(),
		);
		let documents = SourceDocuments::new(
			db.pool.clone(),
			scratch,
			cfg.providers.extraction.clone(),
			providers.extraction.clone(),
		);

		tracing::info!(
			collection_prefix = %cfg.storage.qdrant.collection_prefix,
			extraction = cfg.providers.extraction.is_some(),
			"Resolution service connected."
		);

		Ok(Self::new(cfg, Arc::new(index), Arc::new(documents), providers, prompts))
	}

	pub(crate) fn synthesizer(&self) -> Synthesizer<'_> {
		Synthesizer {
			provider: self.providers.synthesizer.as_ref(),
			cfg: &self.cfg.providers.synthesizer,
			max_history_turns: self.cfg.synthesis.max_history_turns as usize,
		}
	}

	pub(crate) fn grader(&self) -> Grader<'_> {
		Grader {
			provider: self.providers.grader.as_ref(),
			cfg: &self.cfg.providers.grader,
			prompt: self.prompts.grader.as_str(),
		}
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(chat::complete(cfg, messages).await?) })
	}

	fn complete_structured<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
		schema: &'a ResponseSchema,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Ok(chat::complete_structured(cfg, messages, schema).await?) })
	}
}
impl ExtractionProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a ExtractionProviderConfig,
		file_name: &'a str,
		bytes: Vec<u8>,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(extraction::extract_text(cfg, file_name, bytes).await?) })
	}
}
