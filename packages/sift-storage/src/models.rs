use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct KnowledgeChunkRow {
	pub chunk_id: Uuid,
	pub document_id: i64,
	pub source_locator: String,
	pub content: String,
	pub embedding_text: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentSource {
	pub document_id: i64,
	pub knowledge_store_id: i64,
	pub file_name: Option<String>,
	pub source_locator: String,
}

/// A chunk row with its embedding decoded.
#[derive(Debug, Clone)]
pub struct KnowledgeChunk {
	pub chunk_id: Uuid,
	pub document_id: i64,
	pub source_locator: String,
	pub content: String,
	pub embedding: Vec<f32>,
}
