pub const DENSE_VECTOR_NAME: &str = "dense";
pub const DOCUMENT_ID_KEY: &str = "document_id";

use crate::Result;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection_prefix: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &sift_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection_prefix: cfg.collection_prefix.clone(),
			vector_dim: cfg.vector_dim,
		})
	}

	/// Each knowledge store lives in its own collection.
	pub fn collection_for(&self, knowledge_store_id: i64) -> String {
		collection_name(&self.collection_prefix, knowledge_store_id)
	}
}

pub fn collection_name(prefix: &str, knowledge_store_id: i64) -> String {
	format!("{prefix}_{knowledge_store_id}")
}
