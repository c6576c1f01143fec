use sift_config::Retrieval;
use sift_domain::{DocumentId, provenance};

use crate::VectorIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceChunk {
	pub content: String,
	pub document_id: DocumentId,
	pub source_locator: String,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexSearch<'a> {
	pub query: &'a str,
	pub knowledge_store_id: i64,
	pub k: u32,
	pub fetch_k: u32,
	/// MMR lambda, weight toward relevance.
	pub diversity: f32,
	/// Empty means the whole store.
	pub document_filter: &'a [DocumentId],
}

/// Selected chunks plus their document ids in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct Evidence {
	pub chunks: Vec<EvidenceChunk>,
	pub document_ids: Vec<DocumentId>,
}
impl Evidence {
	pub fn from_chunks(chunks: Vec<EvidenceChunk>) -> Self {
		let document_ids =
			provenance::first_seen_unique(chunks.iter().map(|chunk| chunk.document_id));

		Self { chunks, document_ids }
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}
}

/// Best-effort retrieval. Backend failures degrade to empty evidence and never propagate.
pub async fn retrieve(
	index: &dyn VectorIndex,
	cfg: &Retrieval,
	query: &str,
	knowledge_store_id: i64,
	document_filter: &[DocumentId],
) -> Evidence {
	let request = IndexSearch {
		query,
		knowledge_store_id,
		k: cfg.top_k,
		fetch_k: cfg.fetch_k,
		diversity: cfg.diversity,
		document_filter,
	};

	match index.search(request).await {
		Ok(mut chunks) => {
			if !document_filter.is_empty() {
				chunks.retain(|chunk| document_filter.contains(&chunk.document_id));
			}

			chunks.truncate(cfg.top_k as usize);

			Evidence::from_chunks(chunks)
		},
		Err(err) => {
			tracing::warn!(
				knowledge_store_id,
				error = %err,
				"Retrieval degraded to empty evidence."
			);

			Evidence::default()
		},
	}
}
