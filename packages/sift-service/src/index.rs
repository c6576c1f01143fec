pub mod diversity;

use std::{collections::HashMap, sync::Arc};

use qdrant_client::qdrant::{
	Condition, Filter, Query as QdrantQuery, QueryPointsBuilder, ScoredPoint,
	point_id::PointIdOptions,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{BoxFuture, EmbeddingProvider, Error, EvidenceChunk, IndexSearch, Result, VectorIndex};
use sift_config::EmbeddingProviderConfig;
use sift_storage::{
	chunks,
	models::KnowledgeChunk,
	qdrant::{DENSE_VECTOR_NAME, DOCUMENT_ID_KEY, QdrantStore},
};

/// Qdrant nearest-neighbour search with chunk bodies and embeddings loaded from Postgres, followed
/// by MMR selection.
pub struct QdrantIndex {
	pool: PgPool,
	qdrant: QdrantStore,
	embedding_cfg: EmbeddingProviderConfig,
	embedding: Arc<dyn EmbeddingProvider>,
}
impl QdrantIndex {
	pub fn new(
		pool: PgPool,
		qdrant: QdrantStore,
		embedding_cfg: EmbeddingProviderConfig,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { pool, qdrant, embedding_cfg, embedding }
	}

	async fn search_inner(&self, request: IndexSearch<'_>) -> Result<Vec<EvidenceChunk>> {
		let query_vec = self.embed_query(request.query).await?;
		let collection = self.qdrant.collection_for(request.knowledge_store_id);
		let mut search = QueryPointsBuilder::new(collection.clone())
			.query(QdrantQuery::new_nearest(query_vec.clone()))
			.using(DENSE_VECTOR_NAME)
			.with_payload(false)
			.limit(request.fetch_k as u64);

		if let Some(filter) = document_filter(request.document_filter) {
			search = search.filter(filter);
		}

		let response = self
			.qdrant
			.client
			.query(search)
			.await
			.map_err(|err| Error::Qdrant { message: err.to_string() })?;
		let chunk_ids = ranked_chunk_ids(&response.result)?;
		let rows = chunks::load_chunks(&self.pool, request.knowledge_store_id, &chunk_ids).await?;
		let candidates = order_candidates(&chunk_ids, rows, request.document_filter);

		tracing::debug!(
			collection = %collection,
			scored = chunk_ids.len(),
			candidates = candidates.len(),
			"Loaded retrieval candidates."
		);

		Ok(diversity::select_diverse(
			&query_vec,
			candidates,
			request.k as usize,
			request.diversity,
		))
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let texts = [query.to_string()];
		let mut vectors = self.embedding.embed(&self.embedding_cfg, &texts).await?;
		let vector = vectors.pop().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension {} does not match vector_dim {}.",
					vector.len(),
					self.qdrant.vector_dim
				),
			});
		}

		Ok(vector)
	}
}
impl VectorIndex for QdrantIndex {
	fn search<'a>(&'a self, request: IndexSearch<'a>) -> BoxFuture<'a, Result<Vec<EvidenceChunk>>> {
		Box::pin(async move {
			self.search_inner(request).await.map_err(|err| match err {
				Error::Retrieval { .. } => err,
				other => Error::Retrieval { message: other.to_string() },
			})
		})
	}
}

fn document_filter(document_ids: &[i64]) -> Option<Filter> {
	if document_ids.is_empty() {
		return None;
	}

	Some(Filter::all([Condition::matches(DOCUMENT_ID_KEY, document_ids.to_vec())]))
}

fn ranked_chunk_ids(points: &[ScoredPoint]) -> Result<Vec<Uuid>> {
	let mut ids = Vec::with_capacity(points.len());

	for point in points {
		let id = point.id.as_ref().ok_or_else(|| Error::Qdrant {
			message: "Qdrant returned item without id.".to_string(),
		})?;
		let chunk_id = match id.point_id_options.as_ref() {
			Some(PointIdOptions::Uuid(raw)) => Uuid::parse_str(raw).map_err(|_| Error::Qdrant {
				message: "Qdrant returned invalid uuid id.".to_string(),
			})?,
			Some(other) =>
				return Err(Error::Qdrant {
					message: format!("Qdrant returned unsupported id type: {other:?}."),
				}),
			None =>
				return Err(Error::Qdrant {
					message: "Qdrant returned item with missing id.".to_string(),
				}),
		};

		if !ids.contains(&chunk_id) {
			ids.push(chunk_id);
		}
	}

	Ok(ids)
}

/// Pairs each chunk with its embedding in Qdrant rank order. Ids without a Postgres row are
/// dropped.
fn order_candidates(
	ranked_ids: &[Uuid],
	rows: Vec<KnowledgeChunk>,
	document_filter: &[i64],
) -> Vec<(EvidenceChunk, Vec<f32>)> {
	let mut by_id: HashMap<Uuid, KnowledgeChunk> =
		rows.into_iter().map(|row| (row.chunk_id, row)).collect();
	let mut out = Vec::with_capacity(ranked_ids.len());

	for chunk_id in ranked_ids {
		let Some(row) = by_id.remove(chunk_id) else { continue };

		if !document_filter.is_empty() && !document_filter.contains(&row.document_id) {
			continue;
		}

		out.push((
			EvidenceChunk {
				content: row.content,
				document_id: row.document_id,
				source_locator: row.source_locator,
			},
			row.embedding,
		));
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(chunk_id: Uuid, document_id: i64) -> KnowledgeChunk {
		KnowledgeChunk {
			chunk_id,
			document_id,
			source_locator: format!("s3://docs/{document_id}.pdf"),
			content: format!("chunk of {document_id}"),
			embedding: vec![1.0, 0.0],
		}
	}

	#[test]
	fn candidates_follow_rank_order_and_skip_missing_rows() {
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();
		let missing = Uuid::new_v4();
		let candidates = order_candidates(&[b, missing, a], vec![row(a, 1), row(b, 2)], &[]);
		let documents: Vec<i64> = candidates.iter().map(|(chunk, _)| chunk.document_id).collect();

		assert_eq!(documents, vec![2, 1]);
	}

	#[test]
	fn candidates_respect_document_filter() {
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();
		let candidates = order_candidates(&[a, b], vec![row(a, 1), row(b, 2)], &[2]);

		assert_eq!(candidates.len(), 1);
		assert_eq!(candidates[0].0.document_id, 2);
	}

	#[test]
	fn empty_filter_builds_no_condition() {
		assert!(document_filter(&[]).is_none());
		assert!(document_filter(&[42]).is_some());
	}
}
