use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{KnowledgeChunk, KnowledgeChunkRow},
};

pub async fn load_chunks<'e, E>(
	executor: E,
	knowledge_store_id: i64,
	chunk_ids: &[Uuid],
) -> Result<Vec<KnowledgeChunk>>
where
	E: PgExecutor<'e>,
{
	if chunk_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, KnowledgeChunkRow>(
		"\
SELECT
\tchunk_id,
\tdocument_id,
\tsource_locator,
\tcontent,
\tembedding::text AS embedding_text
FROM knowledge_chunks
WHERE knowledge_store_id = $1 AND chunk_id = ANY($2)",
	)
	.bind(knowledge_store_id)
	.bind(chunk_ids)
	.fetch_all(executor)
	.await?;
	let mut chunks = Vec::with_capacity(rows.len());

	for row in rows {
		chunks.push(KnowledgeChunk {
			chunk_id: row.chunk_id,
			document_id: row.document_id,
			source_locator: row.source_locator,
			content: row.content,
			embedding: parse_pg_vector(&row.embedding_text)?,
		});
	}

	Ok(chunks)
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets =
		trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')).ok_or_else(|| {
			Error::InvalidArgument("Vector text is not bracketed.".to_string())
		})?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| {
			Error::InvalidArgument("Vector text contains a non-numeric value.".to_string())
		})?;

		vec.push(value);
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_pgvector_text() {
		assert_eq!(parse_pg_vector("[0.5, -1,2e-1]").expect("parse failed"), vec![0.5, -1.0, 0.2]);
		assert!(parse_pg_vector("[]").expect("parse failed").is_empty());
	}

	#[test]
	fn rejects_malformed_vectors() {
		assert!(parse_pg_vector("0.5,1").is_err());
		assert!(parse_pg_vector("[0.5,abc]").is_err());
	}
}
