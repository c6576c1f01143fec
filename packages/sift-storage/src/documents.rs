use sqlx::PgExecutor;

use crate::{Result, models::DocumentSource};

pub async fn insert_document_source<'e, E>(executor: E, source: &DocumentSource) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO document_sources (document_id, knowledge_store_id, file_name, source_locator)
VALUES ($1,$2,$3,$4)
ON CONFLICT (document_id) DO UPDATE
SET
\tknowledge_store_id = EXCLUDED.knowledge_store_id,
\tfile_name = EXCLUDED.file_name,
\tsource_locator = EXCLUDED.source_locator",
	)
	.bind(source.document_id)
	.bind(source.knowledge_store_id)
	.bind(source.file_name.as_deref())
	.bind(source.source_locator.as_str())
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_document_source<'e, E>(
	executor: E,
	document_id: i64,
) -> Result<Option<DocumentSource>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, DocumentSource>(
		"\
SELECT document_id, knowledge_store_id, file_name, source_locator
FROM document_sources
WHERE document_id = $1
LIMIT 1",
	)
	.bind(document_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}
