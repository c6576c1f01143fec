use sqlx::PgExecutor;

use crate::Result;

pub async fn get_prompt<'e, E>(executor: E, prompt_name: &str) -> Result<Option<String>>
where
	E: PgExecutor<'e>,
{
	let prompt = sqlx::query_scalar::<_, String>(
		"SELECT prompt FROM prompts WHERE prompt_name = $1 LIMIT 1",
	)
	.bind(prompt_name)
	.fetch_optional(executor)
	.await?;

	Ok(prompt)
}

pub async fn upsert_prompt<'e, E>(executor: E, prompt_name: &str, prompt: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO prompts (prompt_name, prompt)
VALUES ($1,$2)
ON CONFLICT (prompt_name) DO UPDATE
SET prompt = EXCLUDED.prompt, updated_at = now()",
	)
	.bind(prompt_name)
	.bind(prompt)
	.execute(executor)
	.await?;

	Ok(())
}
