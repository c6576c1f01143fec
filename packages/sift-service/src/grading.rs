use serde_json::Value;

use sift_config::LlmProviderConfig;
use sift_domain::{
	DocumentId, provenance,
	verdict::{GradeRecord, Verdict},
};
use sift_providers::chat::{ChatMessage, ResponseSchema};

use crate::{ChatProvider, Error, Result};

pub const GRADE_SCHEMA_NAME: &str = "grade_llm_response";

pub struct Grader<'a> {
	pub provider: &'a dyn ChatProvider,
	pub cfg: &'a LlmProviderConfig,
	pub prompt: &'a str,
}
impl Grader<'_> {
	/// Judges `answer` against `query`. Any failure is fatal for the caller's knowledge store:
	/// there is no partial verdict and no fallback to accepting the answer.
	pub async fn grade(
		&self,
		query: &str,
		answer: &str,
		supplied_ids: &[DocumentId],
	) -> Result<Verdict> {
		let messages = grader_messages(self.prompt, query, answer, supplied_ids);
		let schema = grade_schema();
		let raw = self
			.provider
			.complete_structured(self.cfg, &messages, &schema)
			.await
			.map_err(|err| Error::GraderUnavailable { message: err.to_string() })?;

		parse_verdict(raw, supplied_ids)
	}
}

pub fn grade_schema() -> ResponseSchema {
	ResponseSchema {
		name: GRADE_SCHEMA_NAME.to_string(),
		schema: serde_json::json!({
			"type": "object",
			"additionalProperties": false,
			"required": ["answer", "raw_context", "found_doc_ids", "validation"],
			"properties": {
				"answer": { "type": "string" },
				"raw_context": { "type": "string" },
				"found_doc_ids": { "type": "array", "items": { "type": "integer" } },
				"validation": { "type": "string", "enum": ["Correct", "Incorrect"] },
			},
		}),
	}
}

/// Stored grader prompts may be templates with `{query}` and `{llm_response}` placeholders; those
/// are rendered into a single user message. Plain prompts become the system message.
pub fn grader_messages(
	prompt: &str,
	query: &str,
	answer: &str,
	supplied_ids: &[DocumentId],
) -> Vec<ChatMessage> {
	let candidates = if supplied_ids.is_empty() {
		"none".to_string()
	} else {
		supplied_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
	};

	if prompt.contains("{query}") || prompt.contains("{llm_response}") {
		let rendered = prompt.replace("{query}", query).replace("{llm_response}", answer);

		return vec![ChatMessage::user(format!(
			"{rendered}\n\nCandidate document ids: {candidates}"
		))];
	}

	vec![
		ChatMessage::system(prompt),
		ChatMessage::user(format!(
			"Query: {query}\n\nResponse to evaluate:\n{answer}\n\nCandidate document ids: {candidates}"
		)),
	]
}

pub fn parse_verdict(raw: Value, supplied_ids: &[DocumentId]) -> Result<Verdict> {
	let record: GradeRecord = serde_json::from_value(raw).map_err(|err| {
		Error::GraderUnavailable { message: format!("Grader returned a malformed verdict: {err}") }
	})?;
	let unsupplied = provenance::outside_of(&record.found_doc_ids, supplied_ids);

	if !unsupplied.is_empty() {
		tracing::warn!(
			?unsupplied,
			?supplied_ids,
			"Grader cited documents it was not shown. Dropping them."
		);
	}

	Ok(Verdict::from_record(record, supplied_ids))
}
