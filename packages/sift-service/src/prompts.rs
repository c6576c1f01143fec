use sqlx::PgPool;

use sift_domain::sentinel::NO_DATA_FOUND;
use sift_storage::prompts;

pub const CHATBOT_PROMPT_NAME: &str = "Chatbot System Prompt";
pub const GRADER_PROMPT_NAME: &str = "Grader Agent Prompt";

/// System prompts used by the pipeline. The chunk-synthesis and grader prompts can be overridden
/// through the `prompts` table; the whole-document prompt is fixed.
#[derive(Debug, Clone)]
pub struct PromptSet {
	pub chatbot: String,
	pub grader: String,
	pub whole_document: String,
}
impl PromptSet {
	pub async fn load(pool: &PgPool) -> Self {
		let mut set = Self::default();

		if let Some(prompt) = load_prompt(pool, CHATBOT_PROMPT_NAME).await {
			set.chatbot = prompt;
		}
		if let Some(prompt) = load_prompt(pool, GRADER_PROMPT_NAME).await {
			set.grader = prompt;
		}

		set
	}
}
impl Default for PromptSet {
	fn default() -> Self {
		Self {
			chatbot: default_chatbot_prompt(),
			grader: default_grader_prompt(),
			whole_document: default_whole_document_prompt(),
		}
	}
}

async fn load_prompt(pool: &PgPool, name: &str) -> Option<String> {
	match prompts::get_prompt(pool, name).await {
		Ok(Some(prompt)) if !prompt.trim().is_empty() => Some(prompt),
		Ok(_) => {
			tracing::info!(prompt_name = name, "Stored prompt missing. Using built-in prompt.");

			None
		},
		Err(err) => {
			tracing::warn!(
				prompt_name = name,
				error = %err,
				"Failed to load stored prompt. Using built-in prompt."
			);

			None
		},
	}
}

fn default_chatbot_prompt() -> String {
	format!(
		"\
You answer questions about the user's documents using only the passages supplied as context.
Each passage is labelled with its document number, document id, and source.
Quote figures, dates, and names exactly as they appear in the passages.
Mention the document id of every passage you rely on.
If the passages do not contain the answer, reply with exactly: {NO_DATA_FOUND}"
	)
}

fn default_grader_prompt() -> String {
	format!(
		"\
You are a strict reviewer of answers produced from document passages.
Given the user's query and a candidate response, decide whether the response actually answers the
query.
Return:
- answer: the answer restated concisely, or exactly \"{NO_DATA_FOUND}\" if the response contains no
  answer.
- raw_context: the verbatim passage from the response that supports the answer, or
  \"{NO_DATA_FOUND}\".
- found_doc_ids: the ids of the documents the response relied on, taken only from the candidate
  document ids listed in the request.
- validation: \"Correct\" if the response answers the query, otherwise \"Incorrect\"."
	)
}

fn default_whole_document_prompt() -> String {
	format!(
		"\
You answer the user's query from the complete text of a single document.

Rules:
1. Read the whole document before answering. Use nothing outside it.
2. Produce one JSON object with exactly these keys:
   - \"source_metadata\": an array of objects {{\"doc_id\": <number>, \"source\": \"<source>\"}},
     copied from the metadata supplied with the document.
   - \"raw_context\": the verbatim passage that contains the answer.
   - \"summary\": a short summary of that passage.
   - \"answer\": a complete answer to the query.
3. Do not add commentary outside the JSON object.
4. If the document does not answer the query, return exactly \"{NO_DATA_FOUND}\" and nothing else."
	)
}
