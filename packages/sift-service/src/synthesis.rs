use sift_config::LlmProviderConfig;
use sift_domain::{
	history::{self, HistoryTurn},
	sentinel,
	verdict::Verdict,
};
use sift_providers::chat::ChatMessage;

use crate::{ChatProvider, Error, EvidenceChunk, Result};

/// What the synthesizer is asked to do. A `Revision` carries an earlier rejected answer and its
/// verdict so the model can correct it.
#[derive(Debug, Clone, Copy)]
pub enum SynthesisInput<'a> {
	Base,
	Revision { prior_output: &'a str, prior_verdict: &'a Verdict },
}

pub struct Synthesizer<'a> {
	pub provider: &'a dyn ChatProvider,
	pub cfg: &'a LlmProviderConfig,
	pub max_history_turns: usize,
}
impl Synthesizer<'_> {
	/// Answers from retrieved chunks. No chunks means no model call and the sentinel answer.
	pub async fn synthesize(
		&self,
		system_prompt: &str,
		query: &str,
		chunks: &[EvidenceChunk],
		history: &[HistoryTurn],
	) -> Result<String> {
		if chunks.is_empty() {
			return Ok(sentinel::sentinel());
		}

		let context = format_context(chunks);

		self.synthesize_context(system_prompt, query, &context, history, SynthesisInput::Base).await
	}

	/// Runs the shared prompt skeleton over an arbitrary context body. Always calls the model.
	pub async fn synthesize_context(
		&self,
		system_prompt: &str,
		query: &str,
		context: &str,
		history: &[HistoryTurn],
		input: SynthesisInput<'_>,
	) -> Result<String> {
		let turns = history::recent_turns(history, self.max_history_turns);
		let messages = build_messages(system_prompt, context, query, turns, input);

		self.provider
			.complete(self.cfg, &messages)
			.await
			.map_err(|err| Error::SynthesisUnavailable { message: err.to_string() })
	}
}

pub fn format_context(chunks: &[EvidenceChunk]) -> String {
	chunks
		.iter()
		.enumerate()
		.map(|(idx, chunk)| {
			format!(
				"[Document {} - ID: {}]\nSource: {}\nContent: {}\n",
				idx + 1,
				chunk.document_id,
				chunk.source_locator,
				chunk.content
			)
		})
		.collect::<Vec<_>>()
		.join("\n")
}

pub fn build_messages(
	system_prompt: &str,
	context: &str,
	query: &str,
	history: &[HistoryTurn],
	input: SynthesisInput<'_>,
) -> Vec<ChatMessage> {
	let mut messages = vec![
		ChatMessage::system(system_prompt),
		ChatMessage::user(format!(
			"Context: {context}\n\nChat History:\n{}\n\nQuery: {query}\n\nAnswer the query based on the context provided.",
			history::render_history(history)
		)),
	];

	if let SynthesisInput::Revision { prior_output, prior_verdict } = input {
		messages.push(ChatMessage::assistant(prior_output));
		messages.push(ChatMessage::user(revision_feedback(prior_verdict)));
	}

	messages
}

fn revision_feedback(verdict: &Verdict) -> String {
	let validation = if verdict.is_correct { "Correct" } else { "Incorrect" };

	format!(
		"A reviewer graded the previous answer as {validation}.\nReviewer answer: {}\nReviewer excerpt: {}\n\nAnswer the query again using the full context above.",
		verdict.canonical_answer, verdict.supporting_excerpt
	)
}
