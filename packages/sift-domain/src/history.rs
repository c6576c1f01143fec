use serde::{Deserialize, Serialize};

pub const EMPTY_HISTORY: &str = "No previous chat history.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
	#[serde(default)]
	pub question: String,
	#[serde(default)]
	pub answer: Option<String>,
}
impl HistoryTurn {
	pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
		Self { question: question.into(), answer: Some(answer.into()) }
	}
}

/// The newest `max_turns` turns, still oldest first. Older turns are dropped, never reordered.
pub fn recent_turns(turns: &[HistoryTurn], max_turns: usize) -> &[HistoryTurn] {
	let start = turns.len().saturating_sub(max_turns);

	&turns[start..]
}

pub fn render_history(turns: &[HistoryTurn]) -> String {
	let mut lines = Vec::with_capacity(turns.len() * 2);

	for turn in turns {
		if !turn.question.is_empty() {
			lines.push(format!("User: {}", turn.question));
		}
		if let Some(answer) = turn.answer.as_deref().filter(|answer| !answer.is_empty()) {
			lines.push(format!("Assistant: {answer}"));
		}
	}

	if lines.is_empty() {
		return EMPTY_HISTORY.to_string();
	}

	lines.join("\n")
}
