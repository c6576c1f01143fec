use serde::{Deserialize, Serialize};

use crate::{DocumentId, provenance, sentinel};

/// Structured judgment returned by the grader model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
	pub answer: String,
	pub raw_context: String,
	#[serde(default)]
	pub found_doc_ids: Vec<DocumentId>,
	pub validation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
	pub is_correct: bool,
	pub canonical_answer: String,
	pub supporting_excerpt: String,
	pub document_ids_used: Vec<DocumentId>,
}
impl Verdict {
	/// Builds a verdict whose provenance only names documents the grader was actually shown.
	pub fn from_record(record: GradeRecord, supplied_ids: &[DocumentId]) -> Self {
		Self {
			is_correct: record.validation.trim().eq_ignore_ascii_case("correct"),
			canonical_answer: record.answer,
			supporting_excerpt: record.raw_context,
			document_ids_used: provenance::restrict_to(&record.found_doc_ids, supplied_ids),
		}
	}

	pub fn is_sentinel(&self) -> bool {
		sentinel::is_sentinel(&self.canonical_answer)
	}

	/// A verdict is accepted only when it is graded correct and names an actual answer. A correct
	/// "not found" is rejected the same way as a wrong answer.
	pub fn is_accepted(&self) -> bool {
		self.is_correct && !self.is_sentinel()
	}
}
