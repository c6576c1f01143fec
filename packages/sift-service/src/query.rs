use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use sift_domain::{DocumentId, history::HistoryTurn};

/// One question against an ordered list of knowledge stores. Store order is significant: the
/// first store supplies the top-level answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
	pub id: i64,
	pub question: String,
	#[serde(rename = "knowledgeStoreList")]
	pub knowledge_stores: Vec<KnowledgeStoreRef>,
	#[serde(rename = "historyList", default)]
	pub history: Vec<HistoryTurn>,
}
impl Query {
	pub fn validate(&self) -> Result<()> {
		if self.question.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "question must be non-empty.".to_string(),
			});
		}

		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStoreRef {
	pub id: i64,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	/// Request side: optional allow-list. Response side: the resolved provenance ids.
	#[serde(rename = "documentIds", default)]
	pub document_ids: Vec<DocumentId>,
}
impl KnowledgeStoreRef {
	pub fn with_document_ids(&self, document_ids: Vec<DocumentId>) -> Self {
		Self { document_ids, ..self.clone() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
	pub id: i64,
	pub question: String,
	pub answer: String,
	#[serde(rename = "raw_context")]
	pub excerpt: String,
	#[serde(rename = "knowledgeStoreList")]
	pub knowledge_stores: Vec<KnowledgeStoreRef>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_uses_wire_field_names() {
		let raw = serde_json::json!({
			"id": 9,
			"question": "What is the BP?",
			"knowledgeStoreList": [
				{ "id": 1, "name": "Vitals", "type": "medical", "documentIds": [42] }
			],
			"historyList": [{ "id": 3, "question": "Hi", "answer": null }]
		});
		let query: Query = serde_json::from_value(raw).expect("parse failed");

		assert_eq!(query.knowledge_stores[0].kind, "medical");
		assert_eq!(query.knowledge_stores[0].document_ids, vec![42]);
		assert_eq!(query.history[0].answer, None);
	}

	#[test]
	fn history_and_allow_list_are_optional() {
		let raw = serde_json::json!({
			"id": 1,
			"question": "q",
			"knowledgeStoreList": [{ "id": 1, "name": "n", "type": "t" }]
		});
		let query: Query = serde_json::from_value(raw).expect("parse failed");

		assert!(query.history.is_empty());
		assert!(query.knowledge_stores[0].document_ids.is_empty());
	}

	#[test]
	fn blank_question_is_invalid() {
		let query = Query {
			id: 1,
			question: "  ".to_string(),
			knowledge_stores: Vec::new(),
			history: Vec::new(),
		};

		assert!(matches!(query.validate(), Err(Error::InvalidRequest { .. })));
	}
}
