use sift_domain::sentinel;

use crate::{Query, ResolutionOutcome, Response};

/// Builds the response from per-store outcomes given in the query's store order. Only the first
/// store supplies the top-level answer and excerpt; every store contributes its document ids.
pub fn aggregate(query: &Query, outcomes: Vec<ResolutionOutcome>) -> Response {
	let mut answer = None;
	let mut excerpt = None;
	let mut knowledge_stores = Vec::with_capacity(outcomes.len());

	for (store, outcome) in query.knowledge_stores.iter().zip(outcomes) {
		if answer.is_none() {
			answer = Some(outcome.final_answer);
			excerpt = Some(outcome.final_excerpt);
		}

		knowledge_stores.push(store.with_document_ids(outcome.final_document_ids));
	}

	Response {
		id: query.id,
		question: query.question.clone(),
		answer: answer.unwrap_or_else(sentinel::sentinel),
		excerpt: excerpt.unwrap_or_else(sentinel::sentinel),
		knowledge_stores,
	}
}
