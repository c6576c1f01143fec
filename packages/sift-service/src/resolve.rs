use futures::future;

use crate::{Query, ResolutionOutcome, Response, SiftService, aggregate};

impl SiftService {
	/// Resolves every knowledge store of `query` and aggregates the outcomes. Always returns a
	/// well-formed response; a store that fails contributes the sentinel and no document ids.
	pub async fn resolve_query(&self, query: &Query) -> Response {
		tracing::info!(
			query_id = query.id,
			stores = query.knowledge_stores.len(),
			history_turns = query.history.len(),
			"Resolving query."
		);

		let outcomes: Vec<ResolutionOutcome> = if self.cfg.resolution.concurrent_stores {
			future::join_all(
				query.knowledge_stores.iter().map(|store| self.resolve_store(query, store)),
			)
			.await
		} else {
			let mut outcomes = Vec::with_capacity(query.knowledge_stores.len());

			for store in &query.knowledge_stores {
				outcomes.push(self.resolve_store(query, store).await);
			}

			outcomes
		};
		let response = aggregate::aggregate(query, outcomes);

		tracing::info!(query_id = query.id, answer_len = response.answer.len(), "Query resolved.");

		response
	}
}
