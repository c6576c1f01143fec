use std::collections::HashSet;

use crate::DocumentId;

/// Ids in order of first appearance, duplicates removed.
pub fn first_seen_unique<I>(ids: I) -> Vec<DocumentId>
where
	I: IntoIterator<Item = DocumentId>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for id in ids {
		if seen.insert(id) {
			out.push(id);
		}
	}

	out
}

/// Union of every id list observed while resolving a store, first-seen order across `sources`.
pub fn merge_document_ids(sources: &[&[DocumentId]]) -> Vec<DocumentId> {
	first_seen_unique(sources.iter().flat_map(|ids| ids.iter().copied()))
}

/// Keeps only ids present in `allowed`, preserving the order of `reported`.
pub fn restrict_to(reported: &[DocumentId], allowed: &[DocumentId]) -> Vec<DocumentId> {
	let allowed: HashSet<DocumentId> = allowed.iter().copied().collect();

	first_seen_unique(reported.iter().copied().filter(|id| allowed.contains(id)))
}

/// Ids in `reported` that `restrict_to` would drop.
pub fn outside_of(reported: &[DocumentId], allowed: &[DocumentId]) -> Vec<DocumentId> {
	let allowed: HashSet<DocumentId> = allowed.iter().copied().collect();

	first_seen_unique(reported.iter().copied().filter(|id| !allowed.contains(id)))
}
