//! Maximal marginal relevance over a candidate pool.

pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return None;
	}

	Some((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

#[derive(Clone, Copy)]
struct DiversityPick {
	remaining_pos: usize,
	mmr_score: f32,
	retrieval_rank: usize,
}
impl DiversityPick {
	fn better_than(self, other: &Self) -> bool {
		self.mmr_score > other.mmr_score
			|| (self.mmr_score == other.mmr_score && self.retrieval_rank < other.retrieval_rank)
	}
}

/// Picks up to `k` candidates, each maximizing `lambda * relevance - (1 - lambda) * redundancy`,
/// where relevance is similarity to the query and redundancy is the highest similarity to any
/// candidate already picked. Candidates arrive in retrieval order, which breaks ties.
pub fn select_diverse<T>(
	query: &[f32],
	candidates: Vec<(T, Vec<f32>)>,
	k: usize,
	lambda: f32,
) -> Vec<T> {
	if candidates.is_empty() || k == 0 {
		return Vec::new();
	}

	let relevance: Vec<f32> = candidates
		.iter()
		.map(|(_, embedding)| cosine_similarity(query, embedding).unwrap_or(0.0))
		.collect();
	let mut remaining: Vec<usize> = (0..candidates.len()).collect();
	let mut selected: Vec<usize> = Vec::with_capacity(k.min(candidates.len()));

	while selected.len() < k && !remaining.is_empty() {
		let mut best: Option<DiversityPick> = None;

		for (remaining_pos, &candidate_idx) in remaining.iter().enumerate() {
			let redundancy = selected
				.iter()
				.filter_map(|&selected_idx| {
					cosine_similarity(&candidates[candidate_idx].1, &candidates[selected_idx].1)
				})
				.fold(None, |max: Option<f32>, similarity| {
					Some(max.map_or(similarity, |value| value.max(similarity)))
				})
				.unwrap_or(0.0);
			let pick = DiversityPick {
				remaining_pos,
				mmr_score: lambda * relevance[candidate_idx] - (1.0 - lambda) * redundancy,
				retrieval_rank: candidate_idx,
			};

			if best.map(|current| pick.better_than(&current)).unwrap_or(true) {
				best = Some(pick);
			}
		}

		let Some(best) = best else { break };

		selected.push(remaining.remove(best.remaining_pos));
	}

	let mut slots: Vec<Option<T>> = candidates.into_iter().map(|(item, _)| Some(item)).collect();

	selected.into_iter().filter_map(|idx| slots[idx].take()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cosine_similarity_rejects_mismatched_or_zero_vectors() {
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), None);
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]), Some(1.0));
	}

	#[test]
	fn pure_relevance_keeps_similarity_order() {
		let query = [1.0, 0.0];
		let candidates = vec![
			("far", vec![0.0, 1.0]),
			("near", vec![1.0, 0.1]),
			("mid", vec![1.0, 1.0]),
		];

		assert_eq!(select_diverse(&query, candidates, 2, 1.0), vec!["near", "mid"]);
	}

	#[test]
	fn near_duplicates_give_way_to_new_evidence() {
		let query = [1.0, 0.0];
		let candidates = vec![
			("first", vec![1.0, 0.0]),
			("duplicate", vec![1.0, 0.0]),
			("different", vec![0.6, 0.8]),
		];

		assert_eq!(select_diverse(&query, candidates, 2, 0.3), vec!["first", "different"]);
	}

	#[test]
	fn returns_everything_when_pool_is_smaller_than_k() {
		let query = [1.0, 0.0];
		let candidates = vec![("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])];

		assert_eq!(select_diverse(&query, candidates, 4, 0.9).len(), 2);
		assert!(select_diverse::<&str>(&query, Vec::new(), 4, 0.9).is_empty());
	}
}
