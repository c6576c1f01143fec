//! Per-store resolution: retrieve, synthesize, grade, then either accept the chunk-based answer or
//! re-answer once from the full text of the most relevant document.

use std::fmt;

use sift_domain::{DocumentId, provenance, sentinel, verdict::Verdict};

use crate::{
	KnowledgeStoreRef, Query, Result, SiftService, SynthesisInput,
	retrieval::{self, Evidence},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Retrieved,
	Synthesized,
	Graded,
	Accepted,
	Escalating,
	Resynthesized,
	Regraded,
	Finalized,
}
impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Retrieved => "RETRIEVED",
			Self::Synthesized => "SYNTHESIZED",
			Self::Graded => "GRADED",
			Self::Accepted => "ACCEPTED",
			Self::Escalating => "ESCALATING",
			Self::Resynthesized => "RE-SYNTHESIZED",
			Self::Regraded => "RE-GRADED",
			Self::Finalized => "FINALIZED",
		}
	}
}
impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// The rejected verdict named no document to re-read.
	NoCandidates,
	/// `escalation.enabled` is off.
	Disabled,
}

/// How a store's resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
	Accepted,
	Skipped { reason: SkipReason },
	Escalated { document_id: DocumentId },
	/// A fatal stage error ended resolution before a decision.
	Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
	pub final_answer: String,
	pub final_excerpt: String,
	pub final_document_ids: Vec<DocumentId>,
	pub escalation: Escalation,
	pub stages: Vec<Stage>,
}
impl ResolutionOutcome {
	/// Outcome of a store whose resolution failed fatally.
	pub fn aborted(stages: Vec<Stage>) -> Self {
		Self {
			final_answer: sentinel::sentinel(),
			final_excerpt: sentinel::sentinel(),
			final_document_ids: Vec::new(),
			escalation: Escalation::Aborted,
			stages,
		}
	}
}

struct StageTrail {
	knowledge_store_id: i64,
	stages: Vec<Stage>,
}
impl StageTrail {
	fn new(knowledge_store_id: i64) -> Self {
		Self { knowledge_store_id, stages: Vec::with_capacity(8) }
	}

	fn enter(&mut self, stage: Stage) {
		tracing::debug!(
			knowledge_store_id = self.knowledge_store_id,
			stage = %stage,
			"Stage entered."
		);

		self.stages.push(stage);
	}
}

impl SiftService {
	/// Resolves one knowledge store. Never fails: fatal stage errors become an aborted outcome
	/// carrying the sentinel answer, so sibling stores are unaffected.
	pub async fn resolve_store(
		&self,
		query: &Query,
		store: &KnowledgeStoreRef,
	) -> ResolutionOutcome {
		let mut trail = StageTrail::new(store.id);

		match self.run_store(query, store, &mut trail).await {
			Ok(outcome) => outcome,
			Err(err) => {
				tracing::error!(
					knowledge_store_id = store.id,
					error = %err,
					"Knowledge store resolution failed."
				);

				ResolutionOutcome::aborted(trail.stages)
			},
		}
	}

	async fn run_store(
		&self,
		query: &Query,
		store: &KnowledgeStoreRef,
		trail: &mut StageTrail,
	) -> Result<ResolutionOutcome> {
		let evidence = retrieval::retrieve(
			self.index.as_ref(),
			&self.cfg.retrieval,
			&query.question,
			store.id,
			&store.document_ids,
		)
		.await;

		trail.enter(Stage::Retrieved);

		let answer = self
			.synthesizer()
			.synthesize(&self.prompts.chatbot, &query.question, &evidence.chunks, &query.history)
			.await?;

		trail.enter(Stage::Synthesized);

		let verdict = self.grader().grade(&query.question, &answer, &evidence.document_ids).await?;

		trail.enter(Stage::Graded);

		if verdict.is_accepted() {
			trail.enter(Stage::Accepted);

			return Ok(finalize_accepted(verdict, &evidence, trail));
		}

		trail.enter(Stage::Escalating);

		if !self.cfg.escalation.enabled {
			return Ok(finalize_skipped(verdict, SkipReason::Disabled, trail));
		}

		let Some(document_id) = verdict.document_ids_used.first().copied() else {
			return Ok(finalize_skipped(verdict, SkipReason::NoCandidates, trail));
		};

		tracing::info!(
			knowledge_store_id = store.id,
			document_id,
			is_correct = verdict.is_correct,
			"Escalating to whole-document resolution."
		);

		let input = if self.cfg.escalation.include_prior_feedback {
			SynthesisInput::Revision { prior_output: &answer, prior_verdict: &verdict }
		} else {
			SynthesisInput::Base
		};
		let escalated_answer = self
			.resolve_whole_document(document_id, &query.question, &query.history, input)
			.await?;

		trail.enter(Stage::Resynthesized);

		let regrade =
			self.grader().grade(&query.question, &escalated_answer, &[document_id]).await?;

		trail.enter(Stage::Regraded);

		Ok(finalize_escalated(&verdict, &evidence, regrade, document_id, trail))
	}
}

fn finalize_accepted(
	verdict: Verdict,
	evidence: &Evidence,
	trail: &mut StageTrail,
) -> ResolutionOutcome {
	let final_document_ids = if verdict.document_ids_used.is_empty() {
		evidence.document_ids.clone()
	} else {
		verdict.document_ids_used
	};

	trail.enter(Stage::Finalized);

	ResolutionOutcome {
		final_answer: verdict.canonical_answer,
		final_excerpt: verdict.supporting_excerpt,
		final_document_ids,
		escalation: Escalation::Accepted,
		stages: std::mem::take(&mut trail.stages),
	}
}

fn finalize_skipped(
	verdict: Verdict,
	reason: SkipReason,
	trail: &mut StageTrail,
) -> ResolutionOutcome {
	tracing::info!(
		knowledge_store_id = trail.knowledge_store_id,
		reason = ?reason,
		"Escalation skipped."
	);

	trail.enter(Stage::Finalized);

	ResolutionOutcome {
		final_answer: verdict.canonical_answer,
		final_excerpt: verdict.supporting_excerpt,
		final_document_ids: Vec::new(),
		escalation: Escalation::Skipped { reason },
		stages: std::mem::take(&mut trail.stages),
	}
}

/// The re-grade always supplies the final answer, even when it is itself graded incorrect. When
/// that answer is the sentinel, every id observed across both attempts is reported, retrieved
/// documents included.
fn finalize_escalated(
	initial: &Verdict,
	evidence: &Evidence,
	regrade: Verdict,
	document_id: DocumentId,
	trail: &mut StageTrail,
) -> ResolutionOutcome {
	let final_document_ids = if regrade.is_sentinel() {
		provenance::merge_document_ids(&[
			initial.document_ids_used.as_slice(),
			evidence.document_ids.as_slice(),
			regrade.document_ids_used.as_slice(),
		])
	} else if regrade.document_ids_used.is_empty() {
		vec![document_id]
	} else {
		regrade.document_ids_used
	};

	trail.enter(Stage::Finalized);

	ResolutionOutcome {
		final_answer: regrade.canonical_answer,
		final_excerpt: regrade.supporting_excerpt,
		final_document_ids,
		escalation: Escalation::Escalated { document_id },
		stages: std::mem::take(&mut trail.stages),
	}
}
