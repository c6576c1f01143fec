use sift_domain::{
	history::{self, HistoryTurn},
	provenance,
	sentinel::{self, NO_DATA_FOUND},
	verdict::{GradeRecord, Verdict},
};

fn record(answer: &str, validation: &str, ids: Vec<i64>) -> GradeRecord {
	GradeRecord {
		answer: answer.to_string(),
		raw_context: format!("excerpt for {answer}"),
		found_doc_ids: ids,
		validation: validation.to_string(),
	}
}

#[test]
fn recent_turns_keeps_newest_in_original_order() {
	let turns: Vec<HistoryTurn> =
		(0..25).map(|idx| HistoryTurn::new(format!("q{idx}"), format!("a{idx}"))).collect();
	let kept = history::recent_turns(&turns, 20);

	assert_eq!(kept.len(), 20);
	assert_eq!(kept.first().map(|turn| turn.question.as_str()), Some("q5"));
	assert_eq!(kept.last().map(|turn| turn.question.as_str()), Some("q24"));
	assert_eq!(history::recent_turns(&turns[..3], 20).len(), 3);
}

#[test]
fn render_history_prefixes_roles() {
	let turns = vec![
		HistoryTurn::new("What is the BP?", "120/80"),
		HistoryTurn { question: "And the pulse?".to_string(), answer: None },
	];

	assert_eq!(
		history::render_history(&turns),
		"User: What is the BP?\nAssistant: 120/80\nUser: And the pulse?"
	);
	assert_eq!(history::render_history(&[]), history::EMPTY_HISTORY);
}

#[test]
fn history_turn_accepts_missing_answer_on_the_wire() {
	let turn: HistoryTurn =
		serde_json::from_value(serde_json::json!({ "id": 7, "question": "hi", "answer": null }))
			.expect("Failed to parse history turn.");

	assert_eq!(turn.question, "hi");
	assert_eq!(turn.answer, None);
}

#[test]
fn merge_keeps_first_seen_order_without_duplicates() {
	assert_eq!(provenance::merge_document_ids(&[&[3, 1], &[1, 2]]), vec![3, 1, 2]);
	assert_eq!(provenance::merge_document_ids(&[&[3], &[3, 1, 5], &[]]), vec![3, 1, 5]);
	assert_eq!(provenance::merge_document_ids(&[&[], &[5, 5]]), vec![5]);
	assert!(provenance::merge_document_ids(&[]).is_empty());
}

#[test]
fn verdict_provenance_is_restricted_to_supplied_documents() {
	let verdict = Verdict::from_record(record("120/80", "Correct", vec![9, 4, 4, 7]), &[4, 7]);

	assert!(verdict.is_correct);
	assert_eq!(verdict.document_ids_used, vec![4, 7]);
}

#[test]
fn unsupplied_ids_are_reported_once_in_order() {
	assert_eq!(provenance::outside_of(&[9, 4, 9, 12, 7], &[4, 7]), vec![9, 12]);
	assert!(provenance::outside_of(&[4, 7], &[4, 7]).is_empty());
}

#[test]
fn validation_is_case_insensitive() {
	assert!(Verdict::from_record(record("x", "correct", vec![]), &[]).is_correct);
	assert!(Verdict::from_record(record("x", " CORRECT ", vec![]), &[]).is_correct);
	assert!(!Verdict::from_record(record("x", "Incorrect", vec![]), &[]).is_correct);
}

#[test]
fn correct_sentinel_is_not_accepted() {
	let verdict = Verdict::from_record(record(NO_DATA_FOUND, "Correct", vec![1]), &[1]);

	assert!(verdict.is_correct);
	assert!(verdict.is_sentinel());
	assert!(!verdict.is_accepted());
	assert!(Verdict::from_record(record("120/80", "Correct", vec![]), &[]).is_accepted());
	assert!(!Verdict::from_record(record("120/80", "Incorrect", vec![]), &[]).is_accepted());
}

#[test]
fn sentinel_constructor_round_trips_through_detection() {
	assert!(sentinel::is_sentinel(&sentinel::sentinel()));
}
