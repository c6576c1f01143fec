use sift_domain::{DocumentId, history::HistoryTurn};

use crate::{DocumentStore, Result, SiftService, SynthesisInput};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WholeDocument {
	pub document_id: DocumentId,
	pub source_locator: Option<String>,
	pub text: String,
}
impl WholeDocument {
	/// Context body for the whole-document pass: the metadata the model must echo, then the text.
	pub fn context(&self) -> String {
		let metadata = serde_json::json!({
			"doc_id": self.document_id,
			"source": self.source_locator.as_deref().unwrap_or_default(),
		});

		format!("Metadata:\n{metadata}\n\nDocument Content:\n{}", self.text)
	}
}

/// Looks up and fetches one document. Lookup, download, and extraction failures all collapse to an
/// empty body so synthesis still runs.
pub async fn load_document(
	documents: &dyn DocumentStore,
	document_id: DocumentId,
) -> WholeDocument {
	let source_locator = match documents.source_locator(document_id).await {
		Ok(locator) => locator,
		Err(err) => {
			tracing::warn!(document_id, error = %err, "Extraction failed. Source lookup failed.");

			return WholeDocument { document_id, source_locator: None, text: String::new() };
		},
	};
	let text = match documents.fetch_full_text(&source_locator).await {
		Ok(text) => text,
		Err(err) => {
			tracing::warn!(
				document_id,
				source_locator = %source_locator,
				error = %err,
				"Extraction failed. Continuing with empty context."
			);

			String::new()
		},
	};

	if text.trim().is_empty() {
		tracing::warn!(document_id, "Extraction produced no text.");
	}

	WholeDocument { document_id, source_locator: Some(source_locator), text }
}

impl SiftService {
	/// Re-answers `query` from the full text of a single document with the whole-document prompt.
	pub async fn resolve_whole_document(
		&self,
		document_id: DocumentId,
		query: &str,
		history: &[HistoryTurn],
		input: SynthesisInput<'_>,
	) -> Result<String> {
		let document = load_document(self.documents.as_ref(), document_id).await;

		self.synthesizer()
			.synthesize_context(
				&self.prompts.whole_document,
				query,
				&document.context(),
				history,
				input,
			)
			.await
	}
}
