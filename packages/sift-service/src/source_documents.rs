use std::sync::Arc;

use sqlx::PgPool;

use crate::{BoxFuture, DocumentStore, Error, ExtractionProvider, Result};
use sift_config::ExtractionProviderConfig;
use sift_domain::DocumentId;
use sift_storage::{documents, scratch::ScratchArea};

const PLAIN_TEXT_EXTENSIONS: [&str; 6] = ["txt", "md", "csv", "json", "log", "html"];

/// Postgres-backed locator lookup plus scratch download and text extraction.
pub struct SourceDocuments {
	pool: PgPool,
	scratch: ScratchArea,
	extraction_cfg: Option<ExtractionProviderConfig>,
	extraction: Arc<dyn ExtractionProvider>,
}
impl SourceDocuments {
	pub fn new(
		pool: PgPool,
		scratch: ScratchArea,
		extraction_cfg: Option<ExtractionProviderConfig>,
		extraction: Arc<dyn ExtractionProvider>,
	) -> Self {
		Self { pool, scratch, extraction_cfg, extraction }
	}

	async fn lookup(&self, document_id: DocumentId) -> Result<String> {
		let source = documents::get_document_source(&self.pool, document_id)
			.await?
			.ok_or(Error::DocumentNotFound { document_id })?;

		Ok(source.source_locator)
	}

	async fn fetch(&self, locator: &str) -> Result<String> {
		let file = self.scratch.download(locator).await?;
		let extension = file.extension();

		if is_plain_text(extension.as_deref()) {
			let bytes = tokio::fs::read(file.path())
				.await
				.map_err(|err| Error::Extraction { message: err.to_string() })?;

			return Ok(String::from_utf8_lossy(&bytes).into_owned());
		}

		let Some(cfg) = self.extraction_cfg.as_ref() else {
			tracing::warn!(
				locator,
				extension = extension.as_deref().unwrap_or("none"),
				"No extraction service configured for this format."
			);

			return Ok(String::new());
		};
		let bytes = tokio::fs::read(file.path())
			.await
			.map_err(|err| Error::Extraction { message: err.to_string() })?;

		self.extraction
			.extract(cfg, file.file_name(), bytes)
			.await
			.map_err(|err| Error::Extraction { message: err.to_string() })
	}
}
impl DocumentStore for SourceDocuments {
	fn source_locator<'a>(&'a self, document_id: DocumentId) -> BoxFuture<'a, Result<String>> {
		Box::pin(self.lookup(document_id))
	}

	fn fetch_full_text<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(self.fetch(locator))
	}
}

fn is_plain_text(extension: Option<&str>) -> bool {
	extension.map(|ext| PLAIN_TEXT_EXTENSIONS.contains(&ext)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_text_formats_skip_extraction() {
		assert!(is_plain_text(Some("txt")));
		assert!(is_plain_text(Some("md")));
		assert!(!is_plain_text(Some("pdf")));
		assert!(!is_plain_text(Some("docx")));
		assert!(!is_plain_text(None));
	}
}
