use sift_domain::DocumentId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
	#[error("Retrieval error: {message}")]
	Retrieval { message: String },
	#[error("Synthesis unavailable: {message}")]
	SynthesisUnavailable { message: String },
	#[error("Grader unavailable: {message}")]
	GraderUnavailable { message: String },
	#[error("Extraction failed: {message}")]
	Extraction { message: String },
	#[error("Document {document_id} has no source locator.")]
	DocumentNotFound { document_id: DocumentId },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<sift_storage::Error> for Error {
	fn from(err: sift_storage::Error) -> Self {
		match err {
			sift_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			sift_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
			sift_storage::Error::Io(inner) => Self::Storage { message: inner.to_string() },
			sift_storage::Error::Reqwest(inner) => Self::Storage { message: inner.to_string() },
			sift_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			sift_storage::Error::NotFound(message) => Self::Storage { message },
		}
	}
}

impl From<sift_providers::Error> for Error {
	fn from(err: sift_providers::Error) -> Self {
		let message = if err.is_timeout() {
			format!("Provider call timed out: {err}")
		} else {
			err.to_string()
		};

		Self::Provider { message }
	}
}
