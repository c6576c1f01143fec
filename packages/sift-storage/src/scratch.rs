//! Transient local copies of source documents.
//!
//! Every download is owned by a [`ScratchFile`] guard. Dropping the guard removes the file, so a
//! copy never outlives the request that fetched it, whether that request succeeds or fails.

use std::{
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
	time::Duration,
};

use reqwest::Client;
use uuid::Uuid;

use crate::{Error, Result};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
	Remote(String),
	Local(PathBuf),
}

pub struct ScratchArea {
	dir: PathBuf,
	objects_base_url: Option<String>,
	client: Client,
}
impl ScratchArea {
	pub fn new(cfg: &sift_config::Storage) -> Result<Self> {
		let client = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;

		Ok(Self {
			dir: PathBuf::from(&cfg.scratch.dir),
			objects_base_url: cfg.objects.base_url.clone(),
			client,
		})
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Copies the document behind `locator` into the scratch directory.
	pub async fn download(&self, locator: &str) -> Result<ScratchFile> {
		let location = resolve_locator(locator, self.objects_base_url.as_deref())?;
		let file_name = file_name_of(locator);

		tokio::fs::create_dir_all(&self.dir).await?;

		let file = ScratchFile {
			path: self.dir.join(format!("{}_{file_name}", Uuid::new_v4().simple())),
			file_name,
		};

		match location {
			SourceLocation::Remote(url) => {
				let res = self.client.get(url.as_str()).send().await?.error_for_status()?;
				let bytes = res.bytes().await?;

				tokio::fs::write(&file.path, &bytes).await?;
			},
			SourceLocation::Local(path) => {
				if !tokio::fs::try_exists(&path).await? {
					return Err(Error::NotFound(format!(
						"Source file {} does not exist.",
						path.display()
					)));
				}

				tokio::fs::copy(&path, &file.path).await?;
			},
		}

		tracing::debug!(locator, path = %file.path.display(), "Downloaded source document.");

		Ok(file)
	}
}

#[derive(Debug)]
pub struct ScratchFile {
	path: PathBuf,
	file_name: String,
}
impl ScratchFile {
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Name of the file at its source, without the scratch prefix.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Lowercased extension of the source file name, if any.
	pub fn extension(&self) -> Option<String> {
		Path::new(&self.file_name)
			.extension()
			.and_then(|ext| ext.to_str())
			.map(str::to_ascii_lowercase)
	}
}
impl Drop for ScratchFile {
	fn drop(&mut self) {
		match fs::remove_file(&self.path) {
			Ok(()) => {},
			Err(err) if err.kind() == ErrorKind::NotFound => {},
			Err(err) => {
				tracing::warn!(
					path = %self.path.display(),
					error = %err,
					"Failed to remove scratch file."
				);
			},
		}
	}
}

pub fn resolve_locator(locator: &str, objects_base_url: Option<&str>) -> Result<SourceLocation> {
	let locator = locator.trim();

	if locator.is_empty() {
		return Err(Error::InvalidArgument("Source locator is empty.".to_string()));
	}
	if let Some(object) = locator.strip_prefix("s3://") {
		let Some(base_url) = objects_base_url else {
			return Err(Error::InvalidArgument(
				"s3:// locators require storage.objects.base_url.".to_string(),
			));
		};

		return Ok(SourceLocation::Remote(format!("{base_url}/{}", object.trim_start_matches('/'))));
	}
	if locator.starts_with("http://") || locator.starts_with("https://") {
		return Ok(SourceLocation::Remote(locator.to_string()));
	}
	if let Some(path) = locator.strip_prefix("file://") {
		return Ok(SourceLocation::Local(PathBuf::from(path)));
	}

	Ok(SourceLocation::Local(PathBuf::from(locator)))
}

fn file_name_of(locator: &str) -> String {
	let without_query = locator.split(['?', '#']).next().unwrap_or(locator);
	let name = without_query.rsplit(['/', '\\']).next().unwrap_or_default();
	let sanitized: String = name
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
		.collect();

	if sanitized.is_empty() { "document".to_string() } else { sanitized }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn s3_locators_go_through_the_object_gateway() {
		let location =
			resolve_locator("s3://records/patients/42.pdf", Some("http://127.0.0.1:9000"))
				.expect("resolve failed");

		assert_eq!(
			location,
			SourceLocation::Remote("http://127.0.0.1:9000/records/patients/42.pdf".to_string())
		);
	}

	#[test]
	fn s3_locators_without_gateway_are_rejected() {
		assert!(resolve_locator("s3://records/42.pdf", None).is_err());
	}

	#[test]
	fn file_and_bare_paths_are_local() {
		assert_eq!(
			resolve_locator("file:///srv/docs/a.txt", None).expect("resolve failed"),
			SourceLocation::Local(PathBuf::from("/srv/docs/a.txt"))
		);
		assert_eq!(
			resolve_locator("docs/a.txt", None).expect("resolve failed"),
			SourceLocation::Local(PathBuf::from("docs/a.txt"))
		);
	}

	#[test]
	fn file_names_drop_query_and_unsafe_characters() {
		assert_eq!(file_name_of("https://host/a/lab report.pdf?sig=1"), "lab_report.pdf");
		assert_eq!(file_name_of("s3://bucket/"), "document");
	}
}
