use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};
use serde_json::Value;

use crate::{Error, Result};

pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Sends raw document bytes to the extraction service, which performs OCR or format parsing and
/// returns plain text.
pub async fn extract_text(
	cfg: &sift_config::ExtractionProviderConfig,
	file_name: &str,
	bytes: Vec<u8>,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.header(CONTENT_TYPE, "application/octet-stream")
		.header(FILE_NAME_HEADER, file_name)
		.body(bytes)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_extraction_response(json)
}

fn parse_extraction_response(json: Value) -> Result<String> {
	if let Some(text) = json.get("text").and_then(|v| v.as_str()) {
		return Ok(text.to_string());
	}

	let pages = json.get("pages").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse {
			message: "Extraction response is missing text or pages.".to_string(),
		}
	})?;
	let mut texts = Vec::with_capacity(pages.len());

	for page in pages {
		let text = page.get("text").and_then(|v| v.as_str()).ok_or_else(|| {
			Error::InvalidResponse { message: "Extraction page is missing text.".to_string() }
		})?;

		texts.push(text);
	}

	Ok(texts.join("\n\n"))
}
