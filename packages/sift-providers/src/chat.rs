use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

const MAX_STRUCTURED_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}
impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: Role::System, content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}

	pub fn assistant(content: impl Into<String>) -> Self {
		Self { role: Role::Assistant, content: content.into() }
	}
}

/// JSON schema the model is asked to follow for a structured completion.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
	pub name: String,
	pub schema: Value,
}

pub async fn complete(
	cfg: &sift_config::LlmProviderConfig,
	messages: &[ChatMessage],
) -> Result<String> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let json = post_completion(cfg, &body).await?;

	parse_completion_text(&json)
}

pub async fn complete_structured(
	cfg: &sift_config::LlmProviderConfig,
	messages: &[ChatMessage],
	schema: &ResponseSchema,
) -> Result<Value> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
		"response_format": {
			"type": "json_schema",
			"json_schema": {
				"name": schema.name,
				"schema": schema.schema,
				"strict": true,
			},
		},
	});

	for attempt in 1..=MAX_STRUCTURED_ATTEMPTS {
		let json = post_completion(cfg, &body).await?;

		match parse_structured_content(json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => {
				tracing::warn!(
					attempt,
					model = %cfg.model,
					error = %err,
					"Structured completion is not valid JSON."
				);
			},
		}
	}

	Err(Error::InvalidResponse { message: "Structured completion is not valid JSON.".to_string() })
}

async fn post_completion(cfg: &sift_config::LlmProviderConfig, body: &Value) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

fn message_content(json: &Value) -> Option<&str> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
}

fn parse_completion_text(json: &Value) -> Result<String> {
	message_content(json).map(str::to_string).ok_or_else(|| Error::InvalidResponse {
		message: "Completion response is missing message content.".to_string(),
	})
}

fn parse_structured_content(json: Value) -> Result<Value> {
	if let Some(content) = message_content(&json) {
		let parsed: Value = serde_json::from_str(strip_code_fence(content)).map_err(|_| {
			Error::InvalidResponse {
				message: "Structured completion content is not valid JSON.".to_string(),
			}
		})?;

		return Ok(parsed);
	}
	if json.is_object() && json.get("choices").is_none() {
		return Ok(json);
	}

	Err(Error::InvalidResponse {
		message: "Structured completion is missing JSON content.".to_string(),
	})
}

fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);

	inner.strip_suffix("```").unwrap_or(inner).trim()
}
