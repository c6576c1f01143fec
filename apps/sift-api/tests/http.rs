use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt;

use sift_api::{routes, state::AppState};
use sift_config::{EmbeddingProviderConfig, ExtractionProviderConfig, LlmProviderConfig};
use sift_providers::chat::{ChatMessage, ResponseSchema};
use sift_service::{
	BoxFuture, ChatProvider, DocumentStore, EmbeddingProvider, Error, EvidenceChunk,
	ExtractionProvider, IndexSearch, PromptSet, Providers, Result, SiftService, VectorIndex,
};

struct OneChunkIndex;
impl VectorIndex for OneChunkIndex {
	fn search<'a>(
		&'a self,
		_request: IndexSearch<'a>,
	) -> BoxFuture<'a, Result<Vec<EvidenceChunk>>> {
		Box::pin(async move {
			Ok(vec![EvidenceChunk {
				content: "BP: 120/80".to_string(),
				document_id: 42,
				source_locator: "s3://records/42.pdf".to_string(),
			}])
		})
	}
}

struct NoDocuments;
impl DocumentStore for NoDocuments {
	fn source_locator<'a>(&'a self, document_id: i64) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Err(Error::DocumentNotFound { document_id }) })
	}

	fn fetch_full_text<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			Err(Error::Extraction { message: format!("cannot read {locator}") })
		})
	}
}

struct FixedChat;
impl ChatProvider for FixedChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok("The BP is 120/80 [Document 1 - ID: 42].".to_string()) })
	}

	fn complete_structured<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_messages: &'a [ChatMessage],
		_schema: &'a ResponseSchema,
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			Ok(serde_json::json!({
				"answer": "120/80",
				"raw_context": "BP: 120/80",
				"found_doc_ids": [42],
				"validation": "Correct",
			}))
		})
	}
}

struct NoEmbedding;
impl EmbeddingProvider for NoEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(Error::Provider { message: "not used".to_string() }) })
	}
}

struct NoExtraction;
impl ExtractionProvider for NoExtraction {
	fn extract<'a>(
		&'a self,
		_cfg: &'a ExtractionProviderConfig,
		_file_name: &'a str,
		_bytes: Vec<u8>,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Err(Error::Extraction { message: "not used".to_string() }) })
	}
}

fn app(api_auth_token: Option<&str>) -> Router {
	let mut cfg = sift_testkit::sample_config();

	cfg.security.api_auth_token = api_auth_token.map(str::to_string);

	let chat = Arc::new(FixedChat);
	let providers =
		Providers::new(Arc::new(NoEmbedding), chat.clone(), chat, Arc::new(NoExtraction));
	let service = SiftService::new(
		cfg,
		Arc::new(OneChunkIndex),
		Arc::new(NoDocuments),
		providers,
		PromptSet::default(),
	);

	routes::router(AppState::from_service(service))
}

fn chat_request(payload: &Value, bearer: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri("/v1/document/chat")
		.header(header::CONTENT_TYPE, "application/json");

	if let Some(token) = bearer {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
	}

	builder.body(Body::from(payload.to_string())).expect("Failed to build request.")
}

fn query_payload(question: &str) -> Value {
	serde_json::json!({
		"id": 7,
		"question": question,
		"knowledgeStoreList": [{ "id": 1, "name": "Records", "type": "medical" }],
	})
}

async fn json_body(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Response body is not JSON.")
}

#[tokio::test]
async fn health_ok() {
	let response = app(None)
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_returns_the_resolved_answer() {
	let response = app(None)
		.oneshot(chat_request(&query_payload("What is the BP?"), None))
		.await
		.expect("Failed to call /v1/document/chat.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = json_body(response).await;

	assert_eq!(body["id"], 7);
	assert_eq!(body["answer"], "120/80");
	assert_eq!(body["raw_context"], "BP: 120/80");
	assert_eq!(body["knowledgeStoreList"][0]["documentIds"], serde_json::json!([42]));
	assert_eq!(body["knowledgeStoreList"][0]["type"], "medical");
}

#[tokio::test]
async fn blank_question_is_rejected() {
	let response = app(None)
		.oneshot(chat_request(&query_payload("   "), None))
		.await
		.expect("Failed to call /v1/document/chat.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = json_body(response).await;

	assert_eq!(body["error_code"], "invalid_request");
	assert_eq!(body["fields"], serde_json::json!(["$.question"]));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
	let response = app(None)
		.oneshot(chat_request(&serde_json::json!({ "question": 3 }), None))
		.await
		.expect("Failed to call /v1/document/chat.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["error_code"], "invalid_request");
}

#[tokio::test]
async fn configured_token_is_enforced() {
	let missing = app(Some("s3cret"))
		.oneshot(chat_request(&query_payload("What is the BP?"), None))
		.await
		.expect("Failed to call /v1/document/chat.");

	assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

	let wrong = app(Some("s3cret"))
		.oneshot(chat_request(&query_payload("What is the BP?"), Some("guess")))
		.await
		.expect("Failed to call /v1/document/chat.");

	assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

	let accepted = app(Some("s3cret"))
		.oneshot(chat_request(&query_payload("What is the BP?"), Some("s3cret")))
		.await
		.expect("Failed to call /v1/document/chat.");

	assert_eq!(accepted.status(), StatusCode::OK);
}
