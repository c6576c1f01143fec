use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

use sift_providers::Error;

#[test]
fn builds_bearer_auth_header() {
	let headers =
		sift_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn copies_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-tenant".to_string(), Value::String("clinic".to_string()));

	let headers =
		sift_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");

	assert_eq!(headers.get("x-tenant").expect("Missing default header."), "clinic");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::from(3));

	let err =
		sift_providers::auth_headers("secret", &defaults).expect_err("Expected config error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}
