//! Verify query encoding, error normalization and request building against
//! the JSON vectors in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field order in
//! the vector files does not matter.

use std::sync::Arc;

use coachboard_core::{
    ApiClient, ApiError, ApiRequest, ClientConfig, Credentials, HttpBody, HttpMethod, QueryParams, StaticCredentials,
    UreqTransport,
};
use serde_json::Value;

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Query encoding
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    for case in cases(include_str!("../../test-vectors/query.json")) {
        let name = case["name"].as_str().unwrap();
        let params = QueryParams::from_serialize(&case["params"]).unwrap();
        assert_eq!(params.encode(), case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors() {
    for case in cases(include_str!("../../test-vectors/errors.json")) {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();

        let err = ApiError::from_response(status, body);
        assert_eq!(err.status(), Some(status), "{name}: status");
        assert_eq!(err.to_string(), case["message"].as_str().unwrap(), "{name}: message");

        match (case["kind"].as_str().unwrap(), &err) {
            ("server", ApiError::Server { code, .. }) => {
                assert_eq!(code.as_deref(), case["code"].as_str(), "{name}: code");
            }
            ("http", ApiError::Http { body: raw, .. }) => {
                assert_eq!(raw, body, "{name}: body passed through");
            }
            (kind, other) => panic!("{name}: expected {kind}, got {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let client = ApiClient::new(
        ClientConfig::new("http://localhost:8080"),
        Arc::new(StaticCredentials(Credentials::new("tok-1", "u-1"))),
        Arc::new(UreqTransport::default()),
    );

    for case in cases(include_str!("../../test-vectors/requests.json")) {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());

        let mut request = ApiRequest::new(method, case["path"].as_str().unwrap())
            .query(&case["query"])
            .unwrap();
        if !case["body"].is_null() {
            request = request.json(&case["body"]).unwrap();
        }

        let built = client.build_request(&request).unwrap();
        let expected = &case["expected"];

        assert_eq!(built.method, method, "{name}: method");
        assert_eq!(built.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let pair = h.as_array().unwrap();
                (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(built.headers, expected_headers, "{name}: headers");

        match (&built.body, &expected["body"]) {
            (None, Value::Null) => {}
            (Some(HttpBody::Json(text)), want) => {
                let got: Value = serde_json::from_str(text).unwrap();
                assert_eq!(&got, want, "{name}: body");
            }
            (got, want) => panic!("{name}: body mismatch, got {got:?}, want {want}"),
        }
    }
}
