use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, header};
use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;

use hearth_core::service::{AuthService, ListingService};
use hearth_core::storage::DiskStorage;
use hearth_core::store::MemoryDatabase;
use hearth_server::AppState;
use hearth_server::auth::token::TokenSigner;
use hearth_server::infra::config::Config;

pub const TEST_PUBLIC_BASE: &str = "http://localhost:4000";
pub const TEST_TOKEN_SECRET: &str = "test-secret";

/// App state over the in-memory store and a temp-dir disk storage. The
/// TempDir must outlive the test or uploads disappear mid-flight.
pub fn setup_test_state() -> (AppState, TempDir) {
    let uploads = tempfile::tempdir().expect("failed to create temp uploads dir");
    let db = Arc::new(MemoryDatabase::new());
    let storage = Arc::new(DiskStorage::new(uploads.path(), TEST_PUBLIC_BASE));

    let config = Config {
        server_port: 4000,
        database_url: None,
        public_base_url: TEST_PUBLIC_BASE.to_string(),
        upload_dir: uploads.path().to_string_lossy().into_owned(),
        auth_token_secret: TEST_TOKEN_SECRET.to_string(),
        storage_endpoint: None,
    };

    let state = AppState {
        config: Arc::new(config),
        auth: Arc::new(AuthService::new(db.clone())),
        listings: Arc::new(ListingService::new(db.clone(), storage.clone())),
        storage,
        tokens: Arc::new(TokenSigner::new(TEST_TOKEN_SECRET)),
    };
    (state, uploads)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// Same as [`json_request`] with an `Authorization: Bearer` header.
pub fn authed_json_request(method: &str, uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn multipart_photo_request(
    uri: &str,
    field: &str,
    filename: &str,
    bytes: &[u8],
) -> Request<Body> {
    let boundary = "hearth-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}
