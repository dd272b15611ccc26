use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::Claims;

/// Creates a Supabase-like access token for a specific user ID.
///
/// The token is signed with a throwaway HS256 secret; only the payload
/// matters to the mock resolver, which never verifies signatures.
pub fn create_jwt_token(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role: Some("authenticated".to_string()),
        aud: Some("authenticated".to_string()),
        email: Some("test@example.com".to_string()),
        session_id: Some("8f1b3f83-2f5c-4a36-a4a7-5d1b1a5d2c10".to_string()),
        exp: now + 3600,
        iat: now - 100,
    };

    let header = Header::new(Algorithm::HS256);
    let secret = "test_secret_key_for_jwt_encoding_in_tests";
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &claims, &encoding_key).expect("Failed to create JWT")
}

/// Authorization header carrying a bearer token for `user_id`
pub fn create_auth_header(user_id: &str) -> (String, String) {
    let token = create_jwt_token(user_id);
    ("authorization".to_string(), format!("Bearer {}", token))
}

/// Builds a test request authenticated as `user_id`
pub fn create_test_request(
    method: &str,
    path: &str,
    user_id: &str,
    body: Option<serde_json::Value>,
) -> http::Request<axum::body::Body> {
    let (_, auth_value) = create_auth_header(user_id);
    create_raw_request(
        method,
        path,
        Some(&auth_value),
        body.map(|json_body| json_body.to_string()),
    )
}

/// Builds a test request with an arbitrary (or no) authorization header and raw body text
pub fn create_raw_request(
    method: &str,
    path: &str,
    authorization: Option<&str>,
    body: Option<String>,
) -> http::Request<axum::body::Body> {
    let mut builder = http::Request::builder().method(method).uri(path);

    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }

    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    match body {
        Some(text) => builder.body(axum::body::Body::from(text)).unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}
