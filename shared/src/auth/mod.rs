use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::config::SupabaseConfig;
use crate::error::{Result, ServiceError};
use crate::models::AuthUser;

pub mod gotrue;

/// Returns the raw `Authorization` header, or an empty string when it is
/// absent or not valid UTF-8. The value is forwarded verbatim to Supabase.
pub fn extract_authorization(headers: &HeaderMap) -> String {
    match headers.get(http::header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(value) => value.to_string(),
            Err(err) => {
                tracing::warn!("Invalid authorization header format: {:?}", err);
                String::new()
            }
        },
        None => {
            tracing::debug!("No authorization header in request");
            String::new()
        }
    }
}

/// Caller-scoped credentials for one request.
///
/// Every call made to Supabase on behalf of the caller presents the project
/// anon key together with the caller's own `Authorization` header, so the
/// row-level security policies see the caller rather than the service.
#[derive(Clone)]
pub struct Session {
    config: SupabaseConfig,
    authorization: String,
}

impl Session {
    pub fn new(config: &SupabaseConfig, authorization: impl Into<String>) -> Self {
        Self {
            config: config.clone(),
            authorization: authorization.into(),
        }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    pub fn has_credential(&self) -> bool {
        !self.authorization.trim().is_empty()
    }

    /// The token part of a `Bearer <token>` header, if that is its shape.
    pub fn bearer_token(&self) -> Option<&str> {
        self.authorization
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

// Keep the credential out of debug logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.config.url)
            .field("authorization_len", &self.authorization.len())
            .finish()
    }
}

/// Resolves the caller behind a session's credential
#[async_trait]
pub trait AuthResolver: Send + Sync + 'static {
    /// Returns the authenticated user, `ServiceError::Unauthorized` when the
    /// credential is rejected, or `ServiceError::Transport` when the auth
    /// service could not be reached.
    async fn resolve_user(&self, session: &Session) -> Result<AuthUser>;
}

// Claims carried by Supabase access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

// JWT decoder without verification; the signature is only ever checked by Supabase Auth
pub fn decode_jwt_payload(token: &str) -> Result<Claims> {
    tracing::debug!("Decoding JWT payload");

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::warn!("Invalid JWT format: expected 3 parts, got {}", parts.len());
        return Err(ServiceError::Unauthorized("Invalid JWT format".into()));
    }

    let payload_data = match URL_SAFE_NO_PAD.decode(parts[1]) {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!("Failed to base64 decode JWT payload: {:?}", err);
            return Err(ServiceError::Unauthorized(
                "Could not decode JWT payload".into(),
            ));
        }
    };

    match serde_json::from_slice::<Claims>(&payload_data) {
        Ok(claims) => {
            tracing::debug!("JWT claims parsed successfully: sub={}", claims.sub);
            Ok(claims)
        }
        Err(err) => {
            tracing::warn!("Failed to parse JWT claims: {:?}", err);
            Err(ServiceError::Unauthorized("Could not parse JWT claims".into()))
        }
    }
}
