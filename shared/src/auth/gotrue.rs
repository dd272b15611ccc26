use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;

use super::{AuthResolver, Session};
use crate::error::{map_supabase_error, Result, ServiceError};
use crate::models::AuthUser;

const USER_PATH: &str = "/auth/v1/user";

/// Supabase Auth (GoTrue) client resolving the caller via `GET /auth/v1/user`
#[derive(Clone)]
pub struct GoTrueAuthResolver {
    client: Client,
}

// GoTrue has used several error body shapes across versions
#[derive(Deserialize, Debug)]
struct GoTrueErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

impl GoTrueAuthResolver {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a resolver around an existing HTTP client, sharing its connection pool.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for GoTrueAuthResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthResolver for GoTrueAuthResolver {
    async fn resolve_user(&self, session: &Session) -> Result<AuthUser> {
        if !session.has_credential() {
            tracing::warn!("Missing authorization header, skipping user lookup");
            return Err(ServiceError::Unauthorized(
                "Missing authorization header".into(),
            ));
        }

        let url = session.config().endpoint(USER_PATH);
        tracing::debug!("Resolving user via {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", session.config().anon_key.as_str())
            .header(AUTHORIZATION, session.authorization())
            .send()
            .await
            .map_err(|e| map_supabase_error("get_user", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_supabase_error("get_user", e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoTrueErrorBody>(&body)
                .ok()
                .and_then(GoTrueErrorBody::into_message)
                .unwrap_or_else(|| status.to_string());
            tracing::warn!("User lookup rejected: status={}, message={}", status, message);
            return Err(ServiceError::Unauthorized(message));
        }

        match serde_json::from_str::<AuthUser>(&body) {
            Ok(user) => {
                tracing::info!("Authenticated user ID: {}", user.id);
                Ok(user)
            }
            Err(err) => {
                tracing::warn!("User lookup returned no usable user: {:?}", err);
                Err(ServiceError::Unauthorized("No user in auth response".into()))
            }
        }
    }
}
