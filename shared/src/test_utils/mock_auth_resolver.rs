use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::auth::{decode_jwt_payload, AuthResolver, Session};
use crate::error::{Result, ServiceError};
use crate::models::AuthUser;

/// Mock implementation of AuthResolver for testing
///
/// Reads the subject out of the bearer token's payload without verifying the
/// signature, the way a token built by `test_utils::jwt::create_jwt_token`
/// would be resolved by Supabase Auth.
pub struct MockAuthResolver {
    allowed_users: Option<HashSet<String>>,
    error_mode: bool,
    calls: AtomicUsize,
}

impl MockAuthResolver {
    /// Accepts any well-formed token
    pub fn new() -> Self {
        Self {
            allowed_users: None,
            error_mode: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Accepts only tokens whose subject is one of `user_ids`
    pub fn with_users<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_users: Some(user_ids.into_iter().map(Into::into).collect()),
            error_mode: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every lookup fails as if the auth service were unreachable
    pub fn new_error() -> Self {
        Self {
            allowed_users: None,
            error_mode: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of lookups attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAuthResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthResolver for MockAuthResolver {
    async fn resolve_user(&self, session: &Session) -> Result<AuthUser> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.error_mode {
            return Err(ServiceError::Transport(
                "Mock auth service unreachable".into(),
            ));
        }

        let token = session
            .bearer_token()
            .ok_or_else(|| ServiceError::Unauthorized("Missing bearer token".into()))?;
        let claims = decode_jwt_payload(token)?;

        if let Some(allowed) = &self.allowed_users {
            if !allowed.contains(&claims.sub) {
                return Err(ServiceError::Unauthorized(format!(
                    "Unknown user: {}",
                    claims.sub
                )));
            }
        }

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            aud: claims.aud,
        })
    }
}
