use axum::{
    extract::Request,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;

use reminder_shared::{
    auth::{gotrue::GoTrueAuthResolver, AuthResolver},
    config::ServiceConfig,
    error::ServiceError,
    models::{ErrorResponse, WORKFLOW_RUNS_TABLE},
    store::{postgrest::PostgrestWorkflowRunStore, WorkflowRunStore},
};

use crate::error::AppError;
use crate::handlers::{reminder_handlers::send_reminder, AppState};

pub const FUNCTION_PATH: &str = "/send-reminder";
/// Prefix Supabase puts in front of edge function routes
pub const BASE_PATH: &str = "/functions/v1";

/// Creates a router talking to the Supabase project named in the environment
pub fn create_router() -> Result<Router, ServiceError> {
    tracing::info!("Creating router with Supabase backends");

    let config = ServiceConfig::from_env();
    if config.supabase().is_err() {
        // Still serve: every request will answer with the configuration error
        tracing::warn!("SUPABASE_URL or SUPABASE_ANON_KEY is not set");
    }

    // One pooled client for both backends; credentials travel per request
    let client = reqwest::Client::builder()
        .user_agent(concat!("send-reminder/", env!("CARGO_PKG_VERSION")))
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ServiceError::Configuration(format!("HTTP client setup failed: {}", e)))?;

    let auth = Arc::new(GoTrueAuthResolver::with_client(client.clone()));
    let store = Arc::new(PostgrestWorkflowRunStore::with_client_and_table(
        client,
        WORKFLOW_RUNS_TABLE.to_string(),
    ));

    Ok(create_router_with_backends(config, auth, store))
}

/// Creates a router with the given auth resolver and store implementations
pub fn create_router_with_backends<A, S>(config: ServiceConfig, auth: Arc<A>, store: Arc<S>) -> Router
where
    A: AuthResolver + ?Sized,
    S: WorkflowRunStore + ?Sized,
{
    // If REMOVE_BASE_PATH is set to true, serve without the /functions/v1 prefix
    let prefix = if config.remove_base_path { "" } else { BASE_PATH };
    let path = format!("{}{}", prefix, FUNCTION_PATH);
    tracing::info!("Serving reminder submissions at {}", path);

    // Logging middleware to trace all requests; never logs headers
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        tracing::info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let state = AppState::new(config, auth, store);

    // Every method reaches the handler; it answers non-POST requests itself
    Router::new()
        .route(&path, any(send_reminder::<A, S>))
        .with_state(state)
        .fallback(|req: Request| async move {
            tracing::warn!("No route matched for: {} {}", req.method(), req.uri());
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Not found".to_string(),
                }),
            )
        })
        .layer(middleware::from_fn(logging_middleware))
        .layer(CatchPanicLayer::custom(panic_response))
}

// A panic anywhere below the router still answers with the JSON error shape
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = err.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = err.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "Unknown panic".to_string()
    };

    AppError::Unexpected(detail).into_response()
}
