use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::Method,
    Json,
};

use serde_json::Value;

use reminder_shared::{
    auth::{extract_authorization, AuthResolver, Session},
    models::NewWorkflowRun,
    store::WorkflowRunStore,
};

use crate::{
    error::{AppError, Result},
    handlers::AppState,
    models::{ReminderRequest, SuccessResponse, DEFAULT_INTENT},
};

// POST /send-reminder - Record a demo automation run for the caller
pub async fn send_reminder<A, S>(
    State(state): State<AppState<A, S>>,
    request: Request,
) -> Result<Json<SuccessResponse>>
where
    A: AuthResolver + ?Sized,
    S: WorkflowRunStore + ?Sized,
{
    if request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let supabase = state.config.supabase()?;

    // Every Supabase call below runs as the caller, never as the service
    let session = Session::new(&supabase, extract_authorization(request.headers()));
    let user = state.auth.resolve_user(&session).await?;

    let body = match to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!("Could not read request body, treating it as empty: {}", err);
            Default::default()
        }
    };
    let reminder = parse_reminder_request(&body);
    let run = NewWorkflowRun::completed(user.id, normalize_intent(&reminder));

    state.store.insert_workflow_run(&session, &run).await?;

    tracing::info!("Saved workflow run for user_id={}", run.user_id);
    Ok(Json(SuccessResponse::executed()))
}

/// Parses the body leniently: anything that is not a JSON object reads as
/// an empty request. A repeated key keeps its last value.
pub fn parse_reminder_request(body: &[u8]) -> ReminderRequest {
    if body.is_empty() {
        return ReminderRequest::default();
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut fields)) => ReminderRequest {
            intent: fields.remove("intent").filter(|value| !value.is_null()),
        },
        Ok(other) => {
            tracing::debug!("Ignoring non-object request body of type {}", json_type(&other));
            ReminderRequest::default()
        }
        Err(err) => {
            tracing::debug!("Ignoring unparseable request body: {}", err);
            ReminderRequest::default()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// The characters JavaScript's String.prototype.trim strips: Unicode
// White_Space minus U+0085, plus U+FEFF
fn is_js_trim_char(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// The trimmed `intent` if it is a non-blank string, otherwise the default.
pub fn normalize_intent(request: &ReminderRequest) -> String {
    let trimmed = request
        .intent
        .as_ref()
        .and_then(|value| value.as_str())
        .map(|intent| intent.trim_matches(is_js_trim_char));

    match trimmed {
        Some(intent) if !intent.is_empty() => intent.to_string(),
        _ => DEFAULT_INTENT.to_string(),
    }
}
