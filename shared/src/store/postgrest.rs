use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::WorkflowRunStore;
use crate::auth::Session;
use crate::error::{map_supabase_error, Result, ServiceError};
use crate::models::{NewWorkflowRun, WORKFLOW_RUNS_TABLE};

const REST_PATH: &str = "/rest/v1";

// PostgREST error body, e.g. {"code":"42501","message":"new row violates row-level security policy ..."}
#[derive(Deserialize, Debug)]
struct PostgrestErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// WorkflowRunStore backed by the Supabase REST API (PostgREST)
#[derive(Clone)]
pub struct PostgrestWorkflowRunStore {
    client: Client,
    table_name: String,
}

impl PostgrestWorkflowRunStore {
    pub fn new() -> Self {
        Self::with_client_and_table(Client::new(), WORKFLOW_RUNS_TABLE.to_string())
    }

    /// Creates a store with the specified HTTP client and table name.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn table_url(&self, session: &Session) -> String {
        session
            .config()
            .endpoint(&format!("{}/{}", REST_PATH, self.table_name))
    }
}

impl Default for PostgrestWorkflowRunStore {
    fn default() -> Self {
        Self::new()
    }
}

// Picks the most useful message out of a failed PostgREST response
fn rejection_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(PostgrestErrorBody {
            message: Some(message),
            code,
            details,
            hint,
        }) => {
            tracing::debug!(
                "PostgREST error: code={:?}, details={:?}, hint={:?}",
                code,
                details,
                hint
            );
            message
        }
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
    }
}

#[async_trait]
impl WorkflowRunStore for PostgrestWorkflowRunStore {
    async fn insert_workflow_run(&self, session: &Session, run: &NewWorkflowRun) -> Result<()> {
        let url = self.table_url(session);
        tracing::debug!("Inserting workflow run for user_id={} into {}", run.user_id, url);

        let response = self
            .client
            .post(&url)
            .header("apikey", session.config().anon_key.as_str())
            .header(AUTHORIZATION, session.authorization())
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .json(run)
            .send()
            .await
            .map_err(|e| map_supabase_error("insert", e))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(
                "Workflow run saved: user_id={}, status={:?}",
                run.user_id,
                run.status
            );
            return Ok(());
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_supabase_error("insert", e))?;
        let message = rejection_message(status, &body);
        tracing::warn!("Workflow run insert rejected: status={}, message={}", status, message);

        Err(ServiceError::StoreRejected(message))
    }
}
