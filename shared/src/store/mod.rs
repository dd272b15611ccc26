use async_trait::async_trait;

use crate::auth::Session;
use crate::error::Result;
use crate::models::NewWorkflowRun;

// Expose the PostgREST store module
pub mod postgrest;

/// WorkflowRunStore trait defining the interface for workflow history storage
#[async_trait]
pub trait WorkflowRunStore: Send + Sync + 'static {
    /// Inserts one workflow run using the caller's own credentials.
    ///
    /// A write refused by the store (row-level security, constraint
    /// violation) is `ServiceError::StoreRejected` carrying the store's
    /// message. Failing to reach the store is `ServiceError::Transport`.
    async fn insert_workflow_run(&self, session: &Session, run: &NewWorkflowRun) -> Result<()>;
}
