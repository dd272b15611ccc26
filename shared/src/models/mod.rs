use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Table the handler writes to.
pub const WORKFLOW_RUNS_TABLE: &str = "workflow_runs";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowRunStatus {
    Completed,
}

/// Insert payload for the `workflow_runs` table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewWorkflowRun {
    pub user_id: String,
    pub intent: String,
    pub status: WorkflowRunStatus,
}

impl NewWorkflowRun {
    /// A completed run owned by `user_id`.
    pub fn completed(user_id: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            intent: intent.into(),
            status: WorkflowRunStatus::Completed,
        }
    }
}

/// A stored row; id and created_at are assigned by the store
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorkflowRun {
    pub id: String,
    pub user_id: String,
    pub intent: String,
    pub status: WorkflowRunStatus,
    pub created_at: String,
}

// The subset of the Supabase Auth user object the handler relies on
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

// Response DTOs for general use across services
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

// Helper function to get current timestamp as string
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}
