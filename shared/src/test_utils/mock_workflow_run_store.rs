use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::{Result, ServiceError};
use crate::models::{now_str, NewWorkflowRun, WorkflowRun};
use crate::store::WorkflowRunStore;

enum FailureMode {
    None,
    Reject(String),
    Transport,
    Panic,
}

/// MockWorkflowRunStore is a simple in-memory implementation of WorkflowRunStore for testing
pub struct MockWorkflowRunStore {
    runs: Mutex<Vec<WorkflowRun>>,
    authorizations: Mutex<Vec<String>>, // Authorization header seen by each insert
    failure: FailureMode,
}

impl MockWorkflowRunStore {
    /// Create a new empty MockWorkflowRunStore
    pub fn new() -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
            failure: FailureMode::None,
        }
    }

    /// Every insert is refused with `message`, as a constraint or RLS violation would be
    pub fn new_rejecting(message: impl Into<String>) -> Self {
        Self {
            failure: FailureMode::Reject(message.into()),
            ..Self::new()
        }
    }

    /// Every insert fails as if the store were unreachable
    pub fn new_error() -> Self {
        Self {
            failure: FailureMode::Transport,
            ..Self::new()
        }
    }

    /// Every insert panics, for exercising the router's last-resort error mapping
    pub fn new_panicking() -> Self {
        Self {
            failure: FailureMode::Panic,
            ..Self::new()
        }
    }

    /// All rows inserted so far, oldest first
    pub fn runs(&self) -> Vec<WorkflowRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn runs_for_user(&self, user_id: &str) -> Vec<WorkflowRun> {
        self.runs
            .lock()
            .unwrap()
            .iter()
            .filter(|run| run.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Authorization headers presented with each insert attempt
    pub fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().unwrap().clone()
    }
}

impl Default for MockWorkflowRunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowRunStore for MockWorkflowRunStore {
    async fn insert_workflow_run(&self, session: &Session, run: &NewWorkflowRun) -> Result<()> {
        self.authorizations
            .lock()
            .unwrap()
            .push(session.authorization().to_string());

        match &self.failure {
            FailureMode::None => {}
            FailureMode::Reject(message) => {
                return Err(ServiceError::StoreRejected(message.clone()))
            }
            FailureMode::Transport => {
                return Err(ServiceError::Transport("Mock store unreachable".into()))
            }
            FailureMode::Panic => panic!("mock store exploded"),
        }

        self.runs.lock().unwrap().push(WorkflowRun {
            id: Uuid::new_v4().to_string(),
            user_id: run.user_id.clone(),
            intent: run.intent.clone(),
            status: run.status,
            created_at: now_str(),
        });

        Ok(())
    }
}
