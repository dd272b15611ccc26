use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_INTENT: &str = "Demo reminder";
pub const SUCCESS_MESSAGE: &str = "Demo automation executed and saved to workflow history.";

// Request DTOs

/// Body of a reminder submission. `intent` may be any JSON value; only a
/// non-blank string is used, everything else falls back to the default.
#[derive(Debug, Default)]
pub struct ReminderRequest {
    pub intent: Option<Value>,
}

// Response DTOs

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SuccessResponse {
    pub ok: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn executed() -> Self {
        Self {
            ok: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}
