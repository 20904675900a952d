//! DataForSEO response envelope.
//!
//! Every endpoint answers with the same wrapper: a top-level status, then a
//! list of tasks, each carrying its own status and an endpoint-specific
//! `result` array. The `result` payload is kept as raw JSON here; callers
//! project it into their own typed shapes.

use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;

/// "Ok." - the task finished and `result` is populated.
pub const STATUS_OK: u32 = 20000;

/// "Task Created." - returned by `task_post` endpoints.
pub const STATUS_TASK_CREATED: u32 = 20100;

/// "Task Handed." - accepted but not picked up yet.
pub const STATUS_TASK_HANDED: u32 = 40601;

/// "Task In Queue." - still being processed.
pub const STATUS_TASK_IN_QUEUE: u32 = 40602;

/// Top-level response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    /// Overall request status (absent in some error bodies)
    #[serde(default)]
    pub status_code: Option<u32>,

    /// Human-readable status
    #[serde(default)]
    pub status_message: Option<String>,

    /// One entry per submitted task
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A single task inside the envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    /// Provider-assigned task id
    #[serde(default)]
    pub id: String,

    /// Task status code (`20000` = ready)
    pub status_code: u32,

    /// Human-readable task status
    #[serde(default)]
    pub status_message: String,

    /// Endpoint-specific payload, `null` until the task is ready
    #[serde(default)]
    pub result: Option<Value>,
}

/// Whether a provider code is in the 2xxxx success range.
pub fn is_success_code(code: u32) -> bool {
    (20000..30000).contains(&code)
}

/// Whether a provider code means "accepted, come back later".
pub fn is_pending_code(code: u32) -> bool {
    matches!(code, STATUS_TASK_HANDED | STATUS_TASK_IN_QUEUE)
}

impl ApiEnvelope {
    /// Unwrap the first task, turning embedded error codes into [`ApiError`].
    ///
    /// Pending task codes are not errors; the task is returned so the caller
    /// can decide to poll again.
    pub fn into_first_task(self) -> Result<Task, ApiError> {
        if let Some(code) = self.status_code {
            if !is_success_code(code) {
                return Err(ApiError::Provider {
                    code,
                    message: self.status_message.unwrap_or_default(),
                });
            }
        }

        let task = self
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Shape("response contained no tasks".to_string()))?;

        if is_success_code(task.status_code) || is_pending_code(task.status_code) {
            Ok(task)
        } else {
            Err(ApiError::Provider {
                code: task.status_code,
                message: task.status_message,
            })
        }
    }
}

impl Task {
    /// Whether the task finished and its result can be read.
    pub fn is_ready(&self) -> bool {
        self.status_code == STATUS_OK
    }
}
