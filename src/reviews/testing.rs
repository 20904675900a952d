//! Scripted [`ReviewJobApi`] double shared by the review tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::dataforseo::types::{STATUS_OK, STATUS_TASK_IN_QUEUE};
use crate::dataforseo::{ApiError, Task};

use super::client::{Job, ReviewJobApi};
use super::query::ReviewSource;

/// Replays queued fetch results; once the queue is empty it keeps answering
/// "task in queue".
pub(crate) struct ScriptedApi {
    job_id: String,
    submit_error: Option<ApiError>,
    submit_delay: Duration,
    fetches: Mutex<VecDeque<Result<Task, ApiError>>>,
    pub submits: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub bodies: Mutex<Vec<Value>>,
}

impl ScriptedApi {
    pub fn new(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            submit_error: None,
            submit_delay: Duration::ZERO,
            fetches: Mutex::new(VecDeque::new()),
            submits: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_submit(mut self, err: ApiError) -> Self {
        self.submit_error = Some(err);
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn then(self, result: Result<Task, ApiError>) -> Self {
        self.fetches.lock().unwrap().push_back(result);
        self
    }

    pub fn then_pending(self) -> Self {
        let id = self.job_id.clone();
        self.then(Ok(pending_task(&id)))
    }

    pub fn then_ready(self, items: Value) -> Self {
        let id = self.job_id.clone();
        self.then(Ok(ready_task(&id, items)))
    }

    /// Queue a ready result on an already shared double.
    pub fn push_ready(&self, items: Value) {
        let task = ready_task(&self.job_id, items);
        self.fetches.lock().unwrap().push_back(Ok(task));
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewJobApi for ScriptedApi {
    async fn submit(&self, source: ReviewSource, body: &Value) -> Result<Job, ApiError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(body.clone());
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        Ok(Job {
            id: self.job_id.clone(),
            source,
            submitted_at: Utc::now(),
        })
    }

    async fn fetch(&self, _source: ReviewSource, job_id: &str) -> Result<Task, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.fetches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(pending_task(job_id)))
    }
}

pub(crate) fn pending_task(id: &str) -> Task {
    Task {
        id: id.to_string(),
        status_code: STATUS_TASK_IN_QUEUE,
        status_message: "Task In Queue.".to_string(),
        result: None,
    }
}

pub(crate) fn ready_task(id: &str, items: Value) -> Task {
    Task {
        id: id.to_string(),
        status_code: STATUS_OK,
        status_message: "Ok.".to_string(),
        result: Some(json!([{ "items": items }])),
    }
}

/// A Google-shaped review item.
pub(crate) fn google_item(id: &str, rating: Value, text: &str) -> Value {
    json!({
        "type": "google_reviews_search",
        "review_id": id,
        "review_text": text,
        "timestamp": "2024-05-01 12:00:00 +00:00",
        "rating": {"rating_type": "Max5", "value": rating, "votes_count": null},
        "profile_name": format!("reviewer {id}"),
        "profile_image_url": format!("https://img.example/{id}.png")
    })
}
