//! # Batch Job Controller
//!
//! Prints one label template across data rows × copies, streaming progress
//! events and honoring cancellation.
//!
//! ## Lifecycle
//!
//! ```text
//! start ──► started ──► (printing ─► printed)* ──► done
//!                              │            │
//!                              ├─► error    └─► cancelled
//! ```
//!
//! - Units run strictly in order, row-major: row 0 × every copy, then row 1.
//! - With a pause configured, the job sleeps between units. The sleep wakes
//!   early on cancellation.
//! - Cancellation is checked before every unit; `cancelled` reports how many
//!   labels were actually printed.
//! - A failed unit ends the job with `error`; nothing is retried.
//! - Only one batch runs per printer. Dropping the event receiver stops the
//!   job at its next event.
//!
//! ## Example
//!
//! ```no_run
//! # async fn example(
//! #     controller: tapelabel::batch::BatchController,
//! #     sink: std::sync::Arc<dyn tapelabel::printer::PrintSink>,
//! #     request: tapelabel::batch::BatchRequest,
//! # ) -> Result<(), tapelabel::error::LabelError> {
//! let mut handle = controller.start(request, sink)?;
//! while let Some(event) = handle.events.recv().await {
//!     println!("{}", serde_json::to_string(&event).unwrap());
//! }
//! # Ok(())
//! # }
//! ```

mod event;
mod job;

pub use event::BatchEvent;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::LabelError;
use crate::label::batch::{MAX_COPIES, MAX_PAUSE_SECS};
use crate::label::{BatchRow, BatchState, LabelSettings, Widget};
use crate::printer::PrintSink;
use crate::render::WidgetRenderers;

use job::{Job, JobEntry, JobTable, render_payload};

/// Buffered events per job before the job waits for the consumer.
const EVENT_BUFFER: usize = 32;

/// A batch print request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub settings: LabelSettings,
    #[serde(default)]
    pub rows: Vec<BatchRow>,
    #[serde(default = "default_copies")]
    pub copies: i64,
    #[serde(default)]
    pub pause_time: f64,
}

fn default_copies() -> i64 {
    1
}

impl BatchRequest {
    /// Build a request from an editor's batch state.
    pub fn from_state(widgets: Vec<Widget>, settings: LabelSettings, state: &BatchState) -> Self {
        Self {
            widgets,
            settings,
            rows: state.rows.clone(),
            copies: state.copies() as i64,
            pause_time: state.pause_secs(),
        }
    }

    /// Copies per row, clamped to `1..=999`.
    pub fn copies(&self) -> usize {
        self.copies.clamp(1, MAX_COPIES as i64) as usize
    }

    /// Pause between units, clamped to `0..=60s`; NaN counts as zero.
    pub fn pause(&self) -> Duration {
        if self.pause_time.is_finite() {
            Duration::from_secs_f64(self.pause_time.clamp(0.0, MAX_PAUSE_SECS))
        } else {
            Duration::ZERO
        }
    }

    pub fn total(&self) -> usize {
        self.rows.len() * self.copies()
    }

    fn validate(&self) -> Result<(), LabelError> {
        if self.widgets.is_empty() {
            return Err(LabelError::Validation("No widgets provided".to_string()));
        }
        if self.rows.is_empty() {
            return Err(LabelError::Validation("No rows provided".to_string()));
        }
        Ok(())
    }
}

/// A started job.
#[derive(Debug)]
pub struct BatchHandle {
    pub job_id: String,
    pub total: usize,
    /// Ordered progress events; the last one is terminal.
    pub events: mpsc::Receiver<BatchEvent>,
}

/// Owns the running jobs.
#[derive(Clone)]
pub struct BatchController {
    renderers: WidgetRenderers,
    jobs: JobTable,
}

impl BatchController {
    pub fn new(renderers: WidgetRenderers) -> Self {
        Self {
            renderers,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn renderers(&self) -> &WidgetRenderers {
        &self.renderers
    }

    /// Validate and start a batch on `sink`. Must be called inside a tokio
    /// runtime; the job runs on its own task.
    pub fn start(&self, request: BatchRequest, sink: Arc<dyn PrintSink>) -> Result<BatchHandle, LabelError> {
        request.validate()?;

        let printer_id = sink.info().id;
        let job_id = Uuid::new_v4().simple().to_string();
        let token = CancellationToken::new();

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            if jobs.values().any(|j| j.printer_id == printer_id) {
                return Err(LabelError::Conflict(
                    "Another batch job is already running on this printer".to_string(),
                ));
            }
            jobs.insert(
                job_id.clone(),
                JobEntry {
                    token: token.clone(),
                    printer_id,
                },
            );
        }

        let job = Job {
            id: job_id.clone(),
            copies: request.copies(),
            pause: request.pause(),
            widgets: request.widgets,
            settings: request.settings,
            rows: request.rows,
            token,
            sink,
            renderers: self.renderers.clone(),
            jobs: self.jobs.clone(),
        };
        let total = job.total();

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(job.run(tx));

        Ok(BatchHandle {
            job_id,
            total,
            events: rx,
        })
    }

    /// Request cancellation. Unknown or finished ids are ignored.
    ///
    /// Returns whether a running job was signalled.
    pub fn cancel(&self, job_id: &str) -> bool {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        match jobs.get(job_id) {
            Some(job) => {
                tracing::info!(job_id, "batch cancel requested");
                job.token.cancel();
                true
            }
            None => {
                tracing::debug!(job_id, "cancel for unknown batch job ignored");
                false
            }
        }
    }

    /// Whether a job is still registered.
    pub fn is_running(&self, job_id: &str) -> bool {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(job_id)
    }

    /// Print one label: the batch with one row, one copy and no events.
    pub async fn print_single(
        &self,
        widgets: Vec<Widget>,
        settings: LabelSettings,
        sink: Arc<dyn PrintSink>,
    ) -> Result<(), LabelError> {
        if widgets.is_empty() {
            return Err(LabelError::Validation("No widgets provided".to_string()));
        }
        let label = render_payload(self.renderers.clone(), widgets, settings.clone()).await?;
        sink.print(&label, &settings).await?;
        tracing::info!(printer = %sink.info().id, "label printed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::TextWidget;

    fn request(rows: usize, copies: i64, pause_time: f64) -> BatchRequest {
        BatchRequest {
            widgets: vec![Widget::Text(TextWidget::new("x"))],
            settings: LabelSettings::default(),
            rows: vec![BatchRow::new(); rows],
            copies,
            pause_time,
        }
    }

    #[test]
    fn test_request_clamps() {
        assert_eq!(request(3, 0, -1.0).copies(), 1);
        assert_eq!(request(3, -5, 0.0).copies(), 1);
        assert_eq!(request(3, 5000, 0.0).copies(), 999);
        assert_eq!(request(3, 2, -1.0).pause(), Duration::ZERO);
        assert_eq!(request(3, 2, f64::NAN).pause(), Duration::ZERO);
        assert_eq!(request(3, 2, 120.0).pause(), Duration::from_secs(60));
        assert_eq!(request(3, 2, 0.0).total(), 6);
    }

    #[test]
    fn test_request_from_json_defaults() {
        let req: BatchRequest = serde_json::from_str(
            r#"{"widgets": [{"type": "text", "text": ":name:"}], "rows": [{"name": "Ada"}]}"#,
        )
        .unwrap();
        assert_eq!(req.copies(), 1);
        assert_eq!(req.pause(), Duration::ZERO);
        assert_eq!(req.rows[0]["name"], "Ada");
    }

    #[test]
    fn test_validation() {
        let mut req = request(1, 1, 0.0);
        req.widgets.clear();
        assert!(matches!(req.validate(), Err(LabelError::Validation(_))));

        let req = request(0, 1, 0.0);
        assert!(matches!(req.validate(), Err(LabelError::Validation(_))));
    }

    #[test]
    fn test_from_state() {
        let mut state = BatchState::default();
        state.add_row();
        state.copies = 3;
        state.pause_time = 1.5;
        let req = BatchRequest::from_state(vec![], LabelSettings::default(), &state);
        assert_eq!(req.total(), 6);
        assert_eq!(req.pause(), Duration::from_millis(1500));
    }
}
