//! The per-job task: rows × copies, strictly in order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::LabelError;
use crate::label::{BatchRow, LabelSettings, Widget};
use crate::printer::PrintSink;
use crate::render::{ComposeMode, RenderedLabel, WidgetRenderers};
use crate::variables::substitute;

use super::BatchEvent;

/// Registry entry for a running job.
pub(crate) struct JobEntry {
    pub(crate) token: CancellationToken,
    pub(crate) printer_id: String,
}

pub(crate) type JobTable = Arc<Mutex<HashMap<String, JobEntry>>>;

/// Removes the job from the registry when the task ends, however it ends.
/// Terminal events unregister first, so the printer is free once they arrive.
struct JobGuard {
    jobs: JobTable,
    job_id: String,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        unregister(&self.jobs, &self.job_id);
    }
}

fn unregister(jobs: &JobTable, job_id: &str) {
    jobs.lock().unwrap_or_else(PoisonError::into_inner).remove(job_id);
}

pub(crate) struct Job {
    pub(crate) id: String,
    pub(crate) widgets: Vec<Widget>,
    pub(crate) settings: LabelSettings,
    pub(crate) rows: Vec<BatchRow>,
    pub(crate) copies: usize,
    pub(crate) pause: Duration,
    pub(crate) token: CancellationToken,
    pub(crate) sink: Arc<dyn PrintSink>,
    pub(crate) renderers: WidgetRenderers,
    pub(crate) jobs: JobTable,
}

/// Why a job stopped early.
enum Stop {
    /// The event receiver went away.
    Disconnected,
    /// A terminal event was sent.
    Finished,
}

impl Job {
    pub(crate) fn total(&self) -> usize {
        self.rows.len() * self.copies
    }

    pub(crate) async fn run(self, events: mpsc::Sender<BatchEvent>) {
        let _guard = JobGuard {
            jobs: self.jobs.clone(),
            job_id: self.id.clone(),
        };

        match self.drive(&events).await {
            Ok(()) | Err(Stop::Finished) => {}
            Err(Stop::Disconnected) => {
                tracing::info!(job_id = %self.id, "batch receiver dropped, stopping job");
            }
        }
    }

    async fn drive(&self, events: &mpsc::Sender<BatchEvent>) -> Result<(), Stop> {
        let total = self.total();
        tracing::info!(
            job_id = %self.id,
            printer = %self.sink.info().id,
            total,
            "batch started"
        );
        emit(
            events,
            BatchEvent::Started {
                job_id: self.id.clone(),
                total,
            },
        )
        .await?;

        let mut printed = 0;
        let units = self
            .rows
            .iter()
            .flat_map(|row| std::iter::repeat_n(row, self.copies));

        for (index, row) in units.enumerate() {
            if index > 0 && !self.pause.is_zero() {
                self.check_cancelled(events, printed).await?;
                tokio::select! {
                    _ = tokio::time::sleep(self.pause) => {}
                    _ = self.token.cancelled() => {}
                }
            }
            self.check_cancelled(events, printed).await?;

            emit(events, BatchEvent::Printing { index, total }).await?;

            let widgets = substitute(&self.widgets, row);
            match self.print_unit(widgets).await {
                Ok(()) => {
                    printed += 1;
                    tracing::debug!(job_id = %self.id, index, "batch unit printed");
                    emit(events, BatchEvent::Printed { index, total }).await?;
                }
                Err(e) => {
                    tracing::error!(job_id = %self.id, index, error = %e, "batch unit failed");
                    unregister(&self.jobs, &self.id);
                    emit(
                        events,
                        BatchEvent::Error {
                            message: e.to_string(),
                            index: Some(index),
                        },
                    )
                    .await?;
                    return Err(Stop::Finished);
                }
            }
        }

        tracing::info!(job_id = %self.id, total, "batch done");
        unregister(&self.jobs, &self.id);
        emit(events, BatchEvent::Done { total }).await
    }

    async fn check_cancelled(&self, events: &mpsc::Sender<BatchEvent>, printed: usize) -> Result<(), Stop> {
        if !self.token.is_cancelled() {
            return Ok(());
        }
        tracing::info!(job_id = %self.id, printed, "batch cancelled");
        unregister(&self.jobs, &self.id);
        emit(events, BatchEvent::Cancelled { printed }).await?;
        Err(Stop::Finished)
    }

    async fn print_unit(&self, widgets: Vec<Widget>) -> Result<(), LabelError> {
        let label = render_payload(self.renderers.clone(), widgets, self.settings.clone()).await?;
        self.sink.print(&label, &self.settings).await
    }
}

async fn emit(events: &mpsc::Sender<BatchEvent>, event: BatchEvent) -> Result<(), Stop> {
    events.send(event).await.map_err(|_| Stop::Disconnected)
}

/// Render a printer payload off the async runtime.
pub(crate) async fn render_payload(
    renderers: WidgetRenderers,
    widgets: Vec<Widget>,
    settings: LabelSettings,
) -> Result<RenderedLabel, LabelError> {
    tokio::task::spawn_blocking(move || renderers.render_label(&widgets, &settings, ComposeMode::Payload))
        .await
        .map_err(|e| LabelError::Render(format!("render task failed: {e}")))?
}
