//! Progress events emitted by a batch job.
//!
//! Events are JSON objects tagged by `event`:
//!
//! ```json
//! {"event": "started", "jobId": "9f1c…", "total": 6}
//! {"event": "printing", "index": 0, "total": 6}
//! {"event": "printed", "index": 0, "total": 6}
//! {"event": "done", "total": 6}
//! ```
//!
//! `done`, `cancelled` and `error` are terminal: nothing follows them.

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum BatchEvent {
    Started {
        #[serde(rename = "jobId")]
        job_id: String,
        total: usize,
    },
    Printing {
        index: usize,
        total: usize,
    },
    Printed {
        index: usize,
        total: usize,
    },
    Done {
        total: usize,
    },
    Cancelled {
        printed: usize,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchEvent::Done { .. } | BatchEvent::Cancelled { .. } | BatchEvent::Error { .. }
        )
    }

    /// The failure carried by an `error` event.
    pub fn into_error(self) -> Option<LabelError> {
        match self {
            BatchEvent::Error { message, index } => Some(LabelError::Batch { index, message }),
            _ => None,
        }
    }
}
