//! # Printers
//!
//! A printer is an opaque sink: it receives a composed label plus the
//! settings it was rendered with, and either succeeds or reports why not.
//!
//! ## Sinks
//!
//! - [`virtual_printer`]: writes PNG and/or JSON files to a directory
//! - [`command`]: hands a PNG to an external print program
//! - [`ExclusiveSink`]: serializes access so prints never interleave
//!
//! The [`registry`] lists configured printers and picks one per request.

pub mod command;
pub mod registry;
pub mod virtual_printer;

pub use command::CommandPrinter;
pub use registry::PrinterRegistry;
pub use virtual_printer::{OutputMode, VirtualPrinter, VirtualPrinterConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::LabelError;
use crate::label::LabelSettings;
use crate::render::RenderedLabel;

/// Printer description as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterInfo {
    pub id: String,
    pub name: String,
    pub vendor_product_id: String,
    pub serial_number: Option<String>,
}

/// Destination for finished labels.
#[async_trait]
pub trait PrintSink: Send + Sync {
    fn info(&self) -> PrinterInfo;

    async fn print(&self, label: &RenderedLabel, settings: &LabelSettings) -> Result<(), LabelError>;
}

/// Wraps a sink so only one print runs at a time.
///
/// Single prints and batch units aimed at the same printer queue up on the
/// same lock.
pub struct ExclusiveSink {
    inner: Arc<dyn PrintSink>,
    lock: Mutex<()>,
}

impl ExclusiveSink {
    pub fn new(inner: Arc<dyn PrintSink>) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl PrintSink for ExclusiveSink {
    fn info(&self) -> PrinterInfo {
        self.inner.info()
    }

    async fn print(&self, label: &RenderedLabel, settings: &LabelSettings) -> Result<(), LabelError> {
        let _guard = self.lock.lock().await;
        self.inner.print(label, settings).await
    }
}
