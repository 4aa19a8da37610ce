//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::batch::BatchController;
use crate::error::LabelError;
use crate::printer::{PrinterRegistry, VirtualPrinterConfig};
use crate::render::WidgetRenderers;
use crate::uploads::DirImageStore;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:5000")
    pub listen_addr: String,
    /// Directory holding uploaded images
    pub upload_dir: PathBuf,
    /// Built client files, served for every non-API path
    pub client_dir: PathBuf,
    pub virtual_printers: Vec<VirtualPrinterConfig>,
    /// Command line of the physical print program, if any
    pub print_command: Option<String>,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub printers: PrinterRegistry,
    pub batches: BatchController,
    pub uploads: Arc<DirImageStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, LabelError> {
        let uploads = Arc::new(DirImageStore::open(&config.upload_dir)?);
        let printers = PrinterRegistry::from_config(&config.virtual_printers, config.print_command.as_deref())?;
        let batches = BatchController::new(WidgetRenderers::new(uploads.clone()));
        Ok(Self {
            config,
            printers,
            batches,
            uploads,
        })
    }

    pub fn renderers(&self) -> &WidgetRenderers {
        self.batches.renderers()
    }
}
