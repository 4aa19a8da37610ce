//! # Virtual Printers
//!
//! File-backed printers for development and testing. Each print writes a
//! PNG of the label, a JSON snapshot of the widgets and settings, or both,
//! into the printer's output directory.
//!
//! ## Naming
//!
//! ```text
//! id           = "virtual:" + name with spaces → "_" and parentheses removed
//! display name = "<name> (Virtual)"
//! files        = label_<YYYYmmdd_HHMMSS>_<8 hex>.{png,json}
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LabelError;
use crate::label::{LabelSettings, Widget};
use crate::render::RenderedLabel;

use super::{PrintSink, PrinterInfo};

/// Prefix shared by every virtual printer id.
pub const VIRTUAL_PREFIX: &str = "virtual:";

/// What a virtual printer writes per print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Image,
    Json,
    Both,
}

impl OutputMode {
    fn writes_image(self) -> bool {
        matches!(self, OutputMode::Image | OutputMode::Both)
    }

    fn writes_json(self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Both)
    }
}

/// One entry of the `VIRTUAL_PRINTERS` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualPrinterConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub output: OutputMode,
}

/// A printer that saves labels to disk.
#[derive(Debug, Clone)]
pub struct VirtualPrinter {
    name: String,
    output_dir: PathBuf,
    mode: OutputMode,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    widgets: &'a [Widget],
    settings: &'a LabelSettings,
}

impl VirtualPrinter {
    /// Create the printer. The output directory is created if missing; a
    /// failure there is logged and surfaces again on the first print.
    pub fn new(name: impl Into<String>, output_dir: impl Into<PathBuf>, mode: OutputMode) -> Self {
        let printer = Self {
            name: name.into(),
            output_dir: output_dir.into(),
            mode,
        };
        match std::fs::create_dir_all(&printer.output_dir) {
            Ok(()) => tracing::info!(
                printer = %printer.name,
                dir = %printer.output_dir.display(),
                "virtual printer ready"
            ),
            Err(e) => tracing::error!(
                printer = %printer.name,
                dir = %printer.output_dir.display(),
                error = %e,
                "cannot create virtual printer directory"
            ),
        }
        printer
    }

    pub fn from_config(config: &VirtualPrinterConfig) -> Self {
        Self::new(config.name.clone(), config.path.clone(), config.output)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> String {
        virtual_id(&self.name)
    }

    pub fn display_name(&self) -> String {
        format!("{} (Virtual)", self.name)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Write the label image as PNG.
    pub async fn save_image(&self, label: &RenderedLabel, stem: &str) -> Result<PathBuf, LabelError> {
        let path = self.output_dir.join(format!("{stem}.png"));
        let png = label.to_png()?;
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }

    /// Write the widgets and settings as JSON.
    pub async fn save_json(
        &self,
        widgets: &[Widget],
        settings: &LabelSettings,
        stem: &str,
    ) -> Result<PathBuf, LabelError> {
        let path = self.output_dir.join(format!("{stem}.json"));
        let json = serde_json::to_vec_pretty(&Snapshot { widgets, settings })
            .map_err(|e| LabelError::Printer(format!("cannot serialize label: {e}")))?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }

    /// Write every output the mode asks for. Returns the written paths.
    pub async fn save(&self, label: &RenderedLabel, settings: &LabelSettings) -> Result<Vec<PathBuf>, LabelError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let stem = unique_stem();
        let mut paths = Vec::new();
        if self.mode.writes_image() {
            paths.push(self.save_image(label, &stem).await?);
        }
        if self.mode.writes_json() {
            paths.push(self.save_json(&label.widgets, settings, &stem).await?);
        }

        for path in &paths {
            tracing::info!(printer = %self.name, path = %path.display(), "virtual printer saved label");
        }
        Ok(paths)
    }
}

#[async_trait]
impl PrintSink for VirtualPrinter {
    fn info(&self) -> PrinterInfo {
        PrinterInfo {
            id: self.id(),
            name: self.display_name(),
            vendor_product_id: "virtual".to_string(),
            serial_number: None,
        }
    }

    async fn print(&self, label: &RenderedLabel, settings: &LabelSettings) -> Result<(), LabelError> {
        self.save(label, settings)
            .await
            .map(|_| ())
            .map_err(|e| LabelError::Printer(format!("virtual printer '{}': {e}", self.name)))
    }
}

/// Printer id for a virtual printer name.
pub fn virtual_id(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{VIRTUAL_PREFIX}{sanitized}")
}

fn unique_stem() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let unique = Uuid::new_v4().simple().to_string();
    format!("label_{timestamp}_{}", &unique[..8])
}
