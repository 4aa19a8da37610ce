//! External-command printer.
//!
//! Writes the label to a temporary PNG and runs the configured program with
//! the file path as its last argument, e.g. `PRINT_COMMAND="lp -d dymo"` runs
//! `lp -d dymo /tmp/tapelabel-<id>.png`. The tape width is passed in the
//! `TAPELABEL_TAPE_MM` environment variable.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::LabelError;
use crate::label::LabelSettings;
use crate::render::RenderedLabel;

use super::{PrintSink, PrinterInfo};

/// Id under which the command printer is listed.
pub const COMMAND_PRINTER_ID: &str = "command";

/// Printer backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandPrinter {
    program: String,
    args: Vec<String>,
}

impl CommandPrinter {
    /// Parse a whitespace-separated command line.
    pub fn parse(command_line: &str) -> Result<Self, LabelError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| LabelError::Config("PRINT_COMMAND is empty".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Removes the temporary file on drop.
struct TempFile(PathBuf);

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[async_trait]
impl PrintSink for CommandPrinter {
    fn info(&self) -> PrinterInfo {
        PrinterInfo {
            id: COMMAND_PRINTER_ID.to_string(),
            name: format!("{} (Command)", self.program),
            vendor_product_id: "command".to_string(),
            serial_number: None,
        }
    }

    async fn print(&self, label: &RenderedLabel, settings: &LabelSettings) -> Result<(), LabelError> {
        let png = label.to_png()?;
        let file = TempFile(std::env::temp_dir().join(format!("tapelabel-{}.png", Uuid::new_v4().simple())));
        tokio::fs::write(&file.0, png).await?;

        tracing::debug!(program = %self.program, path = %file.0.display(), "running print command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&file.0)
            .env("TAPELABEL_TAPE_MM", settings.tape_size_mm.mm().to_string())
            .output()
            .await
            .map_err(|e| LabelError::Printer(format!("cannot run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LabelError::Printer(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{TextWidget, Widget};
    use crate::render::{ComposeMode, WidgetRenderers};
    use crate::uploads::MemoryImageStore;
    use std::sync::Arc;

    fn label() -> RenderedLabel {
        WidgetRenderers::new(Arc::new(MemoryImageStore::default())).render_label(
            &[Widget::Text(TextWidget::new("x"))],
            &LabelSettings::default(),
            ComposeMode::Payload,
        )
        .unwrap()
    }

    #[test]
    fn test_parse() {
        let printer = CommandPrinter::parse("lp -d  dymo").unwrap();
        assert_eq!(printer.program(), "lp");
        assert_eq!(printer.args, vec!["-d", "dymo"]);
        assert!(CommandPrinter::parse("   ").is_err());
        assert_eq!(printer.info().id, COMMAND_PRINTER_ID);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_command() {
        let printer = CommandPrinter::parse("true").unwrap();
        printer.print(&label(), &LabelSettings::default()).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_reports_error() {
        let printer = CommandPrinter::parse("false").unwrap();
        let err = printer.print(&label(), &LabelSettings::default()).await.unwrap_err();
        assert!(matches!(err, LabelError::Printer(_)));
    }

    #[tokio::test]
    async fn test_missing_program_reports_error() {
        let printer = CommandPrinter::parse("tapelabel-no-such-program-xyz").unwrap();
        let err = printer.print(&label(), &LabelSettings::default()).await.unwrap_err();
        assert!(err.to_string().contains("cannot run"));
    }
}
