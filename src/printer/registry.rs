//! Printer registry and selection.
//!
//! Resolution rules for a requested printer id:
//!
//! 1. `virtual:<name>` picks that virtual printer, or fails.
//! 2. Any other id must match a configured printer exactly, or fails.
//! 3. No id (or a blank one) auto-selects: the first physical printer, then
//!    the first virtual printer, then fails.

use std::sync::Arc;

use crate::error::LabelError;

use super::virtual_printer::VIRTUAL_PREFIX;
use super::{CommandPrinter, ExclusiveSink, PrintSink, PrinterInfo, VirtualPrinter, VirtualPrinterConfig};

/// Configured printers, each wrapped in an [`ExclusiveSink`].
#[derive(Default, Clone)]
pub struct PrinterRegistry {
    physical: Vec<Arc<dyn PrintSink>>,
    virtuals: Vec<Arc<dyn PrintSink>>,
}

impl PrinterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from virtual printer entries and an optional print command.
    pub fn from_config(
        virtual_printers: &[VirtualPrinterConfig],
        print_command: Option<&str>,
    ) -> Result<Self, LabelError> {
        let mut registry = Self::new();
        if let Some(command) = print_command.filter(|c| !c.trim().is_empty()) {
            registry = registry.with_physical(Arc::new(CommandPrinter::parse(command)?));
        }
        for config in virtual_printers {
            registry = registry.with_virtual(Arc::new(VirtualPrinter::from_config(config)));
        }
        tracing::info!(
            physical = registry.physical.len(),
            virtual_printers = registry.virtuals.len(),
            "printer registry ready"
        );
        Ok(registry)
    }

    pub fn with_physical(mut self, sink: Arc<dyn PrintSink>) -> Self {
        self.physical.push(Arc::new(ExclusiveSink::new(sink)));
        self
    }

    pub fn with_virtual(mut self, sink: Arc<dyn PrintSink>) -> Self {
        self.virtuals.push(Arc::new(ExclusiveSink::new(sink)));
        self
    }

    /// All printers, physical first.
    pub fn list(&self) -> Vec<PrinterInfo> {
        self.physical
            .iter()
            .chain(&self.virtuals)
            .map(|p| p.info())
            .collect()
    }

    /// Pick the printer for a request.
    pub fn resolve(&self, printer_id: Option<&str>) -> Result<Arc<dyn PrintSink>, LabelError> {
        let requested = printer_id.map(str::trim).filter(|id| !id.is_empty());

        match requested {
            Some(id) if id.starts_with(VIRTUAL_PREFIX) => find(&self.virtuals, id)
                .ok_or_else(|| LabelError::PrinterNotFound(format!("virtual printer {id}"))),
            Some(id) => find(&self.physical, id)
                .or_else(|| find(&self.virtuals, id))
                .ok_or_else(|| LabelError::PrinterNotFound(id.to_string())),
            None => self
                .physical
                .first()
                .or_else(|| self.virtuals.first())
                .cloned()
                .ok_or_else(|| {
                    LabelError::PrinterNotFound(
                        "no printers available (no print command and no virtual printers configured)"
                            .to_string(),
                    )
                }),
        }
    }
}

fn find(printers: &[Arc<dyn PrintSink>], id: &str) -> Option<Arc<dyn PrintSink>> {
    printers.iter().find(|p| p.info().id == id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::OutputMode;

    fn virtual_printer(name: &str) -> Arc<dyn PrintSink> {
        let dir = std::env::temp_dir().join("tapelabel-registry-tests");
        Arc::new(VirtualPrinter::new(name, dir, OutputMode::Image))
    }

    #[test]
    fn test_auto_select_without_printers_fails() {
        let err = PrinterRegistry::new().resolve(None).err().unwrap();
        assert!(err.to_string().contains("no printers available"));
    }

    #[test]
    fn test_auto_select_falls_back_to_first_virtual() {
        let registry = PrinterRegistry::new()
            .with_virtual(virtual_printer("Office"))
            .with_virtual(virtual_printer("Lab"));
        assert_eq!(registry.resolve(None).unwrap().info().id, "virtual:Office");
        assert_eq!(registry.resolve(Some("  ")).unwrap().info().id, "virtual:Office");
    }

    #[test]
    fn test_auto_select_prefers_physical() {
        let registry = PrinterRegistry::new()
            .with_virtual(virtual_printer("Office"))
            .with_physical(Arc::new(CommandPrinter::parse("lp").unwrap()));
        assert_eq!(registry.resolve(None).unwrap().info().id, "command");
        let ids: Vec<String> = registry.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["command", "virtual:Office"]);
    }

    #[test]
    fn test_explicit_ids() {
        let registry = PrinterRegistry::new()
            .with_virtual(virtual_printer("Office (2nd Floor)"))
            .with_physical(Arc::new(CommandPrinter::parse("lp").unwrap()));

        let printer = registry.resolve(Some("virtual:Office_2nd_Floor")).unwrap();
        assert_eq!(printer.info().name, "Office (2nd Floor) (Virtual)");
        assert_eq!(registry.resolve(Some("command")).unwrap().info().id, "command");

        assert!(matches!(
            registry.resolve(Some("virtual:Nope")),
            Err(LabelError::PrinterNotFound(_))
        ));
        assert!(matches!(
            registry.resolve(Some("usb:0922:1001")),
            Err(LabelError::PrinterNotFound(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let configs = vec![VirtualPrinterConfig {
            name: "Desk".into(),
            path: dir.path().join("desk"),
            output: OutputMode::Both,
        }];
        let registry = PrinterRegistry::from_config(&configs, None).unwrap();
        assert_eq!(registry.list().len(), 1);
        assert!(dir.path().join("desk").is_dir());

        let registry = PrinterRegistry::from_config(&configs, Some("lp -d x")).unwrap();
        assert_eq!(registry.list().len(), 2);
    }
}
