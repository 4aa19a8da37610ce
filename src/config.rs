//! # Configuration
//!
//! Settings come from CLI flags with environment fallbacks (see `main.rs`).
//! This module holds the parts shared by every entry point.
//!
//! ## Environment
//!
//! | Variable               | Meaning |
//! |------------------------|---------|
//! | `TAPELABEL_LISTEN`     | HTTP listen address (default `0.0.0.0:5000`) |
//! | `TAPELABEL_UPLOAD_DIR` | Where uploaded images are kept |
//! | `TAPELABEL_CLIENT_DIR` | Static client files (default `dist-client`) |
//! | `VIRTUAL_PRINTERS`     | JSON array of `{"name", "path", "output"?}` |
//! | `PRINT_COMMAND`        | Program that prints a PNG passed as last argument |
//!
//! ## Virtual printers
//!
//! ```json
//! [{"name": "Office Printer", "path": "./output/office", "output": "both"}]
//! ```
//!
//! `output` is `image` (default), `json` or `both`. Malformed configuration
//! never stops the server: bad entries are skipped with a warning and
//! unparseable input yields no virtual printers.

use std::path::PathBuf;

use serde_json::Value;

use crate::printer::{OutputMode, VirtualPrinterConfig};

pub const ENV_LISTEN: &str = "TAPELABEL_LISTEN";
pub const ENV_UPLOAD_DIR: &str = "TAPELABEL_UPLOAD_DIR";
pub const ENV_CLIENT_DIR: &str = "TAPELABEL_CLIENT_DIR";
pub const ENV_VIRTUAL_PRINTERS: &str = "VIRTUAL_PRINTERS";
pub const ENV_PRINT_COMMAND: &str = "PRINT_COMMAND";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:5000";
pub const DEFAULT_CLIENT_DIR: &str = "dist-client";

/// Upload directory used when none is configured.
pub fn default_upload_dir() -> PathBuf {
    std::env::temp_dir().join("tapelabel-uploads")
}

/// Parse the `VIRTUAL_PRINTERS` value.
pub fn parse_virtual_printers(raw: &str) -> Vec<VirtualPrinterConfig> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            tracing::error!("{ENV_VIRTUAL_PRINTERS} must be a JSON array");
            return Vec::new();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to parse {ENV_VIRTUAL_PRINTERS}");
            return Vec::new();
        }
    };

    let printers: Vec<VirtualPrinterConfig> = entries.iter().filter_map(parse_entry).collect();
    tracing::info!(count = printers.len(), "loaded virtual printer config");
    printers
}

fn parse_entry(entry: &Value) -> Option<VirtualPrinterConfig> {
    let Value::Object(fields) = entry else {
        tracing::warn!(entry = %entry, "skipping invalid virtual printer config");
        return None;
    };

    let name = fields.get("name").and_then(Value::as_str);
    let path = fields.get("path").and_then(Value::as_str);
    let (Some(name), Some(path)) = (name, path) else {
        tracing::warn!(entry = %entry, "virtual printer missing 'name' or 'path'");
        return None;
    };

    let output = match fields.get("output").and_then(Value::as_str) {
        None | Some("image") => OutputMode::Image,
        Some("json") => OutputMode::Json,
        Some("both") => OutputMode::Both,
        Some(other) => {
            tracing::warn!(printer = name, output = other, "unknown output mode, using image");
            OutputMode::Image
        }
    };

    Some(VirtualPrinterConfig {
        name: name.to_string(),
        path: PathBuf::from(path),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_or_blank_is_no_printers() {
        assert!(parse_virtual_printers("").is_empty());
        assert!(parse_virtual_printers("   \n").is_empty());
    }

    #[test]
    fn test_invalid_json_or_non_array_is_no_printers() {
        assert!(parse_virtual_printers("[{").is_empty());
        assert!(parse_virtual_printers(r#"{"name": "x", "path": "y"}"#).is_empty());
        assert!(parse_virtual_printers("42").is_empty());
    }

    #[test]
    fn test_valid_entries() {
        let printers = parse_virtual_printers(
            r#"[
                {"name": "Office Printer", "path": "./output/office"},
                {"name": "Lab", "path": "/tmp/lab", "output": "both"}
            ]"#,
        );
        assert_eq!(
            printers,
            vec![
                VirtualPrinterConfig {
                    name: "Office Printer".into(),
                    path: PathBuf::from("./output/office"),
                    output: OutputMode::Image,
                },
                VirtualPrinterConfig {
                    name: "Lab".into(),
                    path: PathBuf::from("/tmp/lab"),
                    output: OutputMode::Both,
                },
            ]
        );
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let printers = parse_virtual_printers(
            r#"[
                "just a string",
                42,
                {"name": "No path"},
                {"path": "/no/name"},
                {"name": 7, "path": "/numeric/name"},
                {"name": "Good", "path": "/good", "output": "fax"}
            ]"#,
        );
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].name, "Good");
        assert_eq!(printers[0].output, OutputMode::Image);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_virtual_printers("[]").is_empty());
    }
}
