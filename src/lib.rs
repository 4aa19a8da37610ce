//! # Tapelabel - Label Layout and Batch Printing
//!
//! Tapelabel composes tape labels from widgets (text, QR codes, barcodes and
//! images) and drives print jobs against label printers. It provides:
//!
//! - **Layout**: a deterministic, pure horizontal layout engine
//! - **Rendering**: bitmap fonts, QR and linear barcodes, dithered images
//! - **Variables**: `:name:` placeholders filled from batch data rows
//! - **Batch printing**: ordered, pausable, cancellable jobs with progress events
//! - **Printers**: virtual file printers and an external print command
//! - **Server**: a JSON/SSE HTTP API for the label editor
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tapelabel::{
//!     label::Label,
//!     render::{ComposeMode, WidgetRenderers},
//!     uploads::DirImageStore,
//! };
//!
//! let label: Label = serde_json::from_str(
//!     r#"{"widgets": [{"type": "text", "text": "Hello"}], "settings": {"tapeSizeMm": 12}}"#,
//! )?;
//!
//! let renderers = WidgetRenderers::new(Arc::new(DirImageStore::open("uploads")?));
//! let rendered = renderers.render_label(&label.widgets, &label.settings, ComposeMode::Preview)?;
//! std::fs::write("label.png", rendered.to_png()?)?;
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Widget model and label settings |
//! | [`layout`] | Geometry of a composed label |
//! | [`render`] | Widget renderers and composition |
//! | [`variables`] | Placeholder detection and substitution |
//! | [`batch`] | Batch job controller |
//! | [`printer`] | Print sinks and printer selection |
//! | [`uploads`] | Uploaded image storage |
//! | [`server`] | HTTP API |
//! | [`config`] | Environment configuration |
//! | [`error`] | Error types |

pub mod batch;
pub mod config;
pub mod error;
pub mod label;
pub mod layout;
pub mod printer;
pub mod render;
pub mod server;
pub mod uploads;
pub mod variables;

// Re-exports for convenience
pub use error::LabelError;
pub use label::{Label, LabelSettings, Widget};
