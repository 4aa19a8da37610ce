//! HTTP handlers for the server.

pub mod batch;
pub mod label;
pub mod printers;
pub mod uploads;
