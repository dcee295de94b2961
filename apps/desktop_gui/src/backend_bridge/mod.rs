//! Bridge between the egui thread and the tokio runtime that owns the call controller.

pub mod commands;
pub mod runtime;
