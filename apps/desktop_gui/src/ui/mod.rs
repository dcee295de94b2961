//! UI layer: app shell, panels and status styling.

pub mod app;
pub mod theme;

pub use app::CallAgentApp;
