//! # formwright-core
//!
//! Core types, settings, and error types for the formwright workspace.
//! This crate has no dependency on the field pipeline and provides the
//! foundation the other crates build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`utils`] - Utility functions (text inflection, JSON deep merge)
//! - [`settings`] - Form settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FormError, FormResult};
pub use settings::{Settings, SETTINGS};
