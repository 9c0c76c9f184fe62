//! Utility functions for formwright.
//!
//! This module provides:
//! - [`text`]: String inflection helpers (humanize, camelize, singularize).
//! - [`json`]: Deep merging of JSON maps.

pub mod json;
pub mod text;
