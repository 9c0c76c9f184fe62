//! Logging integration for formwright.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-field spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info", "warn",
/// "error"). In debug mode a pretty, human-readable format is used; otherwise
/// a structured JSON format is used. Installing a subscriber twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for rendering a single field.
///
/// Every log entry emitted while the field is resolved and composed carries
/// the object name and attribute.
///
/// # Examples
///
/// ```
/// use formwright_core::logging::field_span;
///
/// let span = field_span("user", "email");
/// let _guard = span.enter();
/// tracing::debug!("resolving input");
/// ```
pub fn field_span(object_name: &str, attribute: &str) -> tracing::Span {
    tracing::debug_span!("field", object = object_name, attribute = attribute)
}
