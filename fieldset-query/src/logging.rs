//! Logging bootstrap.
//!
//! The library itself only emits `tracing` events. This module installs a
//! subscriber for applications that do not set up their own, controlled by
//! environment variables.
//!
//! # Environment Variables
//!
//! - `FIELDSET_DEBUG=true` (or `1`, `yes`) - Enable debug logging
//! - `FIELDSET_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `FIELDSET_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! A subscriber is only installed with the `tracing-subscriber` feature.
//!
//! ```rust,no_run
//! use fieldset_query::logging;
//!
//! // Call once at startup; later calls are no-ops.
//! logging::init();
//! ```
//!
//! Events emitted by the library:
//!
//! ```rust,ignore
//! debug!(field = "author", "dropping directive below external relation");
//! trace!(serializer = "User", field = "nickname", "field skipped");
//! warn!(offset = 4, "ignoring unmatched `}` in selection");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Variable enabling debug logging.
pub const DEBUG_VAR: &str = "FIELDSET_DEBUG";
/// Variable overriding the log level.
pub const LEVEL_VAR: &str = "FIELDSET_LOG_LEVEL";
/// Variable selecting the output format.
pub const FORMAT_VAR: &str = "FIELDSET_LOG_FORMAT";

/// Check if debug logging is enabled via `FIELDSET_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    debug_flag(env::var(DEBUG_VAR).ok().as_deref())
}

/// Get the configured log level.
///
/// Defaults to "debug" if `FIELDSET_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    level_from(is_debug_enabled(), env::var(LEVEL_VAR).ok().as_deref())
}

/// Get the configured log format. Defaults to "json".
pub fn get_log_format() -> &'static str {
    format_from(env::var(FORMAT_VAR).ok().as_deref())
}

fn debug_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

fn level_from(debug: bool, level: Option<&str>) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match level.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn format_from(format: Option<&str>) -> &'static str {
    match format.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Initialize logging from the environment.
///
/// Does nothing unless `FIELDSET_DEBUG` or `FIELDSET_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
        return;
    }
    install(get_log_level(), get_log_format());
}

/// Initialize logging with a specific level, ignoring the environment.
///
/// ```rust,no_run
/// fieldset_query::logging::init_with_level("trace");
/// ```
pub fn init_with_level(level: &str) {
    install(level_from(false, Some(level)), get_log_format());
}

/// Initialize debug-level logging.
pub fn init_debug() {
    install("debug", get_log_format());
}

#[cfg_attr(not(feature = "tracing-subscriber"), allow(unused_variables))]
fn install(level: &'static str, format: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "fieldset={level},fieldset_query={level},fieldset_selection={level},fieldset_axum={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format, "fieldset logging initialized");
            }
        }
    });
}
