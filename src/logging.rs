//! Logging setup.
//!
//! All logs are written to **stderr**: stdout carries the plugin handshake
//! and must stay clean.
//!
//! # Environment Variables
//!
//! The filter is taken from the first of these that is set and non-empty:
//!
//! - `RUST_LOG`: full `tracing` directives, e.g.
//!   `info,terraform_provider_incident=debug`
//! - `TF_LOG_PROVIDER`: a Terraform level name for provider logs
//! - `TF_LOG`: a Terraform level name for everything
//!
//! Terraform level names are `TRACE`, `DEBUG`, `INFO`, `WARN` and `ERROR`;
//! `JSON` means `TRACE`. With none of the variables set the level is `info`.
//!
//! ```bash
//! TF_LOG=DEBUG terraform plan
//! RUST_LOG=terraform_provider_incident::client=debug terraform apply
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when no variable selects one.
pub const DEFAULT_LEVEL: &str = "info";

/// Directives taken verbatim.
pub const RUST_LOG_ENV: &str = "RUST_LOG";

/// Terraform level for provider logs.
pub const TF_LOG_PROVIDER_ENV: &str = "TF_LOG_PROVIDER";

/// Terraform level for all logs.
pub const TF_LOG_ENV: &str = "TF_LOG";

/// Map a Terraform log level name onto a `tracing` level.
///
/// Returns `None` for names Terraform does not define.
pub fn terraform_level(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "JSON" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" => Some("warn"),
        "ERROR" => Some("error"),
        _ => None,
    }
}

/// Work out the filter directives from the environment.
pub fn filter_directives<F>(env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    if let Some(directives) = set(RUST_LOG_ENV) {
        return directives;
    }

    [TF_LOG_PROVIDER_ENV, TF_LOG_ENV]
        .iter()
        .filter_map(|key| set(key))
        .find_map(|name| terraform_level(&name))
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

fn env_filter() -> EnvFilter {
    let directives = filter_directives(|key| std::env::var(key).ok());
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Initialize the global logging subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this does not panic when a subscriber has already
/// been set, which makes it safe to call from tests.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so only the
    // filter selection is tested here.

    use super::*;
    use std::collections::HashMap;

    fn directives(vars: &[(&str, &str)]) -> String {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        filter_directives(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_default_level() {
        assert_eq!(directives(&[]), "info");
    }

    #[test]
    fn test_rust_log_wins() {
        assert_eq!(
            directives(&[("RUST_LOG", "warn,terraform_provider_incident=debug"), ("TF_LOG", "TRACE")]),
            "warn,terraform_provider_incident=debug"
        );
    }

    #[test]
    fn test_provider_level_before_global_level() {
        assert_eq!(directives(&[("TF_LOG_PROVIDER", "DEBUG"), ("TF_LOG", "ERROR")]), "debug");
        assert_eq!(directives(&[("TF_LOG", "warn")]), "warn");
    }

    #[test]
    fn test_json_means_trace() {
        assert_eq!(directives(&[("TF_LOG", "JSON")]), "trace");
    }

    #[test]
    fn test_unknown_or_empty_levels_are_skipped() {
        assert_eq!(directives(&[("TF_LOG_PROVIDER", "LOUD"), ("TF_LOG", "ERROR")]), "error");
        assert_eq!(directives(&[("RUST_LOG", " "), ("TF_LOG", "")]), "info");
    }

    #[test]
    fn test_directives_parse() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(level).is_ok());
        }
        assert!(EnvFilter::try_new("warn,terraform_provider_incident=debug").is_ok());
    }
}
