//! Log output for `gensnip`.
//!
//! Log lines always go to stderr. When the browser launches `gensnip bridge`
//! stdout carries native-messaging frames and stderr ends up in the
//! browser's own log, so colors are only used on a terminal.
//!
//! The filter comes from `GENSNIP_LOG`, then `RUST_LOG`, then the
//! command-line verbosity.

use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding a filter for this crate's binaries.
pub const LOG_ENV: &str = "GENSNIP_LOG";

/// How much `gensnip` logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Ingestions, clears and store openings.
    #[default]
    Normal,
    /// Per-record and per-notice detail.
    Verbose,
    /// Everything, including ignored relationships.
    Trace,
}

impl Verbosity {
    /// The most detailed level logged at this verbosity.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive for this crate at this verbosity.
    ///
    /// Other crates stay at `warn` so dependencies do not drown out the
    /// catalog's own messages.
    #[must_use]
    pub fn directive(self) -> String {
        let level = match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        };
        format!("warn,genealogy_snippets={level}")
    }
}

/// Pick the filter: the first of `overrides` that parses, otherwise the
/// directive for `verbosity`.
fn select_filter<'a>(
    overrides: impl IntoIterator<Item = Option<&'a str>>,
    verbosity: Verbosity,
) -> EnvFilter {
    overrides
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directive()))
}

/// Install the stderr subscriber.
///
/// Call once at startup; later calls leave the first subscriber in place.
///
/// # Examples
///
/// ```no_run
/// use genealogy_snippets::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let gensnip_log = std::env::var(LOG_ENV).ok();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = select_filter([gensnip_log.as_deref(), rust_log.as_deref()], verbosity);

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(verbosity >= Verbosity::Verbose);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

/// Initialize logging for tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
