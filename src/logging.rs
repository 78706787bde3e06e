//! Stage-tagged logging on stderr.
//!
//! Every event carries the pipeline [`Stage`] that produced it, so a run reads
//! as `input -> builder -> validate -> obligations` followed by `check` or
//! `query`. Reports stay on stdout.
//!
//! `[logging.modules]` accepts stage names as well as module paths:
//!
//! ```toml
//! [logging]
//! default = "warn"
//!
//! [logging.modules]
//! builder = "debug"             # same as "classgraph::graph::builder"
//! "classgraph::input" = "info"
//! ```
//!
//! `debug = true` in settings raises the default level to `debug`. `RUST_LOG`
//! replaces the whole filter when set.

use std::fmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Declaration,
    Builder,
    Validate,
    Obligations,
    Check,
    Query,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Input,
        Stage::Declaration,
        Stage::Builder,
        Stage::Validate,
        Stage::Obligations,
        Stage::Check,
        Stage::Query,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Declaration => "declaration",
            Stage::Builder => "builder",
            Stage::Validate => "validate",
            Stage::Obligations => "obligations",
            Stage::Check => "check",
            Stage::Query => "query",
        }
    }

    /// Module whose events this stage covers, used as the filter target.
    pub fn module(&self) -> &'static str {
        match self {
            Stage::Input => "classgraph::input",
            Stage::Declaration => "classgraph::declaration",
            Stage::Builder => "classgraph::graph::builder",
            Stage::Validate => "classgraph::graph::validate",
            Stage::Obligations => "classgraph::graph::obligations",
            Stage::Check => "classgraph::cli::commands::check",
            Stage::Query => "classgraph::cli::commands::query",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Install the stderr subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one is left alone.
pub fn init(config: &LoggingConfig, debug: bool) -> bool {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(filter_directives(config, debug))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(CompactTime)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

/// `EnvFilter` directives: the default level, then per-target overrides in
/// sorted order with stage names expanded to their module.
fn filter_directives(config: &LoggingConfig, debug: bool) -> String {
    let mut directives = vec![if debug {
        "debug".to_string()
    } else {
        config.default.clone()
    }];

    let mut overrides: Vec<(&str, &str)> = config
        .modules
        .iter()
        .map(|(target, level)| {
            let target = Stage::from_name(target).map_or(target.as_str(), |s| s.module());
            (target, level.as_str())
        })
        .collect();
    overrides.sort();

    directives.extend(
        overrides
            .into_iter()
            .map(|(target, level)| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Info-level event tagged with its stage.
///
/// ```ignore
/// log_event!(Stage::Check, "done", "{} files", count);
/// ```
#[macro_export]
macro_rules! log_event {
    ($stage:expr, $event:expr) => {
        tracing::info!("[{}] {}", $stage, $event)
    };
    ($stage:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $stage, $event, format!($($arg)*))
    };
}

/// Debug-level event tagged with its stage.
#[macro_export]
macro_rules! debug_event {
    ($stage:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $stage, $event)
    };
    ($stage:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $stage, $event, format!($($arg)*))
    };
}
