//! Logging setup and secret redaction.
//!
//! Events are emitted with the `tracing` macros and rendered to stderr, since
//! stdout carries MCP frames. Structured arguments attached to an event go
//! through [`Redacted`] so credentials never reach the log:
//!
//! ```ignore
//! use codesentry_core::logging::Redacted;
//!
//! tracing::debug!(arguments = %Redacted(&args), "Tool arguments");
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::subscriber::Interest;
use tracing::{Level, Metadata};
use tracing_subscriber::layer::{Context, Filter, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::parse_flag;
use crate::{LogLevel, ServerConfig};

/// Environment flag enabling debug output.
const DEBUG_VAR: &str = "DEBUG";

/// Replacement value for redacted fields.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Rendered when a value cannot be serialized.
pub const UNSERIALIZABLE_MARKER: &str = "[Object - Could not serialize]";

/// Key fragments that mark a field as sensitive (matched case-insensitively).
const SENSITIVE_KEYS: [&str; 6] = ["password", "token", "secret", "key", "auth", "credential"];

/// Whether a field name looks like it holds a credential.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|fragment| key.contains(fragment))
}

/// Shallow copy of `value` with sensitive top-level fields replaced.
///
/// Only the immediate keys of an object are inspected; nested objects and
/// non-object values are returned as they are.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, field)| {
                    let field = if is_sensitive_key(key) {
                        Value::String(REDACTION_MARKER.to_string())
                    } else {
                        field.clone()
                    };
                    (key.clone(), field)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Display adapter rendering a JSON value with secrets redacted.
#[derive(Debug, Clone, Copy)]
pub struct Redacted<'a>(pub &'a Value);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&redact(self.0)) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(UNSERIALIZABLE_MARKER),
        }
    }
}

/// Decides, for every debug event, whether it is emitted.
///
/// The check runs each time a debug event fires and is never cached, so
/// flipping `DEBUG` in the process environment takes effect immediately.
#[derive(Clone)]
pub struct DebugGate(Arc<dyn Fn() -> bool + Send + Sync>);

impl DebugGate {
    /// Gate backed by an arbitrary check.
    pub fn new(check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    /// Re-reads `DEBUG` from the process environment on each event.
    pub fn from_env() -> Self {
        Self::new(|| std::env::var(DEBUG_VAR).is_ok_and(|value| parse_flag(&value)))
    }

    /// Gate that is always open (`--verbose`).
    pub fn open() -> Self {
        Self::new(|| true)
    }

    pub fn is_open(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for DebugGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DebugGate").finish_non_exhaustive()
    }
}

/// Per-layer filter applying `LOG_LEVEL` to info/warn/error and the
/// [`DebugGate`] to debug events. Trace events are dropped.
#[derive(Debug, Clone)]
pub struct LevelGate {
    threshold: Level,
    debug: DebugGate,
}

impl LevelGate {
    pub fn new(log_level: LogLevel, debug: DebugGate) -> Self {
        // Debug output is governed by the gate alone
        let threshold = match log_level {
            LogLevel::Debug | LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        };
        Self { threshold, debug }
    }

    fn allows(&self, level: &Level) -> bool {
        match *level {
            Level::TRACE => false,
            Level::DEBUG => self.debug.is_open(),
            _ => *level <= self.threshold,
        }
    }
}

impl<S> Filter<S> for LevelGate {
    fn enabled(&self, metadata: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.allows(metadata.level())
    }

    fn callsite_enabled(&self, metadata: &'static Metadata<'static>) -> Interest {
        match *metadata.level() {
            // Re-evaluated on every event
            Level::DEBUG => Interest::sometimes(),
            _ if self.allows(metadata.level()) => Interest::always(),
            _ => Interest::never(),
        }
    }
}

/// Build the event filter for the given configuration.
///
/// `RUST_LOG` takes precedence when set. Otherwise info/warn/error follow
/// `LOG_LEVEL` and debug events pass only while `debug` is open.
pub fn event_filter(config: &ServerConfig, debug: DebugGate) -> Box<dyn Filter<Registry> + Send + Sync> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Box::new(filter),
        Err(_) => Box::new(LevelGate::new(config.log_level, debug)),
    }
}

/// Install the global stderr subscriber.
///
/// With `verbose` the debug gate is held open; otherwise it follows `DEBUG`.
/// Subsequent calls are ignored.
pub fn init(config: &ServerConfig, verbose: bool) {
    let debug = if verbose {
        DebugGate::open()
    } else {
        DebugGate::from_env()
    };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_filter(event_filter(config, debug)),
        )
        .try_init();
}
