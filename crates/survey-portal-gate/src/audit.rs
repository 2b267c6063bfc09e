// crates/survey-portal-gate/src/audit.rs
// ============================================================================
// Module: Gate Audit Logging
// Description: Structured audit events for gate decisions and server lifecycle.
// Purpose: Emit JSON-line audit records without exposing raw credentials.
// Dependencies: survey-portal-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every gate decision is recorded as a `gate_decision` event: allow,
//! login redirect, denied redirect, or fail-open. Events carry a SHA-256
//! fingerprint of the access token rather than the token itself. Sinks write
//! one JSON object per line and never fail the request they describe.
//! Fail-open decisions always reach a sink: `audit.sink = "none"` still
//! writes them to stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use survey_portal_config::AuditConfig;
use survey_portal_config::AuditSinkKind;

use crate::gate::FAIL_OPEN_LABEL;
use crate::gate::GateDecision;

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Gate decision audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct GateAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    timestamp_ms: u128,
    /// Decision label.
    pub decision: &'static str,
    /// Requested path.
    pub path: String,
    /// Resolved user identifier.
    pub user_id: Option<String>,
    /// Decoded role.
    pub role: Option<&'static str>,
    /// Reason for redirects and fail-open.
    pub reason: Option<String>,
    /// Request identifier (if provided).
    pub request_id: Option<String>,
    /// Access token fingerprint (sha256).
    pub token_fingerprint: Option<String>,
}

impl GateAuditEvent {
    /// Builds an event describing `decision` for `path`.
    #[must_use]
    pub fn for_decision(
        path: &str,
        request_id: Option<&str>,
        token_fingerprint: Option<String>,
        decision: &GateDecision,
    ) -> Self {
        let identity = decision.identity();
        Self {
            event: "gate_decision",
            timestamp_ms: now_millis(),
            decision: decision.label(),
            path: path.to_string(),
            user_id: identity.map(|identity| identity.user_id.to_string()),
            role: identity.map(|identity| identity.role.as_str()),
            reason: decision.reason(),
            request_id: request_id.map(str::to_string),
            token_fingerprint,
        }
    }

    /// Returns true for fail-open decisions.
    #[must_use]
    pub fn is_fail_open(&self) -> bool {
        self.decision == FAIL_OPEN_LABEL
    }
}

/// Server lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ServerAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    timestamp_ms: u128,
    /// Bound listener address.
    pub bind: String,
    /// Number of route rules in force.
    pub route_rules: usize,
}

impl ServerAuditEvent {
    /// Builds a `server_started` event.
    #[must_use]
    pub fn started(bind: String, route_rules: usize) -> Self {
        Self {
            event: "server_started",
            timestamp_ms: now_millis(),
            bind,
            route_rules,
        }
    }
}

/// Returns the current time in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gate events.
pub trait GateAuditSink: Send + Sync {
    /// Record a gate decision event.
    fn record(&self, event: &GateAuditEvent);

    /// Record a server lifecycle event.
    fn record_server(&self, _event: &ServerAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl GateAuditSink for StderrAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        write_stderr_line(event);
    }

    fn record_server(&self, event: &ServerAuditEvent) {
        write_stderr_line(event);
    }
}

/// Writes one JSON line to stderr.
fn write_stderr_line<T: Serialize>(event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(io::stderr(), "{payload}");
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one JSON line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl GateAuditSink for FileAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        self.append(event);
    }

    fn record_server(&self, event: &ServerAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl GateAuditSink for NoopAuditSink {
    fn record(&self, _event: &GateAuditEvent) {}
}

/// Sink that forwards only fail-open decisions.
///
/// # Invariants
/// - A `fail_open` event is never dropped, whatever else is discarded.
pub struct FailOpenOnlySink {
    /// Destination for fail-open events.
    inner: Arc<dyn GateAuditSink>,
}

impl FailOpenOnlySink {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn GateAuditSink>) -> Self {
        Self {
            inner,
        }
    }
}

impl GateAuditSink for FailOpenOnlySink {
    fn record(&self, event: &GateAuditEvent) {
        if event.is_fail_open() {
            self.inner.record(event);
        }
    }
}

/// Builds the sink selected by `[audit]`.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its log.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn GateAuditSink>> {
    match (config.sink, config.path.as_deref()) {
        (AuditSinkKind::File, Some(path)) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        (AuditSinkKind::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "audit file sink requires a path"))
        }
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(FailOpenOnlySink::new(Arc::new(StderrAuditSink)))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
