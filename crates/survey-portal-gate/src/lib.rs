// crates/survey-portal-gate/src/lib.rs
// ============================================================================
// Module: Survey Portal Gate
// Description: Access gate and HTTP service for the survey portals.
// Purpose: Refresh sessions, authorize routes by role, and serve survey checks.
// Dependencies: survey-portal-core, survey-portal-config, axum, reqwest, tokio
// ============================================================================

//! ## Overview
//! The gate sits in front of both portals. For every request it refreshes the
//! session through the identity collaborator, decodes the role claim, and
//! matches the path against the route policy, producing exactly one
//! [`GateDecision`]. The same decision drives the in-process axum middleware
//! and the forward-auth endpoint used by a reverse proxy.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod gate;
pub mod identity;
pub mod middleware;
pub mod server;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FailOpenOnlySink;
pub use audit::FileAuditSink;
pub use audit::GateAuditEvent;
pub use audit::GateAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ServerAuditEvent;
pub use audit::StderrAuditSink;
pub use audit::sink_from_config;
pub use gate::AccessGate;
pub use gate::AuthorizationDenied;
pub use gate::GateDecision;
pub use gate::GateInternalError;
pub use gate::GateRequest;
pub use gate::GateSettings;
pub use gate::Identity;
pub use gate::SessionInvalid;
pub use gate::SessionState;
pub use identity::HostedAuthProvider;
pub use identity::IdentityError;
pub use identity::IdentityProvider;
pub use identity::ResolvedSession;
pub use middleware::gate_layer;
pub use server::GateServer;
pub use server::ServerError;
pub use session::CookieError;
pub use session::CookieSettings;
pub use session::RotatedSession;
pub use session::SessionCredential;
pub use session::rewrite_cookie_header;
