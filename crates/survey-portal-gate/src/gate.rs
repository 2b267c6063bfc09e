// crates/survey-portal-gate/src/gate.rs
// ============================================================================
// Module: Access Gate
// Description: Session refresh and role-based route authorization.
// Purpose: Decide, per request, whether to pass through or redirect.
// Dependencies: survey-portal-core, survey-portal-config, tokio, url
// ============================================================================

//! ## Overview
//! The gate runs once per request. It reads the session credential from the
//! request cookies, asks the [`IdentityProvider`] to validate and refresh it
//! (once, bounded by a timeout), decodes the role claim, and matches the
//! request path against the [`RoutePolicy`]. The outcome is exactly one
//! [`GateDecision`].
//!
//! Resolution ([`AccessGate::resolve_session`]) and decision
//! ([`AccessGate::decide`]) are split: the decision is a pure function of the
//! path and a [`SessionState`], so every branch is directly testable.
//!
//! Failure classes:
//! - Identity failures (rejected, unreachable, timed out, malformed, unknown
//!   role) mean the session is invalid: protected paths redirect to login.
//! - Faults inside the gate's own plumbing (collaborator panic, collaborator
//!   internal error, a rotated token that cannot be written as a cookie) fail
//!   open: the request continues with its original headers and an audit
//!   event is recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use survey_portal_config::ConfigError;
use survey_portal_config::PortalConfig;
use survey_portal_core::Role;
use survey_portal_core::RouteAccess;
use survey_portal_core::RoutePolicy;
use survey_portal_core::UserId;
use survey_portal_core::fingerprint_token;
use thiserror::Error;
use url::form_urlencoded;

use crate::audit::GateAuditEvent;
use crate::audit::GateAuditSink;
use crate::identity::IdentityError;
use crate::identity::IdentityProvider;
use crate::session::CookieSettings;
use crate::session::RotatedSession;
use crate::session::SessionCredential;

/// Query parameter carrying the original path on login redirects.
const REDIRECT_PARAM: &str = "redirectTo";
/// Audit label of [`GateDecision::FailOpen`].
pub const FAIL_OPEN_LABEL: &str = "fail_open";

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Authenticated caller with a decoded role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User identifier.
    pub user_id: UserId,
    /// Decoded role claim.
    pub role: Role,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a session does not authenticate the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionInvalid {
    /// No session cookie on the request.
    #[error("no session credential presented")]
    Missing,
    /// Identity provider rejected or could not resolve the session.
    #[error("session rejected: {0}")]
    Rejected(IdentityError),
    /// Identity provider did not answer in time.
    #[error("identity provider timed out after {0:?}")]
    TimedOut(Duration),
    /// Session carries no role claim.
    #[error("session has no role claim")]
    MissingRole,
    /// Role claim outside the known set.
    #[error("role claim {0:?} is not recognized")]
    UnknownRole(String),
}

/// Authenticated caller lacks the role a route requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("role {role} may not access {path} (requires {required})")]
pub struct AuthorizationDenied {
    /// Caller role.
    pub role: Role,
    /// Role the route requires.
    pub required: Role,
    /// Requested path.
    pub path: String,
}

/// Fault inside the gate's own plumbing.
///
/// # Invariants
/// - Every variant leads to a fail-open decision and an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateInternalError {
    /// Identity provider task panicked.
    #[error("identity provider panicked")]
    ProviderPanicked,
    /// Identity provider task was cancelled before completing.
    #[error("identity provider task cancelled")]
    ProviderCancelled,
    /// Identity provider reported an internal fault.
    #[error("identity provider fault: {0}")]
    ProviderFault(String),
    /// Session cookies could not be encoded.
    #[error("session cookie encoding failed: {0}")]
    CookieEncoding(String),
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Session resolution outcome fed to [`AccessGate::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Session did not authenticate the request.
    Invalid {
        /// Why.
        reason: SessionInvalid,
        /// Whether a credential was presented (and should be cleared).
        presented: bool,
    },
    /// Valid session with its refreshed cookies.
    Active {
        /// Resolved caller.
        identity: Identity,
        /// Cookies encoding the carried-forward credential.
        session: RotatedSession,
    },
    /// Gate fault; the request fails open.
    Faulted(GateInternalError),
}

/// Gate outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue the request.
    Proceed {
        /// Caller, when the session resolved.
        identity: Option<Identity>,
        /// Refreshed cookies to attach to request and response.
        session: Option<RotatedSession>,
    },
    /// Redirect to the login surface.
    RedirectToLogin {
        /// Redirect target including `redirectTo`.
        location: String,
        /// `Set-Cookie` values expiring the session; empty when none was presented.
        clear_cookies: Vec<HeaderValue>,
        /// Why the session was not accepted.
        reason: SessionInvalid,
    },
    /// Redirect an authenticated caller away from a route its role cannot reach.
    RedirectDenied {
        /// Redirect target (role home or denied surface).
        location: String,
        /// Caller.
        identity: Identity,
        /// Refreshed cookies to attach to the redirect.
        session: RotatedSession,
        /// Denial detail.
        denial: AuthorizationDenied,
    },
    /// Internal fault; continue with the original request headers.
    FailOpen {
        /// Fault detail.
        error: GateInternalError,
    },
}

impl GateDecision {
    /// Returns the stable audit label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Proceed { .. } => "allow",
            Self::RedirectToLogin { .. } => "login_redirect",
            Self::RedirectDenied { .. } => "denied_redirect",
            Self::FailOpen { .. } => FAIL_OPEN_LABEL,
        }
    }

    /// Returns the resolved caller, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Proceed { identity, .. } => identity.as_ref(),
            Self::RedirectDenied { identity, .. } => Some(identity),
            Self::RedirectToLogin { .. } | Self::FailOpen { .. } => None,
        }
    }

    /// Returns the redirect or fault reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Proceed { .. } => None,
            Self::RedirectToLogin { reason, .. } => Some(reason.to_string()),
            Self::RedirectDenied { denial, .. } => Some(denial.to_string()),
            Self::FailOpen { error } => Some(error.to_string()),
        }
    }

    /// Returns true when the request continues to its handler.
    #[must_use]
    pub const fn continues(&self) -> bool {
        matches!(self, Self::Proceed { .. } | Self::FailOpen { .. })
    }
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Gate configuration in decoded form.
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Route access table.
    pub policy: RoutePolicy,
    /// Login surface path.
    pub login_path: String,
    /// Denied surface path.
    pub denied_path: String,
    /// Default landing path per role.
    pub role_homes: BTreeMap<Role, String>,
    /// Session cookie codec settings.
    pub cookies: CookieSettings,
    /// Upper bound on one identity provider call.
    pub identity_timeout: Duration,
}

impl GateSettings {
    /// Decodes gate settings from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the route table or role homes are invalid.
    pub fn from_config(config: &PortalConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            policy: config.gate.route_policy()?,
            login_path: config.gate.login_path.clone(),
            denied_path: config.gate.denied_path.clone(),
            role_homes: config.gate.role_homes()?,
            cookies: CookieSettings::from_config(&config.session),
            identity_timeout: config.identity.request_timeout(),
        })
    }
}

// ============================================================================
// SECTION: Access Gate
// ============================================================================

/// Per-request gate input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateRequest<'a> {
    /// Original request path, including any query string.
    pub path: &'a str,
    /// Raw `Cookie` header.
    pub cookie_header: Option<&'a str>,
    /// Caller-supplied request identifier.
    pub request_id: Option<&'a str>,
}

/// Session refresh and route authorization gate.
///
/// # Invariants
/// - Holds no mutable state; one instance serves concurrent requests.
/// - Calls the identity provider at most once per request for validation.
pub struct AccessGate {
    /// Identity collaborator.
    provider: Arc<dyn IdentityProvider>,
    /// Decoded settings.
    settings: GateSettings,
    /// Decision audit sink.
    audit: Arc<dyn GateAuditSink>,
}

impl AccessGate {
    /// Builds a gate.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        settings: GateSettings,
        audit: Arc<dyn GateAuditSink>,
    ) -> Self {
        Self {
            provider,
            settings,
            audit,
        }
    }

    /// Returns the gate settings.
    #[must_use]
    pub const fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// Runs the gate for one request and records the decision.
    ///
    /// When the session is rejected on a protected path, the collaborator's
    /// sign-out is attempted once and its outcome ignored.
    pub async fn check(&self, request: GateRequest<'_>) -> GateDecision {
        let credential = self.settings.cookies.read_credential(request.cookie_header);
        let state = match &credential {
            None => SessionState::Invalid {
                reason: SessionInvalid::Missing,
                presented: false,
            },
            Some(credential) => self.resolve_session(credential.clone(), request.cookie_header).await,
        };
        let decision = self.decide(request.path, state);

        if let (GateDecision::RedirectToLogin { .. }, Some(credential)) = (&decision, &credential) {
            self.invalidate_best_effort(credential).await;
        }

        let fingerprint =
            credential.as_ref().map(|credential| fingerprint_token(&credential.access_token));
        let event = GateAuditEvent::for_decision(
            request.path,
            request.request_id,
            fingerprint.map(|fingerprint| fingerprint.as_str().to_string()),
            &decision,
        );
        self.audit.record(&event);
        decision
    }

    /// Validates and refreshes `credential` through the identity provider.
    ///
    /// The call runs on its own task so a collaborator panic surfaces as a
    /// [`GateInternalError`] instead of tearing down the request.
    pub async fn resolve_session(
        &self,
        credential: SessionCredential,
        cookie_header: Option<&str>,
    ) -> SessionState {
        let provider = Arc::clone(&self.provider);
        let mut task =
            tokio::spawn(async move { provider.validate_and_refresh(&credential).await });
        let timeout = self.settings.identity_timeout;
        let joined = match tokio::time::timeout(timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                task.abort();
                return invalid(SessionInvalid::TimedOut(timeout));
            }
        };
        let resolved = match joined {
            Ok(Ok(resolved)) => resolved,
            Ok(Err(IdentityError::Internal(message))) => {
                return SessionState::Faulted(GateInternalError::ProviderFault(message));
            }
            Ok(Err(err)) => return invalid(SessionInvalid::Rejected(err)),
            Err(join_error) if join_error.is_panic() => {
                return SessionState::Faulted(GateInternalError::ProviderPanicked);
            }
            Err(_) => return SessionState::Faulted(GateInternalError::ProviderCancelled),
        };

        let role = match resolved.role_claim.as_deref() {
            None => return invalid(SessionInvalid::MissingRole),
            Some(claim) => match Role::parse(claim) {
                Some(role) => role,
                None => return invalid(SessionInvalid::UnknownRole(claim.to_string())),
            },
        };
        match self.settings.cookies.issue(&resolved.credential, cookie_header) {
            Ok(session) => SessionState::Active {
                identity: Identity {
                    user_id: resolved.user_id,
                    role,
                },
                session,
            },
            Err(err) => SessionState::Faulted(GateInternalError::CookieEncoding(err.to_string())),
        }
    }

    /// Decides the outcome for `path` given a resolved session state.
    #[must_use]
    pub fn decide(&self, path: &str, state: SessionState) -> GateDecision {
        let access = self.settings.policy.access_for(path);
        match state {
            SessionState::Faulted(error) => GateDecision::FailOpen {
                error,
            },
            SessionState::Invalid { .. } if !access.is_protected() => GateDecision::Proceed {
                identity: None,
                session: None,
            },
            SessionState::Invalid {
                reason,
                presented,
            } => {
                let clear_cookies = if presented {
                    match self.settings.cookies.clearing_cookies() {
                        Ok(cookies) => cookies,
                        Err(err) => {
                            return GateDecision::FailOpen {
                                error: GateInternalError::CookieEncoding(err.to_string()),
                            };
                        }
                    }
                } else {
                    Vec::new()
                };
                GateDecision::RedirectToLogin {
                    location: self.login_location(path),
                    clear_cookies,
                    reason,
                }
            }
            SessionState::Active {
                identity,
                session,
            } => match access {
                RouteAccess::Role(required) if required != identity.role => {
                    let denial = AuthorizationDenied {
                        role: identity.role,
                        required,
                        path: path.to_string(),
                    };
                    GateDecision::RedirectDenied {
                        location: self.denied_location(identity.role),
                        identity,
                        session,
                        denial,
                    }
                }
                RouteAccess::Public | RouteAccess::Authenticated | RouteAccess::Role(_) => {
                    GateDecision::Proceed {
                        identity: Some(identity),
                        session: Some(session),
                    }
                }
            },
        }
    }

    /// Builds the login redirect target for `path`.
    fn login_location(&self, path: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(REDIRECT_PARAM, path)
            .finish();
        format!("{}?{query}", self.settings.login_path)
    }

    /// Picks the redirect target for a denied `role`.
    ///
    /// The role home is used only when that role may reach it; otherwise the
    /// denied surface, which configuration guarantees is public.
    fn denied_location(&self, role: Role) -> String {
        self.settings
            .role_homes
            .get(&role)
            .filter(|home| self.settings.policy.access_for(home).admits(Some(role)))
            .map_or_else(|| self.settings.denied_path.clone(), Clone::clone)
    }

    /// Signs the session out, bounded by the identity timeout.
    async fn invalidate_best_effort(&self, credential: &SessionCredential) {
        let _ = tokio::time::timeout(
            self.settings.identity_timeout,
            self.provider.invalidate(credential),
        )
        .await;
    }
}

/// Shorthand for an invalid state with a presented credential.
fn invalid(reason: SessionInvalid) -> SessionState {
    SessionState::Invalid {
        reason,
        presented: true,
    }
}

#[cfg(test)]
mod tests;
