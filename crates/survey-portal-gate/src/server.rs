// crates/survey-portal-gate/src/server.rs
// ============================================================================
// Module: Gate Server
// Description: HTTP service exposing forward-auth and survey endpoints.
// Purpose: Run the access gate behind a reverse proxy and serve survey checks.
// Dependencies: survey-portal-core, survey-portal-config, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes:
//! - `GET /gate/check`: forward-auth sub-request. The original path comes from
//!   `X-Forwarded-Uri` (or `X-Original-URI`). Pass-through answers `200` with
//!   caller headers and refreshed cookies; redirects answer `303`.
//! - `POST /surveys/validate`, `POST /surveys/visibility`,
//!   `POST /surveys/responses/check`: survey evaluation over posted documents,
//!   behind the gate middleware.
//! - `GET /healthz`: liveness.
//!
//! Request bodies are bounded by `server.max_body_bytes`. Security posture:
//! every request body is untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use survey_portal_config::PortalConfig;
use survey_portal_config::SURVEY_RESPONSE_CHECK_PATH;
use survey_portal_config::SURVEY_VALIDATE_PATH;
use survey_portal_config::SURVEY_VISIBILITY_PATH;
use survey_portal_core::AnswerIssue;
use survey_portal_core::Answers;
use survey_portal_core::EvaluationError;
use survey_portal_core::StructureIssue;
use survey_portal_core::SurveyResponse;
use survey_portal_core::SurveyStructure;
use survey_portal_core::VisibilityEvaluator;
use survey_portal_core::check_response;
use survey_portal_core::structure_issues;
use tokio::net::TcpListener;

use crate::audit::GateAuditSink;
use crate::audit::ServerAuditEvent;
use crate::audit::sink_from_config;
use crate::gate::AccessGate;
use crate::gate::GateDecision;
use crate::gate::GateRequest;
use crate::gate::GateSettings;
use crate::identity::HostedAuthProvider;
use crate::identity::IdentityProvider;
use crate::middleware::REQUEST_ID_HEADER;
use crate::middleware::append_set_cookies;
use crate::middleware::cookie_header;
use crate::middleware::gate_layer;
use crate::middleware::header_str;
use crate::middleware::redirect_response;

/// Header naming the original URI on forward-auth sub-requests.
pub const FORWARDED_URI_HEADER: &str = "x-forwarded-uri";
/// Fallback header naming the original URI.
pub const ORIGINAL_URI_HEADER: &str = "x-original-uri";
/// Response header carrying the resolved user identifier.
pub const USER_HEADER: &str = "x-portal-user";
/// Response header carrying the decoded role.
pub const ROLE_HEADER: &str = "x-portal-role";
/// Response header carrying the rewritten `Cookie` value for the upstream request.
pub const FORWARD_COOKIE_HEADER: &str = "x-portal-cookie";

// ============================================================================
// SECTION: Gate Server
// ============================================================================

/// Access gate HTTP server.
pub struct GateServer {
    /// Validated configuration.
    config: PortalConfig,
    /// Shared gate.
    gate: Arc<AccessGate>,
    /// Audit sink shared with the gate.
    audit: Arc<dyn GateAuditSink>,
}

impl GateServer {
    /// Builds a server backed by the hosted auth provider.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or a collaborator
    /// cannot be initialized.
    pub fn from_config(config: PortalConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let identity = &config.identity;
        let api_key = identity.resolve_api_key().map_err(|err| ServerError::Config(err.to_string()))?;
        let base_url = identity.base_url().map_err(|err| ServerError::Config(err.to_string()))?;
        let provider = HostedAuthProvider::new(
            base_url.to_string(),
            api_key,
            identity.connect_timeout(),
            identity.request_timeout(),
        )
        .map_err(|err| ServerError::Init(err.to_string()))?;
        let audit = sink_from_config(&config.audit).map_err(|err| ServerError::Init(err.to_string()))?;
        Self::with_collaborators(config, Arc::new(provider), audit)
    }

    /// Builds a server with explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid.
    pub fn with_collaborators(
        config: PortalConfig,
        provider: Arc<dyn IdentityProvider>,
        audit: Arc<dyn GateAuditSink>,
    ) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let settings =
            GateSettings::from_config(&config).map_err(|err| ServerError::Config(err.to_string()))?;
        let gate = Arc::new(AccessGate::new(provider, settings, Arc::clone(&audit)));
        Ok(Self {
            config,
            gate,
            audit,
        })
    }

    /// Builds the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        let surveys = Router::new()
            .route(SURVEY_VALIDATE_PATH, post(validate_survey))
            .route(SURVEY_VISIBILITY_PATH, post(survey_visibility))
            .route(SURVEY_RESPONSE_CHECK_PATH, post(check_survey_response))
            .route_layer(from_fn_with_state(Arc::clone(&self.gate), gate_layer));
        Router::new()
            .route("/gate/check", get(gate_check))
            .route("/healthz", get(healthz))
            .merge(surveys)
            .layer(DefaultBodyLimit::max(self.config.server.max_body_bytes))
            .with_state(Arc::clone(&self.gate))
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        self.serve_on(listener).await
    }

    /// Serves on an already-bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when serving fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map_err(|_| ServerError::Transport("listener address unavailable".to_string()))?;
        let rules = self.gate.settings().policy.rules().len();
        self.audit.record_server(&ServerAuditEvent::started(local.to_string(), rules));
        axum::serve(listener, self.router())
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

// ============================================================================
// SECTION: Gate Handlers
// ============================================================================

/// Handles forward-auth sub-requests.
async fn gate_check(State(gate): State<Arc<AccessGate>>, headers: HeaderMap) -> Response {
    let path = header_str(&headers, FORWARDED_URI_HEADER)
        .or_else(|| header_str(&headers, ORIGINAL_URI_HEADER))
        .unwrap_or("/");
    let cookies = cookie_header(&headers);
    let decision = gate
        .check(GateRequest {
            path,
            cookie_header: cookies.as_deref(),
            request_id: header_str(&headers, REQUEST_ID_HEADER),
        })
        .await;

    match decision {
        GateDecision::Proceed {
            identity,
            session,
        } => {
            let mut response = StatusCode::OK.into_response();
            let response_headers = response.headers_mut();
            if let Some(identity) = identity {
                if let Ok(user) = HeaderValue::from_str(identity.user_id.as_str()) {
                    response_headers.insert(USER_HEADER, user);
                }
                response_headers.insert(ROLE_HEADER, HeaderValue::from_static(identity.role.as_str()));
            }
            if let Some(session) = session {
                response_headers.insert(FORWARD_COOKIE_HEADER, session.forward_cookie);
                append_set_cookies(response_headers, session.set_cookies);
            }
            response
        }
        GateDecision::FailOpen { .. } => StatusCode::OK.into_response(),
        GateDecision::RedirectToLogin {
            location,
            clear_cookies,
            ..
        } => redirect_response(&location, clear_cookies),
        GateDecision::RedirectDenied {
            location,
            session,
            ..
        } => redirect_response(&location, session.set_cookies),
    }
}

/// Liveness probe.
async fn healthz() -> &'static str {
    "ok"
}

// ============================================================================
// SECTION: Survey Handlers
// ============================================================================

/// Collected issues reply.
#[derive(Debug, Serialize)]
struct IssuesReply<T> {
    /// True when no issues were found.
    valid: bool,
    /// Issues in detection order.
    issues: Vec<T>,
}

impl<T> IssuesReply<T> {
    /// Wraps collected issues.
    fn new(issues: Vec<T>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }
}

/// Visibility request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VisibilityRequest {
    /// Structure to evaluate.
    structure: SurveyStructure,
    /// Current answers.
    #[serde(default)]
    answers: Answers,
}

/// Response check request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResponseCheckRequest {
    /// Structure the response was collected on.
    structure: SurveyStructure,
    /// Submitted response.
    response: SurveyResponse,
}

/// Evaluation failure reply.
#[derive(Debug, Serialize)]
struct EvaluationReply {
    /// Evaluation error.
    error: EvaluationError,
}

/// Validates a posted structure.
async fn validate_survey(Json(structure): Json<SurveyStructure>) -> Json<IssuesReply<StructureIssue>> {
    Json(IssuesReply::new(structure_issues(&structure)))
}

/// Evaluates visibility for posted answers.
async fn survey_visibility(Json(request): Json<VisibilityRequest>) -> Response {
    match VisibilityEvaluator::new(&request.structure).report(&request.answers) {
        Ok(report) => Json(report).into_response(),
        Err(error) => {
            let reply = EvaluationReply {
                error,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(reply)).into_response()
        }
    }
}

/// Checks a posted response against its structure.
async fn check_survey_response(
    Json(request): Json<ResponseCheckRequest>,
) -> Json<IssuesReply<AnswerIssue>> {
    let issues = match check_response(&request.structure, &request.response) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.0,
    };
    Json(IssuesReply::new(issues))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gate server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
