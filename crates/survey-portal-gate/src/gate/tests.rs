// crates/survey-portal-gate/src/gate/tests.rs
// ============================================================================
// Module: Access Gate Tests
// Description: Unit and property tests for gate decisions.
// Purpose: Cover refresh, redirect, authorization, and fail-open branches.
// Dependencies: survey-portal-gate, proptest, tokio
// ============================================================================

//! ## Overview
//! Drives [`super::AccessGate`] with scripted identity providers and a
//! recording audit sink.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use survey_portal_config::PortalConfig;
use survey_portal_core::Role;
use survey_portal_core::UserId;
use survey_portal_core::fingerprint_token;

use super::AccessGate;
use super::GateDecision;
use super::GateInternalError;
use super::GateRequest;
use super::GateSettings;
use super::Identity;
use super::SessionInvalid;
use super::SessionState;
use crate::audit::FailOpenOnlySink;
use crate::audit::GateAuditEvent;
use crate::audit::GateAuditSink;
use crate::audit::NoopAuditSink;
use crate::identity::IdentityError;
use crate::identity::IdentityProvider;
use crate::identity::ResolvedSession;
use crate::session::SessionCredential;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Scripted provider behavior.
#[derive(Clone)]
enum Script {
    Resolve {
        role: Option<&'static str>,
        rotated: Option<SessionCredential>,
    },
    Fail(IdentityError),
    Panic,
    Hang,
}

struct ScriptedProvider {
    script: Script,
    validations: AtomicUsize,
    invalidations: AtomicUsize,
}

impl ScriptedProvider {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            validations: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        })
    }

    fn with_role(role: &'static str) -> Arc<Self> {
        Self::new(Script::Resolve {
            role: Some(role),
            rotated: None,
        })
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn validate_and_refresh(
        &self,
        credential: &SessionCredential,
    ) -> Result<ResolvedSession, IdentityError> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Resolve {
                role,
                rotated,
            } => Ok(ResolvedSession {
                user_id: UserId::new("user-1"),
                role_claim: role.map(str::to_string),
                credential: rotated.clone().unwrap_or_else(|| credential.clone()),
            }),
            Script::Fail(err) => Err(err.clone()),
            Script::Panic => panic!("scripted provider panic"),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(IdentityError::Unavailable("unreachable".to_string()))
            }
        }
    }

    async fn invalidate(&self, _credential: &SessionCredential) -> Result<(), IdentityError> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<GateAuditEvent>>,
}

impl GateAuditSink for RecordingSink {
    fn record(&self, event: &GateAuditEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

const CONFIG: &str = r#"
[identity]
base_url = "http://auth.local"
api_key = "anon-key"
"#;

fn settings() -> GateSettings {
    let config = PortalConfig::from_toml_str(CONFIG).expect("config");
    let mut settings = GateSettings::from_config(&config).expect("settings");
    settings.identity_timeout = Duration::from_millis(200);
    settings
}

fn build_gate(provider: Arc<ScriptedProvider>) -> (AccessGate, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let gate = AccessGate::new(provider, settings(), Arc::clone(&sink) as Arc<dyn GateAuditSink>);
    (gate, sink)
}

const SESSION_COOKIE: &str = "theme=dark; sb-access-token=access-1; sb-refresh-token=refresh-1";

fn request(path: &str) -> GateRequest<'_> {
    GateRequest {
        path,
        cookie_header: Some(SESSION_COOKIE),
        request_id: Some("req-1"),
    }
}

fn anonymous(path: &str) -> GateRequest<'_> {
    GateRequest {
        path,
        cookie_header: None,
        request_id: None,
    }
}

fn active(gate: &AccessGate, role: Role) -> SessionState {
    let credential = SessionCredential::new("access-1", Some("refresh-1".to_string()));
    SessionState::Active {
        identity: Identity {
            user_id: UserId::new("user-1"),
            role,
        },
        session: gate.settings().cookies.issue(&credential, None).expect("issue"),
    }
}

// ============================================================================
// SECTION: Unauthenticated Requests
// ============================================================================

#[tokio::test]
async fn missing_session_on_protected_path_redirects_to_login() {
    let provider = ScriptedProvider::with_role("admin");
    let (gate, _) = build_gate(Arc::clone(&provider));
    let decision = gate.check(anonymous("/admin/projects")).await;
    match decision {
        GateDecision::RedirectToLogin {
            location,
            clear_cookies,
            reason,
        } => {
            assert_eq!(location, "/login?redirectTo=%2Fadmin%2Fprojects");
            assert!(clear_cookies.is_empty());
            assert_eq!(reason, SessionInvalid::Missing);
        }
        other => panic!("unexpected decision: {other:?}"),
    }
    assert_eq!(provider.validations.load(Ordering::SeqCst), 0);
    assert_eq!(provider.invalidations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn public_paths_pass_without_a_session() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("admin"));
    for path in ["/", "/login", "/unauthorized", "/administrator", "/public/report"] {
        let decision = gate.check(anonymous(path)).await;
        assert_eq!(
            decision,
            GateDecision::Proceed {
                identity: None,
                session: None,
            },
            "{path}"
        );
    }
}

#[tokio::test]
async fn rejected_session_clears_cookies_and_signs_out() {
    let provider =
        ScriptedProvider::new(Script::Fail(IdentityError::Unauthenticated("expired".to_string())));
    let (gate, _) = build_gate(Arc::clone(&provider));
    let decision = gate.check(request("/dashboard")).await;
    let GateDecision::RedirectToLogin {
        clear_cookies,
        reason,
        ..
    } = decision
    else {
        panic!("expected login redirect");
    };
    assert_eq!(clear_cookies.len(), 2);
    assert!(matches!(reason, SessionInvalid::Rejected(IdentityError::Unauthenticated(_))));
    assert_eq!(provider.validations.load(Ordering::SeqCst), 1);
    assert_eq!(provider.invalidations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_session_on_public_path_passes_unchanged() {
    let provider =
        ScriptedProvider::new(Script::Fail(IdentityError::Unavailable("down".to_string())));
    let (gate, _) = build_gate(Arc::clone(&provider));
    let decision = gate.check(request("/login")).await;
    assert_eq!(
        decision,
        GateDecision::Proceed {
            identity: None,
            session: None,
        }
    );
    assert_eq!(provider.invalidations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_or_missing_role_claims_are_unauthenticated() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("owner"));
    let decision = gate.check(request("/dashboard")).await;
    assert!(matches!(
        decision,
        GateDecision::RedirectToLogin { reason: SessionInvalid::UnknownRole(ref claim), .. } if claim == "owner"
    ));

    let (gate, _) = build_gate(ScriptedProvider::new(Script::Resolve {
        role: None,
        rotated: None,
    }));
    let decision = gate.check(request("/dashboard")).await;
    assert!(matches!(
        decision,
        GateDecision::RedirectToLogin {
            reason: SessionInvalid::MissingRole,
            ..
        }
    ));
}

#[tokio::test]
async fn provider_timeout_is_a_refresh_failure() {
    let (gate, _) = build_gate(ScriptedProvider::new(Script::Hang));
    let decision = gate.check(request("/admin")).await;
    assert!(matches!(
        decision,
        GateDecision::RedirectToLogin {
            reason: SessionInvalid::TimedOut(_),
            ..
        }
    ));
}

// ============================================================================
// SECTION: Authorization
// ============================================================================

#[tokio::test]
async fn matching_role_proceeds_with_rotated_cookies() {
    let rotated = SessionCredential::new("access-2", Some("refresh-2".to_string()));
    let (gate, _) = build_gate(ScriptedProvider::new(Script::Resolve {
        role: Some("admin"),
        rotated: Some(rotated.clone()),
    }));
    let decision = gate.check(request("/admin/projects")).await;
    let GateDecision::Proceed {
        identity: Some(identity),
        session: Some(session),
    } = decision
    else {
        panic!("expected proceed");
    };
    assert_eq!(identity.role, Role::Admin);
    assert_eq!(session.credential, rotated);
    assert!(session.set_cookies[0].to_str().unwrap().starts_with("sb-access-token=access-2;"));
    assert_eq!(
        session.forward_cookie.to_str().unwrap(),
        "theme=dark; sb-access-token=access-2; sb-refresh-token=refresh-2"
    );
}

#[tokio::test]
async fn analyst_is_redirected_away_from_admin_to_own_home() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("analyst"));
    let decision = gate.check(request("/admin/projects")).await;
    let GateDecision::RedirectDenied {
        location,
        identity,
        session,
        denial,
    } = decision
    else {
        panic!("expected denied redirect");
    };
    assert_eq!(location, "/analyst");
    assert_eq!(identity.role, Role::Analyst);
    assert_eq!(denial.required, Role::Admin);
    assert_eq!(session.set_cookies.len(), 2);
}

#[tokio::test]
async fn role_without_reachable_home_goes_to_denied_surface() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("surveyor"));
    let decision = gate.check(request("/super-admin")).await;
    assert!(matches!(
        decision,
        GateDecision::RedirectDenied { ref location, .. } if location == "/unauthorized"
    ));
}

#[tokio::test]
async fn there_is_no_role_hierarchy() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("super_admin"));
    let decision = gate.check(request("/admin")).await;
    assert!(matches!(
        decision,
        GateDecision::RedirectDenied { ref location, .. } if location == "/super-admin"
    ));
}

#[tokio::test]
async fn percent_encoded_protected_paths_are_still_gated() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("analyst"));
    for path in ["/%61dmin/projects", "/admin%2Fprojects", "/login%2F..%2Fadmin"] {
        let decision = gate.check(request(path)).await;
        assert!(
            matches!(decision, GateDecision::RedirectDenied { ref location, .. } if location == "/analyst"),
            "{path}"
        );
        let decision = gate.check(anonymous(path)).await;
        assert!(matches!(decision, GateDecision::RedirectToLogin { .. }), "{path}");
    }
}

#[test]
fn authenticated_prefixes_admit_every_role() {
    let (gate, _) = build_gate(ScriptedProvider::with_role("admin"));
    for role in Role::ALL {
        let decision = gate.decide("/dashboard/overview", active(&gate, role));
        assert!(matches!(decision, GateDecision::Proceed { identity: Some(_), .. }), "{role}");
    }
}

// ============================================================================
// SECTION: Fail-Open
// ============================================================================

#[tokio::test]
async fn provider_panic_fails_open_and_is_audited() {
    let (gate, sink) = build_gate(ScriptedProvider::new(Script::Panic));
    let decision = gate.check(request("/admin")).await;
    assert_eq!(
        decision,
        GateDecision::FailOpen {
            error: GateInternalError::ProviderPanicked,
        }
    );
    assert!(decision.continues());
    let events = sink.events.lock().expect("events lock");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].decision, "fail_open");
    assert_eq!(events[0].reason.as_deref(), Some("identity provider panicked"));
}

#[tokio::test]
async fn provider_internal_fault_fails_open() {
    let (gate, _) =
        build_gate(ScriptedProvider::new(Script::Fail(IdentityError::Internal("bug".to_string()))));
    let decision = gate.check(request("/admin")).await;
    assert!(matches!(
        decision,
        GateDecision::FailOpen {
            error: GateInternalError::ProviderFault(_),
        }
    ));
}

#[tokio::test]
async fn unencodable_rotated_credential_fails_open() {
    let (gate, _) = build_gate(ScriptedProvider::new(Script::Resolve {
        role: Some("admin"),
        rotated: Some(SessionCredential::new("bad token", None)),
    }));
    let decision = gate.check(request("/admin")).await;
    assert!(matches!(
        decision,
        GateDecision::FailOpen {
            error: GateInternalError::CookieEncoding(_),
        }
    ));
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[tokio::test]
async fn audit_records_fingerprint_not_token() {
    let (gate, sink) = build_gate(ScriptedProvider::with_role("analyst"));
    let _ = gate.check(request("/analyst/reports")).await;
    let events = sink.events.lock().expect("events lock");
    let event = &events[0];
    assert_eq!(event.decision, "allow");
    assert_eq!(event.user_id.as_deref(), Some("user-1"));
    assert_eq!(event.role, Some("analyst"));
    assert_eq!(event.request_id.as_deref(), Some("req-1"));
    let expected = fingerprint_token("access-1");
    assert_eq!(event.token_fingerprint.as_deref(), Some(expected.as_str()));
    let payload = serde_json::to_string(event).unwrap();
    assert!(!payload.contains("access-1"));
    assert!(payload.contains("\"event\":\"gate_decision\""));
}

#[tokio::test]
async fn discarding_sink_still_keeps_fail_open_decisions() {
    let recorded = Arc::new(RecordingSink::default());
    let sink = Arc::new(FailOpenOnlySink::new(Arc::clone(&recorded) as Arc<dyn GateAuditSink>));

    let allowing = AccessGate::new(
        ScriptedProvider::with_role("admin"),
        settings(),
        Arc::clone(&sink) as Arc<dyn GateAuditSink>,
    );
    let _ = allowing.check(request("/admin")).await;
    let _ = allowing.check(anonymous("/admin")).await;
    assert!(recorded.events.lock().expect("events lock").is_empty());

    let panicking = AccessGate::new(
        ScriptedProvider::new(Script::Panic),
        settings(),
        Arc::clone(&sink) as Arc<dyn GateAuditSink>,
    );
    let decision = panicking.check(request("/admin")).await;
    assert!(decision.continues());
    let events = recorded.events.lock().expect("events lock");
    assert_eq!(events.len(), 1);
    assert!(events[0].is_fail_open());
    assert_eq!(events[0].path, "/admin");
}

// ============================================================================
// SECTION: Properties
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn suffix_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9-]{1,8}", 0..4).prop_map(|segments| {
        segments.iter().map(|segment| format!("/{segment}")).collect::<String>()
    })
}

proptest! {
    #[test]
    fn wrong_role_on_role_prefix_is_always_redirected(
        role in role_strategy(),
        (required, prefix) in prop::sample::select(vec![
            (Role::SuperAdmin, "/super-admin"),
            (Role::Admin, "/admin"),
            (Role::Analyst, "/analyst"),
        ]),
        suffix in suffix_strategy(),
    ) {
        prop_assume!(role != required);
        let gate = AccessGate::new(
            ScriptedProvider::with_role("admin"),
            settings(),
            Arc::new(NoopAuditSink),
        );
        let path = format!("{prefix}{suffix}");
        let decision = gate.decide(&path, active(&gate, role));
        let is_denied = matches!(decision, GateDecision::RedirectDenied { .. });
        prop_assert!(is_denied);
    }

    #[test]
    fn public_paths_never_blocked_by_invalid_sessions(
        segment in "[a-z]{1,10}",
        suffix in suffix_strategy(),
        presented in any::<bool>(),
    ) {
        prop_assume!(!["super-admin", "admin", "analyst", "dashboard", "surveys"].contains(&segment.as_str()));
        let gate = AccessGate::new(
            ScriptedProvider::with_role("admin"),
            settings(),
            Arc::new(NoopAuditSink),
        );
        let path = format!("/{segment}{suffix}");
        let state = SessionState::Invalid {
            reason: SessionInvalid::Rejected(IdentityError::Unauthenticated("expired".to_string())),
            presented,
        };
        prop_assert_eq!(
            gate.decide(&path, state),
            GateDecision::Proceed { identity: None, session: None }
        );
    }
}
