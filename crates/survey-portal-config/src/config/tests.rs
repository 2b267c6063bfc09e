// crates/survey-portal-config/src/config/tests.rs
// ============================================================================
// Module: Config Unit Tests
// Description: Unit tests for section validation and defaults.
// Purpose: Ensure every fail-closed rule rejects what it should.
// Dependencies: survey-portal-config
// ============================================================================

//! ## Overview
//! Exercises section validators directly and through TOML parsing.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use survey_portal_core::Role;
use survey_portal_core::RouteAccess;

use super::AuditSinkKind;
use super::ConfigError;
use super::MAX_IDENTITY_CONNECT_TIMEOUT_MS;
use super::MIN_IDENTITY_CONNECT_TIMEOUT_MS;
use super::PortalConfig;
use super::SURVEY_API_PATHS;
use super::SameSite;
use super::validate_cookie_name;
use super::validate_surface_path;
use super::validate_timeout_range;
use crate::config_toml_example;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const MINIMAL: &str = r#"
[identity]
base_url = "https://auth.example.com"
api_key = "anon"
"#;

fn parse(extra: &str) -> Result<PortalConfig, ConfigError> {
    PortalConfig::from_toml_str(&format!("{MINIMAL}\n{extra}"))
}

fn assert_invalid(result: Result<PortalConfig, ConfigError>, needle: &str) {
    match result {
        Err(ConfigError::Invalid(message)) => {
            assert!(message.contains(needle), "error {message} did not contain {needle}");
        }
        Err(other) => panic!("expected invalid config, got {other}"),
        Ok(_) => panic!("expected invalid config for {needle}"),
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn minimal_config_uses_backend_defaults() {
    let config = parse("").unwrap();
    assert_eq!(config.session.access_cookie, "sb-access-token");
    assert_eq!(config.session.refresh_cookie, "sb-refresh-token");
    assert_eq!(config.session.same_site, SameSite::Lax);
    assert!(config.session.secure);
    assert_eq!(config.gate.login_path, "/login");
    assert_eq!(config.audit.sink, AuditSinkKind::Stderr);
    let policy = config.gate.route_policy().unwrap();
    assert_eq!(policy.access_for("/admin/projects"), RouteAccess::Role(Role::Admin));
    assert_eq!(policy.access_for("/login"), RouteAccess::Public);
    let homes = config.gate.role_homes().unwrap();
    assert_eq!(homes.get(&Role::Analyst).map(String::as_str), Some("/analyst"));
    assert!(!homes.contains_key(&Role::Surveyor));
}

#[test]
fn example_config_validates() {
    let config = PortalConfig::from_toml_str(&config_toml_example()).unwrap();
    assert_eq!(config.gate.routes.len(), 5);
    assert_eq!(config.identity.api_key_env.as_deref(), Some("SURVEY_PORTAL_ANON_KEY"));
}

// ============================================================================
// SECTION: Section Validation
// ============================================================================

#[test]
fn unknown_fields_are_rejected() {
    match parse("[server]\nport = 80\n") {
        Err(ConfigError::Parse(_)) => {}
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn bind_and_body_limit_are_checked() {
    assert_invalid(parse("[server]\nbind = \"localhost\"\n"), "server.bind");
    assert_invalid(parse("[server]\nmax_body_bytes = 0\n"), "server.max_body_bytes");
}

#[test]
fn identity_requires_one_key_source_and_http_url() {
    let both = r#"
[identity]
base_url = "https://auth.example.com"
api_key = "anon"
api_key_env = "KEY"
"#;
    assert_invalid(PortalConfig::from_toml_str(both), "mutually exclusive");
    let neither = "[identity]\nbase_url = \"https://auth.example.com\"\n";
    assert_invalid(PortalConfig::from_toml_str(neither), "is required");
    let ftp = "[identity]\nbase_url = \"ftp://auth.example.com\"\napi_key = \"k\"\n";
    assert_invalid(PortalConfig::from_toml_str(ftp), "http or https");
}

#[test]
fn cookie_names_must_be_tokens_and_distinct() {
    assert!(validate_cookie_name("f", "sb-access-token").is_ok());
    assert!(validate_cookie_name("f", "bad name").is_err());
    assert!(validate_cookie_name("f", "semi;colon").is_err());
    assert_invalid(
        parse("[session]\naccess_cookie = \"same\"\nrefresh_cookie = \"same\"\n"),
        "must differ",
    );
}

#[test]
fn same_site_none_requires_secure() {
    assert_invalid(parse("[session]\nsame_site = \"none\"\nsecure = false\n"), "same_site=none");
}

#[test]
fn login_surface_must_stay_public() {
    let config = r#"
[gate]
login_path = "/dashboard/login"
"#;
    assert_invalid(parse(config), "gate.login_path must resolve to public access");
}

#[test]
fn route_prefixes_are_unique_and_normalized() {
    let duplicate = r#"
[[gate.routes]]
prefix = "/admin"
access = "admin"

[[gate.routes]]
prefix = "/admin"
access = "analyst"
"#;
    assert_invalid(parse(duplicate), "more than once");
    let trailing = "[[gate.routes]]\nprefix = \"/admin/\"\naccess = \"admin\"\n";
    assert_invalid(parse(trailing), "normalized");
}

#[test]
fn custom_route_tables_must_keep_survey_endpoints_protected() {
    let without_surveys = r#"
[[gate.routes]]
prefix = "/admin"
access = "admin"
"#;
    assert_invalid(
        parse(without_surveys),
        "gate.routes must require a session for /surveys/validate",
    );

    let public_override = r#"
[[gate.routes]]
prefix = "/surveys"
access = "authenticated"

[[gate.routes]]
prefix = "/surveys/responses"
access = "public"
"#;
    assert_invalid(parse(public_override), "/surveys/responses/check");

    let site_wide = r#"
[[gate.routes]]
prefix = "/"
access = "authenticated"

[[gate.routes]]
prefix = "/login"
access = "public"

[[gate.routes]]
prefix = "/unauthorized"
access = "public"
"#;
    let config = parse(site_wide).expect("site-wide session requirement covers surveys");
    let policy = config.gate.route_policy().expect("policy");
    for path in SURVEY_API_PATHS {
        assert!(policy.access_for(path).is_protected(), "{path}");
    }
}

#[test]
fn unknown_route_access_is_a_parse_error() {
    let config = "[[gate.routes]]\nprefix = \"/owners\"\naccess = \"owner\"\n";
    assert!(matches!(parse(config), Err(ConfigError::Parse(_))));
}

#[test]
fn role_home_keys_must_be_roles() {
    assert_invalid(parse("[gate.role_homes]\nowner = \"/owner\"\n"), "is not a role");
}

#[test]
fn surface_paths_must_be_site_relative() {
    assert!(validate_surface_path("f", "/login").is_ok());
    assert!(validate_surface_path("f", "https://evil.example").is_err());
    assert!(validate_surface_path("f", "//evil.example").is_err());
    assert!(validate_surface_path("f", "/login?x=1").is_err());
}

#[test]
fn audit_file_sink_requires_path() {
    assert_invalid(parse("[audit]\nsink = \"file\"\n"), "requires audit.path");
    assert_invalid(parse("[audit]\nsink = \"none\"\npath = \"a.jsonl\"\n"), "only allowed");
    assert!(parse("[audit]\nsink = \"file\"\npath = \"audit.jsonl\"\n").is_ok());
}

#[test]
fn timeout_range_is_inclusive() {
    let field = "identity.connect_timeout_ms";
    let (min, max) = (MIN_IDENTITY_CONNECT_TIMEOUT_MS, MAX_IDENTITY_CONNECT_TIMEOUT_MS);
    assert!(validate_timeout_range(field, min, min, max).is_ok());
    assert!(validate_timeout_range(field, max, min, max).is_ok());
    let err = validate_timeout_range(field, max + 1, min, max).unwrap_err();
    assert!(err.to_string().contains(field));
}
