// crates/survey-portal-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for `survey-portal.toml`. The example must always pass
//! validation; a unit test enforces this.

/// Returns a canonical example `survey-portal.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 1048576

[identity]
base_url = "https://project-ref.supabase.co"
api_key_env = "SURVEY_PORTAL_ANON_KEY"
connect_timeout_ms = 500
request_timeout_ms = 3000

[session]
access_cookie = "sb-access-token"
refresh_cookie = "sb-refresh-token"
secure = true
same_site = "lax"
max_age_secs = 604800

[gate]
login_path = "/login"
denied_path = "/unauthorized"

[gate.role_homes]
super_admin = "/super-admin"
admin = "/admin"
analyst = "/analyst"

[[gate.routes]]
prefix = "/super-admin"
access = "super_admin"

[[gate.routes]]
prefix = "/admin"
access = "admin"

[[gate.routes]]
prefix = "/analyst"
access = "analyst"

[[gate.routes]]
prefix = "/dashboard"
access = "authenticated"

[[gate.routes]]
prefix = "/surveys"
access = "authenticated"

[audit]
sink = "stderr"
# sink = "file"
# path = "/var/log/survey-portal/audit.jsonl"
"#,
    )
}
