// crates/survey-portal-config/src/config.rs
// ============================================================================
// Module: Survey Portal Configuration
// Description: Configuration loading and validation for the access gate service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: survey-portal-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. Every section except
//! `[identity]` has defaults matching the hosted backend's conventions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use survey_portal_core::Role;
use survey_portal_core::RouteAccess;
use survey_portal_core::RoutePolicy;
use survey_portal_core::RouteRule;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "survey-portal.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SURVEY_PORTAL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP bind address.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Maximum allowed request body size in bytes.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default identity connect timeout in milliseconds.
pub(crate) const DEFAULT_IDENTITY_CONNECT_TIMEOUT_MS: u64 = 500;
/// Default identity request timeout in milliseconds.
pub(crate) const DEFAULT_IDENTITY_REQUEST_TIMEOUT_MS: u64 = 3_000;
/// Minimum identity connect timeout in milliseconds.
pub(crate) const MIN_IDENTITY_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum identity connect timeout in milliseconds.
pub(crate) const MAX_IDENTITY_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum identity request timeout in milliseconds.
pub(crate) const MIN_IDENTITY_REQUEST_TIMEOUT_MS: u64 = 500;
/// Maximum identity request timeout in milliseconds.
pub(crate) const MAX_IDENTITY_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default access token cookie name.
pub(crate) const DEFAULT_ACCESS_COOKIE: &str = "sb-access-token";
/// Default refresh token cookie name.
pub(crate) const DEFAULT_REFRESH_COOKIE: &str = "sb-refresh-token";
/// Default session cookie lifetime (seven days).
pub(crate) const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;
/// Maximum session cookie lifetime browsers honor (400 days).
pub(crate) const MAX_SESSION_MAX_AGE_SECS: u64 = 400 * 24 * 60 * 60;
/// Maximum cookie name length.
pub(crate) const MAX_COOKIE_NAME_LENGTH: usize = 128;
/// Maximum number of route rules.
pub(crate) const MAX_ROUTE_RULES: usize = 256;
/// Structure validation endpoint.
pub const SURVEY_VALIDATE_PATH: &str = "/surveys/validate";
/// Visibility evaluation endpoint.
pub const SURVEY_VISIBILITY_PATH: &str = "/surveys/visibility";
/// Response check endpoint.
pub const SURVEY_RESPONSE_CHECK_PATH: &str = "/surveys/responses/check";
/// Survey endpoints the route table must protect.
pub const SURVEY_API_PATHS: [&str; 3] =
    [SURVEY_VALIDATE_PATH, SURVEY_VISIBILITY_PATH, SURVEY_RESPONSE_CHECK_PATH];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Survey portal gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity backend configuration.
    pub identity: IdentityConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Access gate configuration.
    #[serde(default)]
    pub gate: GateConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl PortalConfig {
    /// Loads configuration using CLI path or `SURVEY_PORTAL_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.identity.validate()?;
        self.session.validate()?;
        self.gate.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address is malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind is not a valid socket address".to_string()))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_MAX_BODY_BYTES}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Hosted identity backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Base URL of the hosted backend (auth API lives under `/auth/v1`).
    pub base_url: String,
    /// Public API key sent as the `apikey` header.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_identity_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds; also bounds the whole gate refresh.
    #[serde(default = "default_identity_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl IdentityConfig {
    /// Returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is malformed or not http(s).
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("identity.base_url is invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "identity.base_url must use http or https".to_string(),
            ));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "identity.base_url must not carry a query or fragment".to_string(),
            ));
        }
        Ok(url)
    }

    /// Resolves the API key from inline config or the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the key is missing or empty.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(key.trim().to_string());
        }
        let Some(var) = &self.api_key_env else {
            return Err(ConfigError::Invalid(
                "identity.api_key or identity.api_key_env is required".to_string(),
            ));
        };
        let key = env::var(var)
            .map_err(|_| ConfigError::Invalid(format!("environment variable {var} is not set")))?;
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("environment variable {var} is empty")));
        }
        Ok(key.trim().to_string())
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates identity configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        match (&self.api_key, &self.api_key_env) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "identity.api_key and identity.api_key_env are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "identity.api_key or identity.api_key_env is required".to_string(),
                ));
            }
            (Some(key), None) if key.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "identity.api_key must be non-empty".to_string(),
                ));
            }
            (None, Some(var)) if var.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "identity.api_key_env must be non-empty".to_string(),
                ));
            }
            _ => {}
        }
        validate_timeout_range(
            "identity.connect_timeout_ms",
            self.connect_timeout_ms,
            MIN_IDENTITY_CONNECT_TIMEOUT_MS,
            MAX_IDENTITY_CONNECT_TIMEOUT_MS,
        )?;
        validate_timeout_range(
            "identity.request_timeout_ms",
            self.request_timeout_ms,
            MIN_IDENTITY_REQUEST_TIMEOUT_MS,
            MAX_IDENTITY_REQUEST_TIMEOUT_MS,
        )?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// `SameSite` attribute for session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    /// Sent on same-site requests only.
    Strict,
    /// Sent on same-site requests and top-level navigations.
    #[default]
    Lax,
    /// Sent on all requests; requires `secure`.
    None,
}

impl SameSite {
    /// Returns the cookie attribute spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Cookie carrying the access token.
    #[serde(default = "default_access_cookie")]
    pub access_cookie: String,
    /// Cookie carrying the refresh token.
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,
    /// Emit the `Secure` attribute.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// `SameSite` attribute.
    #[serde(default)]
    pub same_site: SameSite,
    /// Cookie lifetime in seconds.
    #[serde(default = "default_session_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_cookie: default_access_cookie(),
            refresh_cookie: default_refresh_cookie(),
            secure: true,
            same_site: SameSite::default(),
            max_age_secs: default_session_max_age_secs(),
        }
    }
}

impl SessionConfig {
    /// Validates session configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_cookie_name("session.access_cookie", &self.access_cookie)?;
        validate_cookie_name("session.refresh_cookie", &self.refresh_cookie)?;
        if self.access_cookie == self.refresh_cookie {
            return Err(ConfigError::Invalid(
                "session.access_cookie and session.refresh_cookie must differ".to_string(),
            ));
        }
        if self.same_site == SameSite::None && !self.secure {
            return Err(ConfigError::Invalid(
                "session.same_site=none requires session.secure=true".to_string(),
            ));
        }
        if self.max_age_secs == 0 || self.max_age_secs > MAX_SESSION_MAX_AGE_SECS {
            return Err(ConfigError::Invalid(format!(
                "session.max_age_secs must be between 1 and {MAX_SESSION_MAX_AGE_SECS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Route rule as written in `[[gate.routes]]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRuleConfig {
    /// Absolute path prefix.
    pub prefix: String,
    /// `public`, `authenticated`, or a role name.
    pub access: RouteAccess,
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Login surface; unauthenticated users are redirected here.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Fallback surface for authorization denials.
    #[serde(default = "default_denied_path")]
    pub denied_path: String,
    /// Landing page per role claim, keyed by role name.
    #[serde(default = "default_role_homes")]
    pub role_homes: BTreeMap<String, String>,
    /// Route table.
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteRuleConfig>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            denied_path: default_denied_path(),
            role_homes: default_role_homes(),
            routes: default_routes(),
        }
    }
}

impl GateConfig {
    /// Builds the route policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the route table is invalid.
    pub fn route_policy(&self) -> Result<RoutePolicy, ConfigError> {
        if self.routes.len() > MAX_ROUTE_RULES {
            return Err(ConfigError::Invalid(format!(
                "gate.routes exceeds {MAX_ROUTE_RULES} entries"
            )));
        }
        let rules = self
            .routes
            .iter()
            .map(|rule| RouteRule::new(rule.prefix.clone(), rule.access))
            .collect();
        RoutePolicy::new(rules).map_err(|err| ConfigError::Invalid(format!("gate.routes: {err}")))
    }

    /// Returns the decoded role homes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a key is not a role name.
    pub fn role_homes(&self) -> Result<BTreeMap<Role, String>, ConfigError> {
        let mut homes = BTreeMap::new();
        for (key, path) in &self.role_homes {
            let role = Role::parse(key).ok_or_else(|| {
                ConfigError::Invalid(format!("gate.role_homes key {key} is not a role"))
            })?;
            homes.insert(role, path.clone());
        }
        Ok(homes)
    }

    /// Validates gate configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_surface_path("gate.login_path", &self.login_path)?;
        validate_surface_path("gate.denied_path", &self.denied_path)?;
        let policy = self.route_policy()?;
        for (field, path) in [("gate.login_path", &self.login_path), ("gate.denied_path", &self.denied_path)] {
            if policy.access_for(path).is_protected() {
                return Err(ConfigError::Invalid(format!(
                    "{field} must resolve to public access"
                )));
            }
        }
        for path in SURVEY_API_PATHS {
            if !policy.access_for(path).is_protected() {
                return Err(ConfigError::Invalid(format!(
                    "gate.routes must require a session for {path}"
                )));
            }
        }
        for (role, path) in self.role_homes()? {
            validate_surface_path(&format!("gate.role_homes.{role}"), &path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events except fail-open decisions, which go to stderr.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines) for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path only allowed when sink=file".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a filesystem path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a site-relative URL path used as a redirect target.
fn validate_surface_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') || value.starts_with("//") {
        return Err(ConfigError::Invalid(format!("{field} must be an absolute site path")));
    }
    if value.contains(['?', '#']) || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain a query, fragment, or whitespace"
        )));
    }
    Ok(())
}

/// Validates a cookie name as an RFC 6265 token.
fn validate_cookie_name(field: &str, value: &str) -> Result<(), ConfigError> {
    const SEPARATORS: &str = "()<>@,;:\\\"/[]?={} \t";
    if value.is_empty() || value.len() > MAX_COOKIE_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} must be 1 to {MAX_COOKIE_NAME_LENGTH} characters"
        )));
    }
    if value.chars().any(|c| !c.is_ascii() || c.is_ascii_control() || SEPARATORS.contains(c)) {
        return Err(ConfigError::Invalid(format!("{field} is not a valid cookie name")));
    }
    Ok(())
}

/// Validates a timeout value against bounds.
fn validate_timeout_range(
    field: &str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {min_ms} and {max_ms} milliseconds",
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size.
pub(crate) const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default identity connect timeout.
pub(crate) const fn default_identity_connect_timeout_ms() -> u64 {
    DEFAULT_IDENTITY_CONNECT_TIMEOUT_MS
}

/// Default identity request timeout.
pub(crate) const fn default_identity_request_timeout_ms() -> u64 {
    DEFAULT_IDENTITY_REQUEST_TIMEOUT_MS
}

/// Default access cookie name.
fn default_access_cookie() -> String {
    DEFAULT_ACCESS_COOKIE.to_string()
}

/// Default refresh cookie name.
fn default_refresh_cookie() -> String {
    DEFAULT_REFRESH_COOKIE.to_string()
}

/// Serde helper for boolean fields defaulting to true.
const fn default_true() -> bool {
    true
}

/// Default session cookie lifetime.
pub(crate) const fn default_session_max_age_secs() -> u64 {
    DEFAULT_SESSION_MAX_AGE_SECS
}

/// Default login surface.
fn default_login_path() -> String {
    "/login".to_string()
}

/// Default denied surface.
fn default_denied_path() -> String {
    "/unauthorized".to_string()
}

/// Default landing pages per role.
fn default_role_homes() -> BTreeMap<String, String> {
    [
        (Role::SuperAdmin, "/super-admin"),
        (Role::Admin, "/admin"),
        (Role::Analyst, "/analyst"),
    ]
    .into_iter()
    .map(|(role, path)| (role.as_str().to_string(), path.to_string()))
    .collect()
}

/// Default route table for the admin, analyst, and super-admin portals.
fn default_routes() -> Vec<RouteRuleConfig> {
    [
        ("/super-admin", RouteAccess::Role(Role::SuperAdmin)),
        ("/admin", RouteAccess::Role(Role::Admin)),
        ("/analyst", RouteAccess::Role(Role::Analyst)),
        ("/dashboard", RouteAccess::Authenticated),
        ("/surveys", RouteAccess::Authenticated),
    ]
    .into_iter()
    .map(|(prefix, access)| RouteRuleConfig {
        prefix: prefix.to_string(),
        access,
    })
    .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
