// crates/survey-portal-gate/src/session.rs
// ============================================================================
// Module: Session Cookies
// Description: Session credential cookie codec for the access gate.
// Purpose: Read credentials from requests and emit rotated or cleared cookies.
// Dependencies: axum, survey-portal-config, thiserror
// ============================================================================

//! ## Overview
//! A session credential travels in two cookies: the access token and an
//! optional refresh token. The gate reads them from the `Cookie` header,
//! hands them to the identity collaborator, and writes the (possibly
//! rotated) pair back twice: into the forwarded request's `Cookie` header so
//! downstream handlers observe the fresh tokens, and into `Set-Cookie`
//! headers on the response so the browser stores them.
//!
//! Token values are written verbatim and must be RFC 6265 cookie octets. A
//! rotated token that cannot be written is a [`CookieError`], which the gate
//! treats as an internal fault.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use axum::http::HeaderValue;
use survey_portal_config::SameSite;
use survey_portal_config::SessionConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Credential
// ============================================================================

/// Opaque session credential.
///
/// # Invariants
/// - `access_token` is never empty when read from a request.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    /// Short-lived access token.
    pub access_token: String,
    /// Refresh token used to mint a new access token.
    pub refresh_token: Option<String>,
}

impl SessionCredential {
    /// Creates a credential.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Cookie encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    /// Token contains bytes outside the cookie-octet set.
    #[error("cookie {0} value is not a valid cookie octet string")]
    InvalidValue(String),
    /// Assembled header is not a valid header value.
    #[error("cookie header for {0} could not be encoded")]
    InvalidHeader(String),
}

/// Cookies written for a refreshed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedSession {
    /// Credential the cookies encode.
    pub credential: SessionCredential,
    /// `Set-Cookie` values for the response.
    pub set_cookies: Vec<HeaderValue>,
    /// `Cookie` value for the forwarded request.
    pub forward_cookie: HeaderValue,
}

// ============================================================================
// SECTION: Cookie Settings
// ============================================================================

/// Session cookie names and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Access token cookie name.
    pub access_name: String,
    /// Refresh token cookie name.
    pub refresh_name: String,
    /// Emit `Secure`.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Max-Age` for issued cookies.
    pub max_age_secs: u64,
}

impl CookieSettings {
    /// Builds settings from the session configuration.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            access_name: config.access_cookie.clone(),
            refresh_name: config.refresh_cookie.clone(),
            secure: config.secure,
            same_site: config.same_site,
            max_age_secs: config.max_age_secs,
        }
    }

    /// Reads the session credential from a `Cookie` header.
    ///
    /// Returns `None` when the access cookie is absent or empty.
    #[must_use]
    pub fn read_credential(&self, cookie_header: Option<&str>) -> Option<SessionCredential> {
        let pairs = parse_cookie_pairs(cookie_header?);
        let lookup = |name: &str| {
            pairs
                .iter()
                .find(|(key, value)| *key == name && !value.is_empty())
                .map(|(_, value)| (*value).to_string())
        };
        let access_token = lookup(&self.access_name)?;
        Some(SessionCredential {
            access_token,
            refresh_token: lookup(&self.refresh_name),
        })
    }

    /// Encodes a refreshed credential for the response and forwarded request.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError`] when a token cannot be written as a cookie.
    pub fn issue(
        &self,
        credential: &SessionCredential,
        original_cookie: Option<&str>,
    ) -> Result<RotatedSession, CookieError> {
        let mut set_cookies = Vec::with_capacity(2);
        set_cookies.push(self.set_cookie(&self.access_name, &credential.access_token)?);
        if let Some(refresh_token) = &credential.refresh_token {
            set_cookies.push(self.set_cookie(&self.refresh_name, refresh_token)?);
        }
        let forward = rewrite_cookie_header(original_cookie, self, credential)?;
        let forward_cookie = HeaderValue::from_str(&forward)
            .map_err(|_| CookieError::InvalidHeader("Cookie".to_string()))?;
        Ok(RotatedSession {
            credential: credential.clone(),
            set_cookies,
            forward_cookie,
        })
    }

    /// Returns `Set-Cookie` values that expire both session cookies.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError`] when a cookie name cannot be written.
    pub fn clearing_cookies(&self) -> Result<Vec<HeaderValue>, CookieError> {
        [&self.access_name, &self.refresh_name]
            .into_iter()
            .map(|name| {
                let header = format!("{name}=; {}", self.attributes(0));
                HeaderValue::from_str(&header).map_err(|_| CookieError::InvalidHeader(name.clone()))
            })
            .collect()
    }

    /// Builds one `Set-Cookie` value.
    fn set_cookie(&self, name: &str, value: &str) -> Result<HeaderValue, CookieError> {
        if !is_cookie_value(value) {
            return Err(CookieError::InvalidValue(name.to_string()));
        }
        let header = format!("{name}={value}; {}", self.attributes(self.max_age_secs));
        HeaderValue::from_str(&header).map_err(|_| CookieError::InvalidHeader(name.to_string()))
    }

    /// Renders the shared cookie attributes.
    fn attributes(&self, max_age_secs: u64) -> String {
        let mut attributes =
            format!("Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite={}", self.same_site.as_str());
        if self.secure {
            attributes.push_str("; Secure");
        }
        attributes
    }
}

// ============================================================================
// SECTION: Cookie Header Helpers
// ============================================================================

/// Rewrites a `Cookie` header so it carries `credential`.
///
/// Unrelated cookies keep their order; the session cookies are replaced in
/// place or appended when absent. A credential without a refresh token
/// leaves any existing refresh cookie untouched.
///
/// # Errors
///
/// Returns [`CookieError`] when a token is not a valid cookie value.
pub fn rewrite_cookie_header(
    original: Option<&str>,
    settings: &CookieSettings,
    credential: &SessionCredential,
) -> Result<String, CookieError> {
    if !is_cookie_value(&credential.access_token) {
        return Err(CookieError::InvalidValue(settings.access_name.clone()));
    }
    let refresh = credential.refresh_token.as_deref();
    if let Some(token) = refresh
        && !is_cookie_value(token)
    {
        return Err(CookieError::InvalidValue(settings.refresh_name.clone()));
    }

    let mut pairs: Vec<(String, String)> = original
        .map(parse_cookie_pairs)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    upsert(&mut pairs, &settings.access_name, &credential.access_token);
    if let Some(token) = refresh {
        upsert(&mut pairs, &settings.refresh_name, token);
    }
    Ok(pairs.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("; "))
}

/// Replaces every pair named `name`, appending when none exists.
fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    let mut found = false;
    pairs.retain_mut(|(key, existing)| {
        if key != name {
            return true;
        }
        if found {
            return false;
        }
        found = true;
        value.clone_into(existing);
        true
    });
    if !found {
        pairs.push((name.to_string(), value.to_string()));
    }
}

/// Splits a `Cookie` header into name/value pairs.
fn parse_cookie_pairs(header: &str) -> Vec<(&str, &str)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(value);
            Some((name, value))
        })
        .collect()
}

/// Returns true when `value` is a non-empty RFC 6265 cookie-octet string.
fn is_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|byte| {
            matches!(byte, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
        })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
