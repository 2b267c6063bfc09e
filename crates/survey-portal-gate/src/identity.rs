// crates/survey-portal-gate/src/identity.rs
// ============================================================================
// Module: Identity Collaborator
// Description: Session validation and refresh against the hosted auth backend.
// Purpose: Resolve a session credential into a user and role claim.
// Dependencies: survey-portal-core, async-trait, reqwest, serde
// ============================================================================

//! ## Overview
//! The gate never interprets tokens itself. It asks an [`IdentityProvider`]
//! to validate a credential, refreshing it when the access token has
//! expired, and receives the user identifier, the raw role claim, and the
//! credential to carry forward (rotated or not).
//!
//! [`HostedAuthProvider`] speaks the hosted backend's auth REST API:
//! `GET /auth/v1/user` validates the access token; on `401`/`403` with a
//! refresh token present, `POST /auth/v1/token?grant_type=refresh_token`
//! mints a new pair. Each request is made once; there is no retry.
//! Security posture: the provider is a trust boundary; every unexpected reply
//! is an error, never an implicit grant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde_json::Value;
use survey_portal_core::UserId;
use thiserror::Error;

use crate::session::SessionCredential;

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "apikey";

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// Result of a successful session validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    /// Authenticated user identifier.
    pub user_id: UserId,
    /// Raw role claim, undecoded.
    pub role_claim: Option<String>,
    /// Credential to carry forward; rotated when a refresh happened.
    pub credential: SessionCredential,
}

/// Identity collaborator interface.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validates `credential`, refreshing it when the access token expired.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the session cannot be resolved.
    async fn validate_and_refresh(
        &self,
        credential: &SessionCredential,
    ) -> Result<ResolvedSession, IdentityError>;

    /// Signs the session out. Callers treat this as best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the backend rejects the sign-out.
    async fn invalidate(&self, credential: &SessionCredential) -> Result<(), IdentityError>;
}

// ============================================================================
// SECTION: Hosted Auth Provider
// ============================================================================

/// Identity provider backed by the hosted auth REST API.
///
/// # Invariants
/// - Base URL is normalized without a trailing slash.
pub struct HostedAuthProvider {
    /// Backend base URL (no trailing slash).
    base_url: String,
    /// Project API key sent on every request.
    api_key: String,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl HostedAuthProvider {
    /// Builds a provider.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the HTTP client cannot be built.
    pub fn new(
        mut base_url: String,
        api_key: String,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|err| IdentityError::Internal(err.to_string()))?;
        let trimmed_len = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed_len);
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds headers for an auth API request.
    fn build_headers(&self, access_token: Option<&str>) -> Result<HeaderMap, IdentityError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| IdentityError::Internal("invalid api key".to_string()))?;
        headers.insert(API_KEY_HEADER, api_key);
        if let Some(token) = access_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| IdentityError::Malformed("invalid access token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Fetches the user behind an access token.
    async fn fetch_user(&self, access_token: &str) -> Result<UserFetch, IdentityError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(url)
            .headers(self.build_headers(Some(access_token))?)
            .send()
            .await
            .map_err(transport_error)?;
        match response.status() {
            StatusCode::OK => {
                let user: HostedUser = response
                    .json()
                    .await
                    .map_err(|err| IdentityError::Malformed(err.to_string()))?;
                Ok(UserFetch::Valid(user))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(UserFetch::Expired),
            status => Err(IdentityError::Unavailable(format!("user lookup returned status {status}"))),
        }
    }

    /// Exchanges a refresh token for a new credential.
    async fn refresh(&self, refresh_token: &str) -> Result<ResolvedSession, IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(self.build_headers(None)?)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(transport_error)?;
        match response.status() {
            StatusCode::OK => {
                let grant: TokenGrant = response
                    .json()
                    .await
                    .map_err(|err| IdentityError::Malformed(err.to_string()))?;
                let credential = SessionCredential::new(grant.access_token, Some(grant.refresh_token));
                resolved(grant.user, credential)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::Unauthenticated("refresh token rejected".to_string()))
            }
            status => Err(IdentityError::Unavailable(format!("token refresh returned status {status}"))),
        }
    }
}

#[async_trait]
impl IdentityProvider for HostedAuthProvider {
    async fn validate_and_refresh(
        &self,
        credential: &SessionCredential,
    ) -> Result<ResolvedSession, IdentityError> {
        match self.fetch_user(&credential.access_token).await? {
            UserFetch::Valid(user) => resolved(user, credential.clone()),
            UserFetch::Expired => match &credential.refresh_token {
                Some(refresh_token) => self.refresh(refresh_token).await,
                None => Err(IdentityError::Unauthenticated("access token rejected".to_string())),
            },
        }
    }

    async fn invalidate(&self, credential: &SessionCredential) -> Result<(), IdentityError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(self.build_headers(Some(&credential.access_token))?)
            .send()
            .await
            .map_err(transport_error)?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::Unauthenticated("sign-out rejected".to_string()))
            }
            status => Err(IdentityError::Unavailable(format!("sign-out returned status {status}"))),
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Outcome of a user lookup.
enum UserFetch {
    /// Access token accepted.
    Valid(HostedUser),
    /// Access token rejected; a refresh may recover.
    Expired,
}

/// User object returned by the auth API.
#[derive(Deserialize)]
struct HostedUser {
    /// User identifier.
    id: String,
    /// Operator-controlled metadata.
    #[serde(default)]
    app_metadata: Metadata,
    /// User-editable metadata.
    #[serde(default)]
    user_metadata: Metadata,
}

/// Metadata subset carrying the role claim.
#[derive(Deserialize, Default)]
struct Metadata {
    /// Role claim; non-string values are ignored.
    #[serde(default)]
    role: Option<Value>,
}

impl Metadata {
    /// Returns the role claim when it is a string.
    fn role(&self) -> Option<&str> {
        self.role.as_ref().and_then(Value::as_str)
    }
}

/// Refresh grant response.
#[derive(Deserialize)]
struct TokenGrant {
    /// New access token.
    access_token: String,
    /// New refresh token.
    refresh_token: String,
    /// User the tokens belong to.
    user: HostedUser,
}

/// Builds a resolved session, preferring the operator-controlled role claim.
fn resolved(user: HostedUser, credential: SessionCredential) -> Result<ResolvedSession, IdentityError> {
    if user.id.trim().is_empty() {
        return Err(IdentityError::Malformed("user id is empty".to_string()));
    }
    let role_claim = user.app_metadata.role().or_else(|| user.user_metadata.role()).map(str::to_string);
    Ok(ResolvedSession {
        user_id: UserId::new(user.id),
        role_claim,
        credential,
    })
}

/// Maps a reqwest failure; request construction faults are internal.
fn transport_error(err: reqwest::Error) -> IdentityError {
    if err.is_builder() {
        IdentityError::Internal(err.to_string())
    } else {
        IdentityError::Unavailable(err.to_string())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identity collaborator failures.
///
/// # Invariants
/// - Variants are stable for error classification.
/// - Only [`IdentityError::Internal`] signals a fault in the gate's own plumbing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Credential is missing, expired, or revoked.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Backend unreachable or returned an unexpected status.
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),
    /// Backend reply or credential could not be interpreted.
    #[error("malformed identity data: {0}")]
    Malformed(String),
    /// Fault inside the collaborator itself.
    #[error("identity provider internal error: {0}")]
    Internal(String),
}
