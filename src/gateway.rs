//! HTTP client for the TribeGate identity service.
//!
//! The identity service is the authority for credential validation, role
//! data, and per-user permission checks. This module translates its HTTP
//! responses into the SDK's typed results and errors; retry policy, if any,
//! belongs to the embedding application.

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};
use crate::types::{RoleRecord, UserRecord};

const USER_AGENT: &str = concat!("tribegate-sdk/", env!("CARGO_PKG_VERSION"));

/// Boundary to the identity service.
///
/// Implemented by [`IdentityGateway`] over HTTP and by the in-memory mock
/// behind the `mock` feature. Guards and server-side helpers depend on this
/// trait rather than the concrete client.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate a bearer credential and return the authenticated user
    async fn validate_credential(&self, token: &str) -> SdkResult<UserRecord>;

    /// Fetch the full role records for a user
    async fn get_user_roles(&self, address: &str, token: &str) -> SdkResult<Vec<RoleRecord>>;

    /// Fetch another user's record. The identity service only permits this
    /// for admin callers.
    async fn get_user_record(&self, address: &str, token: &str) -> SdkResult<UserRecord>;

    /// Ask the identity service for one (user, application, scope) decision.
    /// An absent permission is a denial, not an error.
    async fn check_permission(
        &self,
        address: &str,
        application: &str,
        scope_id: &str,
        token: &str,
    ) -> SdkResult<bool>;
}

/// Wire shape of a permission-check decision
#[derive(Debug, Deserialize)]
struct PermissionDecision {
    allowed: bool,
}

/// HTTP implementation of [`IdentityProvider`]
#[derive(Debug, Clone)]
pub struct IdentityGateway {
    /// Underlying HTTP client
    client: Client,
    /// Identity service base URL, without a trailing slash
    base_url: String,
}

impl IdentityGateway {
    /// Create a gateway with the default 30 second timeout
    pub fn new(base_url: &str) -> SdkResult<Self> {
        Self::with_timeout(base_url, 30)
    }

    /// Create a gateway with an explicit request timeout
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> SdkResult<Self> {
        if base_url.trim().is_empty() {
            return Err(SdkError::Config("identity url is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a gateway from an [`SdkConfig`]
    pub fn from_config(config: &SdkConfig) -> SdkResult<Self> {
        config.validate()?;
        Self::with_timeout(&config.identity_url, config.timeout_secs)
    }

    pub fn builder() -> IdentityGatewayBuilder {
        IdentityGatewayBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a bearer-authenticated GET and decode the successful body;
    /// non-success statuses are classified by `classify`.
    async fn get_json<T, F>(&self, path: &str, token: &str, classify: F) -> SdkResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(StatusCode) -> SdkError,
    {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("identity service returned {} for GET {}", status.as_u16(), path);
            return Err(classify(status));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IdentityProvider for IdentityGateway {
    async fn validate_credential(&self, token: &str) -> SdkResult<UserRecord> {
        self.get_json("/me", token, credential_error).await
    }

    async fn get_user_roles(&self, address: &str, token: &str) -> SdkResult<Vec<RoleRecord>> {
        let path = format!("/users/{}/roles", address);
        self.get_json(&path, token, |status| roles_error(status, address))
            .await
    }

    async fn get_user_record(&self, address: &str, token: &str) -> SdkResult<UserRecord> {
        let path = format!("/users/{}", address);
        self.get_json(&path, token, |status| user_record_error(status, address))
            .await
    }

    async fn check_permission(
        &self,
        address: &str,
        application: &str,
        scope_id: &str,
        token: &str,
    ) -> SdkResult<bool> {
        let path = format!(
            "/users/{}/permissions/{}/{}",
            address, application, scope_id
        );
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        // An absent permission record is a denial, not an error
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            warn!(
                "identity service returned {} for permission check {}",
                status.as_u16(),
                scope_id
            );
            return Err(permission_check_error(status));
        }

        let text = response.text().await?;
        let decision: PermissionDecision = serde_json::from_str(&text)?;
        Ok(decision.allowed)
    }
}

/// Status mapping for credential validation: 401 is the only typed rejection
fn credential_error(status: StatusCode) -> SdkError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SdkError::Unauthorized("credential rejected by identity service".to_string())
        }
        other => SdkError::Network(format!(
            "identity service returned status {}",
            other.as_u16()
        )),
    }
}

/// Status mapping for role lookups
fn roles_error(status: StatusCode, address: &str) -> SdkError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SdkError::Unauthorized("credential rejected by identity service".to_string())
        }
        StatusCode::NOT_FOUND => SdkError::NotFound(format!("user not found: {}", address)),
        other => SdkError::Network(format!(
            "identity service returned status {}",
            other.as_u16()
        )),
    }
}

/// Status mapping for admin-only user lookups
fn user_record_error(status: StatusCode, address: &str) -> SdkError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SdkError::Unauthorized("credential rejected by identity service".to_string())
        }
        StatusCode::FORBIDDEN => SdkError::Forbidden("admin access required".to_string()),
        StatusCode::NOT_FOUND => SdkError::NotFound(format!("user not found: {}", address)),
        other => SdkError::Network(format!(
            "identity service returned status {}",
            other.as_u16()
        )),
    }
}

/// Status mapping for permission checks; 404 never reaches this function
fn permission_check_error(status: StatusCode) -> SdkError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SdkError::Unauthorized("credential rejected by identity service".to_string())
        }
        other => SdkError::Network(format!(
            "identity service returned status {}",
            other.as_u16()
        )),
    }
}

/// Builder for configuring an [`IdentityGateway`]
pub struct IdentityGatewayBuilder {
    base_url: String,
    timeout_secs: u64,
}

impl Default for IdentityGatewayBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl IdentityGatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity service base URL
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn build(self) -> SdkResult<IdentityGateway> {
        IdentityGateway::with_timeout(&self.base_url, self.timeout_secs)
    }
}
