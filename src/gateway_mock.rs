use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::{SdkError, SdkResult};
use crate::gateway::IdentityProvider;
use crate::types::{RoleRecord, UserRecord};

/// In-memory [`IdentityProvider`] for tests and local development.
///
/// Users are keyed by bearer token, role lists by address, and permission
/// grants by (address, application, scope) triple. Unknown tokens behave
/// like a 401 from the real service, unknown addresses like a 404.
#[derive(Debug, Default)]
pub struct GatewayMock {
    /// token -> authenticated user
    users: HashMap<String, UserRecord>,
    /// address -> full role records
    roles: HashMap<String, Vec<RoleRecord>>,
    /// granted (address, application, scope) triples
    grants: HashSet<(String, String, String)>,
}

impl GatewayMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user reachable with the given token
    pub fn with_user(mut self, token: &str, user: UserRecord) -> Self {
        self.users.insert(token.to_string(), user);
        self
    }

    /// Register the role records for an address
    pub fn with_roles(mut self, address: &str, roles: Vec<RoleRecord>) -> Self {
        self.roles.insert(address.to_string(), roles);
        self
    }

    /// Grant one (address, application, scope) permission
    pub fn with_grant(mut self, address: &str, application: &str, scope_id: &str) -> Self {
        self.grants.insert((
            address.to_string(),
            application.to_string(),
            scope_id.to_string(),
        ));
        self
    }

    fn authenticate(&self, token: &str) -> SdkResult<&UserRecord> {
        self.users
            .get(token)
            .ok_or_else(|| SdkError::Unauthorized("credential rejected by identity service".to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GatewayMock {
    async fn validate_credential(&self, token: &str) -> SdkResult<UserRecord> {
        self.authenticate(token).cloned()
    }

    async fn get_user_roles(&self, address: &str, token: &str) -> SdkResult<Vec<RoleRecord>> {
        self.authenticate(token)?;
        self.roles
            .get(address)
            .cloned()
            .ok_or_else(|| SdkError::NotFound(format!("user not found: {}", address)))
    }

    async fn get_user_record(&self, address: &str, token: &str) -> SdkResult<UserRecord> {
        let caller = self.authenticate(token)?;
        if !caller.is_admin {
            return Err(SdkError::Forbidden("admin access required".to_string()));
        }
        self.users
            .values()
            .find(|user| user.eth_address == address)
            .cloned()
            .ok_or_else(|| SdkError::NotFound(format!("user not found: {}", address)))
    }

    async fn check_permission(
        &self,
        address: &str,
        application: &str,
        scope_id: &str,
        token: &str,
    ) -> SdkResult<bool> {
        self.authenticate(token)?;
        // An unknown triple is the 404 case: a denial, not an error
        Ok(self.grants.contains(&(
            address.to_string(),
            application.to_string(),
            scope_id.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let mock = GatewayMock::new();
        let result = mock.validate_credential("nope").await;
        assert!(matches!(result, Err(SdkError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_missing_grant_is_a_denial() {
        let mock = GatewayMock::new().with_user("token", UserRecord::new("0xabc", "Pilot"));
        let allowed = mock
            .check_permission("0xabc", "acme", "tribes:read", "token")
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_user_record_requires_admin_caller() {
        let mock = GatewayMock::new()
            .with_user("token", UserRecord::new("0xabc", "Pilot"))
            .with_user("admin-token", UserRecord::new("0xroot", "Root").with_admin(true));

        let result = mock.get_user_record("0xabc", "token").await;
        assert!(matches!(result, Err(SdkError::Forbidden(_))));

        let record = mock.get_user_record("0xabc", "admin-token").await.unwrap();
        assert_eq!(record.character_name, "Pilot");
    }
}
