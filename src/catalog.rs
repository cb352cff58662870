use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One grantable capability, identified as `"<resource>:<action>"` by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionScope {
    /// Unique id within the application's catalog
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Resource the scope applies to
    pub resource: String,

    /// Action the scope grants on the resource
    pub action: String,
}

impl PermissionScope {
    /// Create a scope without a description
    pub fn new(id: &str, name: &str, resource: &str, action: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Outcome bound to a scope. There is no third state; a missing binding
/// is absence, not denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionEffect {
    Allow,
    Deny,
}

impl PermissionEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionEffect::Allow => "allow",
            PermissionEffect::Deny => "deny",
        }
    }
}

/// A bound decision: if the scope applies, the effect is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub scope: PermissionScope,
    pub effect: PermissionEffect,
}

/// An application's full permission declaration.
///
/// Built once via [`crate::catalog_builder::CatalogBuilder`] and immutable
/// afterwards, so it can be shared freely between the discovery endpoint and
/// the resolver. Field declaration order matches the published discovery
/// document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCatalog {
    /// Name of the declaring application
    pub application_name: String,

    /// Catalog version
    pub version: String,

    /// Declared scopes, in registration order
    pub permissions: Vec<PermissionScope>,

    /// Effects applied to unauthenticated or unresolved callers
    #[serde(default)]
    pub default_permissions: Vec<Permission>,

    /// Stamped when the catalog was built
    pub last_updated: DateTime<Utc>,
}

impl PermissionCatalog {
    /// Look up a scope by id. Duplicate registrations resolve to the
    /// first-registered scope.
    pub fn scope(&self, id: &str) -> Option<&PermissionScope> {
        self.permissions.iter().find(|s| s.id == id)
    }

    /// Ids of every declared scope, in registration order.
    pub fn scope_ids(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(|s| s.id.as_str())
    }

    /// Effect for an unauthenticated caller on the given scope, if one was
    /// declared. First-registered binding wins. This is a separate lookup
    /// path from per-user resolution; the two sets are never merged.
    pub fn default_effect(&self, scope_id: &str) -> Option<PermissionEffect> {
        self.default_permissions
            .iter()
            .find(|p| p.scope.id == scope_id)
            .map(|p| p.effect)
    }
}
