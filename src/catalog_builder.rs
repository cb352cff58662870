use chrono::{DateTime, Utc};

use crate::catalog::{Permission, PermissionCatalog, PermissionEffect, PermissionScope};
use crate::error::{SdkError, SdkResult};

/// Builder for creating a validated, immutable [`PermissionCatalog`].
///
/// CatalogBuilder provides a fluent API for declaring an application's
/// permission surface:
/// - Scope registration, preserving insertion order
/// - Default effects for unauthenticated callers
/// - Validation deferred to `build()`
///
/// The builder is consumed by `build()`; the resulting catalog cannot be
/// mutated afterwards.
///
/// # Examples
///
/// ```
/// use tribegate_sdk::catalog_builder::{crud, CatalogBuilder};
/// use tribegate_sdk::catalog::PermissionEffect;
///
/// let catalog = CatalogBuilder::new("acme")
///     .add_scopes(crud("fleet", Some("Fleet Ops")))
///     .add_default_permission("fleet:read", PermissionEffect::Allow)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(catalog.permissions.len(), 4);
/// ```
#[derive(Debug)]
pub struct CatalogBuilder {
    /// Name of the declaring application
    application_name: String,

    /// Catalog version
    version: String,

    /// Scopes registered so far, in insertion order
    scopes: Vec<PermissionScope>,

    /// Default effects bound to previously registered scopes
    default_permissions: Vec<Permission>,

    /// Build timestamp override
    last_updated: Option<DateTime<Utc>>,
}

impl CatalogBuilder {
    /// Start a builder for the named application. The name is validated at
    /// `build()`, not here.
    pub fn new(application_name: &str) -> Self {
        Self {
            application_name: application_name.to_string(),
            version: "1.0.0".to_string(),
            scopes: Vec::new(),
            default_permissions: Vec::new(),
            last_updated: None,
        }
    }

    /// Override the default `"1.0.0"` version
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Register a scope. Duplicate ids are accepted; indexed lookups over
    /// the built catalog resolve to the first registration.
    pub fn add_scope(mut self, scope: PermissionScope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Register multiple scopes in order, e.g. the output of [`crud`] or
    /// [`tribal`]
    pub fn add_scopes(mut self, scopes: Vec<PermissionScope>) -> Self {
        self.scopes.extend(scopes);
        self
    }

    /// Bind a default effect to a previously registered scope.
    ///
    /// Order-dependent: the scope must already have been added, otherwise
    /// this fails with a configuration error. Default permissions cannot
    /// reference scopes registered later.
    pub fn add_default_permission(
        mut self,
        scope_id: &str,
        effect: PermissionEffect,
    ) -> SdkResult<Self> {
        let scope = self
            .scopes
            .iter()
            .find(|s| s.id == scope_id)
            .cloned()
            .ok_or_else(|| SdkError::Config(format!("scope not found: {}", scope_id)))?;

        self.default_permissions.push(Permission { scope, effect });
        Ok(self)
    }

    /// Inject a fixed build timestamp instead of stamping `build()` time.
    /// Primarily useful for deterministic serialization in tests.
    pub fn with_last_updated(mut self, last_updated: DateTime<Utc>) -> Self {
        self.last_updated = Some(last_updated);
        self
    }

    /// Validate and finalize the catalog.
    ///
    /// # Errors
    ///
    /// Returns a distinct `Config` error for each missing piece: empty
    /// application name, empty version, or an empty scope list.
    pub fn build(self) -> SdkResult<PermissionCatalog> {
        if self.application_name.trim().is_empty() {
            return Err(SdkError::Config("application name is required".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(SdkError::Config("version is required".to_string()));
        }
        if self.scopes.is_empty() {
            return Err(SdkError::Config(
                "at least one permission scope is required".to_string(),
            ));
        }

        Ok(PermissionCatalog {
            application_name: self.application_name,
            version: self.version,
            permissions: self.scopes,
            default_permissions: self.default_permissions,
            last_updated: self.last_updated.unwrap_or_else(Utc::now),
        })
    }
}

/// Generate the four CRUD-style scopes for a resource:
/// `{resource}:read`, `:write`, `:delete`, `:admin`.
///
/// `display_name` defaults to the resource name verbatim.
pub fn crud(resource: &str, display_name: Option<&str>) -> Vec<PermissionScope> {
    let display = display_name.unwrap_or(resource);

    vec![
        PermissionScope::new(
            &format!("{}:read", resource),
            &format!("Read {}", display),
            resource,
            "read",
        )
        .with_description(&format!("View {} data", display)),
        PermissionScope::new(
            &format!("{}:write", resource),
            &format!("Write {}", display),
            resource,
            "write",
        )
        .with_description(&format!("Create and update {} data", display)),
        PermissionScope::new(
            &format!("{}:delete", resource),
            &format!("Delete {}", display),
            resource,
            "delete",
        )
        .with_description(&format!("Delete {} data", display)),
        PermissionScope::new(
            &format!("{}:admin", resource),
            &format!("Admin {}", display),
            resource,
            "admin",
        )
        .with_description(&format!("Full administrative access to {}", display)),
    ]
}

/// Generate the four tribal-hierarchy scopes for a resource:
/// `{resource}:member`, `:officer`, `:director`, `:ceo`.
///
/// `display_name` defaults to the resource name verbatim.
pub fn tribal(resource: &str, display_name: Option<&str>) -> Vec<PermissionScope> {
    let display = display_name.unwrap_or(resource);

    vec![
        PermissionScope::new(
            &format!("{}:member", resource),
            &format!("{} Member", display),
            resource,
            "member",
        ),
        PermissionScope::new(
            &format!("{}:officer", resource),
            &format!("{} Officer", display),
            resource,
            "officer",
        ),
        PermissionScope::new(
            &format!("{}:director", resource),
            &format!("{} Director", display),
            resource,
            "director",
        ),
        PermissionScope::new(
            &format!("{}:ceo", resource),
            &format!("{} CEO", display),
            resource,
            "ceo",
        ),
    ]
}
