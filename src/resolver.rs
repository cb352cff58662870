//! Permission resolution: mapping a user's identity and role claims onto
//! concrete allow/deny decisions for one application's catalog.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::catalog::{Permission, PermissionCatalog, PermissionEffect};
use crate::error::{SdkError, SdkResult};
use crate::gateway::IdentityProvider;
use crate::types::{RoleRecord, UserRecord};

/// Strategy for turning (user, roles, catalog) into a decision set.
///
/// The SDK ships [`MemberReadResolver`] as a reference policy; applications
/// with their own role-to-scope mapping implement this trait and pass their
/// resolver to [`resolve_permissions`].
pub trait PermissionResolver: Send + Sync {
    fn resolve(
        &self,
        user: &UserRecord,
        roles: &[RoleRecord],
        catalog: &PermissionCatalog,
    ) -> Vec<Permission>;
}

/// Reference resolution policy.
///
/// Admins are granted every scope in the catalog. Otherwise, each claimed
/// role is matched by exact name against the supplied records; claims
/// without a record and records that are inactive are skipped. A surviving
/// role whose name contains `"member"` (case-insensitive) grants every
/// scope whose action is `"read"`. Every other combination produces no
/// entry at all: absence, not an explicit deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberReadResolver;

impl PermissionResolver for MemberReadResolver {
    fn resolve(
        &self,
        user: &UserRecord,
        roles: &[RoleRecord],
        catalog: &PermissionCatalog,
    ) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = Vec::new();

        if user.is_admin {
            for scope in &catalog.permissions {
                permissions.push(Permission {
                    scope: scope.clone(),
                    effect: PermissionEffect::Allow,
                });
            }
            info!(
                "resolved {} as admin: {} scopes allowed",
                user.eth_address,
                permissions.len()
            );
            return permissions;
        }

        for role_name in &user.roles {
            let Some(record) = roles.iter().find(|r| &r.name == role_name) else {
                debug!("role claim {:?} has no matching record, skipping", role_name);
                continue;
            };
            if !record.is_active {
                debug!("role {:?} is inactive, skipping", record.name);
                continue;
            }
            if record.name.to_lowercase().contains("member") {
                for scope in &catalog.permissions {
                    // Overlapping member-ish roles yield one entry per scope
                    if scope.action == "read"
                        && !permissions.iter().any(|p| p.scope.id == scope.id)
                    {
                        permissions.push(Permission {
                            scope: scope.clone(),
                            effect: PermissionEffect::Allow,
                        });
                    }
                }
            }
        }

        info!(
            "resolved {}: {} of {} scopes allowed",
            user.eth_address,
            permissions.len(),
            catalog.permissions.len()
        );
        permissions
    }
}

/// A user's decision set for one application.
///
/// Ephemeral: recomputed per request, owned by the caller that requested
/// it, never cached by the SDK.
#[derive(Debug, Clone)]
pub struct ResolvedPermissions {
    /// The authenticated user
    pub user: UserRecord,

    /// Role records supplied to resolution, stored verbatim
    pub roles: Vec<RoleRecord>,

    /// The computed decision set
    pub permissions: Vec<Permission>,

    /// Copied from the user record at resolution time
    pub is_admin: bool,

    /// When this resolution was computed
    pub fetched_at: DateTime<Utc>,
}

impl ResolvedPermissions {
    /// True iff the set contains an `Allow` entry for the scope. Absence of
    /// an entry is neither allow nor deny; the query is simply false.
    pub fn has_permission(&self, scope_id: &str) -> bool {
        self.has_permission_with(scope_id, PermissionEffect::Allow)
    }

    /// True iff the set contains an entry for the scope with the wanted effect
    pub fn has_permission_with(&self, scope_id: &str, effect: PermissionEffect) -> bool {
        self.permissions
            .iter()
            .any(|p| p.scope.id == scope_id && p.effect == effect)
    }

    /// True iff at least one of the scopes is allowed
    pub fn has_any_permission(&self, scope_ids: &[&str]) -> bool {
        scope_ids.iter().any(|id| self.has_permission(id))
    }

    /// True iff every one of the scopes is allowed
    pub fn has_all_permissions(&self, scope_ids: &[&str]) -> bool {
        scope_ids.iter().all(|id| self.has_permission(id))
    }

    /// True iff the user claims the role. This checks the claim list only;
    /// the role's active flag is not consulted at this layer.
    pub fn has_role(&self, role_name: &str) -> bool {
        self.user.roles.iter().any(|name| name == role_name)
    }
}

/// Compute a user's decision set with the given resolver strategy.
pub fn resolve_permissions(
    user: UserRecord,
    roles: Vec<RoleRecord>,
    catalog: &PermissionCatalog,
    resolver: &dyn PermissionResolver,
) -> ResolvedPermissions {
    let permissions = resolver.resolve(&user, &roles, catalog);
    let is_admin = user.is_admin;

    ResolvedPermissions {
        user,
        roles,
        permissions,
        is_admin,
        fetched_at: Utc::now(),
    }
}

/// Per-caller holder for the most recent resolution.
///
/// Every query returns `false` until a resolution has been stored, so
/// callers never need to special-case the not-yet-resolved state.
#[derive(Debug, Default)]
pub struct PermissionSession {
    resolved: Option<ResolvedPermissions>,
}

impl PermissionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly computed resolution
    pub fn store(&mut self, resolved: ResolvedPermissions) {
        self.resolved = Some(resolved);
    }

    /// Drop the stored resolution, e.g. on sign-out
    pub fn clear(&mut self) {
        self.resolved = None;
    }

    pub fn resolved(&self) -> Option<&ResolvedPermissions> {
        self.resolved.as_ref()
    }

    pub fn has_permission(&self, scope_id: &str) -> bool {
        self.resolved
            .as_ref()
            .is_some_and(|r| r.has_permission(scope_id))
    }

    pub fn has_permission_with(&self, scope_id: &str, effect: PermissionEffect) -> bool {
        self.resolved
            .as_ref()
            .is_some_and(|r| r.has_permission_with(scope_id, effect))
    }

    pub fn has_any_permission(&self, scope_ids: &[&str]) -> bool {
        self.resolved
            .as_ref()
            .is_some_and(|r| r.has_any_permission(scope_ids))
    }

    pub fn has_all_permissions(&self, scope_ids: &[&str]) -> bool {
        self.resolved
            .as_ref()
            .is_some_and(|r| r.has_all_permissions(scope_ids))
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        self.resolved.as_ref().is_some_and(|r| r.has_role(role_name))
    }

    pub fn is_admin(&self) -> bool {
        self.resolved.as_ref().is_some_and(|r| r.is_admin)
    }
}

/// Server-side role check against the identity service.
///
/// A missing user upstream means "no roles", so `NotFound` is swallowed
/// into `false`; every other error propagates. Only active roles count.
pub async fn check_user_role<P>(
    provider: &P,
    address: &str,
    role_name: &str,
    token: &str,
) -> SdkResult<bool>
where
    P: IdentityProvider + ?Sized,
{
    match provider.get_user_roles(address, token).await {
        Ok(roles) => Ok(roles.iter().any(|r| r.is_active && r.name == role_name)),
        Err(SdkError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
