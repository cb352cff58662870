//! TribeGate SDK for application permission management
//!
//! This crate lets an application publish a declarative description of the
//! permissions it defines and resolve an authenticated caller's effective
//! permissions against that description, consulting the TribeGate identity
//! service for authentication and role data.
//!
//! The pieces compose in three thin layers:
//! - [`catalog_builder::CatalogBuilder`] assembles an immutable
//!   [`catalog::PermissionCatalog`]
//! - [`discovery`] serves the catalog at the application's well-known path
//! - [`gateway::IdentityGateway`], [`resolver`], and [`guards`] validate
//!   bearer credentials and decide allow/deny per capability

pub mod catalog;
pub mod catalog_builder;
pub mod config;
pub mod discovery;
pub mod error;
pub mod gateway;
#[cfg(any(test, feature = "mock"))]
pub mod gateway_mock;
pub mod guards;
pub mod resolver;
pub mod types;

// Re-export main types for convenience
pub use catalog::{Permission, PermissionCatalog, PermissionEffect, PermissionScope};
pub use catalog_builder::{crud, tribal, CatalogBuilder};
pub use config::SdkConfig;
pub use discovery::{DiscoveryServer, DiscoveryState};
pub use error::{SdkError, SdkResult};
pub use gateway::{IdentityGateway, IdentityGatewayBuilder, IdentityProvider};
#[cfg(any(test, feature = "mock"))]
pub use gateway_mock::GatewayMock;
pub use guards::{bearer_token, with_auth, with_permission, BearerSource};
pub use resolver::{
    check_user_role, resolve_permissions, MemberReadResolver, PermissionResolver,
    PermissionSession, ResolvedPermissions,
};
pub use types::{RoleRecord, UserRecord};
