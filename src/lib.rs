#![forbid(unsafe_code)]

mod admin;
mod build_url;
mod error;
mod models;
#[cfg(feature = "async-client")]
mod admin_async;

pub use error::{ApiError, Error};

pub use models::{
    ClientRepresentation, CredentialRepresentation, DecisionStrategy, GroupCount,
    GroupPolicyRepresentation, GroupRepresentation, Logic, PolicyRepresentation,
    ResourceRepresentation, RoleDefinition, RolePolicyRepresentation, RoleRepresentation,
    ScopeRepresentation, UserPolicyRepresentation, UserRepresentation,
};

pub use admin::{
    AuthzPermissionQuery, AuthzPolicyQuery, AuthzResourceQuery, ClientQuery, GroupQuery,
    KeycloakAdminClient, KeycloakAdminClientBuilder, PageQuery, RoleQuery, TokenProvider,
    UserQuery,
};
#[cfg(feature = "async-client")]
pub use admin_async::{KeycloakAdminAsyncClient, KeycloakAdminAsyncClientBuilder};
