mod client;
pub(crate) mod common;
mod options;

pub use client::{KeycloakAdminClient, KeycloakAdminClientBuilder};
pub use common::TokenProvider;
pub use options::{
    AuthzPermissionQuery, AuthzPolicyQuery, AuthzResourceQuery, ClientQuery, GroupQuery,
    PageQuery, RoleQuery, UserQuery,
};
