//! Fine-grained authorization sub-resources of a client: resources,
//! policies, and permissions under
//! `clients/{id}/authz/resource-server`.

use super::KeycloakAdminAsyncClient;
use crate::admin::common;
use crate::admin::{AuthzPermissionQuery, AuthzPolicyQuery, AuthzResourceQuery};
use crate::error::Error;
use crate::models::{
    GroupPolicyRepresentation, PolicyRepresentation, ResourceRepresentation,
    RolePolicyRepresentation, ScopeRepresentation, UserPolicyRepresentation,
};

impl KeycloakAdminAsyncClient {
    /// Registers a resource with the client's resource server and returns
    /// the stored representation.
    pub async fn create_authz_resource(
        &self,
        id: &str,
        resource: &ResourceRepresentation,
    ) -> Result<ResourceRepresentation, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "resource"])?;
        let mut req = self.http.post(url).json(resource);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_created_json(resp).await
    }

    /// Lists resources registered with the client's resource server.
    pub async fn list_authz_resources(
        &self,
        id: &str,
        query: &AuthzResourceQuery,
    ) -> Result<Vec<ResourceRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "resource"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Creates a group-based policy and returns the stored representation.
    pub async fn create_authz_group_policy(
        &self,
        id: &str,
        policy: &GroupPolicyRepresentation,
    ) -> Result<GroupPolicyRepresentation, Error> {
        let url =
            self.build_url(&["clients", id, "authz", "resource-server", "policy", "group"])?;
        let mut req = self.http.post(url).json(policy);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_created_json(resp).await
    }

    /// Creates a role-based policy and returns the stored representation.
    pub async fn create_authz_role_policy(
        &self,
        id: &str,
        policy: &RolePolicyRepresentation,
    ) -> Result<RolePolicyRepresentation, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "policy", "role"])?;
        let mut req = self.http.post(url).json(policy);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_created_json(resp).await
    }

    /// Creates a user-based policy and returns the stored representation.
    pub async fn create_authz_user_policy(
        &self,
        id: &str,
        policy: &UserPolicyRepresentation,
    ) -> Result<UserPolicyRepresentation, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "policy", "user"])?;
        let mut req = self.http.post(url).json(policy);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_created_json(resp).await
    }

    /// Lists policies of any type.
    pub async fn list_authz_policies(
        &self,
        id: &str,
        query: &AuthzPolicyQuery,
    ) -> Result<Vec<PolicyRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "policy"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Lists group-based policies.
    pub async fn list_authz_group_policies(
        &self,
        id: &str,
        query: &AuthzPolicyQuery,
    ) -> Result<Vec<GroupPolicyRepresentation>, Error> {
        let url =
            self.build_url(&["clients", id, "authz", "resource-server", "policy", "group"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Lists role-based policies.
    pub async fn list_authz_role_policies(
        &self,
        id: &str,
        query: &AuthzPolicyQuery,
    ) -> Result<Vec<RolePolicyRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "policy", "role"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Lists user-based policies.
    pub async fn list_authz_user_policies(
        &self,
        id: &str,
        query: &AuthzPolicyQuery,
    ) -> Result<Vec<UserPolicyRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "policy", "user"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Lists the scopes attached to a policy.
    pub async fn list_authz_permission_scopes(
        &self,
        id: &str,
        policy_id: &str,
    ) -> Result<Vec<ScopeRepresentation>, Error> {
        let url = self.build_url(&[
            "clients",
            id,
            "authz",
            "resource-server",
            "policy",
            policy_id,
            "scopes",
        ])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Lists the policies a permission aggregates.
    pub async fn list_authz_permission_associated_policies(
        &self,
        id: &str,
        permission_id: &str,
    ) -> Result<Vec<PolicyRepresentation>, Error> {
        let url = self.build_url(&[
            "clients",
            id,
            "authz",
            "resource-server",
            "policy",
            permission_id,
            "associatedPolicies",
        ])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Creates a scope permission.
    pub async fn create_authz_scope_permission(
        &self,
        id: &str,
        permission: &PolicyRepresentation,
    ) -> Result<(), Error> {
        let url = self.build_url(&[
            "clients",
            id,
            "authz",
            "resource-server",
            "permission",
            "scope",
        ])?;
        let mut req = self.http.post(url).json(permission);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_success(resp).await
    }

    /// Updates a scope permission.
    pub async fn update_authz_scope_permission(
        &self,
        id: &str,
        permission_id: &str,
        permission: &PolicyRepresentation,
    ) -> Result<(), Error> {
        let url = self.build_url(&[
            "clients",
            id,
            "authz",
            "resource-server",
            "permission",
            "scope",
            permission_id,
        ])?;
        let mut req = self.http.put(url).json(permission);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_success(resp).await
    }

    /// Lists permissions of any type.
    pub async fn list_authz_permissions(
        &self,
        id: &str,
        query: &AuthzPermissionQuery,
    ) -> Result<Vec<PolicyRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "authz", "resource-server", "permission"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_ok_json(resp).await
    }

    /// Deletes a permission.
    pub async fn delete_authz_permission(
        &self,
        id: &str,
        permission_id: &str,
    ) -> Result<(), Error> {
        let url = self.build_url(&[
            "clients",
            id,
            "authz",
            "resource-server",
            "permission",
            permission_id,
        ])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send().await?;
        self.expect_no_content(resp).await
    }
}
