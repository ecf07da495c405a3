use super::KeycloakAdminClient;
use crate::admin::common;
use crate::admin::{PageQuery, UserQuery};
use crate::error::Error;
use crate::models::{
    CredentialRepresentation, GroupRepresentation, RoleRepresentation, UserRepresentation,
};

impl KeycloakAdminClient {
    /// Lists users matching the query.
    pub fn find_users(&self, query: &UserQuery) -> Result<Vec<UserRepresentation>, Error> {
        let url = self.build_url(&["users"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Creates a user and returns its server-assigned ID, taken from the
    /// `Location` response header.
    pub fn create_user(&self, user: &UserRepresentation) -> Result<String, Error> {
        let url = self.build_url(&["users"])?;
        let mut req = self.http.post(url).json(user);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_created_id(resp)
    }

    /// Retrieves a user by ID. Returns `None` when absent.
    pub fn get_user(&self, id: &str) -> Result<Option<UserRepresentation>, Error> {
        let url = self.build_url(&["users", id])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json_or_not_found(resp)
    }

    /// Updates a user.
    pub fn update_user(&self, id: &str, user: &UserRepresentation) -> Result<(), Error> {
        let url = self.build_url(&["users", id])?;
        let mut req = self.http.put(url).json(user);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Deletes a user.
    pub fn delete_user(&self, id: &str) -> Result<(), Error> {
        let url = self.build_url(&["users", id])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Counts users matching the query. The server replies with a bare
    /// integer.
    pub fn count_users(&self, query: &UserQuery) -> Result<i64, Error> {
        let url = self.build_url(&["users", "count"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Sets a user's password credential.
    pub fn reset_user_password(
        &self,
        id: &str,
        credential: &CredentialRepresentation,
    ) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "reset-password"])?;
        let mut req = self.http.put(url).json(credential);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Lists a user's realm-level role mappings.
    pub fn list_user_realm_role_mappings(
        &self,
        id: &str,
    ) -> Result<Vec<RoleRepresentation>, Error> {
        let url = self.build_url(&["users", id, "role-mappings", "realm"])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Adds realm-level role mappings to a user.
    pub fn add_user_realm_role_mappings(
        &self,
        id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "role-mappings", "realm"])?;
        let mut req = self.http.post(url).json(roles);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Removes realm-level role mappings from a user. The roles travel
    /// in the DELETE request body.
    pub fn remove_user_realm_role_mappings(
        &self,
        id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "role-mappings", "realm"])?;
        let mut req = self.http.delete(url).json(roles);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Lists a user's role mappings for one client. `client_id` is the
    /// client's server-assigned ID, not its `clientId`.
    pub fn list_user_client_role_mappings(
        &self,
        id: &str,
        client_id: &str,
    ) -> Result<Vec<RoleRepresentation>, Error> {
        let url = self.build_url(&["users", id, "role-mappings", "clients", client_id])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Adds client-level role mappings to a user.
    pub fn add_user_client_role_mappings(
        &self,
        id: &str,
        client_id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "role-mappings", "clients", client_id])?;
        let mut req = self.http.post(url).json(roles);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Removes client-level role mappings from a user.
    pub fn remove_user_client_role_mappings(
        &self,
        id: &str,
        client_id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "role-mappings", "clients", client_id])?;
        let mut req = self.http.delete(url).json(roles);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Lists the groups a user belongs to, windowed by `first`/`max`.
    pub fn list_user_groups(
        &self,
        id: &str,
        page: &PageQuery,
    ) -> Result<Vec<GroupRepresentation>, Error> {
        let url = self.build_url(&["users", id, "groups"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, page.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Adds a user to a group.
    pub fn add_user_to_group(&self, id: &str, group_id: &str) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "groups", group_id])?;
        let mut req = self.http.put(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Removes a user from a group.
    pub fn remove_user_from_group(&self, id: &str, group_id: &str) -> Result<(), Error> {
        let url = self.build_url(&["users", id, "groups", group_id])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }
}
