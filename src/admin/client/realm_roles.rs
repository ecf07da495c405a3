use super::KeycloakAdminClient;
use crate::admin::common;
use crate::admin::{PageQuery, RoleQuery};
use crate::error::Error;
use crate::models::{RoleRepresentation, UserRepresentation};

impl KeycloakAdminClient {
    /// Lists realm roles.
    pub fn list_roles(&self, query: &RoleQuery) -> Result<Vec<RoleRepresentation>, Error> {
        let url = self.build_url(&["roles"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Creates a realm role and returns its name from the `Location`
    /// response header.
    pub fn create_role(&self, role: &RoleRepresentation) -> Result<String, Error> {
        let url = self.build_url(&["roles"])?;
        let mut req = self.http.post(url).json(role);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_created_id(resp)
    }

    /// Retrieves a realm role by name. Returns `None` when absent.
    pub fn get_role_by_name(&self, name: &str) -> Result<Option<RoleRepresentation>, Error> {
        let url = self.build_url(&["roles", name])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json_or_not_found(resp)
    }

    /// Updates a realm role by name.
    pub fn update_role_by_name(&self, name: &str, role: &RoleRepresentation) -> Result<(), Error> {
        let url = self.build_url(&["roles", name])?;
        let mut req = self.http.put(url).json(role);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Deletes a realm role by name.
    pub fn delete_role_by_name(&self, name: &str) -> Result<(), Error> {
        let url = self.build_url(&["roles", name])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Lists the users holding a realm role, windowed by `first`/`max`.
    pub fn find_users_with_role(
        &self,
        name: &str,
        page: &PageQuery,
    ) -> Result<Vec<UserRepresentation>, Error> {
        let url = self.build_url(&["roles", name, "users"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, page.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Retrieves a role by its ID. Returns `None` when absent.
    pub fn get_role_by_id(&self, id: &str) -> Result<Option<RoleRepresentation>, Error> {
        let url = self.build_url(&["roles-by-id", id])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json_or_not_found(resp)
    }

    /// Updates a role by its ID.
    pub fn update_role_by_id(&self, id: &str, role: &RoleRepresentation) -> Result<(), Error> {
        let url = self.build_url(&["roles-by-id", id])?;
        let mut req = self.http.put(url).json(role);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Deletes a role by its ID.
    pub fn delete_role_by_id(&self, id: &str) -> Result<(), Error> {
        let url = self.build_url(&["roles-by-id", id])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Lists the roles composing a composite role.
    pub fn get_composite_roles(&self, id: &str) -> Result<Vec<RoleRepresentation>, Error> {
        let url = self.build_url(&["roles-by-id", id, "composites"])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Adds roles to a composite role.
    pub fn add_composite_roles(
        &self,
        id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<(), Error> {
        let url = self.build_url(&["roles-by-id", id, "composites"])?;
        let mut req = self.http.post(url).json(roles);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Removes roles from a composite role. The roles travel in the
    /// DELETE request body.
    pub fn remove_composite_roles(
        &self,
        id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<(), Error> {
        let url = self.build_url(&["roles-by-id", id, "composites"])?;
        let mut req = self.http.delete(url).json(roles);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }
}
