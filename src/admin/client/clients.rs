use super::KeycloakAdminClient;
use crate::admin::common;
use crate::admin::{ClientQuery, PageQuery};
use crate::error::Error;
use crate::models::{ClientRepresentation, CredentialRepresentation, RoleRepresentation, UserRepresentation};

impl KeycloakAdminClient {
    /// Lists clients in the realm.
    pub fn find_clients(&self, query: &ClientQuery) -> Result<Vec<ClientRepresentation>, Error> {
        let url = self.build_url(&["clients"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Creates a client and returns its server-assigned ID, taken from
    /// the `Location` response header.
    pub fn create_client(&self, client: &ClientRepresentation) -> Result<String, Error> {
        let url = self.build_url(&["clients"])?;
        let mut req = self.http.post(url).json(client);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_created_id(resp)
    }

    /// Retrieves a client by its ID. Returns `None` when absent.
    pub fn get_client(&self, id: &str) -> Result<Option<ClientRepresentation>, Error> {
        let url = self.build_url(&["clients", id])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json_or_not_found(resp)
    }

    /// Updates a client.
    pub fn update_client(&self, id: &str, client: &ClientRepresentation) -> Result<(), Error> {
        let url = self.build_url(&["clients", id])?;
        let mut req = self.http.put(url).json(client);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Deletes a client.
    pub fn delete_client(&self, id: &str) -> Result<(), Error> {
        let url = self.build_url(&["clients", id])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Creates a role owned by the client and returns the role name from
    /// the `Location` response header.
    pub fn create_client_role(&self, id: &str, role: &RoleRepresentation) -> Result<String, Error> {
        let url = self.build_url(&["clients", id, "roles"])?;
        let mut req = self.http.post(url).json(role);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_created_id(resp)
    }

    /// Lists the roles owned by a client.
    pub fn list_client_roles(&self, id: &str) -> Result<Vec<RoleRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "roles"])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Retrieves a client role by name. Returns `None` when absent.
    pub fn get_client_role(
        &self,
        id: &str,
        role_name: &str,
    ) -> Result<Option<RoleRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "roles", role_name])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json_or_not_found(resp)
    }

    /// Updates a client role.
    pub fn update_client_role(
        &self,
        id: &str,
        role_name: &str,
        role: &RoleRepresentation,
    ) -> Result<(), Error> {
        let url = self.build_url(&["clients", id, "roles", role_name])?;
        let mut req = self.http.put(url).json(role);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Deletes a client role.
    pub fn delete_client_role(&self, id: &str, role_name: &str) -> Result<(), Error> {
        let url = self.build_url(&["clients", id, "roles", role_name])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Lists the users holding a client role, windowed by `first`/`max`.
    pub fn find_users_with_client_role(
        &self,
        id: &str,
        role_name: &str,
        page: &PageQuery,
    ) -> Result<Vec<UserRepresentation>, Error> {
        let url = self.build_url(&["clients", id, "roles", role_name, "users"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, page.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Retrieves the service account user linked to a client.
    pub fn get_service_account_user(&self, id: &str) -> Result<UserRepresentation, Error> {
        let url = self.build_url(&["clients", id, "service-account-user"])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Rotates the client secret and returns the new credential.
    pub fn generate_client_secret(&self, id: &str) -> Result<CredentialRepresentation, Error> {
        let url = self.build_url(&["clients", id, "client-secret"])?;
        let mut req = self.http.post(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Retrieves the current client secret.
    pub fn get_client_secret(&self, id: &str) -> Result<CredentialRepresentation, Error> {
        let url = self.build_url(&["clients", id, "client-secret"])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }
}
