use super::KeycloakAdminClient;
use crate::admin::common;
use crate::admin::{GroupQuery, PageQuery};
use crate::error::Error;
use crate::models::{GroupCount, GroupRepresentation, UserRepresentation};

impl KeycloakAdminClient {
    /// Lists top-level groups matching the query.
    pub fn find_groups(&self, query: &GroupQuery) -> Result<Vec<GroupRepresentation>, Error> {
        let url = self.build_url(&["groups"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, query.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Creates a top-level group and returns its server-assigned ID,
    /// taken from the `Location` response header.
    pub fn create_group(&self, group: &GroupRepresentation) -> Result<String, Error> {
        let url = self.build_url(&["groups"])?;
        let mut req = self.http.post(url).json(group);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_created_id(resp)
    }

    /// Retrieves a group by ID. Returns `None` when absent.
    pub fn get_group(&self, id: &str) -> Result<Option<GroupRepresentation>, Error> {
        let url = self.build_url(&["groups", id])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json_or_not_found(resp)
    }

    /// Updates a group.
    pub fn update_group(&self, id: &str, group: &GroupRepresentation) -> Result<(), Error> {
        let url = self.build_url(&["groups", id])?;
        let mut req = self.http.put(url).json(group);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Deletes a group.
    pub fn delete_group(&self, id: &str) -> Result<(), Error> {
        let url = self.build_url(&["groups", id])?;
        let mut req = self.http.delete(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_no_content(resp)
    }

    /// Counts groups in the realm.
    pub fn count_groups(&self) -> Result<GroupCount, Error> {
        let url = self.build_url(&["groups", "count"])?;
        let mut req = self.http.get(url);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }

    /// Creates a child group under an existing group and returns the
    /// child's ID from the `Location` response header.
    pub fn create_child_group(
        &self,
        id: &str,
        group: &GroupRepresentation,
    ) -> Result<String, Error> {
        let url = self.build_url(&["groups", id, "children"])?;
        let mut req = self.http.post(url).json(group);
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_created_id(resp)
    }

    /// Lists the members of a group, windowed by `first`/`max`.
    pub fn list_group_members(
        &self,
        id: &str,
        page: &PageQuery,
    ) -> Result<Vec<UserRepresentation>, Error> {
        let url = self.build_url(&["groups", id, "members"])?;
        let mut req = self.http.get(url);
        req = common::apply_query_params(req, page.to_query_pairs());
        req = self.apply_auth(req)?;
        let resp = req.send()?;
        self.expect_ok_json(resp)
    }
}
