//! Typed query parameters for list endpoints.
//!
//! Pagination is a straight passthrough of `first`/`max`; the client
//! never walks pages on its own.

#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub client_id: Option<String>,
    pub viewable_only: Option<bool>,
    pub search: Option<bool>,
    pub q: Option<String>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl ClientQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref client_id) = self.client_id {
            pairs.push(("clientId", client_id.clone()));
        }
        if let Some(viewable_only) = self.viewable_only {
            pairs.push(("viewableOnly", viewable_only.to_string()));
        }
        if let Some(search) = self.search {
            pairs.push(("search", search.to_string()));
        }
        if let Some(ref q) = self.q {
            pairs.push(("q", q.clone()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleQuery {
    pub search: Option<String>,
    pub brief_representation: Option<bool>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl RoleQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(brief) = self.brief_representation {
            pairs.push(("briefRepresentation", brief.to_string()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub search: Option<String>,
    pub exact: Option<bool>,
    pub enabled: Option<bool>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl UserQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref username) = self.username {
            pairs.push(("username", username.clone()));
        }
        if let Some(ref email) = self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(ref first_name) = self.first_name {
            pairs.push(("firstName", first_name.clone()));
        }
        if let Some(ref last_name) = self.last_name {
            pairs.push(("lastName", last_name.clone()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(exact) = self.exact {
            pairs.push(("exact", exact.to_string()));
        }
        if let Some(enabled) = self.enabled {
            pairs.push(("enabled", enabled.to_string()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub search: Option<String>,
    pub exact: Option<bool>,
    pub brief_representation: Option<bool>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl GroupQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(exact) = self.exact {
            pairs.push(("exact", exact.to_string()));
        }
        if let Some(brief) = self.brief_representation {
            pairs.push(("briefRepresentation", brief.to_string()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthzResourceQuery {
    pub deep: Option<bool>,
    pub uri: Option<String>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl AuthzResourceQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(deep) = self.deep {
            pairs.push(("deep", deep.to_string()));
        }
        if let Some(ref uri) = self.uri {
            pairs.push(("uri", uri.clone()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthzPolicyQuery {
    pub name: Option<String>,
    pub permission: Option<bool>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl AuthzPolicyQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref name) = self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(permission) = self.permission {
            pairs.push(("permission", permission.to_string()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthzPermissionQuery {
    pub name: Option<String>,
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl AuthzPermissionQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref name) = self.name {
            pairs.push(("name", name.clone()));
        }
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

/// `first`/`max` only, for endpoints whose sole parameters are the page
/// window (role users, group members, user groups).
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub first: Option<i32>,
    pub max: Option<i32>,
}

impl PageQuery {
    pub(crate) fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_page(&mut pairs, self.first, self.max);
        pairs
    }
}

fn push_page(pairs: &mut Vec<(&'static str, String)>, first: Option<i32>, max: Option<i32>) {
    if let Some(first) = first {
        pairs.push(("first", first.to_string()));
    }
    if let Some(max) = max {
        pairs.push(("max", max.to_string()));
    }
}
