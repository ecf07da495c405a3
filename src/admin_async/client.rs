use crate::admin::common;
use crate::admin::common::TokenProvider;
use crate::error::{
    read_body_with_limit_async, Error, CONFIG_ERROR_REDIRECT_WITH_AUTH, MAX_ERROR_BODY_BYTES,
};
use reqwest::header::{self, HeaderValue};
use reqwest::{Certificate, Client as HttpClient, Identity, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

mod authz;
mod clients;
mod groups;
mod realm_roles;
mod users;

/// Builder for [`KeycloakAdminAsyncClient`].
///
/// Available when the `async-client` feature is enabled. The `base_url`
/// should point at the Keycloak server root, for example
/// `https://kc.example.com`.
pub struct KeycloakAdminAsyncClientBuilder {
    base_url: Url,
    realm: String,
    timeout: Option<Duration>,
    follow_redirects: bool,
    identity: Option<Identity>,
    ca_certs: Vec<Certificate>,
    auth: Option<common::AuthProvider>,
}

impl KeycloakAdminAsyncClientBuilder {
    /// Creates a builder for the provided base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            realm: "master".to_string(),
            timeout: Some(common::DEFAULT_ADMIN_TIMEOUT),
            follow_redirects: false,
            identity: None,
            ca_certs: Vec::new(),
            auth: None,
        })
    }

    /// Sets the realm admin requests are scoped to. Defaults to `master`.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Sets the request timeout for the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Control whether HTTP redirects should be followed.
    ///
    /// Redirects are disabled by default; enabling them is rejected at
    /// build time when auth is configured, to avoid leaking bearer
    /// tokens to redirected hosts.
    pub fn follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    /// Configure mutual TLS identity from a single PEM bundle containing the
    /// certificate and private key.
    pub fn mtls_identity_from_pem(mut self, identity_pem: &[u8]) -> Result<Self, Error> {
        self.identity = Some(Identity::from_pem(identity_pem)?);
        Ok(self)
    }

    /// Configure mutual TLS identity from separate PEM-encoded certificate
    /// and private key. The inputs are concatenated with a newline if needed.
    pub fn mtls_identity_from_parts(
        mut self,
        cert_pem: &[u8],
        key_pem: &[u8],
    ) -> Result<Self, Error> {
        let mut combined = Vec::new();
        combined.extend_from_slice(cert_pem);
        if !combined.ends_with(b"\n") {
            combined.push(b'\n');
        }
        combined.extend_from_slice(key_pem);
        self.identity = Some(Identity::from_pem(&combined)?);
        Ok(self)
    }

    /// Adds a PEM-encoded CA certificate to the trust store.
    pub fn add_ca_cert_pem(mut self, ca_pem: &[u8]) -> Result<Self, Error> {
        self.ca_certs.push(Certificate::from_pem(ca_pem)?);
        Ok(self)
    }

    /// Configures a static bearer token for the `Authorization` header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Result<Self, Error> {
        let token = token.as_ref().to_string();
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Config(format!("invalid bearer token: {e}")))?;
        self.auth = Some(common::AuthProvider::Bearer { token });
        Ok(self)
    }

    /// Configures a token source queried before each request. Session
    /// management stays with the provider.
    pub fn token_provider(mut self, source: Arc<dyn TokenProvider>) -> Self {
        self.auth = Some(common::AuthProvider::Provider { source });
        self
    }

    /// Builds the async admin client from the configured options.
    pub fn build(self) -> Result<KeycloakAdminAsyncClient, Error> {
        if self.auth.is_some() && self.follow_redirects {
            return Err(Error::Config(CONFIG_ERROR_REDIRECT_WITH_AUTH.to_string()));
        }
        let mut builder = HttpClient::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if !self.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        for cert in self.ca_certs {
            builder = builder.add_root_certificate(cert);
        }
        let http = builder.build()?;
        Ok(KeycloakAdminAsyncClient {
            base_url: self.base_url,
            realm: self.realm,
            http,
            auth: self.auth,
        })
    }
}

/// Async client for the Keycloak Admin REST API (requires the
/// `async-client` feature).
///
/// Mirrors [`KeycloakAdminClient`](crate::KeycloakAdminClient) method for
/// method.
pub struct KeycloakAdminAsyncClient {
    base_url: Url,
    realm: String,
    http: HttpClient,
    auth: Option<common::AuthProvider>,
}

impl KeycloakAdminAsyncClient {
    /// Returns a builder for an async admin client.
    pub fn builder(base_url: impl AsRef<str>) -> Result<KeycloakAdminAsyncClientBuilder, Error> {
        KeycloakAdminAsyncClientBuilder::new(base_url)
    }

    /// The realm this client's admin paths are scoped to.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns a clone of this client scoped to another realm. The
    /// underlying HTTP client and auth configuration are shared.
    pub fn for_realm(&self, realm: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            realm: realm.into(),
            http: self.http.clone(),
            auth: self.auth.clone(),
        }
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut all = Vec::with_capacity(segments.len() + 3);
        all.extend(["admin", "realms", self.realm.as_str()]);
        all.extend_from_slice(segments);
        common::build_url(&self.base_url, &all, common::BuildUrlOptions::REQUEST)
    }

    fn apply_auth(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        common::apply_auth(req, &self.auth, |req, value, ctx| {
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                let msg = match ctx {
                    common::AuthContext::Config => format!("invalid bearer token: {e}"),
                    common::AuthContext::Provider => {
                        format!("invalid bearer token returned by token provider: {e}")
                    }
                };
                Error::Config(msg)
            })?;
            Ok(req.header(header::AUTHORIZATION, header_value))
        })
    }

    async fn expect_ok_json<T: serde::de::DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, Error> {
        if resp.status() == StatusCode::OK {
            resp.json::<T>().await.map_err(Error::from)
        } else {
            self.parse_error(resp).await
        }
    }

    async fn expect_ok_json_or_not_found<T: serde::de::DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<Option<T>, Error> {
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => resp.json::<T>().await.map(Some).map_err(Error::from),
            _ => self.parse_error(resp).await,
        }
    }

    async fn expect_created_json<T: serde::de::DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, Error> {
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => resp.json::<T>().await.map_err(Error::from),
            _ => self.parse_error(resp).await,
        }
    }

    async fn expect_no_content(&self, resp: Response) -> Result<(), Error> {
        if resp.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            self.parse_error(resp).await
        }
    }

    async fn expect_success(&self, resp: Response) -> Result<(), Error> {
        if resp.status().is_success() {
            Ok(())
        } else {
            self.parse_error(resp).await
        }
    }

    async fn expect_created_id(&self, resp: Response) -> Result<String, Error> {
        if resp.status().is_success() {
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok());
            common::created_id_from_location(location).ok_or(Error::MissingLocation)
        } else {
            self.parse_error(resp).await
        }
    }

    async fn parse_error<T>(&self, mut resp: Response) -> Result<T, Error> {
        let status = resp.status();
        let body = read_body_with_limit_async(&mut resp, MAX_ERROR_BODY_BYTES).await?;
        Err(common::parse_error_from_body(status, &body, true))
    }
}

#[cfg(test)]
mod tests {
    use super::KeycloakAdminAsyncClient;
    use crate::admin::{AuthzPolicyQuery, TokenProvider};
    use crate::error::Error;
    use crate::models::{
        DecisionStrategy, GroupPolicyRepresentation, GroupRepresentation, Logic,
        PolicyRepresentation, ResourceRepresentation, RoleRepresentation,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    #[tokio::test]
    async fn get_client_returns_none_on_not_found() {
        let body = r#"{"error":"Client not found"}"#;
        let response = format!(
            "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let found = client.get_client("missing").await.expect("request");
        assert!(found.is_none());

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/admin/realms/master/clients/missing");

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn create_client_role_returns_name_from_location() {
        let response = "HTTP/1.1 201 Created\r\nLocation: /admin/realms/master/clients/abc/roles/uma_reader\r\nContent-Length: 0\r\n\r\n".to_string();
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let role = RoleRepresentation {
            name: Some("uma_reader".to_string()),
            ..Default::default()
        };
        let name = client
            .create_client_role("abc", &role)
            .await
            .expect("request");
        assert_eq!(name, "uma_reader");

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/admin/realms/master/clients/abc/roles");
        let body: serde_json::Value = serde_json::from_slice(&req.body).expect("json body");
        assert_eq!(body, json!({"name": "uma_reader"}));

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn create_client_without_location_is_an_error() {
        let response = "HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n".to_string();
        let (base_url, _rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let err = client
            .create_client(&Default::default())
            .await
            .expect_err("should fail");
        assert!(matches!(err, Error::MissingLocation));

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn create_authz_group_policy_posts_typed_body() {
        let body = r#"{"id":"pol-1","name":"admins-only","type":"group"}"#;
        let response = format!(
            "HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let policy = GroupPolicyRepresentation {
            name: Some("admins-only".to_string()),
            logic: Some(Logic::Positive),
            groups_claim: Some("groups".to_string()),
            groups: Some(vec![GroupRepresentation {
                id: Some("g-1".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let created = client
            .create_authz_group_policy("abc", &policy)
            .await
            .expect("request");
        assert_eq!(created.id.as_deref(), Some("pol-1"));

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "POST");
        assert_eq!(
            req.path,
            "/admin/realms/master/clients/abc/authz/resource-server/policy/group"
        );
        let body: serde_json::Value = serde_json::from_slice(&req.body).expect("json body");
        assert_eq!(
            body,
            json!({
                "name": "admins-only",
                "logic": "POSITIVE",
                "groupsClaim": "groups",
                "groups": [{"id": "g-1"}],
            })
        );

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn list_authz_policies_forwards_query() {
        let body = r#"[{"id":"pol-1","name":"admins-only"}]"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let query = AuthzPolicyQuery {
            name: Some("admins".to_string()),
            permission: Some(false),
            first: Some(0),
            max: Some(25),
        };
        let policies = client
            .list_authz_policies("abc", &query)
            .await
            .expect("request");
        assert_eq!(policies.len(), 1);

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "GET");
        assert_eq!(
            req.path,
            "/admin/realms/master/clients/abc/authz/resource-server/policy"
        );
        assert_eq!(req.query.get("name").map(String::as_str), Some("admins"));
        assert_eq!(req.query.get("permission").map(String::as_str), Some("false"));
        assert_eq!(req.query.get("first").map(String::as_str), Some("0"));
        assert_eq!(req.query.get("max").map(String::as_str), Some("25"));

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn update_authz_scope_permission_accepts_created_status() {
        let body = r#"{"id":"perm-1"}"#;
        let response = format!(
            "HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let permission = PolicyRepresentation {
            name: Some("read-docs".to_string()),
            decision_strategy: Some(DecisionStrategy::Affirmative),
            ..Default::default()
        };
        client
            .update_authz_scope_permission("abc", "perm-1", &permission)
            .await
            .expect("request");

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "PUT");
        assert_eq!(
            req.path,
            "/admin/realms/master/clients/abc/authz/resource-server/permission/scope/perm-1"
        );

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn create_authz_resource_round_trips_underscore_id() {
        let body = r#"{"_id":"res-9","name":"docs"}"#;
        let response = format!(
            "HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let resource = ResourceRepresentation {
            name: Some("docs".to_string()),
            uris: Some(vec!["/docs/*".to_string()]),
            ..Default::default()
        };
        let created = client
            .create_authz_resource("abc", &resource)
            .await
            .expect("request");
        assert_eq!(created.id.as_deref(), Some("res-9"));

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "POST");
        assert_eq!(
            req.path,
            "/admin/realms/master/clients/abc/authz/resource-server/resource"
        );
        let body: serde_json::Value = serde_json::from_slice(&req.body).expect("json body");
        assert_eq!(body, json!({"name": "docs", "uris": ["/docs/*"]}));

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn token_provider_sets_authorization_header() {
        struct FixedToken;
        impl TokenProvider for FixedToken {
            fn access_token(&self) -> Result<String, Error> {
                Ok("provided-token".to_string())
            }
        }

        let response = "HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n".to_string();
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .token_provider(Arc::new(FixedToken))
            .build()
            .expect("build");

        client.delete_user("u-1").await.expect("request");

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "DELETE");
        assert_eq!(req.path, "/admin/realms/master/users/u-1");
        assert_eq!(
            req.headers.get("authorization").map(String::as_str),
            Some("Bearer provided-token")
        );

        handle.join().expect("server");
    }

    #[tokio::test]
    async fn parse_error_maps_keycloak_error_body() {
        let body = r#"{"error":"invalid_request","error_description":"Missing grant"}"#;
        let response = format!(
            "HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, _rx, handle) = serve_once(response);
        let client = KeycloakAdminAsyncClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let err = client
            .list_client_roles("abc")
            .await
            .expect_err("should fail");
        match err {
            Error::Api(err) => {
                assert_eq!(err.code, 400);
                assert_eq!(err.message, "Missing grant");
                assert_eq!(err.error.as_deref(), Some("invalid_request"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        handle.join().expect("server");
    }

    struct CapturedRequest {
        method: String,
        path: String,
        headers: HashMap<String, String>,
        query: HashMap<String, String>,
        body: Vec<u8>,
    }

    fn serve_once(
        response: String,
    ) -> (
        String,
        mpsc::Receiver<CapturedRequest>,
        thread::JoinHandle<()>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let req = read_request(&mut stream);
                let _ = tx.send(req);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{}", addr), rx, handle)
    }

    fn read_request(stream: &mut TcpStream) -> CapturedRequest {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let mut header_end = loop {
            let read = stream.read(&mut chunk).unwrap_or(0);
            if read == 0 {
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..read]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        if header_end > buf.len() {
            header_end = buf.len();
        }

        let header_str = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = header_str.split("\r\n");
        let request_line = lines.next().unwrap_or("");
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or("").to_string();
        let full_path = parts.next().unwrap_or("");

        let mut path_parts = full_path.splitn(2, '?');
        let path = path_parts.next().unwrap_or("").to_string();
        let query_str = path_parts.next().unwrap_or("");
        let mut query = HashMap::new();
        for (k, v) in url::form_urlencoded::parse(query_str.as_bytes()) {
            query.insert(k.to_string(), v.to_string());
        }

        let mut headers = HashMap::new();
        let mut content_length = 0usize;
        for line in lines {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_ascii_lowercase();
                let value = value.trim().to_string();
                if key == "content-length" {
                    content_length = value.parse().unwrap_or(0);
                }
                headers.insert(key, value);
            }
        }

        let mut body = buf[header_end..].to_vec();
        while body.len() < content_length {
            let read = stream.read(&mut chunk).unwrap_or(0);
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }
        body.truncate(content_length);

        CapturedRequest {
            method,
            path,
            headers,
            query,
            body,
        }
    }
}
