use crate::error::{
    read_body_with_limit, Error, CONFIG_ERROR_REDIRECT_WITH_AUTH, MAX_ERROR_BODY_BYTES,
};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::{header, Certificate, Identity, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::common;
use super::common::TokenProvider;

mod authz;
mod clients;
mod groups;
mod realm_roles;
mod users;

/// Builder for [`KeycloakAdminClient`].
///
/// The `base_url` should point at the Keycloak server root, for example
/// `https://kc.example.com`; the admin prefix (`/admin/realms/{realm}`)
/// is appended per request.
pub struct KeycloakAdminClientBuilder {
    base_url: Url,
    realm: String,
    timeout: Option<Duration>,
    follow_redirects: bool,
    identity: Option<Identity>,
    ca_certs: Vec<Certificate>,
    auth: Option<common::AuthProvider>,
}

impl KeycloakAdminClientBuilder {
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
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(common::AuthProvider::Bearer {
            token: token.into(),
        });
        self
    }

    /// Configures a token source queried before each request. Session
    /// management stays with the provider.
    pub fn token_provider(mut self, source: Arc<dyn TokenProvider>) -> Self {
        self.auth = Some(common::AuthProvider::Provider { source });
        self
    }

    pub fn build(self) -> Result<KeycloakAdminClient, Error> {
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
        Ok(KeycloakAdminClient {
            base_url: self.base_url,
            realm: self.realm,
            http,
            auth: self.auth,
        })
    }
}

/// Blocking client for the Keycloak Admin REST API.
///
/// Every method is a single request/response round trip; nothing is
/// cached or retried.
pub struct KeycloakAdminClient {
    base_url: Url,
    realm: String,
    http: HttpClient,
    auth: Option<common::AuthProvider>,
}

impl KeycloakAdminClient {
    pub fn builder(base_url: impl AsRef<str>) -> Result<KeycloakAdminClientBuilder, Error> {
        KeycloakAdminClientBuilder::new(base_url)
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
        common::build_url(&self.base_url, &all, common::BuildUrlOptions::SYNC_CLIENT)
    }

    fn apply_auth(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        common::apply_auth(req, &self.auth, |req, value, _ctx| {
            Ok(req.header(header::AUTHORIZATION, value))
        })
    }

    fn expect_ok_json<T: serde::de::DeserializeOwned>(&self, resp: Response) -> Result<T, Error> {
        if resp.status() == StatusCode::OK {
            resp.json::<T>().map_err(Error::from)
        } else {
            self.parse_error(resp)
        }
    }

    fn expect_ok_json_or_not_found<T: serde::de::DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<Option<T>, Error> {
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => resp.json::<T>().map(Some).map_err(Error::from),
            _ => self.parse_error(resp),
        }
    }

    fn expect_created_json<T: serde::de::DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, Error> {
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => resp.json::<T>().map_err(Error::from),
            _ => self.parse_error(resp),
        }
    }

    fn expect_no_content(&self, resp: Response) -> Result<(), Error> {
        if resp.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            self.parse_error(resp)
        }
    }

    fn expect_success(&self, resp: Response) -> Result<(), Error> {
        if resp.status().is_success() {
            Ok(())
        } else {
            self.parse_error(resp)
        }
    }

    fn expect_created_id(&self, resp: Response) -> Result<String, Error> {
        if resp.status().is_success() {
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok());
            common::created_id_from_location(location).ok_or(Error::MissingLocation)
        } else {
            self.parse_error(resp)
        }
    }

    fn parse_error<T>(&self, mut resp: Response) -> Result<T, Error> {
        let status = resp.status();
        let body = read_body_with_limit(&mut resp, MAX_ERROR_BODY_BYTES)?;
        Err(common::parse_error_from_body(status, &body, false))
    }
}

#[cfg(test)]
mod tests {
    use crate::admin::ClientQuery;
    use crate::error::{Error, CONFIG_ERROR_REDIRECT_WITH_AUTH};
    use crate::models::ClientRepresentation;
    use crate::KeycloakAdminClient;
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn find_clients_sets_query_params() {
        let body = r#"[{"id":"abc","clientId":"my-app"}]"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let query = ClientQuery {
            client_id: Some("my-app".to_string()),
            viewable_only: Some(true),
            max: Some(10),
            ..Default::default()
        };
        let clients = client.find_clients(&query).expect("request");
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].client_id.as_deref(), Some("my-app"));

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/admin/realms/master/clients");
        assert_eq!(req.query.get("clientId").map(String::as_str), Some("my-app"));
        assert_eq!(req.query.get("viewableOnly").map(String::as_str), Some("true"));
        assert_eq!(req.query.get("max").map(String::as_str), Some("10"));
        assert!(req.headers.contains_key("host"));

        handle.join().expect("server");
    }

    #[test]
    fn bearer_auth_sets_authorization_header() {
        let response = "HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n".to_string();
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminClient::builder(base_url)
            .expect("builder")
            .bearer_auth("admin-token")
            .build()
            .expect("build");

        client.delete_client("abc").expect("request");

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "DELETE");
        assert_eq!(req.path, "/admin/realms/master/clients/abc");
        assert_eq!(
            req.headers.get("authorization").map(String::as_str),
            Some("Bearer admin-token")
        );

        handle.join().expect("server");
    }

    #[test]
    fn get_client_returns_none_on_not_found() {
        let body = r#"{"error":"Client not found"}"#;
        let response = format!(
            "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let found = client.get_client("missing").expect("request");
        assert!(found.is_none());

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/admin/realms/master/clients/missing");

        handle.join().expect("server");
    }

    #[test]
    fn create_client_returns_id_from_location() {
        let response = "HTTP/1.1 201 Created\r\nLocation: /admin/realms/master/clients/abc-123\r\nContent-Length: 0\r\n\r\n".to_string();
        let (base_url, rx, handle) = serve_once(response);
        let client = KeycloakAdminClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let new_client = ClientRepresentation {
            client_id: Some("my-app".to_string()),
            ..Default::default()
        };
        let id = client.create_client(&new_client).expect("request");
        assert_eq!(id, "abc-123");

        let req = rx.recv().expect("request");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/admin/realms/master/clients");

        handle.join().expect("server");
    }

    #[test]
    fn builder_defaults_to_master_realm_and_thirty_second_timeout() {
        let builder =
            KeycloakAdminClient::builder("https://kc.example.com").expect("builder");
        assert_eq!(builder.realm, "master");
        assert_eq!(
            builder.timeout,
            Some(std::time::Duration::from_secs(30))
        );
        assert!(!builder.follow_redirects);
    }

    #[test]
    fn auth_requires_redirects_disabled() {
        let err = match KeycloakAdminClient::builder("https://kc.example.com")
            .expect("builder")
            .follow_redirects(true)
            .bearer_auth("token")
            .build()
        {
            Ok(_) => panic!("expected error"),
            Err(err) => err,
        };
        match err {
            Error::Config(message) => {
                assert_eq!(message, CONFIG_ERROR_REDIRECT_WITH_AUTH);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn build_url_scopes_to_realm_and_trims_trailing_slash() {
        let client = KeycloakAdminClient::builder("https://kc.example.com/auth/")
            .expect("builder")
            .realm("demo")
            .build()
            .expect("build");
        let url = client.build_url(&["clients"]).expect("url");
        assert_eq!(url.path(), "/auth/admin/realms/demo/clients");
    }

    #[test]
    fn for_realm_switches_admin_path() {
        let client = KeycloakAdminClient::builder("https://kc.example.com")
            .expect("builder")
            .build()
            .expect("build");
        assert_eq!(client.realm(), "master");

        let scoped = client.for_realm("tenant-a");
        assert_eq!(scoped.realm(), "tenant-a");
        let url = scoped.build_url(&["users"]).expect("url");
        assert_eq!(url.path(), "/admin/realms/tenant-a/users");
    }

    #[test]
    fn api_error_carries_status_and_message() {
        let body = r#"{"errorMessage":"User exists with same username"}"#;
        let response = format!(
            "HTTP/1.1 409 Conflict\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, _rx, handle) = serve_once(response);
        let client = KeycloakAdminClient::builder(base_url)
            .expect("builder")
            .build()
            .expect("build");

        let err = client.get_user("u-1").expect_err("should fail");
        match err {
            Error::Api(err) => {
                assert_eq!(err.code, 409);
                assert_eq!(err.message, "User exists with same username");
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
        loop {
            let read = stream.read(&mut chunk).unwrap_or(0);
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);
            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let header_end = buf
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|pos| pos + 4)
            .unwrap_or(buf.len());
        let header_str = String::from_utf8_lossy(&buf[..header_end]);
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
        for line in lines {
            if let Some((key, value)) = line.split_once(':') {
                headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        CapturedRequest {
            method,
            path,
            headers,
            query,
        }
    }
}
