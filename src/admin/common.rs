use crate::error::{fallback_message, ApiError, Error};
use reqwest::blocking::RequestBuilder as BlockingRequestBuilder;
use reqwest::RequestBuilder as AsyncRequestBuilder;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Request timeout applied when the builder is not given one.
pub(crate) const DEFAULT_ADMIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of admin access tokens.
///
/// Token acquisition and refresh are the caller's responsibility; the
/// client asks for a token before each request and never inspects or
/// caches it.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Result<String, Error>;
}

#[derive(Clone)]
pub(crate) enum AuthProvider {
    Bearer { token: String },
    Provider { source: Arc<dyn TokenProvider> },
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum AuthContext {
    Config,
    Provider,
}

pub(crate) fn apply_auth<B, F>(
    req: B,
    auth: &Option<AuthProvider>,
    mut set_header: F,
) -> Result<B, Error>
where
    F: FnMut(B, &str, AuthContext) -> Result<B, Error>,
{
    let Some(auth) = auth else {
        return Ok(req);
    };
    match auth {
        AuthProvider::Bearer { token } => {
            set_header(req, &format!("Bearer {token}"), AuthContext::Config)
        }
        AuthProvider::Provider { source } => {
            let token = source.access_token()?;
            set_header(req, &format!("Bearer {token}"), AuthContext::Provider)
        }
    }
}

pub(crate) trait RequestBuilderExt: Sized {
    fn with_query(self, params: &[(&'static str, String)]) -> Self;
}

impl RequestBuilderExt for BlockingRequestBuilder {
    fn with_query(self, params: &[(&'static str, String)]) -> Self {
        self.query(params)
    }
}

impl RequestBuilderExt for AsyncRequestBuilder {
    fn with_query(self, params: &[(&'static str, String)]) -> Self {
        self.query(params)
    }
}

pub(crate) use crate::build_url::BuildUrlOptions;

pub(crate) fn build_url(
    base_url: &Url,
    segments: &[&str],
    options: BuildUrlOptions,
) -> Result<Url, Error> {
    let mut url = base_url.clone();
    if options.clear_query {
        url.set_query(None);
    }
    if options.clear_fragment {
        url.set_fragment(None);
    }
    {
        let mut path_segments = url
            .path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        if options.pop_if_empty {
            path_segments.pop_if_empty();
        }
        for segment in segments {
            path_segments.push(segment);
        }
    }
    Ok(url)
}

pub(crate) fn apply_query_params<B: RequestBuilderExt>(
    req: B,
    params: Vec<(&'static str, String)>,
) -> B {
    if params.is_empty() {
        req
    } else {
        req.with_query(&params)
    }
}

/// Extracts the created-resource identifier from a `Location` header,
/// i.e. the last non-empty path segment.
pub(crate) fn created_id_from_location(location: Option<&str>) -> Option<String> {
    let location = location?;
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_error_from_body(
    status: StatusCode,
    body: &[u8],
    fallback_to_status: bool,
) -> Error {
    let fallback = if fallback_to_status {
        fallback_message(status, body)
    } else {
        String::from_utf8_lossy(body).trim().to_string()
    };
    let mut err = serde_json::from_slice::<ApiError>(body).unwrap_or_default();
    err.code = status.as_u16() as i32;
    err.message = err
        .error_message
        .clone()
        .or_else(|| err.error_description.clone())
        .or_else(|| err.error.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback);
    Error::Api(err)
}
