//! Authenticated request execution for the Warren API.
//!
//! # Design
//! `ApiClient` holds a base URL, an API key and a shared transport, and
//! carries no mutable state between calls. A call is split in two steps:
//! `build_request` turns a `RequestConfig` into a plain-data `HttpRequest`
//! (no I/O, every validation happens here), then the transport executes it
//! and the response is classified by status code into a `ClientResponse`.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::{RequestConfig, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
use crate::transport::{Transport, UreqTransport};

pub const API_KEY_HEADER: &str = "apikey";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Outcome of one API call.
///
/// `body` holds whatever the provider returned, including on failure so that
/// provider-specific error payloads stay readable. `error` is `None` only for
/// status codes below 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    pub body: Vec<u8>,
    pub error: Option<ApiError>,
}

impl ClientResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { body, error: None }
    }

    pub fn failed(error: ApiError) -> Self {
        Self {
            body: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_result(self) -> Result<Vec<u8>, ApiError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.body),
        }
    }

    /// Propagate the call error, or decode the body as JSON.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let body = self.into_result()?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Client for the Warren REST API.
///
/// Cheap to clone; clones share the transport and its connection pool.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client over the default ureq transport.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_transport(base_url, api_key, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(base_url: &str, api_key: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            transport,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    /// Client configured from `WARREN_API_BASE_URL` and `WARREN_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_config(&ClientConfig::from_env())
    }

    /// Copy of this client that authenticates with `api_key`.
    pub fn with_api_key(&self, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Turn `cfg` into an authenticated request without sending it.
    ///
    /// Body errors from `cfg.body()` are returned unchanged; a cancelled or
    /// expired `ctx`, a bad method token, a malformed URL or an API key that
    /// cannot be sent as a header value yield `ApiError::InvalidRequest`.
    pub fn build_request(&self, ctx: &Context, cfg: &RequestConfig) -> Result<HttpRequest, ApiError> {
        let body = cfg.body()?;
        ctx.check()?;
        let method = HttpMethod::parse(&cfg.method)?;

        let url = cfg.url(&self.base_url);
        url::Url::parse(&url).map_err(|e| ApiError::InvalidRequest(format!("invalid url {url:?}: {e}")))?;

        if self.api_key.bytes().any(|b| b.is_ascii_control() && b != b'\t') {
            return Err(ApiError::InvalidRequest("api key is not a valid header value".to_string()));
        }

        let mut request = HttpRequest {
            method,
            url,
            headers: Vec::new(),
            body: None,
        };
        request.set_header(API_KEY_HEADER, &self.api_key);
        if let Some(content_type) = body.content_type() {
            request.set_header(CONTENT_TYPE_HEADER, content_type);
        }
        request.body = body.into_bytes();
        Ok(request)
    }

    /// Send `cfg` declaring a form-encoded payload.
    pub fn form_request(&self, ctx: &Context, cfg: &RequestConfig) -> ClientResponse {
        self.request_as(ctx, cfg, Some(CONTENT_TYPE_FORM))
    }

    /// Send `cfg` declaring a JSON payload.
    pub fn json_request(&self, ctx: &Context, cfg: &RequestConfig) -> ClientResponse {
        self.request_as(ctx, cfg, Some(CONTENT_TYPE_JSON))
    }

    /// Send `cfg` with the content type of whichever body it carries.
    pub fn send(&self, ctx: &Context, cfg: &RequestConfig) -> ClientResponse {
        self.request_as(ctx, cfg, None)
    }

    fn request_as(&self, ctx: &Context, cfg: &RequestConfig, content_type: Option<&str>) -> ClientResponse {
        let mut request = match self.build_request(ctx, cfg) {
            Ok(request) => request,
            Err(err) => return ClientResponse::failed(err),
        };
        if let Some(content_type) = content_type {
            request.set_header(CONTENT_TYPE_HEADER, content_type);
        }
        self.execute(ctx, request)
    }

    fn execute(&self, ctx: &Context, request: HttpRequest) -> ClientResponse {
        debug!(method = %request.method, url = %request.url, "sending api request");
        match self.transport.execute(request, ctx) {
            Ok(response) => classify(response),
            Err(err) => {
                debug!(error = %err, "api request failed");
                ClientResponse::failed(err)
            }
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("transport", &self.transport)
            .finish()
    }
}

/// 2xx and 3xx are success; anything from 400 up is an `ApiError::Api`
/// that keeps the body.
fn classify(response: HttpResponse) -> ClientResponse {
    debug!(status = response.status, bytes = response.body.len(), "received api response");
    if response.status >= 400 {
        let error = ApiError::Api {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        };
        return ClientResponse {
            body: response.body,
            error: Some(error),
        };
    }
    ClientResponse::ok(response.body)
}
