//! Pluggable execution of plain-data HTTP requests.
//!
//! `ApiClient` never talks to the network itself: it hands an `HttpRequest`
//! to a `Transport` and classifies the `HttpResponse` it gets back. The
//! default implementation drives a ureq agent; hosts can supply their own.

use std::fmt;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick};
use ureq::http::{Method, Request, Response};
use ureq::{Agent, AsSendBody, Body};

use crate::context::Context;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// How often an in-flight request looks at its context.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Executes one request and returns the full response.
///
/// Implementations must report a failure to get any response as
/// `ApiError::Transport` and a failure to read the body of a received
/// response as `ApiError::BodyRead`. Status codes are returned as data,
/// never as errors. `ctx` bounds the call: its remaining time is the
/// timeout, and cancelling it while the call is in flight yields
/// `ApiError::Transport`.
pub trait Transport: Send + Sync + fmt::Debug {
    fn execute(&self, request: HttpRequest, ctx: &Context) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a ureq [`Agent`].
///
/// The agent keeps its own connection pool and is shared by clones. Each
/// call runs on a worker thread so that the caller can return as soon as
/// its context is cancelled; the abandoned worker finishes on its own.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Transport with ureq's defaults except that every status code is
    /// returned as a response.
    ///
    /// Redirects are followed (up to ureq's limit of 10), so a 3xx only
    /// reaches the caller when that limit is exhausted. Hosts that need to
    /// see redirects pass an agent configured not to follow them to
    /// [`UreqTransport::with_agent`].
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. It must not turn status codes into errors.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest, ctx: &Context) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        let timeout = ctx.remaining();
        let (done_tx, done_rx) = bounded(1);
        thread::Builder::new()
            .name("warren-http".to_string())
            .spawn(move || {
                // The caller may have stopped listening after a cancel.
                let _ = done_tx.send(call(&agent, request, timeout));
            })
            .map_err(|e| ApiError::Transport(format!("failed to start request worker: {e}")))?;

        let ticker = tick(CANCEL_POLL);
        loop {
            select! {
                recv(done_rx) -> result => {
                    return result.unwrap_or_else(|_| Err(ApiError::Transport("request worker exited".to_string())));
                }
                recv(ticker) -> _ => {
                    if ctx.is_cancelled() {
                        return Err(ApiError::Transport("context cancelled".to_string()));
                    }
                }
            }
        }
    }
}

fn call(agent: &Agent, request: HttpRequest, timeout: Option<Duration>) -> Result<HttpResponse, ApiError> {
    let method = Method::from_bytes(request.method.as_str().as_bytes())
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let mut builder = Request::builder().method(method).uri(request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let mut response = match request.body {
        Some(body) => {
            let req = builder.body(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
            run(agent, req, timeout)?
        }
        None => {
            let req = builder.body(()).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
            run(agent, req, timeout)?
        }
    };

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    // ureq caps bodies at 10 MiB unless told otherwise.
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| ApiError::BodyRead(format!("status={status}: {e}")))?;

    Ok(HttpResponse { status, headers, body })
}

fn run<S: AsSendBody>(agent: &Agent, request: Request<S>, timeout: Option<Duration>) -> Result<Response<Body>, ApiError> {
    let request = match timeout {
        Some(t) => agent.configure_request(request).timeout_global(Some(t)).build(),
        None => request,
    };
    agent.run(request).map_err(|e| ApiError::Transport(e.to_string()))
}
