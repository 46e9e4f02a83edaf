//! Request building, dispatch and response checking for the Facturapi API.
//!
//! # Design
//! `Client` owns a [`Config`] and a [`Transport`]. Each verb is split into a
//! pure part (`build_request`, `check_response`, `parse_json`) and a single
//! transport round-trip, so request shaping can be tested without a network.
//! There is no retry and no timeout policy: one call, one attempt.

use base64::Engine as _;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{FacturapiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::sanitize::{strip_nulls, Sanitize};

/// Client identifier sent as `User-Agent`.
pub const USER_AGENT: &str = concat!("facturapi-rust/", env!("CARGO_PKG_VERSION"));

/// Handle used by every resource operation.
#[derive(Debug, Clone)]
pub struct Client<T: Transport = UreqTransport> {
    config: Config,
    transport: T,
}

impl Client<UreqTransport> {
    /// Client over the default blocking transport.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Client configured from `FACTURAPI_KEY` / `FACTURAPI_HOST`.
    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    /// Replace the API key. The latest call wins.
    pub fn configure(&mut self, api_key: impl Into<String>) {
        self.config.set_api_key(api_key.into());
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build a request against `endpoint`.
    ///
    /// `body` is sent as-is; use [`prepare_body`] to sanitize request objects.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        let mut url = Url::parse(&format!("{}{}", self.config.origin(), join_endpoint(endpoint)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let headers = vec![
            ("Authorization".to_string(), basic_auth(self.config.api_key())),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];

        let body = body.map(serde_json::to_vec).transpose()?;

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// `GET endpoint?params`, returning the decoded JSON body.
    #[tracing::instrument(level = "debug", skip(self, params))]
    pub fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value> {
        let request = self.build_request(HttpMethod::Get, endpoint, params, None)?;
        parse_json(self.execute(request)?)
    }

    /// `POST endpoint` with a sanitized, null-free body.
    #[tracing::instrument(level = "debug", skip(self, body))]
    pub fn post<B: Sanitize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let body = prepare_body(body);
        let request = self.build_request(HttpMethod::Post, endpoint, &[], Some(&body))?;
        parse_json(self.execute(request)?)
    }

    /// `PUT endpoint` with a sanitized, null-free body.
    #[tracing::instrument(level = "debug", skip(self, body))]
    pub fn put<B: Sanitize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        let body = prepare_body(body);
        let request = self.build_request(HttpMethod::Put, endpoint, &[], Some(&body))?;
        parse_json(self.execute(request)?)
    }

    /// `DELETE endpoint?params`, returning the decoded JSON body.
    #[tracing::instrument(level = "debug", skip(self, params))]
    pub fn delete(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value> {
        let request = self.build_request(HttpMethod::Delete, endpoint, params, None)?;
        parse_json(self.execute(request)?)
    }

    /// `GET endpoint`, returning the raw response bytes.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn download(&self, endpoint: &str) -> Result<Vec<u8>> {
        let request = self.build_request(HttpMethod::Get, endpoint, &[], None)?;
        Ok(self.execute(request)?.body)
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let response = self.transport.send(request)?;
        tracing::debug!(method = method.as_str(), status = response.status, "response received");
        check_response(response)
    }
}

/// Sanitize a request object and drop every null-valued key.
pub fn prepare_body<B: Sanitize + ?Sized>(body: &B) -> Value {
    strip_nulls(body.sanitize())
}

/// Turn a non-2xx response into [`FacturapiError::Response`].
///
/// The body is kept verbatim: parsed as JSON when possible, otherwise as a
/// JSON string of the raw text.
pub fn check_response(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let body = serde_json::from_slice(&response.body).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&response.body).into_owned())
    });
    Err(FacturapiError::Response {
        status: response.status,
        body,
    })
}

/// Decode a successful response body. An empty body decodes to `null`.
pub fn parse_json(response: HttpResponse) -> Result<Value> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// Normalize `endpoint` into an absolute path.
///
/// Empty and `.` segments are dropped and `..` never climbs above the root,
/// so `customers`, `/customers/` and `a/../customers` all map to
/// `/customers`.
pub fn join_endpoint(endpoint: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in endpoint.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

fn basic_auth(api_key: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{api_key}:"));
    format!("Basic {token}")
}
