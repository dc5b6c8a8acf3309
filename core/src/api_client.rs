//! Request/response layer shared by every facade operation.
//!
//! # Design
//! `build_request` turns a verb, URL template, path parameters, optional body
//! and query parameters into an `HttpRequest`; `parse_response` turns the
//! `HttpResponse` back into the decoded JSON object. `do_get`, `do_post` and
//! `do_put` glue the two around a single `Transport::execute` call. There are
//! no retries and nothing is cached.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{HyperwalletError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::uri_template;

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Query-string pairs forwarded verbatim to list endpoints, in caller order.
/// Repeated keys are sent as given.
pub type QueryParams = Vec<(String, String)>;

/// Performs one logical API interaction per call.
#[derive(Clone)]
pub struct ApiClient {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn do_get(
        &self,
        template: &str,
        path_params: &[(&str, &str)],
        query: &QueryParams,
    ) -> Result<Map<String, Value>> {
        let request = self.build_request::<()>(HttpMethod::Get, template, path_params, None, query)?;
        self.send(request)
    }

    pub fn do_post<B: Serialize>(
        &self,
        template: &str,
        path_params: &[(&str, &str)],
        body: &B,
        query: &QueryParams,
    ) -> Result<Map<String, Value>> {
        let request = self.build_request(HttpMethod::Post, template, path_params, Some(body), query)?;
        self.send(request)
    }

    pub fn do_put<B: Serialize>(
        &self,
        template: &str,
        path_params: &[(&str, &str)],
        body: &B,
        query: &QueryParams,
    ) -> Result<Map<String, Value>> {
        let request = self.build_request(HttpMethod::Put, template, path_params, Some(body), query)?;
        self.send(request)
    }

    pub fn build_request<B: Serialize>(
        &self,
        method: HttpMethod,
        template: &str,
        path_params: &[(&str, &str)],
        body: Option<&B>,
        query: &QueryParams,
    ) -> Result<HttpRequest> {
        let mut url = format!(
            "{}{}",
            self.config.server(),
            uri_template::expand(template, path_params)?
        );
        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }

        let mut headers = vec![
            ("authorization".to_string(), self.authorization()),
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), USER_AGENT.to_string()),
        ];

        let body = match body {
            Some(body) => {
                let json = serde_json::to_string(body)
                    .map_err(|e| HyperwalletError::Serialization(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(json)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Decode a response body into a JSON object.
    ///
    /// A 2xx response with an empty body (e.g. `204 No Content`) decodes to
    /// an empty object.
    pub fn parse_response(response: HttpResponse) -> Result<Map<String, Value>> {
        if !(200..300).contains(&response.status) {
            let payload = serde_json::from_str(&response.body).ok();
            return Err(HyperwalletError::Api {
                status: response.status,
                body: response.body,
                payload,
            });
        }
        if response.body.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&response.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(HyperwalletError::Deserialization(format!(
                "expected a JSON object, got {other}"
            ))),
            Err(e) => Err(HyperwalletError::Deserialization(e.to_string())),
        }
    }

    fn send(&self, request: HttpRequest) -> Result<Map<String, Value>> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request).inspect_err(|err| {
            tracing::warn!(method = %request.method, url = %request.url, "transport failed: {err}");
        })?;
        tracing::debug!(status = response.status, "received response");
        if !(200..300).contains(&response.status) {
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                status = response.status,
                "request rejected"
            );
        }
        Self::parse_response(response)
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.username(), self.config.password());
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
