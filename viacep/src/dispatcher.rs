// ViaCEP
// Copyright 2025 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Dispatcher for outbound requests to the upstream web API.

use crate::clocks::Clock;
use log::warn;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{tls, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Delay until retrying a request after the upstream reports rate-limiting.
const BACKOFF_SECS: u64 = 5;

/// Content type applied to outgoing requests unless the caller overrides it.
const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// User agent applied to outgoing requests unless the caller overrides it.
const PRODUCT_USER_AGENT: &str = concat!("viacep/", env!("CARGO_PKG_VERSION"));

/// Errors returned by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The upstream failed with a status outside of the not-found family, or
    /// the request could not be delivered at all.
    #[error("{0}")]
    Upstream(String),

    /// A payload exchanged with the upstream did not have the expected shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for this module.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Converts a `reqwest::Error` to a `DispatchError`.
fn reqwest_error_to_dispatch_error(e: reqwest::Error) -> DispatchError {
    DispatchError::Upstream(e.to_string())
}

/// Drops explicit `null` members from objects, recursively, so they are
/// omitted from serialized payloads instead of going out on the wire.
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(members) => Value::Object(
            members
                .iter()
                .filter(|(_name, value)| !value.is_null())
                .map(|(name, value)| (name.clone(), strip_nulls(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

/// Derives a human-readable message from a failed response.
///
/// Prefers the JSON content of the error body and falls back to the raw body.
/// An empty body yields a message carrying the numeric status code, and a body
/// that cannot be read yields the transport error's own text.
async fn upstream_message(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(content) if content.is_empty() => {
            format!("Empty response body; status code {}", status.as_u16())
        }
        Ok(content) => match serde_json::from_str::<Value>(&content) {
            Ok(json) => json.to_string(),
            Err(_) => content,
        },
        Err(e) => e.to_string(),
    }
}

/// Applies the response policy to a completed exchange.
///
/// Success bodies come back as text, a 404 or 422 collapses to an empty
/// payload because those statuses mean "no matching address", and any other
/// failed status becomes an upstream error.
async fn finish(response: Response) -> DispatchResult<String> {
    let status = response.status();
    if status.is_success() {
        return response.text().await.map_err(reqwest_error_to_dispatch_error);
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => Ok(String::new()),
        _ => Err(DispatchError::Upstream(upstream_message(response).await)),
    }
}

/// Sender of requests to the upstream web API.
///
/// The dispatcher owns the connection pool and the retry policy but knows
/// nothing about URL shapes; those belong to the clients built on top of it.
#[derive(Clone)]
pub struct Dispatcher {
    /// Asynchronous HTTP client with which to issue the requests.
    client: Client,

    /// The clock on which the rate-limit retry waits.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Dispatcher {
    /// Creates a new dispatcher that waits on `clock` when backing off.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Result<Self, String> {
        // The upstream negotiates TLS 1.2 at top; rustls cannot express the
        // older protocol versions the service also accepts.
        let client = Client::builder()
            .gzip(true)
            .max_tls_version(tls::Version::TLS_1_2)
            .build()
            .map_err(|e| format!("Failed to build the HTTP client: {}", e))?;
        Ok(Self { client, clock })
    }

    /// Builds and issues one request, without applying any response policy.
    ///
    /// Caller headers are applied verbatim except for the content type and the
    /// user agent, which override the defaults instead of duplicating them.
    async fn issue(
        &self,
        url: &str,
        method: &Method,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> DispatchResult<Response> {
        let mut content_type = DEFAULT_CONTENT_TYPE;
        let mut user_agent = PRODUCT_USER_AGENT;
        let mut builder = self.client.request(method.clone(), url);
        for (name, value) in headers.iter().copied() {
            if name.eq_ignore_ascii_case("content-type") {
                content_type = value;
            } else if name.eq_ignore_ascii_case("user-agent") {
                user_agent = value;
            } else {
                builder = builder.header(name, value);
            }
        }
        builder = builder.header(CONTENT_TYPE, content_type).header(USER_AGENT, user_agent);

        if let Some(body) = body {
            let payload = if content_type.contains("json") {
                serde_json::to_string_pretty(&strip_nulls(body))?
            } else {
                match body {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                }
            };
            builder = builder.body(payload);
        }

        builder.send().await.map_err(reqwest_error_to_dispatch_error)
    }

    /// Sends a request and returns the full response body as text.
    ///
    /// A 429 response triggers exactly one retry of the identical request,
    /// caller headers included, after a fixed delay on the injected clock.  A
    /// second 429 propagates as a regular upstream error.
    pub async fn send(
        &self,
        url: &str,
        method: Method,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> DispatchResult<String> {
        let response = self.issue(url, &method, body, headers).await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("Upstream rate-limited {} {}; retrying in {}s", method, url, BACKOFF_SECS);
            self.clock.sleep(Duration::from_secs(BACKOFF_SECS)).await;
            let response = self.issue(url, &method, body, headers).await?;
            return finish(response).await;
        }
        finish(response).await
    }

    /// Sends a request like `send` and deserializes the response as JSON.
    ///
    /// The empty payload that `send` produces for a missing entity
    /// deserializes to `None`.  Payloads of an unexpected shape propagate the
    /// deserialization error unchanged.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> DispatchResult<Option<T>> {
        let text = self.send(url, method, body, headers).await?;
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Sends a form-url-encoded request and deserializes the JSON response.
    ///
    /// This path is independent from `send`: it always identifies itself with
    /// the product user agent, applies caller headers verbatim, and has no
    /// retry or empty-result special-casing, so transport errors surface
    /// directly.
    pub async fn dispatch_form<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        body: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> DispatchResult<T> {
        let mut builder =
            self.client.request(method, url).header(USER_AGENT, PRODUCT_USER_AGENT).form(body);
        for (name, value) in headers.iter().copied() {
            builder = builder.header(name, value);
        }
        let response = builder.send().await.map_err(reqwest_error_to_dispatch_error)?;
        let text = response.text().await.map_err(reqwest_error_to_dispatch_error)?;
        Ok(serde_json::from_str(&text)?)
    }
}
