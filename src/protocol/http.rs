// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the WLED JSON API.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, multipart};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::RetryPolicy;

/// Path of the state endpoint; POSTs to it get `"v": true` added.
pub const STATE_PATH: &str = "/json/state";

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection parameters for a WLED device.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wled_lib::protocol::{HttpConfig, RetryPolicy};
///
/// let config = HttpConfig::new("192.168.1.50");
/// assert_eq!(config.base_url(), "http://192.168.1.50");
/// assert_eq!(config.websocket_url(), "ws://192.168.1.50/ws");
///
/// let config = HttpConfig::new("wled.local")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(3))
///     .with_retry(RetryPolicy::disabled());
/// assert_eq!(config.base_url(), "http://wled.local:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    websocket_port: Option<u16>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            websocket_port: None,
            timeout: Self::DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets the WebSocket port when it differs from the HTTP port.
    #[must_use]
    pub fn with_websocket_port(mut self, port: u16) -> Self {
        self.websocket_port = Some(port);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether HTTPS is enabled.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{scheme}://{}{}", self.host, self.base_port_suffix())
    }

    /// Builds the WebSocket URL from this configuration.
    #[must_use]
    pub fn websocket_url(&self) -> String {
        let scheme = if self.use_https { "wss" } else { "ws" };
        let port = self.websocket_port.unwrap_or(self.port);
        format!("{scheme}://{}{}/ws", self.host, self.port_suffix(port))
    }

    fn base_port_suffix(&self) -> String {
        self.port_suffix(self.port)
    }

    fn port_suffix(&self, port: u16) -> String {
        if (self.use_https && port == Self::DEFAULT_HTTPS_PORT)
            || (!self.use_https && port == Self::DEFAULT_PORT)
        {
            String::new()
        } else {
            format!(":{port}")
        }
    }

    /// Creates an [`HttpClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url(),
            client,
            retry: self.retry,
        })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the WLED JSON API.
///
/// Every request goes through the configured [`RetryPolicy`].
///
/// # Examples
///
/// ```no_run
/// use serde_json::json;
/// use wled_lib::protocol::HttpConfig;
///
/// # async fn example() -> Result<(), wled_lib::error::ProtocolError> {
/// let client = HttpConfig::new("192.168.1.50").into_client()?;
/// let info = client.get_json("/json/info").await?;
/// client.post("/json/state", &json!({"on": true})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Creates a client with the default configuration for `host`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(host).into_client()
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the underlying `reqwest` client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends a request to `path` on the device.
    ///
    /// A POST to [`STATE_PATH`] with an object body gets `"v": true` added so
    /// the device answers with its new state. The response is returned as
    /// JSON when the device says it is JSON, otherwise as a string value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ResponseStatus`] for 4xx/5xx answers, or the
    /// transport error once retries are exhausted.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ProtocolError> {
        let mut body = body.cloned();
        if method == Method::POST
            && path == STATE_PATH
            && let Some(Value::Object(map)) = body.as_mut()
        {
            map.insert("v".to_string(), Value::Bool(true));
        }

        self.retry
            .run(|| self.send_once(method.clone(), path, body.as_ref()))
            .await
    }

    /// GETs `path` and requires a non-empty body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyResponse`] if the device answered with
    /// nothing, after retrying.
    pub async fn get_json(&self, path: &str) -> Result<Value, ProtocolError> {
        self.retry
            .run(|| async move {
                let value = self.send_once(Method::GET, path, None).await?;
                if is_empty(&value) {
                    return Err(ProtocolError::EmptyResponse(path.to_string()));
                }
                Ok(value)
            })
            .await
    }

    /// POSTs a JSON body to `path`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ProtocolError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Uploads a file as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ResponseStatus`] for 4xx/5xx answers.
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Value, ProtocolError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, file = %file_name, size = content.len(), "Uploading file");

        let part = multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        read_response(response).await
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ProtocolError> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(url = %url, method = %method, "Sending HTTP request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ProtocolError::Http)?;
        read_response(response).await
    }
}

/// Reads a response body, turning 4xx/5xx into [`ProtocolError::ResponseStatus`].
pub(crate) async fn read_response(response: reqwest::Response) -> Result<Value, ProtocolError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let text = response.text().await.map_err(ProtocolError::Http)?;
    let body = if is_json {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    } else {
        Value::String(text)
    };

    if status.is_client_error() || status.is_server_error() {
        tracing::debug!(status = status.as_u16(), body = %body, "Request rejected");
        return Err(ProtocolError::ResponseStatus {
            status: status.as_u16(),
            message: body,
        });
    }

    tracing::debug!(status = status.as_u16(), "Received HTTP response");
    Ok(body)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls() {
        let config = HttpConfig::new("10.0.0.2").with_https();
        assert_eq!(config.port(), 443);
        assert_eq!(config.base_url(), "https://10.0.0.2");
        assert_eq!(config.websocket_url(), "wss://10.0.0.2/ws");

        let config = HttpConfig::new("10.0.0.2").with_port(81);
        assert_eq!(config.websocket_url(), "ws://10.0.0.2:81/ws");
    }

    #[test]
    fn websocket_port_overrides_http_port() {
        let config = HttpConfig::new("127.0.0.1")
            .with_port(8080)
            .with_websocket_port(9001);
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.websocket_url(), "ws://127.0.0.1:9001/ws");

        let config = HttpConfig::new("10.0.0.2").with_https().with_websocket_port(443);
        assert_eq!(config.websocket_url(), "wss://10.0.0.2/ws");
    }

    #[test]
    fn defaults() {
        let config = HttpConfig::new("wled");
        assert_eq!(config.timeout(), Duration::from_secs(8));
        assert_eq!(config.retry().max_attempts, 3);
        assert!(!config.use_https());
        assert_eq!(config.host(), "wled");
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            HttpConfig::new("  ").into_client(),
            Err(ProtocolError::InvalidAddress(_))
        ));
    }

    #[test]
    fn emptiness() {
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!({})));
        assert!(is_empty(&Value::Null));
        assert!(!is_empty(&json!({"0": {}})));
        assert!(!is_empty(&json!(false)));
    }
}
