//! CentralReach REST client.
//!
//! A thin pass-through: each call maps onto one REST request and returns
//! the decoded JSON payload. A non-success status becomes
//! [`Error::Transport`]. There is no retry, backoff, or caching.

use reqwest::Method;
use serde_json::Value;

use crate::config::{
    resolve_centralreach_base_url, resolve_centralreach_timeout, resolve_centralreach_token,
    OpsboardConfig,
};
use crate::error::{Error, Result};

/// Request shape for [`CentralReachClient::fetch_resource`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Defaults to `GET`
    pub method: Option<Method>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl FetchOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A `POST` carrying `body` as JSON.
    #[must_use]
    pub fn post(body: Value) -> Self {
        Self {
            method: Some(Method::POST),
            query: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Date window for appointment and billing queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<chrono::NaiveDate>,
    pub end: Option<chrono::NaiveDate>,
}

impl DateWindow {
    fn apply(&self, mut options: FetchOptions) -> FetchOptions {
        if let Some(start) = self.start {
            options = options.with_query("startDate", start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = self.end {
            options = options.with_query("endDate", end.format("%Y-%m-%d").to_string());
        }
        options
    }
}

/// CentralReach API client.
pub struct CentralReachClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CentralReachClient {
    /// Create a client for `base_url`, with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Create a client from resolved configuration (env > config file > default).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be built.
    pub fn from_config(config: &OpsboardConfig) -> Result<Self> {
        Self::new(
            resolve_centralreach_base_url(config),
            resolve_centralreach_token(config),
            resolve_centralreach_timeout(config),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a resource path. Leading slashes are optional.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform one request and decode the JSON payload.
    ///
    /// An empty response body decodes as `null`.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] when the status is outside `200..=299`
    /// - [`Error::Http`] when the request cannot be sent or read
    /// - [`Error::Json`] when the body is not JSON
    pub async fn fetch_resource(&self, path: &str, options: FetchOptions) -> Result<Value> {
        let method = options.method.unwrap_or(Method::GET);
        let url = self.url_for(path);
        tracing::debug!(%method, %url, "centralreach request");

        let mut request = self.client.request(method, &url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(Error::Transport {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// `GET /clients`
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_resource`].
    pub async fn list_clients(&self, search: Option<&str>) -> Result<Value> {
        let mut options = FetchOptions::get();
        if let Some(term) = search {
            options = options.with_query("search", term);
        }
        self.fetch_resource("clients", options).await
    }

    /// `GET /clients/{id}`
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_resource`].
    pub async fn get_client(&self, client_id: &str) -> Result<Value> {
        self.fetch_resource(&format!("clients/{client_id}"), FetchOptions::get())
            .await
    }

    /// `GET /appointments`, optionally scoped to one client and a date window.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_resource`].
    pub async fn list_appointments(&self, client_id: Option<&str>, window: &DateWindow) -> Result<Value> {
        let mut options = window.apply(FetchOptions::get());
        if let Some(id) = client_id {
            options = options.with_query("clientId", id);
        }
        self.fetch_resource("appointments", options).await
    }

    /// `GET /billing`, within a date window.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_resource`].
    pub async fn list_billing_entries(&self, window: &DateWindow) -> Result<Value> {
        self.fetch_resource("billing", window.apply(FetchOptions::get()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_url_joining() {
        let client = CentralReachClient::new("https://cr.example.test/v1/", None, 5).unwrap();
        assert_eq!(client.base_url(), "https://cr.example.test/v1");
        assert_eq!(client.url_for("clients"), "https://cr.example.test/v1/clients");
        assert_eq!(client.url_for("/clients/42"), "https://cr.example.test/v1/clients/42");
    }

    #[test]
    fn test_fetch_options() {
        let options = FetchOptions::get().with_query("page", "2");
        assert!(options.method.is_none());
        assert_eq!(options.query, vec![("page".to_string(), "2".to_string())]);

        let post = FetchOptions::post(serde_json::json!({"note": "hi"}));
        assert_eq!(post.method, Some(Method::POST));
        assert_eq!(post.body.unwrap()["note"], "hi");
    }

    #[test]
    fn test_date_window_query() {
        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2024, 6, 1),
            end: None,
        };
        let options = window.apply(FetchOptions::get());
        assert_eq!(options.query, vec![("startDate".to_string(), "2024-06-01".to_string())]);
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    /// Client for a loopback test server, bypassing any proxy from the environment.
    fn local_client(base_url: String, token: Option<&str>) -> CentralReachClient {
        CentralReachClient {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            base_url,
            token: token.map(str::to_string),
        }
    }

    /// Answer one connection on a loopback port with a canned response.
    ///
    /// The join handle yields the raw request head.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_server_error_is_transport_error() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
        );
        let client = local_client(base_url, None);

        let result = runtime().block_on(client.fetch_resource("clients", FetchOptions::get()));
        server.join().unwrap();

        match result {
            Err(Error::Transport { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_error_body_uses_reason() {
        let (base_url, server) =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let client = local_client(base_url, None);

        let result = runtime().block_on(client.get_client("42"));
        server.join().unwrap();

        assert!(matches!(
            result,
            Err(Error::Transport { status: 404, ref message }) if message == "Not Found"
        ));
    }

    #[test]
    fn test_empty_success_body_is_null() {
        let (base_url, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let client = local_client(base_url, None);

        let value = runtime()
            .block_on(client.fetch_resource("clients", FetchOptions::get()))
            .unwrap();
        server.join().unwrap();

        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_success_sends_token_and_query() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 13\r\nConnection: close\r\n\r\n[{\"id\":\"c1\"}]",
        );
        let client = local_client(base_url, Some("secret"));

        let value = runtime().block_on(client.list_clients(Some("ann"))).unwrap();
        let request = server.join().unwrap().to_lowercase();

        assert_eq!(value[0]["id"], "c1");
        assert!(request.starts_with("get /clients?search=ann "), "{request}");
        assert!(request.contains("authorization: bearer secret"), "{request}");
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = CentralReachClient::new("http://127.0.0.1:9", None, 2).unwrap();
        let result = runtime().block_on(client.get_client("1"));
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
