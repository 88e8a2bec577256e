//! HTTP transport used for registry and token requests

use crate::config::LucyConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::trace;

/// A GET request to a registry or token endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// Media types sent in `Accept`, all with equal preference
    pub accept: Vec<String>,
    pub bearer_token: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn accept(mut self, media_types: &[&str]) -> Self {
        self.accept = media_types.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token.map(str::to_string);
        self
    }

    /// `Accept` header value, `None` when no media types were given
    pub fn accept_header(&self) -> Option<String> {
        if self.accept.is_empty() {
            return None;
        }
        Some(
            self.accept
                .iter()
                .map(|m| format!("{};q=0.5", m))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, for error messages
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }
}

/// Capability to fetch bytes for a URL.
///
/// Non-success statuses are returned as responses; `Err` means no response
/// was received at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

/// [`Transport`] backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &LucyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.network.user_agent.as_str())
            .timeout(Duration::from_secs(config.network.http_timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        trace!("GET {}", request.url);

        let mut builder = self.client.get(&request.url);
        if let Some(accept) = request.accept_header() {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(token) = &request.bearer_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(&request.url, e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(&request.url, e.to_string()))?
            .to_vec();

        trace!("{} -> {} ({} bytes)", request.url, status, body.len());

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_accept_header_gives_equal_preference() {
        let request = FetchRequest::get("https://example.com").accept(&["a/b", "c/d"]);
        assert_eq!(
            request.accept_header().as_deref(),
            Some("a/b;q=0.5, c/d;q=0.5")
        );
        assert_eq!(FetchRequest::get("x").accept_header(), None);
    }

    #[tokio::test]
    async fn test_http_transport_sends_bearer_and_reads_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string("{}"),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&LucyConfig::default()).unwrap();
        let response = transport
            .fetch(&FetchRequest::get(format!("{}/v2/", server.uri())).bearer(Some("secret")))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        assert_eq!(response.text(), "{}");
    }

    #[tokio::test]
    async fn test_http_transport_returns_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&LucyConfig::default()).unwrap();
        let response = transport
            .fetch(&FetchRequest::get(server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_http_transport_unreachable_host() {
        let transport = HttpTransport::new(&LucyConfig::default()).unwrap();
        let err = transport
            .fetch(&FetchRequest::get("http://127.0.0.1:1/v2/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
