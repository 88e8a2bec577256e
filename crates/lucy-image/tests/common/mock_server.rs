//! Mock registry helpers
//!
//! Sets up wiremock endpoints that behave like the registry v2 manifest API
//! and a token endpoint.

use lucy_image::{GhcrToken, LucyConfig, RegistryClient};
use serde_json::Value;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `host:port` of the mock server, usable as a registry host
pub fn registry_host(server: &MockServer) -> String {
    server.address().to_string()
}

/// Config that reaches the mock server over plain HTTP
pub fn mock_config(servers: &[&MockServer]) -> LucyConfig {
    let mut config = LucyConfig::default();
    config.registries.plain_http = servers.iter().map(|s| registry_host(s)).collect();
    config
}

/// Registry client pointed at the mock server
pub fn mock_client(server: &MockServer) -> RegistryClient {
    RegistryClient::new(mock_config(&[server])).unwrap()
}

/// Registry client that uses GHCR-style tokens from the mock server's `/token`
pub fn mock_client_with_tokens(server: &MockServer) -> RegistryClient {
    mock_client(server).with_token_provider(
        registry_host(server),
        GhcrToken::with_realm(format!("{}/token", server.uri())),
    )
}

/// Serve `body` for `GET /v2/{repository}/manifests/{reference}`
pub async fn mock_manifest(server: &MockServer, repository: &str, reference: &str, body: &Value) {
    mock_manifest_expect(server, repository, reference, body, None).await;
}

/// Like [`mock_manifest`], verifying the number of requests on drop
pub async fn mock_manifest_expect(
    server: &MockServer,
    repository: &str,
    reference: &str,
    body: &Value,
    times: Option<u64>,
) {
    let media_type = body["mediaType"].as_str().unwrap_or("application/json").to_string();
    let mock = Mock::given(method("GET"))
        .and(path(format!("/v2/{}/manifests/{}", repository, reference)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", media_type.as_str())
                .set_body_json(body),
        );
    let mock = match times {
        Some(n) => mock.expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

/// Serve `body` only to requests carrying `Bearer {token}`
pub async fn mock_manifest_with_token(
    server: &MockServer,
    repository: &str,
    reference: &str,
    token: &str,
    body: &Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/manifests/{}", repository, reference)))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Token endpoint for `repository`, expected to be hit `times` times
pub async fn mock_token(server: &MockServer, repository: &str, token: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("scope", format!("repository:{}:pull", repository)))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!(r#"{{"token":"{}"}}"#, token)),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Fail `GET /v2/{repository}/manifests/{reference}` with `status`
pub async fn mock_manifest_error(
    server: &MockServer,
    repository: &str,
    reference: &str,
    status: u16,
    body: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/manifests/{}", repository, reference)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}
