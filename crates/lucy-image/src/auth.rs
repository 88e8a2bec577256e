//! Anonymous pull tokens
//!
//! Docker Hub and GHCR require a bearer token even for public images. Each
//! registry family gets one [`TokenProvider`]; [`provider_for`] picks it from
//! the registry host.

use crate::error::{Error, Result};
use crate::transport::{FetchRequest, Transport};
use crate::types::{decode_json, RegistryToken};
use async_trait::async_trait;
use tracing::debug;

/// Docker Hub token endpoint
pub const DOCKER_HUB_AUTH_REALM: &str = "https://auth.docker.io/token";
const DOCKER_HUB_SERVICE: &str = "registry.docker.io";

/// GHCR token endpoint
pub const GHCR_AUTH_REALM: &str = "https://ghcr.io/token";

/// Exchanges a repository scope for a pull token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Obtain a token for `repository`, or `None` if the registry needs none
    async fn token(
        &self,
        transport: &dyn Transport,
        registry: &str,
        repository: &str,
    ) -> Result<Option<String>>;
}

/// Registries that serve public manifests without a token
pub struct Anonymous;

#[async_trait]
impl TokenProvider for Anonymous {
    fn name(&self) -> &'static str {
        "anonymous"
    }

    async fn token(&self, _: &dyn Transport, _: &str, _: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Docker Hub: `auth.docker.io/token?service=registry.docker.io&scope=...`
pub struct DockerHubToken {
    realm: String,
}

impl DockerHubToken {
    pub fn new() -> Self {
        Self::with_realm(DOCKER_HUB_AUTH_REALM)
    }

    pub fn with_realm(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
        }
    }

    fn token_url(&self, repository: &str) -> String {
        format!(
            "{}?service={}&scope=repository:{}:pull",
            self.realm, DOCKER_HUB_SERVICE, repository
        )
    }
}

impl Default for DockerHubToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for DockerHubToken {
    fn name(&self) -> &'static str {
        "docker-hub"
    }

    async fn token(
        &self,
        transport: &dyn Transport,
        registry: &str,
        repository: &str,
    ) -> Result<Option<String>> {
        request_token(transport, &self.token_url(repository), registry, repository)
            .await
            .map(Some)
    }
}

/// GHCR: `ghcr.io/token?scope=...`
pub struct GhcrToken {
    realm: String,
}

impl GhcrToken {
    pub fn new() -> Self {
        Self::with_realm(GHCR_AUTH_REALM)
    }

    pub fn with_realm(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
        }
    }

    fn token_url(&self, repository: &str) -> String {
        format!("{}?scope=repository:{}:pull", self.realm, repository)
    }
}

impl Default for GhcrToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for GhcrToken {
    fn name(&self) -> &'static str {
        "ghcr"
    }

    async fn token(
        &self,
        transport: &dyn Transport,
        registry: &str,
        repository: &str,
    ) -> Result<Option<String>> {
        request_token(transport, &self.token_url(repository), registry, repository)
            .await
            .map(Some)
    }
}

/// Select the token strategy for a registry host
pub fn provider_for(registry: &str) -> Box<dyn TokenProvider> {
    match registry {
        "index.docker.io" | "docker.io" | "registry-1.docker.io" => Box::new(DockerHubToken::new()),
        "ghcr.io" => Box::new(GhcrToken::new()),
        _ => Box::new(Anonymous),
    }
}

async fn request_token(
    transport: &dyn Transport,
    url: &str,
    registry: &str,
    repository: &str,
) -> Result<String> {
    debug!("Requesting token from: {}", url);

    let response = transport
        .fetch(&FetchRequest::get(url))
        .await
        .map_err(|e| Error::auth(registry, repository, e.to_string()))?;

    if !response.is_success() {
        return Err(Error::auth(
            registry,
            repository,
            format!("token endpoint returned {}", response.status),
        ));
    }

    let token: RegistryToken = decode_json("token response", &response.body)
        .map_err(|e| Error::auth(registry, repository, e.to_string()))?;

    token
        .into_token()
        .ok_or_else(|| Error::auth(registry, repository, "response contained no token"))
}
