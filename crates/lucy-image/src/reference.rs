//! Image reference parsing.
//!
//! Splits addresses like `mcr.microsoft.com/dotnet/aspnet:8.0` into registry,
//! repository and tag, applying the Docker Hub short-name rules:
//!
//! - `debian` → `index.docker.io/library/debian:latest`
//! - `myorg/app` → `index.docker.io/myorg/app:latest`
//! - `localhost:5000/app:v1` → `localhost:5000/app:v1`
//! - `ghcr.io/org/app` → `ghcr.io/org/app` (GHCR rejects an inferred `latest`)

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Canonical Docker Hub registry host
pub const DOCKER_HUB_REGISTRY: &str = "index.docker.io";

/// Hosts that all address Docker Hub
const DOCKER_HUB_ALIASES: &[&str] = &["index.docker.io", "docker.io", "registry-1.docker.io"];

/// Implicit namespace of single-segment Docker Hub names
const DOCKER_HUB_LIBRARY: &str = "library";

const DEFAULT_TAG: &str = "latest";

/// Registries that require every pull to name a tag or digest
const EXPLICIT_TAG_REGISTRIES: &[&str] = &["ghcr.io"];

/// Container image reference with registry, repository, and tag/digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Registry hostname, with port if any (e.g., "ghcr.io", "localhost:5000")
    pub registry: String,
    /// Repository path (e.g., "library/debian")
    pub repository: String,
    /// Tag (e.g., "bookworm")
    pub tag: Option<String>,
    /// Digest (e.g., "sha256:abc123..."); takes precedence over the tag
    pub digest: Option<String>,
    /// Address exactly as given by the user
    pub original_address: String,
}

impl ImageReference {
    /// Parse an image address.
    ///
    /// Never fails: anything that does not name a registry host is treated
    /// as a Docker Hub name.
    pub fn parse(address: &str) -> Self {
        let trimmed = address.trim();

        let (name_tag, digest) = match trimmed.split_once('@') {
            Some((name, digest)) if !digest.is_empty() => (name, Some(digest.to_string())),
            Some((name, _)) => (name, None),
            None => (trimmed, None),
        };

        // Host segment ends at the first slash, if that segment names a host
        let registry_end = name_tag
            .find('/')
            .filter(|&slash| is_registry_host(&name_tag[..slash]));

        let (host, path) = match registry_end {
            Some(end) => (Some(&name_tag[..end]), &name_tag[end + 1..]),
            None => (None, name_tag),
        };

        // Tag separator is the last ':' after the final '/'
        let last_segment = path.rfind('/').map_or(0, |slash| slash + 1);
        let tag_start = path[last_segment..]
            .rfind(':')
            .map(|colon| last_segment + colon);

        let (repository, tag) = match tag_start {
            Some(colon) => (&path[..colon], Some(&path[colon + 1..])),
            None => (path, None),
        };
        let tag = tag.filter(|t| !t.is_empty()).map(str::to_string);

        let (registry, repository) = match host {
            Some(host) if !DOCKER_HUB_ALIASES.contains(&host) => {
                (host.to_string(), repository.to_string())
            }
            _ => {
                let repository = if repository.contains('/') {
                    repository.to_string()
                } else {
                    trace!(
                        "Canonicalizing '{}' to the {} namespace",
                        address,
                        DOCKER_HUB_LIBRARY
                    );
                    format!("{}/{}", DOCKER_HUB_LIBRARY, repository)
                };
                (DOCKER_HUB_REGISTRY.to_string(), repository)
            }
        };

        let tag = match tag {
            None if digest.is_none() && !EXPLICIT_TAG_REGISTRIES.contains(&registry.as_str()) => {
                Some(DEFAULT_TAG.to_string())
            }
            tag => tag,
        };

        Self {
            registry,
            repository,
            tag,
            digest,
            original_address: address.to_string(),
        }
    }

    /// The tag or digest used to address the manifest; the digest wins
    pub fn selector(&self) -> Option<&str> {
        self.digest.as_deref().or(self.tag.as_deref())
    }

    /// A new request for a manifest-list child of this image
    pub fn with_digest(&self, digest: impl Into<String>) -> Self {
        Self {
            digest: Some(digest.into()),
            ..self.clone()
        }
    }

    /// Whether the registry refuses an implied `latest`
    pub fn requires_explicit_tag(&self) -> bool {
        EXPLICIT_TAG_REGISTRIES.contains(&self.registry.as_str())
    }
}

impl FromStr for ImageReference {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.repository)?;
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)
        } else if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)
        } else {
            Ok(())
        }
    }
}

/// A first path segment names a registry when it has a dot (not leading),
/// a port, or is `localhost`
fn is_registry_host(segment: &str) -> bool {
    let first_dot = segment.find('.');
    first_dot.is_some_and(|dot| dot > 0) || segment.contains(':') || segment == "localhost"
}
