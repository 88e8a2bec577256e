use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Docker image manifest, schema version 2
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// Docker multi-platform manifest list, schema version 2
pub const DOCKER_MANIFEST_LIST_V2: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";
/// OCI image manifest
pub const OCI_IMAGE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
/// OCI image index
pub const OCI_IMAGE_INDEX: &str = "application/vnd.oci.image.index.v1+json";

/// Media types advertised in the `Accept` header of every manifest request
pub const ACCEPTED_MANIFEST_TYPES: &[&str] = &[
    DOCKER_MANIFEST_LIST_V2,
    DOCKER_MANIFEST_V2,
    OCI_IMAGE_INDEX,
    OCI_IMAGE_MANIFEST,
];

/// Platform information for multi-arch images
///
/// Equality covers every field: an image built for `windows` with no
/// `os.version` is a different platform from one that carries a version, and
/// `linux/arm/v6` is a different platform from `linux/arm/v7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    #[serde(
        rename = "os.version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub os_version: Option<String>,
    /// CPU variant, e.g. `v7` for `arm` or `v8` for `arm64`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl Platform {
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            architecture: architecture.into(),
            os: os.into(),
            os_version: None,
            variant: None,
        }
    }

    pub fn with_os_version(mut self, os_version: impl Into<String>) -> Self {
        self.os_version = Some(os_version.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Build attestations are published in manifest lists as `unknown/unknown`
    pub fn is_unknown(&self) -> bool {
        self.os == "unknown" && self.architecture == "unknown"
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new("linux", "amd64")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.os_version {
            Some(version) => write!(f, "{}:{}/{}", self.os, version, self.architecture)?,
            None => write!(f, "{}/{}", self.os, self.architecture)?,
        }
        match &self.variant {
            Some(variant) => write!(f, "/{}", variant),
            None => Ok(()),
        }
    }
}

/// Parses `os/arch[/variant]`, with `os:os-version` in place of `os`
impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::config(format!("platform '{}' must be os/arch[/variant]", s));

        let mut parts = s.split('/');
        let os_part = parts.next().unwrap_or_default();
        let architecture = parts.next().ok_or_else(invalid)?;
        let variant = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let (os, os_version) = match os_part.split_once(':') {
            Some((os, version)) => (os, Some(version)),
            None => (os_part, None),
        };

        if os.is_empty() || architecture.is_empty() || variant == Some("") {
            return Err(invalid());
        }

        let mut platform = Platform::new(os, architecture);
        if let Some(version) = os_version.filter(|v| !v.is_empty()) {
            platform = platform.with_os_version(version);
        }
        if let Some(variant) = variant {
            platform = platform.with_variant(variant);
        }
        Ok(platform)
    }
}

/// A single filesystem layer reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestLayer {
    pub media_type: String,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
    pub media_type: String,
    pub digest: String,
}

/// One per-platform child of a manifest list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub media_type: String,
    pub digest: String,
    /// Optional in OCI indexes; entries without one never match a platform
    #[serde(default)]
    pub platform: Option<Platform>,
}

/// Single-platform image manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredManifest {
    pub schema_version: u32,
    pub media_type: String,
    pub config: ManifestConfig,
    /// Ordered bottom-up, base layer first
    pub layers: Vec<ManifestLayer>,
}

impl LayeredManifest {
    pub fn layer_digests(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.digest.as_str())
    }
}

/// Multi-platform manifest list (or OCI index)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestList {
    pub schema_version: u32,
    pub media_type: String,
    pub manifests: Vec<ManifestEntry>,
}

/// A manifest as returned by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    Layered(LayeredManifest),
    List(ManifestList),
}

impl Manifest {
    /// Decode a registry response body.
    ///
    /// The shape is chosen by the body's `mediaType`, falling back to the
    /// response `Content-Type` for OCI documents that omit it.
    pub fn from_slice(body: &[u8], content_type: Option<&str>) -> Result<Self> {
        let raw: RawManifest = decode_json("manifest", body)?;

        let media_type = raw
            .media_type
            .clone()
            .or_else(|| content_type.map(strip_media_type_params))
            .unwrap_or_default();

        match media_type.as_str() {
            DOCKER_MANIFEST_V2 | OCI_IMAGE_MANIFEST => {
                let config = raw
                    .config
                    .ok_or_else(|| Error::shape(format!("{} has no config", media_type)))?;
                Ok(Manifest::Layered(LayeredManifest {
                    schema_version: raw.schema_version,
                    media_type,
                    config,
                    layers: raw.layers.unwrap_or_default(),
                }))
            }
            DOCKER_MANIFEST_LIST_V2 | OCI_IMAGE_INDEX => Ok(Manifest::List(ManifestList {
                schema_version: raw.schema_version,
                media_type,
                manifests: raw.manifests.unwrap_or_default(),
            })),
            "" => Err(Error::shape("manifest has no media type")),
            other => Err(Error::shape(format!(
                "unsupported manifest media type {}",
                other
            ))),
        }
    }

    pub fn media_type(&self) -> &str {
        match self {
            Manifest::Layered(m) => &m.media_type,
            Manifest::List(l) => &l.media_type,
        }
    }

    /// Narrow to a single-platform manifest
    pub fn into_layered(self) -> Result<LayeredManifest> {
        match self {
            Manifest::Layered(m) => Ok(m),
            Manifest::List(l) => Err(Error::shape(format!(
                "expected a single-platform manifest but got {}",
                l.media_type
            ))),
        }
    }
}

/// Bearer token returned by a registry token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryToken {
    #[serde(default)]
    pub token: Option<String>,
    /// Docker Hub mirrors the token here as well
    #[serde(default)]
    pub access_token: Option<String>,
}

impl RegistryToken {
    pub fn into_token(self) -> Option<String> {
        let usable = |t: &String| !t.trim().is_empty();
        self.token
            .filter(usable)
            .or_else(|| self.access_token.filter(usable))
    }
}

/// Wire form of any schema version 2 manifest; both shapes share it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    config: Option<ManifestConfig>,
    #[serde(default)]
    layers: Option<Vec<ManifestLayer>>,
    #[serde(default)]
    manifests: Option<Vec<ManifestEntry>>,
}

/// Decode a JSON body into `T`
pub fn decode_json<T: serde::de::DeserializeOwned>(what: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| Error::Decode {
        what: what.to_string(),
        source,
    })
}

fn strip_media_type_params(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
