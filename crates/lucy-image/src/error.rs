//! Error types for lucy-image

use thiserror::Error;

/// Result type alias using lucy-image's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that can occur while resolving and comparing images
#[derive(Error, Debug)]
pub enum Error {
    /// Token endpoint unreachable or returned no usable token
    #[error("Registry {registry} did not return a valid token for {repository}: {message}. Consider providing a token.")]
    Auth {
        registry: String,
        repository: String,
        message: String,
    },

    /// Non-success manifest fetch, or a body that is not a manifest
    #[error("Registry responded with {status} for {url}: {message}")]
    Registry {
        status: u16,
        url: String,
        message: String,
    },

    /// No tag or digest to address the manifest by
    #[error("Image {image} has no tag or digest and {registry} does not default to latest")]
    MissingSelector { image: String, registry: String },

    /// The request never produced an HTTP response
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Malformed JSON payload
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A manifest of the wrong shape reached a component that cannot handle it
    #[error("Unexpected manifest shape: {0}")]
    Shape(String),

    /// A target platform the base image does not provide.
    ///
    /// Only logged while building a [`crate::FreshnessReport`], where the
    /// platform is recorded as missing in base; never returned as `Err`.
    #[error("Platform manifest cannot be found in {image}: {platform}")]
    PlatformNotFound { image: String, platform: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an auth error
    pub fn auth(
        registry: impl Into<String>,
        repository: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Auth {
            registry: registry.into(),
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Create a registry error
    pub fn registry(status: u16, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registry {
            status,
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a shape error
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// Create a platform not found error
    pub fn platform_not_found(image: impl Into<String>, platform: impl ToString) -> Self {
        Self::PlatformNotFound {
            image: image.into(),
            platform: platform.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status carried by a registry error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Registry { status, .. } => Some(*status),
            _ => None,
        }
    }
}
