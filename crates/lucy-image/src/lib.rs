//! Container image freshness checks for Lucy
//!
//! This crate answers "has my base image changed since I built my image?":
//! - Parsing image references, including Docker Hub short names
//! - Fetching manifests and manifest lists from OCI-compatible registries
//!   (Docker Hub, GHCR, MCR, local registries), with anonymous pull tokens
//! - Picking per-platform manifests out of manifest lists
//! - Comparing the base image's layers with the bottom layers of the image
//!
//! # Example
//!
//! ```no_run
//! use lucy_image::{check_freshness, ImageRequest, LucyConfig, RegistryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lucy_image::Error> {
//!     let client = RegistryClient::new(LucyConfig::default())?;
//!
//!     let report = check_freshness(
//!         &client,
//!         ImageRequest::new("mcr.microsoft.com/dotnet/samples:aspnetapp"),
//!         ImageRequest::new("mcr.microsoft.com/dotnet/aspnet:8.0"),
//!     )
//!     .await?;
//!
//!     println!("{}", report.overall);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod check;
pub mod config;
pub mod error;
pub mod freshness;
pub mod platform;
pub mod reference;
pub mod registry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use auth::{provider_for, Anonymous, DockerHubToken, GhcrToken, TokenProvider};
pub use check::{check_freshness, ImageRequest};
pub use config::LucyConfig;
pub use error::{Error, Result};
pub use freshness::{
    compare_layers, evaluate_freshness, Freshness, FreshnessReport, LayerComparison,
    PlatformStatus, PlatformVerdict,
};
pub use platform::{select_child, PlatformSelection};
pub use reference::ImageReference;
pub use registry::{RegistryClient, ResolvedImage};
pub use transport::{FetchRequest, FetchResponse, HttpTransport, Transport};
pub use types::{
    LayeredManifest, Manifest, ManifestConfig, ManifestEntry, ManifestLayer, ManifestList,
    Platform, RegistryToken,
};

/// Version of the lucy-image crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
