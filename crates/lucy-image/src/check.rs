//! End-to-end freshness check of an image against its base image

use crate::error::Result;
use crate::freshness::{evaluate_freshness, FreshnessReport};
use crate::platform::PlatformSelection;
use crate::reference::ImageReference;
use crate::registry::RegistryClient;
use tracing::info;

/// An image to resolve, with an optional caller-supplied bearer token
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub reference: ImageReference,
    pub token: Option<String>,
}

impl ImageRequest {
    pub fn new(address: &str) -> Self {
        Self {
            reference: ImageReference::parse(address),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Resolve both images and compare every platform of the target.
///
/// The target is resolved first; only the platforms it has are then resolved
/// from the base. Any fetch failure aborts the whole check.
pub async fn check_freshness(
    client: &RegistryClient,
    target: ImageRequest,
    base: ImageRequest,
) -> Result<FreshnessReport> {
    info!("Target image: {}", target.reference);
    info!("Base image  : {}", base.reference);

    let target_image = client
        .resolve_manifest_chain(&target.reference, target.token, &PlatformSelection::All)
        .await?;
    info!("Image is type: {}", target_image.manifest.media_type());

    let wanted = PlatformSelection::Only(target_image.platforms.keys().cloned().collect());
    let base_image = client
        .resolve_manifest_chain(&base.reference, base.token, &wanted)
        .await?;
    info!("Base Image is type: {}", base_image.manifest.media_type());

    if target_image.is_multi_platform() {
        info!(
            "Image includes {} manifests that will be validated.",
            target_image.platforms.len()
        );
    }

    evaluate_freshness(&base_image, &target_image)
}
