//! Layer comparison between a base image and an image built on it
//!
//! An image is fresh when its bottom layers are exactly the layers the base
//! image currently has. Digests are compared as strings, bottom-up, over the
//! shorter of the two layer lists.

use crate::error::{Error, Result};
use crate::registry::ResolvedImage;
use crate::types::{LayeredManifest, Platform};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
}

impl Freshness {
    pub fn is_fresh(self) -> bool {
        self == Freshness::Fresh
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

/// Result of comparing two layer lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum LayerComparison {
    /// Every compared layer matched; `boundary` is the last one compared
    Match {
        boundary: String,
        layers_compared: usize,
    },
    /// First index at which the digests differ
    Mismatch {
        index: usize,
        base_digest: String,
        target_digest: String,
    },
}

impl LayerComparison {
    pub fn is_fresh(&self) -> bool {
        matches!(self, LayerComparison::Match { .. })
    }

    /// The differing target digest, for a mismatch
    pub fn mismatch_digest(&self) -> Option<&str> {
        match self {
            LayerComparison::Mismatch { target_digest, .. } => Some(target_digest),
            LayerComparison::Match { .. } => None,
        }
    }
}

/// Compare the layers of `base` against the bottom of `target`
pub fn compare_layers(base: &LayeredManifest, target: &LayeredManifest) -> Result<LayerComparison> {
    if base.layers.is_empty() {
        return Err(Error::shape("base manifest has no layers"));
    }
    if target.layers.is_empty() {
        return Err(Error::shape("target manifest has no layers"));
    }

    let mut boundary = "";
    let mut layers_compared = 0;

    for (index, (base_digest, target_digest)) in base
        .layer_digests()
        .zip(target.layer_digests())
        .enumerate()
    {
        if base_digest != target_digest {
            debug!("Layer {} doesn't match.", index);
            debug!("Image layer: {}", target_digest);
            debug!("Base image layer: {}", base_digest);
            return Ok(LayerComparison::Mismatch {
                index,
                base_digest: base_digest.to_string(),
                target_digest: target_digest.to_string(),
            });
        }

        debug!("Layer match: {}", base_digest);
        boundary = base_digest;
        layers_compared = index + 1;
    }

    Ok(LayerComparison::Match {
        boundary: boundary.to_string(),
        layers_compared,
    })
}

/// Outcome for one platform of the target image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PlatformStatus {
    Compared(LayerComparison),
    /// The base image has no manifest for this platform
    MissingInBase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformVerdict {
    pub platform: Platform,
    #[serde(flatten)]
    pub status: PlatformStatus,
}

impl PlatformVerdict {
    pub fn is_fresh(&self) -> bool {
        matches!(&self.status, PlatformStatus::Compared(c) if c.is_fresh())
    }

    pub fn mismatch_digest(&self) -> Option<&str> {
        match &self.status {
            PlatformStatus::Compared(c) => c.mismatch_digest(),
            PlatformStatus::MissingInBase => None,
        }
    }
}

/// Aggregate verdict over every platform of the target image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshnessReport {
    pub overall: Freshness,
    pub platforms: Vec<PlatformVerdict>,
}

impl FreshnessReport {
    pub fn is_fresh(&self) -> bool {
        self.overall.is_fresh()
    }

    pub fn verdict_for(&self, platform: &Platform) -> Option<&PlatformVerdict> {
        self.platforms.iter().find(|v| &v.platform == platform)
    }
}

/// Compare every platform of `target` with the same platform of `base`.
///
/// Platforms missing from the base are stale; all platforms are evaluated
/// before the aggregate is decided.
pub fn evaluate_freshness(base: &ResolvedImage, target: &ResolvedImage) -> Result<FreshnessReport> {
    if target.platforms.is_empty() {
        return Err(Error::shape(format!(
            "{} has no platform manifests to compare",
            target.reference
        )));
    }

    let mut platforms = Vec::with_capacity(target.platforms.len());

    for (platform, target_manifest) in &target.platforms {
        info!("Validate for: {}", platform);

        let status = match base.get(platform) {
            Some(base_manifest) => {
                PlatformStatus::Compared(compare_layers(base_manifest, target_manifest)?)
            }
            None => {
                warn!(
                    "{}",
                    Error::platform_not_found(base.reference.to_string(), platform)
                );
                PlatformStatus::MissingInBase
            }
        };

        platforms.push(PlatformVerdict {
            platform: platform.clone(),
            status,
        });
    }

    let overall = if platforms.iter().all(PlatformVerdict::is_fresh) {
        Freshness::Fresh
    } else {
        Freshness::Stale
    };

    Ok(FreshnessReport { overall, platforms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ManifestConfig, ManifestLayer, DOCKER_MANIFEST_V2};

    fn manifest(layers: &[&str]) -> LayeredManifest {
        LayeredManifest {
            schema_version: 2,
            media_type: DOCKER_MANIFEST_V2.to_string(),
            config: ManifestConfig {
                media_type: "application/vnd.docker.container.image.v1+json".to_string(),
                digest: "sha256:config".to_string(),
            },
            layers: layers
                .iter()
                .map(|d| ManifestLayer {
                    media_type: "application/vnd.docker.image.rootfs.diff.tar.gzip".to_string(),
                    digest: d.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_reflexive() {
        let m = manifest(&["A", "B", "C"]);
        assert_eq!(
            compare_layers(&m, &m).unwrap(),
            LayerComparison::Match {
                boundary: "C".to_string(),
                layers_compared: 3
            }
        );
    }

    #[test]
    fn test_base_prefix_is_fresh_with_boundary() {
        let result = compare_layers(&manifest(&["A", "B"]), &manifest(&["A", "B", "C"])).unwrap();
        assert!(result.is_fresh());
        assert_eq!(result.mismatch_digest(), None);
        assert_eq!(
            result,
            LayerComparison::Match {
                boundary: "B".to_string(),
                layers_compared: 2
            }
        );
    }

    #[test]
    fn test_reports_first_mismatch() {
        let result =
            compare_layers(&manifest(&["A", "X", "Y"]), &manifest(&["A", "B", "C"])).unwrap();
        assert_eq!(
            result,
            LayerComparison::Mismatch {
                index: 1,
                base_digest: "X".to_string(),
                target_digest: "B".to_string()
            }
        );
    }

    #[test]
    fn test_longer_base_compares_shorter_range() {
        let result = compare_layers(&manifest(&["A", "B", "C"]), &manifest(&["A", "B"])).unwrap();
        assert_eq!(
            result,
            LayerComparison::Match {
                boundary: "B".to_string(),
                layers_compared: 2
            }
        );
    }

    #[test]
    fn test_empty_layers_is_shape_error() {
        assert!(matches!(
            compare_layers(&manifest(&[]), &manifest(&["A"])),
            Err(Error::Shape(_))
        ));
        assert!(matches!(
            compare_layers(&manifest(&["A"]), &manifest(&[])),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_freshness_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Freshness::Stale).unwrap(),
            "\"stale\""
        );
        assert_eq!(Freshness::Fresh.to_string(), "fresh");
    }
}
