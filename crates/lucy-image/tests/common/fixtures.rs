//! Manifest fixtures
//!
//! Builds registry response bodies in the Docker schema version 2 format.

use lucy_image::types::{DOCKER_MANIFEST_LIST_V2, DOCKER_MANIFEST_V2, OCI_IMAGE_INDEX};
use lucy_image::{ImageReference, LayeredManifest, Manifest, Platform, ResolvedImage};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const LAYER_MEDIA_TYPE: &str = "application/vnd.docker.image.rootfs.diff.tar.gzip";
pub const CONFIG_MEDIA_TYPE: &str = "application/vnd.docker.container.image.v1+json";

/// Single-platform manifest with the given layer digests
pub fn manifest_json(layers: &[&str]) -> Value {
    json!({
        "schemaVersion": 2,
        "mediaType": DOCKER_MANIFEST_V2,
        "config": {
            "mediaType": CONFIG_MEDIA_TYPE,
            "size": 1472,
            "digest": "sha256:config"
        },
        "layers": layers.iter().map(|digest| json!({
            "mediaType": LAYER_MEDIA_TYPE,
            "size": 29126484,
            "digest": digest
        })).collect::<Vec<_>>()
    })
}

/// Manifest list with one child per `(digest, platform)`
pub fn manifest_list_json(children: &[(&str, Platform)]) -> Value {
    list_json(DOCKER_MANIFEST_LIST_V2, children)
}

/// OCI index with one child per `(digest, platform)`
pub fn oci_index_json(children: &[(&str, Platform)]) -> Value {
    list_json(OCI_IMAGE_INDEX, children)
}

fn list_json(media_type: &str, children: &[(&str, Platform)]) -> Value {
    json!({
        "schemaVersion": 2,
        "mediaType": media_type,
        "manifests": children.iter().map(|(digest, platform)| json!({
            "mediaType": DOCKER_MANIFEST_V2,
            "digest": digest,
            "size": 1165,
            "platform": platform
        })).collect::<Vec<_>>()
    })
}

pub fn linux_amd64() -> Platform {
    Platform::new("linux", "amd64")
}

pub fn linux_arm64() -> Platform {
    Platform::new("linux", "arm64")
}

pub fn linux_arm_v6() -> Platform {
    Platform::new("linux", "arm").with_variant("v6")
}

pub fn linux_arm_v7() -> Platform {
    Platform::new("linux", "arm").with_variant("v7")
}

pub fn windows_ltsc2022() -> Platform {
    Platform::new("windows", "amd64").with_os_version("10.0.20348.1726")
}

/// Decode a fixture into a single-platform manifest
pub fn layered(layers: &[&str]) -> LayeredManifest {
    let body = serde_json::to_vec(&manifest_json(layers)).unwrap();
    Manifest::from_slice(&body, None)
        .unwrap()
        .into_layered()
        .unwrap()
}

/// A resolved multi-platform image without going through a registry
pub fn resolved_list(address: &str, platforms: &[(Platform, &[&str])]) -> ResolvedImage {
    let children: Vec<(String, Platform)> = platforms
        .iter()
        .enumerate()
        .map(|(i, (p, _))| (format!("sha256:child{}", i), p.clone()))
        .collect();
    let refs: Vec<(&str, Platform)> = children
        .iter()
        .map(|(d, p)| (d.as_str(), p.clone()))
        .collect();
    let body = serde_json::to_vec(&manifest_list_json(&refs)).unwrap();

    ResolvedImage {
        reference: ImageReference::parse(address),
        manifest: Manifest::from_slice(&body, None).unwrap(),
        platforms: platforms
            .iter()
            .map(|(p, layers)| (p.clone(), layered(layers)))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// A resolved single-platform image attributed to `platform`
pub fn resolved_single(address: &str, platform: Platform, layers: &[&str]) -> ResolvedImage {
    let manifest = layered(layers);
    ResolvedImage {
        reference: ImageReference::parse(address),
        manifest: Manifest::Layered(manifest.clone()),
        platforms: BTreeMap::from([(platform, manifest)]),
    }
}
