//! Picking per-platform children out of a manifest list

use crate::types::{ManifestEntry, ManifestList, Platform};

/// Which children of a manifest list to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSelection {
    /// Every real platform in the list (attestation entries are skipped)
    All,
    /// Only these platforms; absent ones are left out of the result
    Only(Vec<Platform>),
}

/// First entry whose platform equals `platform` exactly
pub fn select_child<'a>(list: &'a ManifestList, platform: &Platform) -> Option<&'a ManifestEntry> {
    list.manifests
        .iter()
        .find(|entry| entry.platform.as_ref() == Some(platform))
}

/// Entries that describe a runnable platform
pub fn platform_entries(list: &ManifestList) -> impl Iterator<Item = (&Platform, &ManifestEntry)> {
    list.manifests.iter().filter_map(|entry| match &entry.platform {
        Some(platform) if !platform.is_unknown() => Some((platform, entry)),
        _ => None,
    })
}
