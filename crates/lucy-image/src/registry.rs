use crate::auth::{provider_for, TokenProvider};
use crate::config::LucyConfig;
use crate::error::{Error, Result};
use crate::platform::{platform_entries, select_child, PlatformSelection};
use crate::reference::ImageReference;
use crate::transport::{FetchRequest, HttpTransport, Transport};
use crate::types::{LayeredManifest, Manifest, Platform, ACCEPTED_MANIFEST_TYPES};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// An image resolved down to its single-platform manifests
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub reference: ImageReference,
    /// Manifest the reference itself resolved to
    pub manifest: Manifest,
    /// Single-platform manifest per platform. A single manifest is keyed by
    /// the configured platform.
    pub platforms: BTreeMap<Platform, LayeredManifest>,
}

impl ResolvedImage {
    pub fn is_multi_platform(&self) -> bool {
        matches!(self.manifest, Manifest::List(_))
    }

    pub fn get(&self, platform: &Platform) -> Option<&LayeredManifest> {
        self.platforms.get(platform)
    }
}

/// Client for reading manifests from OCI-compatible container registries
pub struct RegistryClient {
    transport: Box<dyn Transport>,
    config: LucyConfig,
    /// Token strategies that replace the host-based default
    token_providers: HashMap<String, Box<dyn TokenProvider>>,
}

impl RegistryClient {
    /// Create a registry client using HTTP transport
    pub fn new(config: LucyConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }

    /// Create a registry client over a custom transport
    pub fn with_transport(transport: impl Transport + 'static, config: LucyConfig) -> Self {
        Self {
            transport: Box::new(transport),
            config,
            token_providers: HashMap::new(),
        }
    }

    /// Use `provider` for `registry` instead of the host-based default
    pub fn with_token_provider(
        mut self,
        registry: impl Into<String>,
        provider: impl TokenProvider + 'static,
    ) -> Self {
        self.token_providers
            .insert(registry.into(), Box::new(provider));
        self
    }

    pub fn config(&self) -> &LucyConfig {
        &self.config
    }

    /// Get a pull token for the repository of `reference`, if its registry
    /// requires one
    pub async fn get_token(&self, reference: &ImageReference) -> Result<Option<String>> {
        let registry = reference.registry.as_str();
        let repository = reference.repository.as_str();

        match self.token_providers.get(registry) {
            Some(provider) => {
                debug!("Using {} token strategy for {}", provider.name(), registry);
                provider
                    .token(self.transport.as_ref(), registry, repository)
                    .await
            }
            None => {
                let provider = provider_for(registry);
                debug!("Using {} token strategy for {}", provider.name(), registry);
                provider
                    .token(self.transport.as_ref(), registry, repository)
                    .await
            }
        }
    }

    /// URL of the manifest addressed by `reference`
    pub fn manifest_url(&self, reference: &ImageReference) -> Result<String> {
        let selector = reference
            .selector()
            .ok_or_else(|| Error::MissingSelector {
                image: reference.original_address.clone(),
                registry: reference.registry.clone(),
            })?;

        Ok(format!(
            "{}://{}/v2/{}/manifests/{}",
            self.config.scheme_for(&reference.registry),
            reference.registry,
            reference.repository,
            selector
        ))
    }

    /// Fetch the manifest for `reference` with an already-known token
    pub async fn get_manifest(
        &self,
        reference: &ImageReference,
        token: Option<&str>,
    ) -> Result<Manifest> {
        let url = self.manifest_url(reference)?;

        debug!("Fetching manifest from: {}", url);

        let request = FetchRequest::get(&url)
            .accept(ACCEPTED_MANIFEST_TYPES)
            .bearer(token);
        let response = self.transport.fetch(&request).await?;

        if !response.is_success() {
            let body = response.text();
            return Err(Error::registry(
                response.status,
                url,
                if body.is_empty() {
                    "(no response body)".to_string()
                } else {
                    body
                },
            ));
        }

        let manifest = Manifest::from_slice(&response.body, response.content_type.as_deref())
            .map_err(|e| Error::registry(response.status, &url, e.to_string()))?;

        trace!("{} is {}", reference, manifest.media_type());
        Ok(manifest)
    }

    /// Fetch the manifest for `reference`, obtaining a token first when none
    /// is supplied and the registry requires one
    pub async fn resolve(
        &self,
        reference: &ImageReference,
        preset_token: Option<&str>,
    ) -> Result<Manifest> {
        match preset_token {
            Some(token) => self.get_manifest(reference, Some(token)).await,
            None => {
                let token = self.get_token(reference).await?;
                self.get_manifest(reference, token.as_deref()).await
            }
        }
    }

    /// Resolve `reference` and, if it is a manifest list, the children
    /// picked by `selection`.
    ///
    /// The token obtained for the reference is reused for its children, which
    /// live in the same repository. A list that names the same platform twice
    /// is rejected as a shape error.
    pub async fn resolve_manifest_chain(
        &self,
        reference: &ImageReference,
        preset_token: Option<String>,
        selection: &PlatformSelection,
    ) -> Result<ResolvedImage> {
        let token = match preset_token {
            Some(token) => Some(token),
            None => self.get_token(reference).await?,
        };

        let manifest = self.get_manifest(reference, token.as_deref()).await?;
        let mut platforms = BTreeMap::new();

        match &manifest {
            Manifest::Layered(layered) => {
                debug!(
                    "{} is single-platform, attributed to {}",
                    reference, self.config.platform
                );
                platforms.insert(self.config.platform.clone(), layered.clone());
            }
            Manifest::List(list) => {
                let children: Vec<(&Platform, String)> = match selection {
                    PlatformSelection::All => platform_entries(list)
                        .map(|(platform, entry)| (platform, entry.digest.clone()))
                        .collect(),
                    PlatformSelection::Only(wanted) => wanted
                        .iter()
                        .filter_map(|platform| match select_child(list, platform) {
                            Some(entry) => Some((platform, entry.digest.clone())),
                            None => {
                                debug!("{} has no manifest for {}", reference, platform);
                                None
                            }
                        })
                        .collect(),
                };

                debug!(
                    "{} lists {} manifests, resolving {}",
                    reference,
                    list.manifests.len(),
                    children.len()
                );

                for (platform, digest) in children {
                    if platforms.contains_key(platform) {
                        return Err(Error::shape(format!(
                            "{} lists {} more than once",
                            reference, platform
                        )));
                    }
                    let child = reference.with_digest(digest);
                    let layered = self
                        .get_manifest(&child, token.as_deref())
                        .await?
                        .into_layered()?;
                    platforms.insert(platform.clone(), layered);
                }
            }
        }

        Ok(ResolvedImage {
            reference: reference.clone(),
            manifest,
            platforms,
        })
    }
}
