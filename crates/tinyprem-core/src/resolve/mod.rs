//! TinyMCE version resolution.
//!
//! tiny.cloud answers a request for a major alias (`.../tinymce/6/...`) with
//! a redirect to the concrete release (`.../tinymce/6.1.2/...`). The resolver
//! follows that redirect once and reads the version out of the final URL.
//! The result is memoized in a [`VersionCache`] for as long as the owning
//! resolver lives; there is no expiry.

mod pattern;
mod probe;

pub use pattern::extract_version;
pub use probe::{CurlProbe, Probe, ProbeOutcome};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::Settings;
use crate::error::PremiumError;
use crate::urls::{bootstrap_url, DEFAULT_BOOTSTRAP_FILE};

/// A requested version and the concrete release it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    pub requested: String,
    pub resolved: String,
    pub resolved_at: DateTime<Utc>,
}

/// Single-slot memo for a resolved version.
#[derive(Debug, Default)]
pub struct VersionCache {
    slot: RwLock<Option<ResolvedVersion>>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ResolvedVersion> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self, version: ResolvedVersion) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(version);
    }
}

/// Resolves the version for one fixed [`Settings`] through a [`Probe`] and
/// remembers the first success.
///
/// The cache holds a single answer, so the settings live with it; a
/// different key, CDN or version needs a different resolver.
///
/// Two threads racing on an empty cache may both probe; both results are
/// the same release, so whichever store lands last is kept.
pub struct VersionResolver {
    settings: Settings,
    probe: Arc<dyn Probe>,
    cache: VersionCache,
}

impl VersionResolver {
    pub fn new(settings: Settings, probe: Arc<dyn Probe>) -> Self {
        Self {
            settings,
            probe,
            cache: VersionCache::new(),
        }
    }

    pub fn with_curl(settings: Settings) -> Self {
        Self::new(settings, Arc::new(CurlProbe::default()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The memoized version, without touching the network.
    pub fn cached(&self) -> Option<ResolvedVersion> {
        self.cache.get()
    }

    pub fn resolve(&self) -> Result<ResolvedVersion, PremiumError> {
        if let Some(version) = self.cache.get() {
            return Ok(version);
        }
        let version = resolve_version(self.probe.as_ref(), &self.settings)?;
        tracing::info!(
            requested = %version.requested,
            resolved = %version.resolved,
            "resolved TinyMCE version"
        );
        self.cache.store(version.clone());
        Ok(version)
    }
}

/// One uncached resolution: build the probe URL, follow redirects, match.
pub fn resolve_version(
    probe: &dyn Probe,
    settings: &Settings,
) -> Result<ResolvedVersion, PremiumError> {
    let url = bootstrap_url(
        &settings.tinymce_version,
        &settings.tinymce_cdn,
        &settings.api_key,
        DEFAULT_BOOTSTRAP_FILE,
    )?;
    tracing::debug!(url = %url, "probing CDN for TinyMCE version");

    let outcome = probe.probe(&url)?;
    if !(200..300).contains(&outcome.status) {
        tracing::warn!(url = %url, status = outcome.status, "version probe failed");
        return Err(PremiumError::ResolutionFailed {
            url,
            status: outcome.status,
        });
    }

    match extract_version(&outcome.effective_url) {
        Some(resolved) => Ok(ResolvedVersion {
            requested: settings.tinymce_version.clone(),
            resolved: resolved.to_string(),
            resolved_at: Utc::now(),
        }),
        None => {
            tracing::warn!(url = %outcome.effective_url, "no version in resolved URL");
            Err(PremiumError::VersionNotFound {
                url: outcome.effective_url,
            })
        }
    }
}
