//! CDN URL composition for the premium bundle.
//!
//! Layout: `{cdn}/{api_key}/tinymce/{version}/...`. All parts are checked
//! for emptiness before interpolation so a missing setting never turns into
//! a malformed URL.

use crate::error::PremiumError;

/// File probed to resolve a version and loaded as the premium bundle.
pub const DEFAULT_BOOTSTRAP_FILE: &str = "plugins.min.js";

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, PremiumError> {
    if value.trim().is_empty() {
        return Err(PremiumError::ConfigurationMissing { field });
    }
    Ok(value)
}

fn base(version: &str, cdn: &str, api_key: &str) -> Result<String, PremiumError> {
    let version = require(version, "TinyMCE version")?;
    let cdn = require(cdn, "TinyMCE CDN")?;
    let api_key = require(api_key, "TinyMCE Premium API key")?;
    Ok(format!("{}/{}/tinymce/{}", cdn, api_key, version))
}

/// URL of a file directly under the version directory, e.g. the bundle.
pub fn bootstrap_url(
    version: &str,
    cdn: &str,
    api_key: &str,
    file: &str,
) -> Result<String, PremiumError> {
    let base = base(version, cdn, api_key)?;
    let file = require(file, "file name")?;
    Ok(format!("{}/{}", base, file))
}

/// URL of a single premium plugin script.
pub fn plugin_url(
    version: &str,
    cdn: &str,
    api_key: &str,
    plugin: &str,
) -> Result<String, PremiumError> {
    let base = base(version, cdn, api_key)?;
    let plugin = require(plugin, "plugin")?;
    Ok(format!("{}/plugins/{}/plugin.min.js", base, plugin))
}
