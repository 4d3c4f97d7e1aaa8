//! Error taxonomy shared by resolution, URL building and script rendering.

use crate::script::ScriptError;

/// Failures surfaced by the premium handler.
///
/// Everything except `InvalidScriptFragment` is fatal for the current
/// request. `InvalidScriptFragment` is only produced while rendering an
/// option set, where the offending entry is logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum PremiumError {
    /// A required setting is absent or empty.
    #[error("{field} not set")]
    ConfigurationMissing { field: &'static str },

    /// The probe request ended on a non-2xx status.
    #[error("resolving {url} returned HTTP {status}")]
    ResolutionFailed { url: String, status: u32 },

    /// The effective URL did not embed a version token.
    #[error("no TinyMCE version found in {url}")]
    VersionNotFound { url: String },

    /// Curl could not complete the probe (DNS, connect, timeout).
    #[error("probe request failed: {0}")]
    Transport(#[from] curl::Error),

    /// One option value is not a complete script fragment.
    #[error("invalid script for option {key:?}: {source}")]
    InvalidScriptFragment {
        key: String,
        #[source]
        source: ScriptError,
    },

    /// The composed bootstrap script could not be minified.
    #[error("minifying bootstrap script failed: {0}")]
    MinifyFailed(#[source] ScriptError),
}

impl PremiumError {
    /// True for failures caused by the CDN rather than local configuration.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PremiumError::ResolutionFailed { .. }
                | PremiumError::VersionNotFound { .. }
                | PremiumError::Transport(_)
        )
    }
}
