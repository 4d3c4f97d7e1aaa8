//! Outbound request that follows the CDN redirect.

use std::time::Duration;

use crate::error::PremiumError;

/// Terminal state of a probe after all redirects were followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: u32,
    /// URL of the last response in the redirect chain.
    pub effective_url: String,
}

/// Network seam for version resolution.
pub trait Probe: Send + Sync {
    fn probe(&self, url: &str) -> Result<ProbeOutcome, PremiumError>;
}

/// GET probe through libcurl. The body is read and discarded.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct CurlProbe {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlProbe {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Probe for CurlProbe {
    fn probe(&self, url: &str) -> Result<ProbeOutcome, PremiumError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| Ok(data.len()))?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let effective_url = easy.effective_url()?.unwrap_or(url).to_string();
        tracing::debug!(status, effective_url = %effective_url, "probe finished");

        Ok(ProbeOutcome {
            status,
            effective_url,
        })
    }
}
