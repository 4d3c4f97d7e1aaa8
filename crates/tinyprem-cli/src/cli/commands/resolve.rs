//! `tinyprem resolve` – resolve the configured version against the CDN.

use anyhow::Result;
use std::sync::Arc;
use tinyprem_core::PremiumHandler;

use super::blocking;

pub async fn run_resolve(handler: Arc<PremiumHandler>, json: bool) -> Result<()> {
    let probe_url = handler.probe_url()?;
    let version = blocking(handler, |h| h.resolved_version()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&version)?);
    } else {
        println!("Probe URL: {probe_url}");
        println!(
            "Requested {} -> resolved {} (at {})",
            version.requested,
            version.resolved,
            version.resolved_at.to_rfc3339()
        );
    }
    Ok(())
}
