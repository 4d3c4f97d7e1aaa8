//! `tinyprem plugin-url <name>` and `tinyprem bootstrap-url`.

use anyhow::Result;
use std::sync::Arc;
use tinyprem_core::PremiumHandler;

use super::blocking;

pub async fn run_plugin_url(handler: Arc<PremiumHandler>, plugin: String) -> Result<()> {
    let url = blocking(handler, move |h| h.plugin_url(&plugin)).await?;
    println!("{url}");
    Ok(())
}

pub async fn run_bootstrap_url(handler: Arc<PremiumHandler>, file: String) -> Result<()> {
    let url = blocking(handler, move |h| h.bootstrap_url(&file)).await?;
    println!("{url}");
    Ok(())
}
