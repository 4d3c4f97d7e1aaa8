//! `tinyprem script` – print the bootstrap script.

use anyhow::Result;
use std::sync::Arc;
use tinyprem_core::PremiumHandler;

use super::blocking;

pub async fn run_script(handler: Arc<PremiumHandler>, debug: bool) -> Result<()> {
    let js = blocking(handler, move |h| h.render_script(!debug)).await?;
    println!("{js}");
    Ok(())
}
