//! `tinyprem serve` – HTTP endpoint for the bootstrap script.

use anyhow::Result;
use std::sync::Arc;
use tinyprem_core::PremiumHandler;

use crate::server;

pub async fn run_serve(handler: Arc<PremiumHandler>, host: &str, port: u16) -> Result<()> {
    println!("Include on editor pages: {}", handler.required_url());
    server::serve(handler, host, port).await
}
