//! CLI command handlers, one file per command.

mod resolve;
mod script;
mod serve;
mod urls;

pub use resolve::run_resolve;
pub use script::run_script;
pub use serve::run_serve;
pub use urls::{run_bootstrap_url, run_plugin_url};

use anyhow::{Context, Result};
use std::sync::Arc;
use tinyprem_core::PremiumHandler;

/// Runs blocking handler work (curl probe) off the async runtime.
async fn blocking<T, F>(handler: Arc<PremiumHandler>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&PremiumHandler) -> Result<T, tinyprem_core::PremiumError> + Send + 'static,
{
    let value = tokio::task::spawn_blocking(move || f(&handler))
        .await
        .context("handler task join")??;
    Ok(value)
}
