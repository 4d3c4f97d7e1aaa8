//! CLI for tinyprem.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tinyprem_core::config::{self, PremiumConfig};
use tinyprem_core::resolve::CurlProbe;
use tinyprem_core::urls::DEFAULT_BOOTSTRAP_FILE;
use tinyprem_core::PremiumHandler;

use commands::{run_bootstrap_url, run_plugin_url, run_resolve, run_script, run_serve};

/// Top-level CLI for tinyprem.
#[derive(Debug, Parser)]
#[command(name = "tinyprem")]
#[command(about = "tinyprem: TinyMCE premium CDN resolver and editor bootstrap script", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/tinyprem/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve the configured TinyMCE version against the CDN.
    Resolve {
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the CDN URL of a premium plugin.
    PluginUrl {
        /// Plugin name, e.g. "powerpaste".
        plugin: String,
    },

    /// Print the CDN URL of a file under the resolved version directory.
    BootstrapUrl {
        #[arg(long, default_value = DEFAULT_BOOTSTRAP_FILE)]
        file: String,
    },

    /// Print the bootstrap script.
    Script {
        /// Skip minification.
        #[arg(long)]
        debug: bool,
    },

    /// Serve the bootstrap script over HTTP.
    Serve {
        /// Bind address (default from config).
        #[arg(long)]
        host: Option<String>,
        /// Bind port (default from config).
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<PremiumConfig> {
    match path {
        Some(p) => config::load_from(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);
        let handler = Arc::new(PremiumHandler::from_config(
            &cfg,
            Arc::new(CurlProbe::default()),
        ));

        match cli.command {
            CliCommand::Resolve { json } => run_resolve(handler, json).await?,
            CliCommand::PluginUrl { plugin } => run_plugin_url(handler, plugin).await?,
            CliCommand::BootstrapUrl { file } => run_bootstrap_url(handler, file).await?,
            CliCommand::Script { debug } => run_script(handler, debug).await?,
            CliCommand::Serve { host, port } => {
                let host = host.unwrap_or(cfg.server.host);
                let port = port.unwrap_or(cfg.server.port);
                run_serve(handler, &host, port).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
