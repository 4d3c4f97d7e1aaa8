use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::options::OptionSet;

/// Prefix for environment overrides, e.g. `TINYMCE_PREMIUM_API_KEY`.
pub const ENV_PREFIX: &str = "TINYMCE_PREMIUM_";

pub const DEFAULT_TINYMCE_VERSION: &str = "4";
pub const DEFAULT_TINYMCE_CDN: &str = "https://cdn.tiny.cloud/1";

fn default_tinymce_version() -> String {
    DEFAULT_TINYMCE_VERSION.to_string()
}

fn default_tinymce_cdn() -> String {
    DEFAULT_TINYMCE_CDN.to_string()
}

/// Script endpoint settings (optional `[server]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    pub port: u16,
    /// Public base URL pages use to load the bootstrap script.
    pub public_url: String,
    /// Allows `?debug=1` to serve the script unminified.
    #[serde(default)]
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8088,
            public_url: "http://127.0.0.1:8088".to_string(),
            dev_mode: false,
        }
    }
}

/// Global configuration loaded from `~/.config/tinyprem/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumConfig {
    /// tiny.cloud API key.
    #[serde(default)]
    pub api_key: String,
    /// Requested TinyMCE version; may be a major alias like "6".
    #[serde(default = "default_tinymce_version")]
    pub tinymce_version: String,
    /// CDN base URL.
    #[serde(default = "default_tinymce_cdn")]
    pub tinymce_cdn: String,
    #[serde(default)]
    pub server: ServerConfig,
    /// Editor options, name -> script expression.
    #[serde(default)]
    pub options: OptionSet,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            tinymce_version: default_tinymce_version(),
            tinymce_cdn: default_tinymce_cdn(),
            server: ServerConfig::default(),
            options: OptionSet::new(),
        }
    }
}

impl PremiumConfig {
    /// Effective settings: environment first, then this file.
    pub fn settings(&self) -> Settings {
        Settings::from_sources(&[&EnvSource::from_env(), self])
    }
}

/// The three settings that can be overridden from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    ApiKey,
    TinymceVersion,
    TinymceCdn,
}

impl Setting {
    /// Key in config.toml.
    pub fn key(self) -> &'static str {
        match self {
            Setting::ApiKey => "api_key",
            Setting::TinymceVersion => "tinymce_version",
            Setting::TinymceCdn => "tinymce_cdn",
        }
    }

    pub fn env_var(self) -> String {
        format!("{}{}", ENV_PREFIX, self.key().to_ascii_uppercase())
    }
}

/// One provider in the settings precedence chain.
pub trait SettingSource {
    fn get(&self, setting: Setting) -> Option<String>;
}

impl SettingSource for PremiumConfig {
    fn get(&self, setting: Setting) -> Option<String> {
        let value = match setting {
            Setting::ApiKey => &self.api_key,
            Setting::TinymceVersion => &self.tinymce_version,
            Setting::TinymceCdn => &self.tinymce_cdn,
        };
        Some(value.clone())
    }
}

/// Environment snapshot taken once; later changes to the process
/// environment are not seen.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        Self { vars }
    }
}

impl SettingSource for EnvSource {
    fn get(&self, setting: Setting) -> Option<String> {
        self.vars.get(&setting.env_var()).cloned()
    }
}

/// Effective values after walking the source chain. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub tinymce_version: String,
    pub tinymce_cdn: String,
}

impl Settings {
    pub fn new(
        api_key: impl Into<String>,
        tinymce_version: impl Into<String>,
        tinymce_cdn: impl Into<String>,
    ) -> Self {
        Self {
            api_key: normalize(&api_key.into()),
            tinymce_version: normalize(&tinymce_version.into()),
            tinymce_cdn: normalize(&tinymce_cdn.into()),
        }
    }

    /// Queries `sources` in order; the first non-empty value wins.
    pub fn from_sources(sources: &[&dyn SettingSource]) -> Self {
        let lookup = |setting: Setting| {
            sources
                .iter()
                .filter_map(|s| s.get(setting))
                .map(|v| normalize(&v))
                .find(|v| !v.is_empty())
                .unwrap_or_default()
        };
        Self {
            api_key: lookup(Setting::ApiKey),
            tinymce_version: lookup(Setting::TinymceVersion),
            tinymce_cdn: lookup(Setting::TinymceCdn),
        }
    }
}

/// Settings are used as URL path parts; surrounding slashes would double up.
fn normalize(value: &str) -> String {
    value.trim().trim_matches('/').to_string()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tinyprem")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PremiumConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PremiumConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path; the file must exist.
pub fn load_from(path: &Path) -> Result<PremiumConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: PremiumConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
