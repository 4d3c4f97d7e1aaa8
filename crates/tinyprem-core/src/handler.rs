//! Composition root: settings, options, and the version resolver with its
//! cache, owned together and shared by reference with whoever serves the
//! script.

use std::sync::Arc;

use crate::bootstrap;
use crate::config::{PremiumConfig, Settings};
use crate::error::PremiumError;
use crate::options::OptionSet;
use crate::resolve::{Probe, ResolvedVersion, VersionResolver};
use crate::urls::{self, DEFAULT_BOOTSTRAP_FILE};

/// Path the bootstrap script is served under.
pub const SCRIPT_ROUTE: &str = "/_tinymce-premium/tinymce-premium.js";

/// Path prefix for plugin redirects.
pub const PLUGIN_ROUTE_PREFIX: &str = "/_tinymce-premium/plugins";

pub struct PremiumHandler {
    options: OptionSet,
    resolver: VersionResolver,
    public_url: String,
    dev_mode: bool,
}

impl PremiumHandler {
    pub fn new(settings: Settings, probe: Arc<dyn Probe>) -> Self {
        Self {
            options: OptionSet::new(),
            resolver: VersionResolver::new(settings, probe),
            public_url: String::new(),
            dev_mode: false,
        }
    }

    /// Builds a handler from loaded config, applying environment overrides.
    pub fn from_config(cfg: &PremiumConfig, probe: Arc<dyn Probe>) -> Self {
        let mut handler = Self::new(cfg.settings(), probe);
        handler.options = cfg.options.clone();
        handler.public_url = cfg.server.public_url.trim_end_matches('/').to_string();
        handler.dev_mode = cfg.server.dev_mode;
        handler
    }

    pub fn with_public_url(mut self, public_url: &str) -> Self {
        self.public_url = public_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn settings(&self) -> &Settings {
        self.resolver.settings()
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn resolved_version(&self) -> Result<ResolvedVersion, PremiumError> {
        self.resolver.resolve()
    }

    /// Bundle URL with the requested (possibly alias) version; this is the
    /// URL probed during resolution.
    pub fn probe_url(&self) -> Result<String, PremiumError> {
        urls::bootstrap_url(
            &self.settings().tinymce_version,
            &self.settings().tinymce_cdn,
            &self.settings().api_key,
            DEFAULT_BOOTSTRAP_FILE,
        )
    }

    /// `file` under the resolved version directory.
    pub fn bootstrap_url(&self, file: &str) -> Result<String, PremiumError> {
        let version = self.resolved_version()?;
        urls::bootstrap_url(
            &version.resolved,
            &self.settings().tinymce_cdn,
            &self.settings().api_key,
            file,
        )
    }

    pub fn plugin_url(&self, plugin: &str) -> Result<String, PremiumError> {
        let version = self.resolved_version()?;
        urls::plugin_url(
            &version.resolved,
            &self.settings().tinymce_cdn,
            &self.settings().api_key,
            plugin,
        )
    }

    /// Absolute URL pages should load the bootstrap script from.
    pub fn required_url(&self) -> String {
        format!("{}{}", self.public_url, SCRIPT_ROUTE)
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn set_option(&mut self, key: &str, value: &str) {
        self.options.set(key, value);
    }

    /// Replaces all options.
    pub fn set_options(&mut self, options: OptionSet) {
        self.options = options;
    }

    /// Renders the bootstrap script for one request.
    ///
    /// Resolves the version first (a cache hit after the first success) so a
    /// misconfigured CDN fails the request instead of shipping a script for
    /// editors that cannot load their plugins. `debug` skips minification
    /// only in dev mode.
    pub fn script(&self, debug: bool) -> Result<String, PremiumError> {
        self.render_script(!(debug && self.dev_mode))
    }

    /// Like [`script`](Self::script) with minification chosen by the caller.
    pub fn render_script(&self, minify: bool) -> Result<String, PremiumError> {
        let version = self.resolved_version()?;
        tracing::debug!(version = %version.resolved, minify, "rendering bootstrap script");
        bootstrap::render(&self.options, minify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ProbeOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RedirectingProbe {
        calls: AtomicUsize,
    }

    impl Probe for RedirectingProbe {
        fn probe(&self, url: &str) -> Result<ProbeOutcome, PremiumError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProbeOutcome {
                status: 200,
                effective_url: url.replace("/tinymce/6/", "/tinymce/6.1.2/"),
            })
        }
    }

    fn handler() -> (PremiumHandler, Arc<RedirectingProbe>) {
        let probe = Arc::new(RedirectingProbe {
            calls: AtomicUsize::new(0),
        });
        let settings = Settings::new("xyz", "6", "https://cdn.tiny.cloud/1");
        let handler =
            PremiumHandler::new(settings, probe.clone()).with_public_url("https://cms.example.com/");
        (handler, probe)
    }

    #[test]
    fn urls_use_requested_and_resolved_versions() {
        let (h, probe) = handler();
        assert_eq!(
            h.probe_url().unwrap(),
            "https://cdn.tiny.cloud/1/xyz/tinymce/6/plugins.min.js"
        );
        assert_eq!(
            h.plugin_url("powerpaste").unwrap(),
            "https://cdn.tiny.cloud/1/xyz/tinymce/6.1.2/plugins/powerpaste/plugin.min.js"
        );
        assert_eq!(
            h.bootstrap_url(DEFAULT_BOOTSTRAP_FILE).unwrap(),
            "https://cdn.tiny.cloud/1/xyz/tinymce/6.1.2/plugins.min.js"
        );
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn required_url_is_absolute() {
        let (h, _) = handler();
        assert_eq!(
            h.required_url(),
            "https://cms.example.com/_tinymce-premium/tinymce-premium.js"
        );
    }

    #[test]
    fn script_is_minified_unless_debug_in_dev_mode() {
        let (mut h, _) = handler();
        h.set_option("height", "300");
        assert!(h.script(false).unwrap().contains("{\"height\":300}"));
        assert!(h.script(true).unwrap().contains("{\"height\":300}"));

        let h = h.with_dev_mode(true);
        assert!(h.script(true).unwrap().contains("{ \"height\": 300 }"));
    }

    #[test]
    fn script_fails_without_api_key() {
        let probe = Arc::new(RedirectingProbe {
            calls: AtomicUsize::new(0),
        });
        let h = PremiumHandler::new(Settings::new("", "6", "https://cdn.tiny.cloud/1"), probe.clone());
        assert!(matches!(
            h.script(false),
            Err(PremiumError::ConfigurationMissing { .. })
        ));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn from_config_copies_options_and_server_settings() {
        let mut cfg = PremiumConfig::default();
        cfg.api_key = "xyz".to_string();
        cfg.options.set("menubar", "false");
        cfg.server.public_url = "https://cms.example.com/".to_string();
        cfg.server.dev_mode = true;
        let probe = Arc::new(RedirectingProbe {
            calls: AtomicUsize::new(0),
        });
        let h = PremiumHandler::from_config(&cfg, probe);
        assert_eq!(h.options().get("menubar"), Some("false"));
        assert!(h.dev_mode());
        assert!(h.required_url().starts_with("https://cms.example.com/_tinymce"));
    }

    #[test]
    fn set_options_replaces_everything() {
        let (mut h, _) = handler();
        h.set_option("a", "1");
        h.set_options([("b", "2")].into_iter().collect());
        assert_eq!(h.options().get("a"), None);
        assert_eq!(h.options().get("b"), Some("2"));
    }
}
