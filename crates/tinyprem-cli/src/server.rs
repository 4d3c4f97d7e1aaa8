//! HTTP endpoint serving the bootstrap script and plugin redirects.

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tinyprem_core::handler::{PLUGIN_ROUTE_PREFIX, SCRIPT_ROUTE};
use tinyprem_core::{PremiumError, PremiumHandler};

#[derive(Debug, Default, Deserialize)]
struct ScriptQuery {
    debug: Option<String>,
}

/// `?debug`, `?debug=1`, `?debug=true` are on; `0`, `false` and empty are off.
fn flag_enabled(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false")
}

pub fn router(handler: Arc<PremiumHandler>) -> Router {
    Router::new()
        .route(SCRIPT_ROUTE, get(serve_script))
        .route(
            &format!("{}/{{name}}", PLUGIN_ROUTE_PREFIX),
            get(redirect_plugin),
        )
        .with_state(handler)
}

/// Binds `host:port` and serves until the process stops.
pub async fn serve(handler: Arc<PremiumHandler>, host: &str, port: u16) -> Result<()> {
    let listener = bind(host, port).await?;
    let addr = listener.local_addr().context("listener address")?;
    tracing::info!("serving bootstrap script on http://{}{}", addr, SCRIPT_ROUTE);
    axum::serve(listener, router(handler))
        .await
        .context("script server")?;
    Ok(())
}

/// Host names (`localhost`) and bare IPv6 addresses (`::1`) are resolved
/// by the listener itself.
async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("bind {} port {}", host, port))
}

fn error_response(err: &PremiumError) -> Response {
    let status = if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    tracing::error!(%status, "request failed: {}", err);
    (status, err.to_string()).into_response()
}

async fn run_blocking<T, F>(handler: Arc<PremiumHandler>, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&PremiumHandler) -> Result<T, PremiumError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&handler)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(&err)),
        Err(err) => {
            tracing::error!("handler task failed: {}", err);
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

async fn serve_script(
    State(handler): State<Arc<PremiumHandler>>,
    Query(query): Query<ScriptQuery>,
) -> Response {
    let debug = query.debug.as_deref().is_some_and(flag_enabled);
    match run_blocking(handler, move |h| h.script(debug)).await {
        Ok(js) => ([(header::CONTENT_TYPE, "application/javascript")], js).into_response(),
        Err(resp) => resp,
    }
}

async fn redirect_plugin(
    State(handler): State<Arc<PremiumHandler>>,
    Path(name): Path<String>,
) -> Response {
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return StatusCode::NOT_FOUND.into_response();
    }
    match run_blocking(handler, move |h| h.plugin_url(&name)).await {
        Ok(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tinyprem_core::config::Settings;
    use tinyprem_core::resolve::{Probe, ProbeOutcome};
    use tower::ServiceExt;

    struct FixedProbe {
        status: u32,
        effective_url: &'static str,
        calls: AtomicUsize,
    }

    impl Probe for FixedProbe {
        fn probe(&self, _url: &str) -> Result<ProbeOutcome, PremiumError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProbeOutcome {
                status: self.status,
                effective_url: self.effective_url.to_string(),
            })
        }
    }

    fn probe(status: u32, effective_url: &'static str) -> Arc<FixedProbe> {
        Arc::new(FixedProbe {
            status,
            effective_url,
            calls: AtomicUsize::new(0),
        })
    }

    const RESOLVED: &str = "https://cdn.tiny.cloud/1/xyz/tinymce/6.1.2/plugins.min.js";

    fn handler_with(probe: Arc<FixedProbe>, api_key: &str, dev_mode: bool) -> Arc<PremiumHandler> {
        let settings = Settings::new(api_key, "6", "https://cdn.tiny.cloud/1");
        let mut handler = PremiumHandler::new(settings, probe).with_dev_mode(dev_mode);
        handler.set_option("height", "300");
        handler.set_option("bad", "'open");
        Arc::new(handler)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let location_or_type = resp
            .headers()
            .get(header::LOCATION)
            .or_else(|| resp.headers().get(header::CONTENT_TYPE))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, location_or_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn binds_host_names_and_ipv6() {
        let listener = bind("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
        // Not every sandbox has an IPv6 loopback.
        if let Ok(listener) = bind("::1", 0).await {
            assert!(listener.local_addr().unwrap().is_ipv6());
        }
    }

    #[test]
    fn debug_flag_values() {
        assert!(flag_enabled("1"));
        assert!(flag_enabled("true"));
        assert!(!flag_enabled("0"));
        assert!(!flag_enabled(""));
        assert!(!flag_enabled("false"));
    }

    #[tokio::test]
    async fn script_is_served_as_javascript() {
        let p = probe(200, RESOLVED);
        let app = router(handler_with(p.clone(), "xyz", false));
        let (status, content_type, body) = get(app, SCRIPT_ROUTE).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/javascript"));
        assert!(body.contains("{\"height\":300}"));
        assert!(!body.contains("'open"));
        assert_eq!(p.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn debug_needs_dev_mode() {
        let uri = format!("{}?debug=1", SCRIPT_ROUTE);

        let app = router(handler_with(probe(200, RESOLVED), "xyz", false));
        let (_, _, body) = get(app, &uri).await;
        assert!(body.contains("{\"height\":300}"));

        let app = router(handler_with(probe(200, RESOLVED), "xyz", true));
        let (_, _, body) = get(app, &uri).await;
        assert!(body.contains("{ \"height\": 300 }"));
    }

    #[tokio::test]
    async fn resolution_failure_is_bad_gateway() {
        let app = router(handler_with(probe(404, RESOLVED), "xyz", false));
        let (status, _, body) = get(app, SCRIPT_ROUTE).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("HTTP 404"));
    }

    #[tokio::test]
    async fn missing_api_key_is_server_error_without_probe() {
        let p = probe(200, RESOLVED);
        let app = router(handler_with(p.clone(), "", false));
        let (status, _, body) = get(app, SCRIPT_ROUTE).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("API key not set"));
        assert_eq!(p.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn plugin_route_redirects_to_cdn() {
        let app = router(handler_with(probe(200, RESOLVED), "xyz", false));
        let (status, location, _) =
            get(app, &format!("{}/powerpaste", PLUGIN_ROUTE_PREFIX)).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(
            location.as_deref(),
            Some("https://cdn.tiny.cloud/1/xyz/tinymce/6.1.2/plugins/powerpaste/plugin.min.js")
        );
    }

    #[tokio::test]
    async fn plugin_route_rejects_odd_names() {
        let app = router(handler_with(probe(200, RESOLVED), "xyz", false));
        let (status, _, _) = get(app, &format!("{}/a.b", PLUGIN_ROUTE_PREFIX)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
