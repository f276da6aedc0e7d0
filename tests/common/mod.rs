#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use httpmock::MockServer;
use std::sync::Arc;
use tower::ServiceExt;
use trademark_proxy::{build_router, ProxyConfig, ProxyEngine};

pub const BASE_PATH: &str = "/api/v2/trademarks";

/// Primary on `primary`, one mirror on `mirror` (when given).
pub fn proxy_config(primary: &str, mirror: Option<&str>) -> ProxyConfig {
    proxy_config_with_timeout(primary, mirror, 5)
}

pub fn proxy_config_with_timeout(primary: &str, mirror: Option<&str>, timeout_seconds: u64) -> ProxyConfig {
    let mut toml = format!(
        r#"
[upstream]
base_url = "{primary}{BASE_PATH}"
username = "demo"
password = "secret"
timeout_seconds = {timeout_seconds}

[diagnostics]
probe_term = "starbucks"
ping_timeout_seconds = 2
"#
    );
    if let Some(mirror) = mirror {
        toml.push_str(&format!(
            r#"
[[upstream.mirrors]]
name = "dev"
base_url = "{mirror}{BASE_PATH}"
relaxed_tls = true
"#
        ));
    }
    ProxyConfig::from_toml_str(&toml).unwrap()
}

pub fn app(config: &ProxyConfig) -> Router {
    let engine = ProxyEngine::from_config(config).unwrap();
    build_router(Arc::new(engine))
}

pub fn server_root(server: &MockServer) -> String {
    server.base_url()
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}
