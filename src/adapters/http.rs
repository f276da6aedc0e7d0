use crate::config::UpstreamConfig;
use crate::domain::model::{TransportResponse, UpstreamAttempt};
use crate::domain::ports::UpstreamTransport;
use crate::utils::error::{ProxyError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// reqwest-backed transport.
///
/// Certificate checks are a client-level switch in reqwest, so the relaxed client
/// is a separate instance that only attempts with `tls_verify == false` ever use.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    strict: Client,
    relaxed: Client,
}

impl ReqwestTransport {
    pub fn new(max_redirects: usize) -> Result<Self> {
        let strict = Client::builder()
            .redirect(Policy::limited(max_redirects))
            .build()?;
        let relaxed = Client::builder()
            .redirect(Policy::limited(max_redirects))
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { strict, relaxed })
    }

    pub fn from_config(upstream: &UpstreamConfig) -> Result<Self> {
        Self::new(upstream.max_redirects)
    }

    fn client_for(&self, attempt: &UpstreamAttempt) -> &Client {
        if attempt.tls_verify {
            &self.strict
        } else {
            tracing::debug!("TLS verification disabled for upstream '{}'", attempt.name);
            &self.relaxed
        }
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn get(&self, attempt: &UpstreamAttempt, timeout: Duration) -> Result<TransportResponse> {
        let mut request = self.client_for(attempt).get(&attempt.url).timeout(timeout);

        for (key, value) in &attempt.headers {
            request = request.header(key, value);
        }

        // reqwest errors embed the request URL, which carries the credentials
        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::HttpError(e.without_url()))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| ProxyError::HttpError(e.without_url()))?;

        Ok(TransportResponse {
            status,
            final_url,
            content_type,
            body,
        })
    }
}
