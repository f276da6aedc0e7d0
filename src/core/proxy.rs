use crate::adapters::http::ReqwestTransport;
use crate::config::ProxyConfig;
use crate::core::dispatcher::RequestDispatcher;
use crate::core::fetcher::FallbackFetcher;
use crate::core::relay::RelayResponse;
use crate::domain::model::{SearchRequest, UpstreamPayload};
use crate::domain::ports::UpstreamTransport;
use crate::utils::error::Result;
use crate::utils::redact::CredentialRedactor;
use std::time::Duration;

/// Dispatcher, fallback fetcher and relay for one inbound call. Holds nothing
/// mutable, so one instance serves all concurrent requests.
pub struct ProxyEngine<T: UpstreamTransport> {
    pub(crate) dispatcher: RequestDispatcher,
    pub(crate) fetcher: FallbackFetcher<T>,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) probe_term: String,
    pub(crate) ping_timeout: Duration,
}

impl ProxyEngine<ReqwestTransport> {
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config.upstream)?;
        Self::new(config, transport)
    }
}

impl<T: UpstreamTransport> ProxyEngine<T> {
    pub fn new(config: &ProxyConfig, transport: T) -> Result<Self> {
        Ok(Self {
            dispatcher: RequestDispatcher::new(&config.upstream)?,
            fetcher: FallbackFetcher::new(transport, &config.upstream)?,
            username: config.upstream.username.clone(),
            password: config.upstream.password.clone(),
            probe_term: config.diagnostics.probe_term.clone(),
            ping_timeout: config.ping_timeout(),
        })
    }

    pub fn redactor(&self) -> &CredentialRedactor {
        self.fetcher.redactor()
    }

    /// Builds the upstream URL and runs the fallback sequence for it.
    pub async fn search(&self, request: &SearchRequest) -> Result<UpstreamPayload> {
        let url = self.dispatcher.build_url(request)?;
        self.fetcher.fetch(&url).await
    }

    /// [`Self::search`] mapped to what the caller receives.
    pub async fn relay(&self, request: &SearchRequest) -> RelayResponse {
        let result = self.search(request).await;
        if let Err(err) = &result {
            tracing::warn!(
                kind = %request.kind,
                "Search failed: {} (Category: {:?})",
                self.fetcher.redactor().redact(&err.to_string()),
                err.category()
            );
        }
        RelayResponse::from_result(result, self.fetcher.redactor())
    }
}
