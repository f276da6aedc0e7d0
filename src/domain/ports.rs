use crate::domain::model::{TransportResponse, UpstreamAttempt};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Performs a single outbound GET. Implementations follow redirects and honour
/// the attempt's `tls_verify` flag; they never retry.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get(&self, attempt: &UpstreamAttempt, timeout: Duration) -> Result<TransportResponse>;
}
