use crate::config::UpstreamConfig;
use crate::domain::model::{SearchKind, SearchRequest};
use crate::utils::error::{ProxyError, Result};
use url::Url;

pub const MISSING_SEARCH_MESSAGE: &str = "Search parameter is required";
pub const MISSING_SERIAL_MESSAGE: &str = "Serial number is required";

/// Turns a [`SearchRequest`] into the canonical upstream URL.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    base_url: Url,
    username: String,
    password: String,
}

impl RequestDispatcher {
    pub fn new(upstream: &UpstreamConfig) -> Result<Self> {
        let base_url = Url::parse(&upstream.base_url).map_err(|e| ProxyError::InvalidConfigValueError {
            field: "upstream.base_url".to_string(),
            value: upstream.base_url.clone(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ProxyError::InvalidConfigValueError {
                field: "upstream.base_url".to_string(),
                value: upstream.base_url.clone(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }

        Ok(Self {
            base_url,
            username: upstream.username.clone(),
            password: upstream.password.clone(),
        })
    }

    /// Builds the upstream URL. Fails with a client input error, before any network
    /// activity, when the term or serial number the kind needs is missing or blank.
    pub fn build_url(&self, request: &SearchRequest) -> Result<String> {
        let start = request.start.to_string();
        let mut segments: Vec<&str> = vec![request.kind.path_segment()];

        if request.kind.requires_search_term() {
            segments.push(required(request.search_term.as_deref(), MISSING_SEARCH_MESSAGE)?);
        }

        match request.kind {
            SearchKind::Trademark | SearchKind::Description => {
                segments.extend(["status", request.status.as_str(), "start", start.as_str()]);
            }
            SearchKind::Owner => {
                segments.extend(["start", start.as_str()]);
            }
            SearchKind::Expiring => {
                segments.extend([request.period.as_str(), "start", start.as_str()]);
            }
            SearchKind::Serial => {
                let serial = required(request.serial_number.as_deref(), MISSING_SERIAL_MESSAGE)?;
                segments.push(serial);
            }
        }

        segments.extend(["username", self.username.as_str(), "password", self.password.as_str()]);

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::ConfigError {
                message: "upstream base URL cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        tracing::debug!(kind = %request.kind, "Built upstream URL");
        Ok(url.into())
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ProxyError::missing_parameter(message)),
    }
}
