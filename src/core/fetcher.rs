//! Ordered fallback across the primary upstream and its mirrors.
//!
//! Attempts run one after another. The first `200` carrying a JSON object or array
//! wins; every other outcome moves on to the next candidate, and once the list is
//! exhausted the caller gets the message of the last failure.

use crate::config::UpstreamConfig;
use crate::core::headers::HeaderFactory;
use crate::domain::model::{HeaderProfile, TransportResponse, UpstreamAttempt, UpstreamPayload};
use crate::domain::ports::UpstreamTransport;
use crate::utils::error::{ProxyError, Result};
use crate::utils::redact::CredentialRedactor;
use crate::utils::validation;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub const PRIMARY_NAME: &str = "primary";

/// A base URL the fallback sequence may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub base_url: String,
    pub relaxed_tls: bool,
    pub header_profile: HeaderProfile,
}

/// Derives the ordered attempt list for a primary URL.
#[derive(Debug, Clone)]
pub struct AttemptPlanner {
    candidates: Vec<Candidate>,
    headers: HeaderFactory,
}

impl AttemptPlanner {
    pub fn new(upstream: &UpstreamConfig) -> Result<Self> {
        let mut candidates = vec![Candidate {
            name: PRIMARY_NAME.to_string(),
            base_url: normalize_base("upstream.base_url", &upstream.base_url)?,
            relaxed_tls: false,
            header_profile: upstream.header_profile,
        }];

        for mirror in &upstream.mirrors {
            candidates.push(Candidate {
                name: mirror.name.clone(),
                base_url: normalize_base("upstream.mirrors.base_url", &mirror.base_url)?,
                relaxed_tls: mirror.relaxed_tls,
                header_profile: mirror.header_profile,
            });
        }

        Ok(Self {
            candidates,
            headers: HeaderFactory::new(upstream),
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn header_factory(&self) -> &HeaderFactory {
        &self.headers
    }

    fn primary_base(&self) -> &str {
        &self.candidates[0].base_url
    }

    /// One attempt per candidate, in configured order. Mirror URLs replace the primary
    /// base prefix; a URL already planned is not planned again.
    pub fn plan(&self, primary_url: &str) -> Vec<UpstreamAttempt> {
        let suffix = primary_url.strip_prefix(self.primary_base());
        let mut attempts: Vec<UpstreamAttempt> = Vec::with_capacity(self.candidates.len());

        for candidate in &self.candidates {
            let url = match suffix {
                Some(rest) => format!("{}{}", candidate.base_url, rest),
                None => primary_url.to_string(),
            };

            if attempts.iter().any(|a| a.url == url) {
                tracing::debug!(candidate = %candidate.name, "Skipping duplicate upstream URL");
                continue;
            }

            attempts.push(self.attempt(candidate, url, candidate.header_profile));
        }

        attempts
    }

    /// A single attempt against `url` with an explicit profile, TLS per `candidate`.
    pub fn attempt(&self, candidate: &Candidate, url: String, profile: HeaderProfile) -> UpstreamAttempt {
        UpstreamAttempt {
            name: candidate.name.clone(),
            url,
            headers: self.headers.headers(profile),
            tls_verify: !candidate.relaxed_tls,
        }
    }
}

fn normalize_base(field: &str, raw: &str) -> Result<String> {
    validation::validate_base_url(field, raw)?;
    let url = Url::parse(raw).map_err(|e| ProxyError::InvalidConfigValueError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Rough shape of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// A JSON object or array.
    Json,
    Html,
    /// Anything else, including bare JSON scalars.
    Text,
}

impl BodyKind {
    pub fn detect(body: &str, content_type: Option<&str>) -> Self {
        let trimmed = body.trim_start();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if value.is_object() || value.is_array() {
                return Self::Json;
            }
        }

        let looks_like_markup = trimmed.starts_with('<')
            || trimmed.to_ascii_lowercase().contains("<html")
            || content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"));

        if looks_like_markup {
            Self::Html
        } else {
            Self::Text
        }
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(UpstreamPayload),
    /// Usable HTTP exchange without usable data; try the next candidate.
    SoftFailure(String),
    /// Network error, timeout or a 5xx status.
    TransportFailure(String),
}

pub fn classify(response: TransportResponse) -> AttemptOutcome {
    if response.status >= 500 {
        return AttemptOutcome::TransportFailure(format!(
            "Request failed with status code {}",
            response.status
        ));
    }

    if response.status != 200 {
        return AttemptOutcome::SoftFailure(format!(
            "Upstream returned status {}",
            response.status
        ));
    }

    match BodyKind::detect(&response.body, response.content_type.as_deref()) {
        BodyKind::Json => AttemptOutcome::Success(UpstreamPayload::new(response.body)),
        BodyKind::Html => {
            AttemptOutcome::SoftFailure("Upstream returned HTML instead of JSON".to_string())
        }
        BodyKind::Text => AttemptOutcome::SoftFailure("Upstream returned malformed JSON".to_string()),
    }
}

/// Renders an error with its source chain, e.g. `error sending request: operation timed out`.
pub fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

pub struct FallbackFetcher<T: UpstreamTransport> {
    transport: T,
    planner: AttemptPlanner,
    timeout: Duration,
    redactor: CredentialRedactor,
}

impl<T: UpstreamTransport> FallbackFetcher<T> {
    pub fn new(transport: T, upstream: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            transport,
            planner: AttemptPlanner::new(upstream)?,
            timeout: upstream.request_timeout(),
            redactor: CredentialRedactor::new(&upstream.password),
        })
    }

    pub fn planner(&self) -> &AttemptPlanner {
        &self.planner
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn redactor(&self) -> &CredentialRedactor {
        &self.redactor
    }

    pub async fn fetch(&self, primary_url: &str) -> Result<UpstreamPayload> {
        let attempts = self.planner.plan(primary_url);
        let total = attempts.len();
        let mut last_error = "no upstream candidates".to_string();

        for (index, attempt) in attempts.iter().enumerate() {
            tracing::info!(
                "Attempt {}/{} ({}) - requesting {}",
                index + 1,
                total,
                attempt.name,
                self.redactor.redact(&attempt.url)
            );

            match self.try_attempt(attempt).await {
                AttemptOutcome::Success(payload) => {
                    tracing::info!("Success with upstream '{}'", attempt.name);
                    return Ok(payload);
                }
                AttemptOutcome::SoftFailure(message) => {
                    tracing::warn!("Upstream '{}' unusable: {}, trying next URL", attempt.name, message);
                    last_error = message;
                }
                AttemptOutcome::TransportFailure(message) => {
                    tracing::error!("API request error (attempt {}): {}", index + 1, message);
                    last_error = message;
                }
            }
        }

        Err(ProxyError::UpstreamExhausted { last_error })
    }

    async fn try_attempt(&self, attempt: &UpstreamAttempt) -> AttemptOutcome {
        match self.transport.get(attempt, self.timeout).await {
            Ok(response) => {
                tracing::debug!(
                    status = response.status,
                    final_url = %self.redactor.redact(&response.final_url),
                    content_type = response.content_type.as_deref().unwrap_or(""),
                    "Upstream responded"
                );
                match classify(response) {
                    AttemptOutcome::Success(payload) => AttemptOutcome::Success(payload),
                    AttemptOutcome::SoftFailure(m) => AttemptOutcome::SoftFailure(self.redactor.redact(&m)),
                    AttemptOutcome::TransportFailure(m) => {
                        AttemptOutcome::TransportFailure(self.redactor.redact(&m))
                    }
                }
            }
            Err(err) => AttemptOutcome::TransportFailure(self.redactor.redact(&describe_error(&err))),
        }
    }
}
