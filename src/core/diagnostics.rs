//! Connectivity reports: each candidate and each header profile probed once,
//! without fallback.

use crate::core::fetcher::{describe_error, BodyKind, Candidate, PRIMARY_NAME};
use crate::core::proxy::ProxyEngine;
use crate::domain::model::{HeaderProfile, SearchRequest, UpstreamAttempt};
use crate::domain::ports::UpstreamTransport;
use crate::utils::error::Result;
use crate::utils::redact::mask_secret;
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialSummary {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointProbe {
    pub name: String,
    pub url: String,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<BodyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_preview: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointReport {
    pub message: String,
    pub checked_at: DateTime<Utc>,
    pub credentials: CredentialSummary,
    pub results: Vec<EndpointProbe>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderProbe {
    pub configuration: String,
    pub profile: HeaderProfile,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<BodyKind>,
    pub has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderReport {
    pub message: String,
    pub checked_at: DateTime<Utc>,
    pub test_url: String,
    pub registered_domain: String,
    pub results: Vec<HeaderProbe>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingReport {
    pub status: ProbeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn preview(body: &str) -> String {
    let mut preview: String = body.chars().take(PREVIEW_CHARS).collect();
    if body.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

impl<T: UpstreamTransport> ProxyEngine<T> {
    fn probe_url(&self) -> Result<String> {
        self.dispatcher
            .build_url(&SearchRequest::trademark(self.probe_term.clone()))
    }

    /// GETs the probe query once against every candidate. A status below 400 counts
    /// as reachable.
    pub async fn endpoint_report(&self) -> Result<EndpointReport> {
        let redactor = self.fetcher.redactor();
        let mut results = Vec::new();

        for attempt in self.fetcher.planner().plan(&self.probe_url()?) {
            tracing::info!("Testing upstream '{}'", attempt.name);
            let url = redactor.redact(&attempt.url);

            let probe = match self.fetcher.transport().get(&attempt, self.fetcher.timeout()).await {
                Ok(response) if response.status < 400 => {
                    let kind = BodyKind::detect(&response.body, response.content_type.as_deref());
                    let data_preview = match kind {
                        BodyKind::Json => serde_json::from_str(&response.body).ok(),
                        _ => Some(serde_json::Value::String(redactor.redact(&preview(&response.body)))),
                    };
                    EndpointProbe {
                        name: attempt.name,
                        url,
                        status: ProbeStatus::Success,
                        final_url: Some(redactor.redact(&response.final_url)),
                        response_status: Some(response.status),
                        content_type: response.content_type,
                        data_type: Some(kind),
                        data_preview,
                        error: None,
                    }
                }
                Ok(response) => EndpointProbe {
                    name: attempt.name,
                    url,
                    status: ProbeStatus::Failed,
                    final_url: Some(redactor.redact(&response.final_url)),
                    response_status: Some(response.status),
                    content_type: response.content_type,
                    data_type: None,
                    data_preview: None,
                    error: Some(format!("Request failed with status code {}", response.status)),
                },
                Err(err) => EndpointProbe {
                    name: attempt.name,
                    url,
                    status: ProbeStatus::Failed,
                    final_url: None,
                    response_status: None,
                    content_type: None,
                    data_type: None,
                    data_preview: None,
                    error: Some(redactor.redact(&describe_error(&err))),
                },
            };
            results.push(probe);
        }

        Ok(EndpointReport {
            message: "API connectivity test results".to_string(),
            checked_at: Utc::now(),
            credentials: CredentialSummary {
                username: self.username.clone(),
                password: mask_secret(&self.password),
            },
            results,
        })
    }

    /// GETs the probe query on the primary once per header profile. Any status
    /// below 500 counts as a response.
    pub async fn header_report(&self) -> Result<HeaderReport> {
        let redactor = self.fetcher.redactor();
        let planner = self.fetcher.planner();
        let probe_url = self.probe_url()?;
        let primary = &planner.candidates()[0];
        let mut results = Vec::new();

        for profile in HeaderProfile::ALL {
            tracing::info!("Testing with: {}", profile.label());
            let attempt = planner.attempt(primary, probe_url.clone(), profile);

            let probe = match self.fetcher.transport().get(&attempt, self.fetcher.timeout()).await {
                Ok(response) if response.status < 500 => {
                    let kind = BodyKind::detect(&response.body, response.content_type.as_deref());
                    HeaderProbe {
                        configuration: profile.label().to_string(),
                        profile,
                        status: ProbeStatus::Success,
                        response_status: Some(response.status),
                        final_url: Some(redactor.redact(&response.final_url)),
                        content_type: response.content_type,
                        data_type: Some(kind),
                        has_data: has_data(&response.body, kind),
                        error: None,
                    }
                }
                Ok(response) => failed_header_probe(
                    profile,
                    Some(response.status),
                    format!("Request failed with status code {}", response.status),
                ),
                Err(err) => failed_header_probe(profile, None, redactor.redact(&describe_error(&err))),
            };
            results.push(probe);
        }

        Ok(HeaderReport {
            message: "Header configuration test results".to_string(),
            checked_at: Utc::now(),
            test_url: redactor.redact(&probe_url),
            registered_domain: planner.header_factory().registered_domain().to_string(),
            results,
        })
    }

    /// Plain reachability of the primary upstream's origin.
    pub async fn ping(&self) -> PingReport {
        let planner = self.fetcher.planner();
        let primary = &planner.candidates()[0];
        let origin = origin_of(primary);
        let host = Url::parse(&origin)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| origin.clone());

        let attempt = UpstreamAttempt {
            name: PRIMARY_NAME.to_string(),
            url: origin,
            headers: planner.header_factory().headers(HeaderProfile::Minimal),
            tls_verify: true,
        };

        match self.fetcher.transport().get(&attempt, self.ping_timeout).await {
            Ok(response) if response.status < 400 => PingReport {
                status: ProbeStatus::Success,
                message: format!("Can reach {}", host),
                status_code: Some(response.status),
                error: None,
            },
            Ok(response) => PingReport {
                status: ProbeStatus::Failed,
                message: format!("Cannot reach {}", host),
                status_code: Some(response.status),
                error: Some(format!("Request failed with status code {}", response.status)),
            },
            Err(err) => PingReport {
                status: ProbeStatus::Failed,
                message: format!("Cannot reach {}", host),
                status_code: None,
                error: Some(self.fetcher.redactor().redact(&describe_error(&err))),
            },
        }
    }
}

fn failed_header_probe(profile: HeaderProfile, status: Option<u16>, error: String) -> HeaderProbe {
    HeaderProbe {
        configuration: profile.label().to_string(),
        profile,
        status: ProbeStatus::Failed,
        response_status: status,
        final_url: None,
        content_type: None,
        data_type: None,
        has_data: false,
        error: Some(error),
    }
}

fn has_data(body: &str, kind: BodyKind) -> bool {
    match kind {
        BodyKind::Json => serde_json::from_str::<serde_json::Value>(body)
            .map(|value| match value {
                serde_json::Value::Object(map) => !map.is_empty(),
                serde_json::Value::Array(items) => !items.is_empty(),
                _ => false,
            })
            .unwrap_or(false),
        _ => !body.trim().is_empty(),
    }
}

fn origin_of(candidate: &Candidate) -> String {
    match Url::parse(&candidate.base_url) {
        Ok(url) => format!("{}/", url.origin().ascii_serialization()),
        Err(_) => candidate.base_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = "x".repeat(250);
        let short = preview(&body);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_has_data() {
        assert!(has_data(r#"{"count":1}"#, BodyKind::Json));
        assert!(!has_data("{}", BodyKind::Json));
        assert!(!has_data("[]", BodyKind::Json));
        assert!(has_data("<html></html>", BodyKind::Html));
    }

    #[test]
    fn test_origin_of_candidate() {
        let candidate = Candidate {
            name: "primary".to_string(),
            base_url: "https://markerapi.com/api/v2/trademarks".to_string(),
            relaxed_tls: false,
            header_profile: HeaderProfile::Minimal,
        };
        assert_eq!(origin_of(&candidate), "https://markerapi.com/");
    }
}
