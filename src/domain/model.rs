use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream search endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Trademark,
    Description,
    Owner,
    Serial,
    Expiring,
}

impl SearchKind {
    /// First path segment of the upstream URL for this kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Trademark => "trademark",
            Self::Description => "description",
            Self::Owner => "owner",
            Self::Serial => "serialnumber",
            Self::Expiring => "expiring",
        }
    }

    pub fn requires_search_term(&self) -> bool {
        matches!(self, Self::Trademark | Self::Description | Self::Owner)
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trademark => "trademark",
            Self::Description => "description",
            Self::Owner => "owner",
            Self::Serial => "serial",
            Self::Expiring => "expiring",
        };
        f.write_str(name)
    }
}

pub const DEFAULT_STATUS: &str = "active";
pub const DEFAULT_PERIOD: &str = "6 months";
pub const DEFAULT_START: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub kind: SearchKind,
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_start")]
    pub start: u32,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default)]
    pub serial_number: Option<String>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_start() -> u32 {
    DEFAULT_START
}

fn default_period() -> String {
    DEFAULT_PERIOD.to_string()
}

impl SearchRequest {
    pub fn new(kind: SearchKind) -> Self {
        Self {
            kind,
            search_term: None,
            status: default_status(),
            start: DEFAULT_START,
            period: default_period(),
            serial_number: None,
        }
    }

    pub fn trademark(term: impl Into<String>) -> Self {
        Self::new(SearchKind::Trademark).with_term(term)
    }

    pub fn description(term: impl Into<String>) -> Self {
        Self::new(SearchKind::Description).with_term(term)
    }

    pub fn owner(term: impl Into<String>) -> Self {
        Self::new(SearchKind::Owner).with_term(term)
    }

    pub fn serial(serial_number: impl Into<String>) -> Self {
        let mut request = Self::new(SearchKind::Serial);
        request.serial_number = Some(serial_number.into());
        request
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }
}

/// Named header set sent with an outbound attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderProfile {
    /// App user agent and a JSON accept header, nothing else.
    Minimal,
    /// Desktop browser user agent plus the registered client's referer/origin.
    #[default]
    RegisteredOrigin,
    /// Full browser-like header set from the registered origin.
    Browser,
}

impl HeaderProfile {
    pub const ALL: [HeaderProfile; 3] = [Self::Minimal, Self::RegisteredOrigin, Self::Browser];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Minimal => "No special headers",
            Self::RegisteredOrigin => "With registered domain headers",
            Self::Browser => "Browser-like headers from registered domain",
        }
    }
}

/// One planned outbound request of the fallback sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamAttempt {
    pub name: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub tls_verify: bool,
}

impl UpstreamAttempt {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What the transport saw after following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// Upstream JSON body, kept verbatim so the relay can pass it through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPayload {
    raw: String,
}

impl UpstreamPayload {
    pub(crate) fn new(raw: String) -> Self {
        Self { raw }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults_from_json() {
        let request: SearchRequest =
            serde_json::from_value(serde_json::json!({"kind": "trademark", "search_term": "nike"}))
                .unwrap();

        assert_eq!(request.kind, SearchKind::Trademark);
        assert_eq!(request.status, "active");
        assert_eq!(request.start, 1);
        assert_eq!(request.period, "6 months");
        assert!(request.serial_number.is_none());
    }

    #[test]
    fn test_attempt_header_lookup_is_case_insensitive() {
        let attempt = UpstreamAttempt {
            name: "primary".to_string(),
            url: "https://example.com".to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            tls_verify: true,
        };
        assert_eq!(attempt.header("accept"), Some("application/json"));
        assert_eq!(attempt.header("origin"), None);
    }
}
