use crate::config::UpstreamConfig;
use crate::domain::model::HeaderProfile;

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_BROWSER: &str = "application/json, text/plain, */*";

/// Builds the header list for each [`HeaderProfile`].
#[derive(Debug, Clone)]
pub struct HeaderFactory {
    user_agent: String,
    app_user_agent: String,
    referer: String,
    origin: String,
}

impl HeaderFactory {
    pub fn new(upstream: &UpstreamConfig) -> Self {
        Self {
            user_agent: upstream.user_agent.clone(),
            app_user_agent: upstream.app_user_agent.clone(),
            referer: upstream.origin.referer.clone(),
            origin: upstream.origin.origin.clone(),
        }
    }

    /// The registered client origin the upstream account is tied to.
    pub fn registered_domain(&self) -> &str {
        &self.referer
    }

    pub fn headers(&self, profile: HeaderProfile) -> Vec<(String, String)> {
        let pairs: Vec<(&str, &str)> = match profile {
            HeaderProfile::Minimal => vec![
                ("User-Agent", self.app_user_agent.as_str()),
                ("Accept", ACCEPT_JSON),
            ],
            HeaderProfile::RegisteredOrigin => vec![
                ("User-Agent", self.user_agent.as_str()),
                ("Accept", ACCEPT_JSON),
                ("Referer", self.referer.as_str()),
                ("Origin", self.origin.as_str()),
            ],
            HeaderProfile::Browser => vec![
                ("User-Agent", self.user_agent.as_str()),
                ("Accept", ACCEPT_BROWSER),
                ("Accept-Language", "en-US,en;q=0.9"),
                ("Referer", self.referer.as_str()),
                ("Origin", self.origin.as_str()),
                ("DNT", "1"),
                ("Sec-Fetch-Dest", "empty"),
                ("Sec-Fetch-Mode", "cors"),
                ("Sec-Fetch-Site", "cross-site"),
            ],
        };

        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;

    fn factory() -> HeaderFactory {
        let config = ProxyConfig::from_toml_str(
            r#"
[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "demo"
password = "secret"
"#,
        )
        .unwrap();
        HeaderFactory::new(&config.upstream)
    }

    fn get<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_registered_origin_profile() {
        let headers = factory().headers(HeaderProfile::RegisteredOrigin);

        assert_eq!(get(&headers, "Accept"), Some("application/json"));
        assert_eq!(get(&headers, "Referer"), Some("https://www.getcenterpage.com/"));
        assert_eq!(get(&headers, "Origin"), Some("https://www.getcenterpage.com"));
        assert!(get(&headers, "User-Agent").unwrap().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_minimal_profile_has_no_origin() {
        let headers = factory().headers(HeaderProfile::Minimal);

        assert_eq!(get(&headers, "User-Agent"), Some("TrademarkSearchApp/1.0"));
        assert_eq!(get(&headers, "Origin"), None);
        assert_eq!(get(&headers, "Referer"), None);
    }

    #[test]
    fn test_browser_profile_adds_fetch_metadata() {
        let headers = factory().headers(HeaderProfile::Browser);

        assert_eq!(get(&headers, "Sec-Fetch-Mode"), Some("cors"));
        assert_eq!(get(&headers, "Origin"), Some("https://www.getcenterpage.com"));
    }
}
