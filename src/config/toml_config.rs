use crate::domain::model::HeaderProfile;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Production setup: markerapi primary, the dev mirror (self-signed certificate)
/// and the host markerapi redirects to.
pub const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "${MARKER_API_USERNAME}"
password = "${MARKER_API_PASSWORD}"

[[upstream.mirrors]]
name = "dev"
base_url = "https://dev.markerapi.com/api/v2/trademarks"
relaxed_tls = true

[[upstream.mirrors]]
name = "redirect-target"
base_url = "https://api.worldtradingdata.com/api/v2/trademarks"
"#;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const APP_USER_AGENT: &str = "TrademarkSearchApp/1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `production` disables the local listener.
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_app_user_agent")]
    pub app_user_agent: String,
    #[serde(default)]
    pub header_profile: HeaderProfile,
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub mirrors: Vec<MirrorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    pub referer: String,
    pub origin: String,
}

impl UpstreamConfig {
    /// Bound on a single outbound attempt.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            referer: "https://www.getcenterpage.com/".to_string(),
            origin: "https://www.getcenterpage.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub name: String,
    pub base_url: String,
    /// Skip certificate verification for attempts against this mirror only.
    #[serde(default)]
    pub relaxed_tls: bool,
    #[serde(default)]
    pub header_profile: HeaderProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_probe_term")]
    pub probe_term: String,
    #[serde(default = "default_ping_timeout_seconds")]
    pub ping_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: None,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            probe_term: default_probe_term(),
            ping_timeout_seconds: default_ping_timeout_seconds(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_app_user_agent() -> String {
    APP_USER_AGENT.to_string()
}

fn default_probe_term() -> String {
    "starbucks".to_string()
}

fn default_ping_timeout_seconds() -> u64 {
    5
}

impl ProxyConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProxyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Built-in configuration, with `${VAR}` placeholders resolved from the environment.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Loads `path` when given, the built-in configuration otherwise, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`Self::load`] with overrides taken from `lookup` instead of the process environment.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::builtin()?,
        };
        config.apply_overrides_from(lookup);
        Ok(config)
    }

    /// 替換環境變數 (例如 ${MARKER_API_PASSWORD})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Applies `MARKER_API_*`, `PORT` and `NODE_ENV` overrides from `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("MARKER_API_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(username) = lookup("MARKER_API_USERNAME") {
            self.upstream.username = username;
        }
        if let Some(password) = lookup("MARKER_API_PASSWORD") {
            self.upstream.password = password;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(environment) = lookup("NODE_ENV") {
            self.server.environment = Some(environment);
        }
    }

    pub fn is_production(&self) -> bool {
        self.server
            .environment
            .as_deref()
            .is_some_and(|env| env.eq_ignore_ascii_case("production"))
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.diagnostics.ping_timeout_seconds)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_base_url("upstream.base_url", &self.upstream.base_url)?;
        validation::validate_non_empty_string("upstream.username", &self.upstream.username)?;
        validation::validate_resolved("upstream.username", &self.upstream.username)?;
        validation::validate_non_empty_string("upstream.password", &self.upstream.password)?;
        validation::validate_resolved("upstream.password", &self.upstream.password)?;
        validation::validate_range("upstream.timeout_seconds", self.upstream.timeout_seconds, 1, 300)?;
        validation::validate_range("upstream.max_redirects", self.upstream.max_redirects, 0, 20)?;
        validation::validate_positive_number("server.port", u64::from(self.server.port), 1)?;
        validation::validate_positive_number(
            "diagnostics.ping_timeout_seconds",
            self.diagnostics.ping_timeout_seconds,
            1,
        )?;

        for (index, mirror) in self.upstream.mirrors.iter().enumerate() {
            let field = format!("upstream.mirrors[{}]", index);
            validation::validate_non_empty_string(&format!("{}.name", field), &mirror.name)?;
            validation::validate_base_url(&format!("{}.base_url", field), &mirror.base_url)?;
        }

        Ok(())
    }
}

impl Validate for ProxyConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_TOML: &str = r#"
[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "demo"
password = "secret"

[[upstream.mirrors]]
name = "dev"
base_url = "https://dev.markerapi.com/api/v2/trademarks"
relaxed_tls = true
header_profile = "browser"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = ProxyConfig::from_toml_str(BASIC_TOML).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.timeout_seconds, 15);
        assert_eq!(config.upstream.max_redirects, 5);
        assert_eq!(config.upstream.header_profile, HeaderProfile::RegisteredOrigin);
        assert_eq!(config.upstream.mirrors.len(), 1);
        assert!(config.upstream.mirrors[0].relaxed_tls);
        assert_eq!(config.upstream.mirrors[0].header_profile, HeaderProfile::Browser);
        assert_eq!(config.diagnostics.probe_term, "starbucks");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_PROXY_PASSWORD", "from-env");

        let toml_content = r#"
[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "demo"
password = "${TEST_PROXY_PASSWORD}"
"#;

        let config = ProxyConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upstream.password, "from-env");

        std::env::remove_var("TEST_PROXY_PASSWORD");
    }

    #[test]
    fn test_unresolved_placeholder_fails_validation() {
        let toml_content = r#"
[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "demo"
password = "${TEST_PROXY_UNSET_PASSWORD_VAR}"
"#;

        let config = ProxyConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upstream.password, "${TEST_PROXY_UNSET_PASSWORD_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builtin_config_has_relaxed_dev_mirror() {
        let config = ProxyConfig::builtin().unwrap();

        assert_eq!(config.upstream.base_url, "https://markerapi.com/api/v2/trademarks");
        let names: Vec<&str> = config.upstream.mirrors.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["dev", "redirect-target"]);
        assert!(config.upstream.mirrors[0].relaxed_tls);
        assert!(!config.upstream.mirrors[1].relaxed_tls);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let mut config = ProxyConfig::from_toml_str(BASIC_TOML).unwrap();
        let vars: HashMap<&str, &str> = [
            ("MARKER_API_PASSWORD", "rotated"),
            ("PORT", "8081"),
            ("NODE_ENV", "production"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.upstream.username, "demo");
        assert_eq!(config.upstream.password, "rotated");
        assert_eq!(config.server.port, 8081);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_mirror_url_rejected() {
        let toml_content = r#"
[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "demo"
password = "secret"

[[upstream.mirrors]]
name = "broken"
base_url = "not a url"
"#;

        let config = ProxyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_with_query_rejected() {
        let toml_content = r#"
[upstream]
base_url = "https://markerapi.com/api/v2/trademarks?k=1"
username = "demo"
password = "secret"
"#;
        let config = ProxyConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let mut config = ProxyConfig::from_toml_str(BASIC_TOML).unwrap();
        config.upstream.mirrors[0].base_url =
            "https://dev.markerapi.com/api/v2/trademarks#frag".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_from_config() {
        let config = ProxyConfig::from_toml_str(BASIC_TOML).unwrap();
        assert_eq!(config.upstream.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_TOML.as_bytes()).unwrap();

        let config = ProxyConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.upstream.username, "demo");
    }
}
