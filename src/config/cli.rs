use crate::config::toml_config::ProxyConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "trademark-proxy")]
#[command(about = "HTTP proxy for trademark registry searches")]
pub struct CliConfig {
    /// Path to a TOML configuration file; the built-in configuration is used otherwise
    #[arg(short, long, env = "TRADEMARK_PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// File (or built-in) settings, then environment, then command line flags.
    pub fn load_proxy_config(&self) -> Result<ProxyConfig> {
        self.load_proxy_config_with(|key| std::env::var(key).ok())
    }

    pub fn load_proxy_config_with<F>(&self, lookup: F) -> Result<ProxyConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ProxyConfig::load_with(self.config.as_deref(), lookup)?;

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file() -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[server]
port = 4000

[upstream]
base_url = "https://markerapi.com/api/v2/trademarks"
username = "demo"
password = "secret"
"#,
            )
            .unwrap();
        temp_file
    }

    #[test]
    fn test_cli_flags_override_file() {
        let temp_file = config_file();
        let cli = CliConfig::parse_from([
            "trademark-proxy",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--host",
            "0.0.0.0",
        ]);
        let config = cli.load_proxy_config_with(|_| None).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.upstream.username, "demo");
    }

    #[test]
    fn test_port_flag_wins_over_environment() {
        let temp_file = config_file();
        let cli = CliConfig::parse_from([
            "trademark-proxy",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--port",
            "9000",
        ]);
        let config = cli
            .load_proxy_config_with(|key| match key {
                "PORT" => Some("8081".to_string()),
                "MARKER_API_USERNAME" => Some("env-user".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.upstream.username, "env-user");
    }
}
