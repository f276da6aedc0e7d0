use crate::config::toml_config::ProxyConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::env;
use std::path::PathBuf;

/// Configuration of the Lambda deployment: the same TOML layering as the CLI, with
/// the file path taken from `CONFIG_PATH`.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub config_path: Option<PathBuf>,
    pub proxy: ProxyConfig,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let config_path = env::var("CONFIG_PATH").ok().map(PathBuf::from);
        let proxy = ProxyConfig::load(config_path.as_deref())?;
        Ok(Self { config_path, proxy })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.proxy.validate()?;
        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}
