pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use adapters::http::ReqwestTransport;
pub use app::{build_router, serve};
pub use config::ProxyConfig;
pub use crate::core::{proxy::ProxyEngine, relay::RelayResponse};
pub use domain::model::{SearchKind, SearchRequest};
pub use utils::error::{ProxyError, Result};
