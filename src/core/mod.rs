pub mod diagnostics;
pub mod dispatcher;
pub mod fetcher;
pub mod headers;
pub mod proxy;
pub mod relay;

pub use crate::domain::model::{SearchKind, SearchRequest, UpstreamAttempt, UpstreamPayload};
pub use crate::domain::ports::UpstreamTransport;
pub use crate::utils::error::Result;
