#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "lambda")]
use trademark_proxy::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use trademark_proxy::{LambdaConfig, ProxyEngine, ReqwestTransport, RelayResponse, SearchRequest};

/// Invocation payload, e.g. `{"action":"search","kind":"trademark","search_term":"starbucks"}`.
#[cfg(feature = "lambda")]
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Request {
    Search(SearchRequest),
    Test,
    TestHeaders,
    Ping,
}

/// API Gateway style proxy response; `body` is the relayed JSON text.
#[cfg(feature = "lambda")]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: std::collections::HashMap<String, String>,
    pub body: String,
}

#[cfg(feature = "lambda")]
impl From<RelayResponse> for Response {
    fn from(relay: RelayResponse) -> Self {
        let headers = [("Content-Type".to_string(), "application/json".to_string())].into();
        Self {
            status_code: relay.status,
            headers,
            body: relay.body,
        }
    }
}

#[cfg(feature = "lambda")]
fn json_response<S: Serialize>(report: &S) -> Result<Response, Error> {
    let body = serde_json::to_string(report)?;
    Ok(Response::from(RelayResponse { status: 200, body }))
}

#[cfg(feature = "lambda")]
async fn function_handler(
    engine: &ProxyEngine<ReqwestTransport>,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    match event.payload {
        Request::Search(request) if request.start == 0 => Ok(Response::from(RelayResponse::error(
            400,
            "start must be a positive integer",
        ))),
        Request::Search(request) => {
            tracing::info!(kind = %request.kind, "Relaying search");
            Ok(Response::from(engine.relay(&request).await))
        }
        Request::Test => match engine.endpoint_report().await {
            Ok(report) => json_response(&report),
            Err(e) => Ok(Response::from(RelayResponse::from_error(&e, engine.redactor()))),
        },
        Request::TestHeaders => match engine.header_report().await {
            Ok(report) => json_response(&report),
            Err(e) => Ok(Response::from(RelayResponse::from_error(&e, engine.redactor()))),
        },
        Request::Ping => json_response(&engine.ping().await),
    }
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let lambda_config = LambdaConfig::from_env()?;
    if let Err(e) = lambda_config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    let engine = ProxyEngine::from_config(&lambda_config.proxy)?;
    let engine = &engine;

    run(service_fn(move |event: LambdaEvent<Request>| async move {
        function_handler(engine, event).await
    }))
    .await
}
