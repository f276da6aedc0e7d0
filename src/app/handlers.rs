use crate::app::console::CONSOLE_HTML;
use crate::app::router::SharedEngine;
use crate::core::diagnostics::{EndpointReport, HeaderReport, PingReport};
use crate::core::relay::RelayResponse;
use crate::domain::model::{SearchKind, SearchRequest, DEFAULT_START};
use crate::domain::ports::UpstreamTransport;
use crate::utils::error::{ProxyError, Result};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::any::Any;

/// Raw query string values; parsed leniently so bad input becomes a JSON 400.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub start: Option<String>,
    pub period: Option<String>,
}

impl SearchParams {
    fn start(&self) -> Result<u32> {
        match self.start.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_START),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|start| *start >= 1)
                .ok_or_else(|| ProxyError::invalid_parameter("start must be a positive integer")),
        }
    }

    pub fn into_request(self, kind: SearchKind) -> Result<SearchRequest> {
        let mut request = SearchRequest::new(kind).with_start(self.start()?);
        request.search_term = self.search;

        if matches!(kind, SearchKind::Trademark | SearchKind::Description) {
            if let Some(status) = self.status.filter(|s| !s.trim().is_empty()) {
                request.status = status;
            }
        }
        if kind == SearchKind::Expiring {
            if let Some(period) = self.period.filter(|p| !p.trim().is_empty()) {
                request.period = period;
            }
        }

        Ok(request)
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

async fn relay_search<T: UpstreamTransport>(
    engine: SharedEngine<T>,
    kind: SearchKind,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> RelayResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return RelayResponse::error(400, rejection.body_text()),
    };

    match params.into_request(kind) {
        Ok(request) => engine.relay(&request).await,
        Err(err) => {
            tracing::debug!(%kind, "Rejected request: {}", err);
            RelayResponse::from_error(&err, engine.redactor())
        }
    }
}

/// GET /api/trademark?search=&status=&start=
pub async fn trademark<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> RelayResponse {
    relay_search(engine, SearchKind::Trademark, params).await
}

/// GET /api/description?search=&status=&start=
pub async fn description<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> RelayResponse {
    relay_search(engine, SearchKind::Description, params).await
}

/// GET /api/owner?search=&start=
pub async fn owner<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> RelayResponse {
    relay_search(engine, SearchKind::Owner, params).await
}

/// GET /api/expiring?period=&start=
pub async fn expiring<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> RelayResponse {
    relay_search(engine, SearchKind::Expiring, params).await
}

/// GET /api/serial/:serial_number
pub async fn serial<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
    Path(serial_number): Path<String>,
) -> RelayResponse {
    engine.relay(&SearchRequest::serial(serial_number)).await
}

pub async fn endpoint_test<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
) -> std::result::Result<Json<EndpointReport>, RelayResponse> {
    engine
        .endpoint_report()
        .await
        .map(Json)
        .map_err(|err| RelayResponse::from_error(&err, engine.redactor()))
}

pub async fn header_test<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
) -> std::result::Result<Json<HeaderReport>, RelayResponse> {
    engine
        .header_report()
        .await
        .map(Json)
        .map_err(|err| RelayResponse::from_error(&err, engine.redactor()))
}

pub async fn ping<T: UpstreamTransport + 'static>(
    State(engine): State<SharedEngine<T>>,
) -> Json<PingReport> {
    Json(engine.ping().await)
}

pub async fn console() -> Html<&'static str> {
    Html(CONSOLE_HTML)
}

/// Last line of defence: a panicking handler still answers with the JSON error shape.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Unhandled error: {}", detail);
    RelayResponse::internal_error().into_response()
}
