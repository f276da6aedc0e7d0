use crate::app::handlers;
use crate::core::proxy::ProxyEngine;
use crate::domain::ports::UpstreamTransport;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub type SharedEngine<T> = Arc<ProxyEngine<T>>;

pub fn build_router<T: UpstreamTransport + 'static>(engine: SharedEngine<T>) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::console))
        .route("/api/trademark", get(handlers::trademark::<T>))
        .route("/api/description", get(handlers::description::<T>))
        .route("/api/owner", get(handlers::owner::<T>))
        .route("/api/expiring", get(handlers::expiring::<T>))
        .route("/api/serial/:serial_number", get(handlers::serial::<T>))
        // 診斷
        .route("/api/test", get(handlers::endpoint_test::<T>))
        .route("/api/test-headers", get(handlers::header_test::<T>))
        .route("/api/ping", get(handlers::ping::<T>))
        .with_state(engine);

    with_middleware(routes)
}

/// Request tracing, and a JSON 500 for any handler that panics.
fn with_middleware(router: Router) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handlers::panic_response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn exploding_handler() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_panicking_handler_answers_with_json_500() {
        let app = with_middleware(Router::new().route("/boom", get(exploding_handler)));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"error":"Internal server error"}"#);
    }
}
