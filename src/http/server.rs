//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit, metrics)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown, bounded by the graceful timeout

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    http::Request as HttpRequest,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ListenerConfig, ProxyConfig};
use crate::http::handlers;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::transaction::{TransactionService, UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<TransactionService<UpstreamClient>>,
}

/// HTTP server for the broadcast proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    shutdown: Arc<Shutdown>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig, shutdown: Arc<Shutdown>) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let transactions = Arc::new(TransactionService::new(
            upstream,
            config.monitor.clone(),
            shutdown.clone(),
        ));

        let router = build_router(&config.listener, AppState { transactions });
        Ok(Self {
            router,
            config,
            shutdown,
        })
    }

    /// Router with all middleware, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// shutdown is triggered.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let grace = self.config.listener.graceful_stop_timeout();
        let mut stop_accepting = self.shutdown.subscribe();
        let mut shutdown_started = self.shutdown.subscribe();

        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { stop_accepting.recv().await })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                tracing::info!("HTTP server stopped");
                return result;
            }
            _ = shutdown_started.recv() => {}
        }

        tracing::info!(
            timeout_secs = grace.as_secs(),
            "Shutdown signal received, draining in-flight requests"
        );

        match tokio::time::timeout(grace, server).await {
            Ok(result) => result?,
            Err(_) => tracing::warn!("Graceful shutdown timed out, closing remaining connections"),
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(listener: &ListenerConfig, state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/transactions/broadcast", post(handlers::broadcast_transaction))
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &HttpRequest<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(RequestBodyLimitLayer::new(listener.max_body_bytes)),
        )
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    metrics::record_request(response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = ProxyConfig::default();
        // Nothing listens here; these tests must never reach upstream.
        config.upstream.address = "http://127.0.0.1:9".to_string();
        HttpServer::new(config, Arc::new(Shutdown::new())).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn broadcast(body: &'static str) -> HttpRequest<Body> {
        HttpRequest::post("/transactions/broadcast")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let response = server()
            .router()
            .oneshot(HttpRequest::get("/healthcheck").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "message": "Healthcheck Successful" })
        );
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let response = server()
            .router()
            .oneshot(
                HttpRequest::get("/healthcheck")
                    .header(X_REQUEST_ID, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }

    #[tokio::test]
    async fn test_zero_price_is_bad_request() {
        let response = server()
            .router()
            .oneshot(broadcast(r#"{"symbol":"ETH","price":0,"timestamp":1678912345}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("price"));
    }

    #[tokio::test]
    async fn test_missing_fields_are_bad_request() {
        let response = server().router().oneshot(broadcast("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_null_price_is_bad_request() {
        let response = server()
            .router()
            .oneshot(broadcast(r#"{"symbol":"ETH","price":null,"timestamp":1678912345}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].as_str().unwrap().contains("price"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_unprocessable() {
        let response = server()
            .router()
            .oneshot(broadcast(r#"{"symbol":"ETH","price":"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_type_is_unprocessable() {
        let response = server()
            .router()
            .oneshot(broadcast(r#"{"symbol":"ETH","price":-5,"timestamp":1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = server()
            .router()
            .oneshot(HttpRequest::get("/transactions/broadcast").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
