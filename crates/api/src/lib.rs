//! HTTP API server with observability for the order service.
//!
//! Exposes the order lifecycle (create, get, pay, cancel) over REST,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::{InMemoryCatalog, InMemoryPaymentClient, OrchestratorConfig, OrderOrchestrator};
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: OrderRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let orders_router = Router::new()
        .route("/orders", post(routes::orders::create::<R>))
        .route("/orders/{order_uuid}", get(routes::orders::get::<R>))
        .route("/orders/{order_uuid}/pay", post(routes::orders::pay::<R>))
        .route(
            "/orders/{order_uuid}/cancel",
            post(routes::orders::cancel::<R>),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1", orders_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: the given repository, the seeded
/// in-memory catalog, and the in-memory payment gateway.
pub fn create_default_state<R: OrderRepository + 'static>(
    repository: R,
    config: OrchestratorConfig,
) -> Arc<AppState<R>> {
    let catalog = InMemoryCatalog::seeded();
    let payment = InMemoryPaymentClient::new();
    let orchestrator =
        OrderOrchestrator::new(repository, catalog.clone(), payment.clone(), config);

    Arc::new(AppState {
        orchestrator,
        catalog,
        payment,
    })
}
