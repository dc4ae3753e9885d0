//! HTTP API server with observability for the laundry booking engine.
//!
//! Provides REST endpoints for slot checks, payments and the order lifecycle,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{BookingService, Clock, InMemoryPaymentLedger, OrderStore, SystemClock};
use metrics_exporter_prometheus::PrometheusHandle;
use scheduling::{SlotGrid, SlotRules, SlotValidator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health::<S>))
        .route("/customers", post(routes::customers::register::<S>))
        .route("/slots/validate", post(routes::slots::validate::<S>))
        .route("/slots/{date}", get(routes::slots::available::<S>))
        .route("/payments", post(routes::payments::issue::<S>))
        .route("/quotes", post(routes::payments::quote::<S>))
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>)
                .patch(routes::orders::advance::<S>)
                .put(routes::orders::edit::<S>)
                .delete(routes::orders::cancel::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state on the system clock.
pub fn create_default_state<S: OrderStore + 'static>(
    store: S,
    rules: SlotRules,
) -> scheduling::Result<Arc<AppState<S>>> {
    create_state(store, rules, Arc::new(SystemClock))
}

/// Creates application state with an explicit clock.
pub fn create_state<S: OrderStore + 'static>(
    store: S,
    rules: SlotRules,
    clock: Arc<dyn Clock>,
) -> scheduling::Result<Arc<AppState<S>>> {
    let validator = SlotValidator::new(SlotGrid::new(rules)?);
    let ledger = InMemoryPaymentLedger::with_clock(clock.clone());
    let booking = BookingService::with_clock(store, ledger, validator, clock);

    Ok(Arc::new(AppState { booking }))
}
