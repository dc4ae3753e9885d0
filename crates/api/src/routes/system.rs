//! Health and Prometheus endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use domain::OrderStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub orders: usize,
    pub grid_minutes: u32,
    pub open_hour: u32,
    pub close_hour: u32,
    pub closed_weekday: String,
}

/// GET /health: liveness plus the active slot rules.
pub async fn health<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let orders = state.booking.list_orders().await?.len();
    let rules = state.booking.validator().grid().rules();

    Ok(Json(HealthResponse {
        status: "ok",
        orders,
        grid_minutes: rules.grid_minutes,
        open_hour: rules.open_hour,
        close_hour: rules.close_hour,
        closed_weekday: rules.closed_weekday.to_string(),
    }))
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
