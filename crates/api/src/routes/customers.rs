//! Customer registration.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{Customer, OrderStore};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub is_member: bool,
}

/// POST /customers: register a customer and return its id.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Missing required field: name".to_string()));
    }

    let customer = state.booking.register_customer(name, req.is_member).await;
    Ok((StatusCode::CREATED, Json(customer)))
}
