//! Slot availability and validation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::NaiveDate;
use domain::OrderStore;
use scheduling::{RejectReason, Slot, ValidationResult};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub pickup_slot: String,
}

/// Outcome of a slot check, also used as the body of a rejected booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCheckResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_slot: Option<Slot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Slot>,
}

impl SlotCheckResponse {
    pub fn rejected(reason: RejectReason, suggestion: Option<Slot>) -> Self {
        Self {
            ok: false,
            normalized_slot: None,
            code: Some(reason.code()),
            reason: Some(reason.to_string()),
            suggestion,
        }
    }
}

impl From<ValidationResult> for SlotCheckResponse {
    fn from(result: ValidationResult) -> Self {
        match result {
            ValidationResult::Accepted { normalized_slot } => Self {
                ok: true,
                normalized_slot: Some(normalized_slot),
                code: None,
                reason: None,
                suggestion: None,
            },
            ValidationResult::Rejected { reason, suggestion } => {
                Self::rejected(reason, suggestion)
            }
        }
    }
}

#[derive(Serialize)]
pub struct AvailableSlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// GET /slots/{date}: free pickup slots on a `YYYY-MM-DD` date.
#[tracing::instrument(skip(state))]
pub async fn available<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(date): Path<String>,
) -> Result<Json<AvailableSlotsResponse>, ApiError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{date}', expected YYYY-MM-DD")))?;
    let slots = state.booking.available_slots(date).await?;
    Ok(Json(AvailableSlotsResponse { date, slots }))
}

/// POST /slots/validate: check a pickup request without booking it.
#[tracing::instrument(skip(state, req))]
pub async fn validate<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<SlotCheckResponse>, ApiError> {
    let result = state.booking.validate_slot(&req.pickup_slot).await?;
    Ok(Json(result.into()))
}
