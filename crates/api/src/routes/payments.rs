//! Payment issuing and price quotes.
//!
//! Amounts on the wire are whole currency units.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money};
use domain::{OrderStore, PaymentRecord, PriceOptions, Tier};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePaymentRequest {
    pub customer_id: String,
    pub amount: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub customer_id: String,
    pub tier: Tier,
    #[serde(default)]
    pub express: bool,
    pub distance_km: Option<f64>,
    pub promo_code: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub ok: bool,
    pub token: String,
    pub customer_id: CustomerId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            ok: true,
            token: record.token.to_string(),
            customer_id: record.customer_id,
            amount: record.amount.major(),
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub tier: Tier,
    pub price: i64,
}

pub(crate) fn parse_customer_id(id: &str) -> Result<CustomerId, ApiError> {
    id.parse()
        .map_err(|e: common::IdParseError| ApiError::BadRequest(e.to_string()))
}

/// POST /payments: issue a single-use token for an amount.
#[tracing::instrument(skip(state, req))]
pub async fn issue<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<IssuePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let customer_id = parse_customer_id(&req.customer_id)?;
    let amount = Money::try_from_major(req.amount).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid payment amount: {} (out of range)", req.amount))
    })?;
    let record = state.booking.issue_payment(customer_id, amount).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// POST /quotes: price a tier for a customer.
#[tracing::instrument(skip(state, req))]
pub async fn quote<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let customer_id = parse_customer_id(&req.customer_id)?;
    let options = PriceOptions {
        express: req.express,
        distance_km: req.distance_km,
        promo_code: req.promo_code,
    };
    let price = state.booking.quote(customer_id, req.tier, &options).await?;
    Ok(Json(QuoteResponse {
        tier: req.tier,
        price: price.major(),
    }))
}
