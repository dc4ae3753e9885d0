//! Order booking and lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use domain::{
    CreateOrder, DomainError, EditOrder, Order, OrderStatus, OrderStore, PriceOptions, Tier,
};
use scheduling::Slot;
use serde::{Deserialize, Serialize};

use super::payments::parse_customer_id;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub phone: String,
    pub address: String,
    pub pickup_slot: String,
    pub delivery_slot: String,
    pub tier: Option<Tier>,
    pub weight_kg: Option<f64>,
    pub express: bool,
    pub distance_km: Option<f64>,
    pub promo_code: Option<String>,
    pub payment_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub customer_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub next: Option<OrderStatus>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EditOrderRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub delivery_slot: Option<String>,
    pub weight_kg: Option<f64>,
    pub tier: Option<Tier>,
    pub payment_token: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub pickup_slot: Slot,
    pub delivery_slot: Slot,
    pub tier: Tier,
    pub weight_kg: Option<f64>,
    pub price: i64,
    pub paid: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            customer_name: order.customer_name,
            phone: order.phone,
            address: order.address,
            pickup_slot: order.pickup_slot,
            delivery_slot: order.delivery_slot,
            tier: order.tier,
            weight_kg: order.weight_kg,
            price: order.price.major(),
            paid: order.paid,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct OrderEnvelope {
    pub ok: bool,
    pub order: OrderResponse,
}

impl From<Order> for OrderEnvelope {
    fn from(order: Order) -> Self {
        Self {
            ok: true,
            order: order.into(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
}

// -- Handlers --

/// POST /orders: validate the pickup, consume the payment and book.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderEnvelope>), ApiError> {
    if req.customer_id.trim().is_empty() {
        return Err(DomainError::MissingField("customerId").into());
    }
    let customer_id = parse_customer_id(&req.customer_id)?;

    let cmd = CreateOrder {
        customer_id,
        phone: req.phone,
        address: req.address,
        pickup_slot: req.pickup_slot,
        delivery_slot: req.delivery_slot,
        tier: req.tier,
        weight_kg: req.weight_kg,
        price_options: PriceOptions {
            express: req.express,
            distance_km: req.distance_km,
            promo_code: req.promo_code,
        },
        payment_token: req.payment_token.into(),
    };
    let order = state.booking.create_order(cmd).await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders: all orders, or one customer's with `?customerId=`.
#[tracing::instrument(skip(state, query))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = match query.customer_id.as_deref() {
        Some(id) => {
            let customer_id = parse_customer_id(id)?;
            state.booking.list_orders_for_customer(customer_id).await?
        }
        None => state.booking.list_orders().await?,
    };

    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .booking
        .order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(order.into()))
}

/// PATCH /orders/{id}: advance the status.
#[tracing::instrument(skip(state, req))]
pub async fn advance<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let next = req
        .next
        .ok_or_else(|| ApiError::BadRequest("Missing field: next".to_string()))?;

    let order = state.booking.advance_status(order_id, next).await?;
    Ok(Json(order.into()))
}

/// PUT /orders/{id}: edit before pickup starts.
#[tracing::instrument(skip(state, req))]
pub async fn edit<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<EditOrderRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let patch = EditOrder {
        phone: req.phone,
        address: req.address,
        delivery_slot: req.delivery_slot,
        weight_kg: req.weight_kg,
        tier: req.tier,
        payment_token: req.payment_token.map(Into::into),
    };

    let order = state.booking.edit_order(order_id, patch).await?;
    Ok(Json(order.into()))
}

/// DELETE /orders/{id}: cancel before pickup starts.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.booking.cancel_order(order_id).await?;
    Ok(Json(order.into()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e: common::IdParseError| ApiError::BadRequest(e.to_string()))
}
