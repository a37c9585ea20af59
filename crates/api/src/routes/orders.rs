//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, PartId, UserId};
use domain::Order;
use orchestrator::{InMemoryCatalog, InMemoryPaymentClient, OrderOrchestrator};
use order_store::OrderRepository;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: OrderRepository> {
    pub orchestrator: OrderOrchestrator<R, InMemoryCatalog, InMemoryPaymentClient>,
    pub catalog: InMemoryCatalog,
    pub payment: InMemoryPaymentClient,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_uuid: String,
    pub part_uuids: Vec<String>,
}

#[derive(Deserialize)]
pub struct PayOrderRequest {
    #[serde(default)]
    pub payment_method: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order_uuid: String,
    pub total_price_cents: i64,
}

#[derive(Serialize)]
pub struct PayOrderResponse {
    pub transaction_uuid: String,
}

#[derive(Serialize)]
pub struct OrderDto {
    pub order_uuid: String,
    pub user_uuid: String,
    pub part_uuids: Vec<String>,
    pub total_price_cents: i64,
    pub transaction_uuid: Option<String>,
    pub payment_method: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            order_uuid: order.id().to_string(),
            user_uuid: order.user_id().to_string(),
            part_uuids: order.part_ids().iter().map(ToString::to_string).collect(),
            total_price_cents: order.total_price().cents(),
            transaction_uuid: order.transaction_id().map(|id| id.to_string()),
            payment_method: order.payment_method().map(str::to_string),
            status: order.status().to_string(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

// -- Handlers --

/// POST /api/v1/orders: price the requested parts and create a pending order.
#[tracing::instrument(skip(state, req))]
pub async fn create<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let user_id: UserId = parse_uuid("user_uuid", &req.user_uuid)?;
    let part_ids = req
        .part_uuids
        .iter()
        .map(|id| parse_uuid::<PartId>("part_uuids", id))
        .collect::<Result<Vec<_>, _>>()?;

    let order = state.orchestrator.create_order(user_id, part_ids).await?;

    let response = CreateOrderResponse {
        order_uuid: order.id().to_string(),
        total_price_cents: order.total_price().cents(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/orders/{order_uuid}: current order snapshot.
#[tracing::instrument(skip(state))]
pub async fn get<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(order_uuid): Path<String>,
) -> Result<Json<OrderDto>, ApiError> {
    let order_id: OrderId = parse_uuid("order_uuid", &order_uuid)?;
    let order = state.orchestrator.get_order(order_id).await?;

    Ok(Json(OrderDto::from(&order)))
}

/// POST /api/v1/orders/{order_uuid}/pay: charge a pending order.
#[tracing::instrument(skip(state, req))]
pub async fn pay<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(order_uuid): Path<String>,
    Json(req): Json<PayOrderRequest>,
) -> Result<Json<PayOrderResponse>, ApiError> {
    let order_id: OrderId = parse_uuid("order_uuid", &order_uuid)?;
    let order = state
        .orchestrator
        .pay_order(order_id, &req.payment_method)
        .await?;

    let transaction_uuid = order
        .transaction_id()
        .map(|id| id.to_string())
        .unwrap_or_default();

    Ok(Json(PayOrderResponse { transaction_uuid }))
}

/// POST /api/v1/orders/{order_uuid}/cancel: cancel a pending order.
#[tracing::instrument(skip(state))]
pub async fn cancel<R: OrderRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(order_uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id: OrderId = parse_uuid("order_uuid", &order_uuid)?;
    state.orchestrator.cancel_order(order_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// -- Helpers --

fn parse_uuid<T>(field: &str, value: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = uuid::Error>,
{
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}
