//! Combo purchase endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tutorhub_common::AppResult;
use tutorhub_db::entities::order_combo::{self, OrderApprovalStatus};

use super::{clamp_limit, default_limit};
use crate::{
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Order response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub account_id: String,
    pub combo_id: String,
    pub used_slot: i32,
    pub remaining_slot: i32,
    pub price: i64,
    pub status: bool,
    pub approval_status: OrderApprovalStatus,
    pub reviewed_by: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<order_combo::Model> for OrderResponse {
    fn from(o: order_combo::Model) -> Self {
        Self {
            id: o.id,
            account_id: o.account_id,
            combo_id: o.combo_id,
            used_slot: o.used_slot,
            remaining_slot: o.remaining_slot,
            price: o.price,
            status: o.status,
            approval_status: o.approval_status,
            reviewed_by: o.reviewed_by,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub combo_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub approval_status: Option<OrderApprovalStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub approval_status: OrderApprovalStatus,
}

async fn purchase(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_combo_service.purchase(&id, &req.combo_id).await?;
    Ok(ApiResponse::created(order.into()))
}

async fn list_orders(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<ApiResponse<Vec<OrderResponse>>> {
    let orders = state
        .order_combo_service
        .list(query.approval_status, clamp_limit(query.limit), query.offset)
        .await?;
    Ok(ApiResponse::ok(orders.into_iter().map(Into::into).collect()))
}

async fn my_orders(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderResponse>>> {
    let orders = state.order_combo_service.list_mine(&id).await?;
    Ok(ApiResponse::ok(orders.into_iter().map(Into::into).collect()))
}

async fn set_approval(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApprovalRequest>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state
        .order_combo_service
        .set_approval(&id, &admin.id, req.approval_status)
        .await?;
    Ok(ApiResponse::ok(order.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(purchase))
        .route("/me", get(my_orders))
        .route("/{id}/approval", put(set_approval))
}
