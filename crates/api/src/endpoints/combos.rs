//! Combo catalog endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tutorhub_common::AppResult;
use tutorhub_core::CreateComboInput;
use tutorhub_db::entities::combo;

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Combo response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub slot: i32,
    pub price: i64,
    pub is_active: bool,
}

impl From<combo::Model> for ComboResponse {
    fn from(c: combo::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            slot: c.slot,
            price: c.price,
            is_active: c.is_active,
        }
    }
}

async fn list_combos(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ComboResponse>>> {
    let combos = state.combo_service.list_active().await?;
    Ok(ApiResponse::ok(combos.into_iter().map(Into::into).collect()))
}

async fn create_combo(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateComboInput>,
) -> AppResult<ApiResponse<ComboResponse>> {
    let combo = state.combo_service.create(input).await?;
    Ok(ApiResponse::created(combo.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_combos).post(create_combo))
}
