//! Tutor availability endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Serialize;
use tutorhub_common::AppResult;
use tutorhub_core::CreateScheduleInput;
use tutorhub_db::entities::schedule;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Availability window response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: String,
    pub tutor_id: String,
    pub start_at: String,
    pub end_at: String,
    pub is_booked: bool,
}

impl From<schedule::Model> for ScheduleResponse {
    fn from(s: schedule::Model) -> Self {
        Self {
            id: s.id,
            tutor_id: s.tutor_id,
            start_at: s.start_at.to_rfc3339(),
            end_at: s.end_at.to_rfc3339(),
            is_booked: s.is_booked,
        }
    }
}

async fn create_window(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateScheduleInput>,
) -> AppResult<ApiResponse<ScheduleResponse>> {
    let window = state.schedule_service.create(&id, input).await?;
    Ok(ApiResponse::created(window.into()))
}

async fn my_windows(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ScheduleResponse>>> {
    let windows = state.schedule_service.list_for_tutor(&id).await?;
    Ok(ApiResponse::ok(windows.into_iter().map(Into::into).collect()))
}

async fn tutor_windows(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ScheduleResponse>>> {
    let windows = state.schedule_service.list_for_tutor(&tutor_id).await?;
    Ok(ApiResponse::ok(windows.into_iter().map(Into::into).collect()))
}

async fn delete_window(
    AuthUser { id: tutor_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.schedule_service.delete(&id, &tutor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_window))
        .route("/me", get(my_windows))
        .route("/tutor/{id}", get(tutor_windows))
        .route("/{id}", delete(delete_window))
}
