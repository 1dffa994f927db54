//! Booking endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tutorhub_common::AppResult;
use tutorhub_core::CreateBookingInput;
use tutorhub_db::entities::booking::{self, BookingStatus};

use super::{clamp_limit, default_limit};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Booking response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub student_id: String,
    pub tutor_id: String,
    pub schedule_id: Option<String>,
    pub subject: String,
    pub note: Option<String>,
    pub start_at: String,
    pub end_at: String,
    pub status: BookingStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            student_id: b.student_id,
            tutor_id: b.tutor_id,
            schedule_id: b.schedule_id,
            subject: b.subject,
            note: b.note,
            start_at: b.start_at.to_rfc3339(),
            end_at: b.end_at.to_rfc3339(),
            status: b.status,
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

async fn create_booking(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBookingInput>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state.booking_service.create(&id, input).await?;
    Ok(ApiResponse::created(booking.into()))
}

async fn list_bookings(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state
        .booking_service
        .list(&id, query.status, clamp_limit(query.limit), query.offset)
        .await?;
    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

async fn get_booking(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state
        .booking_service
        .get(&id, &user.id, user.is_admin())
        .await?;
    Ok(ApiResponse::ok(booking.into()))
}

async fn update_status(
    AuthUser { id: caller_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state
        .booking_service
        .update_status(&id, &caller_id, req.status)
        .await?;
    Ok(ApiResponse::ok(booking.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/{id}", get(get_booking))
        .route("/{id}/status", put(update_status))
}
