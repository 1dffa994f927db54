//! Tutor review endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tutorhub_common::AppResult;
use tutorhub_core::{CreateReviewInput, TutorReviews};
use tutorhub_db::entities::review;

use super::{clamp_limit, default_limit};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Review response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub student_id: String,
    pub tutor_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<review::Model> for ReviewResponse {
    fn from(r: review::Model) -> Self {
        Self {
            id: r.id,
            student_id: r.student_id,
            tutor_id: r.tutor_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// A tutor's reviews with their mean rating.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReviewsResponse {
    pub average_rating: Option<f64>,
    pub reviews: Vec<ReviewResponse>,
}

impl From<TutorReviews> for TutorReviewsResponse {
    fn from(t: TutorReviews) -> Self {
        Self {
            average_rating: t.average_rating,
            reviews: t.reviews.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListReviewsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

async fn create_review(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReviewInput>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.review_service.create(&id, input).await?;
    Ok(ApiResponse::created(review.into()))
}

async fn tutor_reviews(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
    Query(query): Query<ListReviewsQuery>,
) -> AppResult<ApiResponse<TutorReviewsResponse>> {
    let reviews = state
        .review_service
        .list_for_tutor(&tutor_id, clamp_limit(query.limit), query.offset)
        .await?;
    Ok(ApiResponse::ok(reviews.into()))
}

async fn delete_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .review_service
        .delete(&id, &user.id, user.is_admin())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/tutor/{id}", get(tutor_reviews))
        .route("/{id}", delete(delete_review))
}
