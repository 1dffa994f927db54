//! Registration, login, profile and tutor-request submission.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use tutorhub_common::AppResult;
use tutorhub_core::{AuthSession, LoginInput, RegisterInput, SubmitTutorRequestInput, UpdateProfileInput};
use tutorhub_db::entities::account::{self, AccountRole};

use super::admin::TutorRequestResponse;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Public account profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub role: AccountRole,
    pub is_approved: bool,
    pub education: Option<String>,
    pub scores: serde_json::Value,
    pub certificates: serde_json::Value,
    pub evidence: serde_json::Value,
    pub created_at: String,
}

impl From<account::Model> for AccountResponse {
    fn from(a: account::Model) -> Self {
        Self {
            id: a.id,
            email: a.email,
            name: a.name,
            avatar_url: a.avatar_url,
            phone: a.phone,
            bio: a.bio,
            role: a.role,
            is_approved: a.is_approved,
            education: a.education,
            scores: a.scores,
            certificates: a.certificates,
            evidence: a.evidence,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Token plus the signed-in profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            account: session.account.into(),
        }
    }
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.account_service.register(input).await?;
    Ok(ApiResponse::created(session.into()))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.account_service.login(input).await?;
    Ok(ApiResponse::ok(session.into()))
}

async fn me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state.account_service.get(&id).await?;
    Ok(ApiResponse::ok(account.into()))
}

async fn update_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state.account_service.update_profile(&id, input).await?;
    Ok(ApiResponse::ok(account.into()))
}

async fn submit_tutor_request(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitTutorRequestInput>,
) -> AppResult<ApiResponse<TutorRequestResponse>> {
    let detail = state.tutor_request_service.submit(&id, input).await?;
    Ok(ApiResponse::created(detail.into()))
}

async fn my_tutor_request(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TutorRequestResponse>> {
    let detail = state.tutor_request_service.latest_for_account(&id).await?;
    Ok(ApiResponse::ok(detail.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
        .route(
            "/tutor-request",
            post(submit_tutor_request).get(my_tutor_request),
        )
}
