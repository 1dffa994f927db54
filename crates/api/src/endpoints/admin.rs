//! Admin endpoints: tutor-request review and dashboard stats.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tutorhub_common::AppResult;
use tutorhub_core::{AdminStats, TutorRequestDetail};
use tutorhub_db::entities::{
    tutor_certificate, tutor_evidence,
    tutor_request::{self, TutorRequestStatus},
};

use super::{clamp_limit, default_limit};
use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Certificate attached to a tutor request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

impl From<tutor_certificate::Model> for CertificateResponse {
    fn from(c: tutor_certificate::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            image_url: c.image_url,
        }
    }
}

/// Evidence attached to a tutor request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceResponse {
    pub id: String,
    pub description: Option<String>,
    pub file_url: String,
}

impl From<tutor_evidence::Model> for EvidenceResponse {
    fn from(e: tutor_evidence::Model) -> Self {
        Self {
            id: e.id,
            description: e.description,
            file_url: e.file_url,
        }
    }
}

/// Tutor request, with attachments when loaded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequestResponse {
    pub id: String,
    pub account_id: String,
    pub status: TutorRequestStatus,
    pub education: Option<String>,
    pub scores: serde_json::Value,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates: Option<Vec<CertificateResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<EvidenceResponse>>,
}

impl From<tutor_request::Model> for TutorRequestResponse {
    fn from(r: tutor_request::Model) -> Self {
        Self {
            id: r.id,
            account_id: r.account_id,
            status: r.status,
            education: r.education,
            scores: r.scores,
            note: r.note,
            reason: r.reason,
            reviewed_by: r.reviewed_by,
            reviewed_at: r.reviewed_at.map(|t| t.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
            certificates: None,
            evidence: None,
        }
    }
}

impl From<TutorRequestDetail> for TutorRequestResponse {
    fn from(detail: TutorRequestDetail) -> Self {
        Self {
            certificates: Some(detail.certificates.into_iter().map(Into::into).collect()),
            evidence: Some(detail.evidence.into_iter().map(Into::into).collect()),
            ..detail.request.into()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTutorRequestsQuery {
    pub status: Option<TutorRequestStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

async fn list_tutor_requests(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListTutorRequestsQuery>,
) -> AppResult<ApiResponse<Vec<TutorRequestResponse>>> {
    let requests = state
        .tutor_request_service
        .list(query.status, clamp_limit(query.limit), query.offset)
        .await?;
    Ok(ApiResponse::ok(requests.into_iter().map(Into::into).collect()))
}

async fn get_tutor_request(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TutorRequestResponse>> {
    let detail = state.tutor_request_service.get_detail(&id).await?;
    Ok(ApiResponse::ok(detail.into()))
}

async fn update_note(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> AppResult<ApiResponse<TutorRequestResponse>> {
    let request = state.tutor_request_service.update_note(&id, req.note).await?;
    Ok(ApiResponse::ok(request.into()))
}

async fn approve(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TutorRequestResponse>> {
    let request = state.tutor_request_service.approve(&id, &admin.id).await?;
    Ok(ApiResponse::ok(request.into()))
}

async fn reject(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> AppResult<ApiResponse<TutorRequestResponse>> {
    let Json(req) = body.unwrap_or_default();
    let request = state
        .tutor_request_service
        .reject(&id, &admin.id, req.reason)
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

async fn stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminStats>> {
    let stats = state.stats_service.collect().await?;
    Ok(ApiResponse::ok(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tutor-requests", get(list_tutor_requests))
        .route("/tutor-requests/{id}", get(get_tutor_request).put(update_note))
        .route("/tutor-requests/{id}/approve", put(approve))
        .route("/tutor-requests/{id}/reject", put(reject))
        .route("/stats", get(stats))
}
