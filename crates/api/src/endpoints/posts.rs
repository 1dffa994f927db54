//! Posts feed endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tutorhub_common::AppResult;
use tutorhub_core::{BookmarkState, CommentInput, CreatePostInput, LikeState};
use tutorhub_db::entities::{post, post_comment};

use super::{clamp_limit, default_limit};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub image_urls: serde_json::Value,
    pub like_count: i32,
    pub comment_count: i32,
    pub created_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            content: p.content,
            image_urls: p.image_urls,
            like_count: p.like_count,
            comment_count: p.comment_count,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Comment response. Replies carry `parentId`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl From<post_comment::Model> for CommentResponse {
    fn from(c: post_comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            parent_id: c.parent_id,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Cursor pagination (before `untilId`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OffsetQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn posts_response(posts: Vec<post::Model>) -> ApiResponse<Vec<PostResponse>> {
    ApiResponse::ok(posts.into_iter().map(Into::into).collect())
}

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .list(clamp_limit(query.limit), query.until_id.as_deref())
        .await?;
    Ok(posts_response(posts))
}

async fn create_post(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&id, input).await?;
    Ok(ApiResponse::created(post.into()))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&id).await?;
    Ok(ApiResponse::ok(post.into()))
}

async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .delete(&id, &user.id, user.is_admin())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_like(
    AuthUser { id: account_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikeState>> {
    let like = state.post_service.toggle_like(&id, &account_id).await?;
    Ok(ApiResponse::ok(like))
}

async fn add_comment(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.post_service.comment(&id, &author_id, input).await?;
    Ok(ApiResponse::created(comment.into()))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OffsetQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .post_service
        .list_comments(&id, clamp_limit(query.limit), query.offset)
        .await?;
    Ok(ApiResponse::ok(comments.into_iter().map(Into::into).collect()))
}

async fn reply(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let reply = state.post_service.reply(&comment_id, &author_id, input).await?;
    Ok(ApiResponse::created(reply.into()))
}

async fn toggle_bookmark(
    AuthUser { id: account_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookmarkState>> {
    let bookmark = state.post_service.toggle_bookmark(&id, &account_id).await?;
    Ok(ApiResponse::ok(bookmark))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .search(&query.q, clamp_limit(query.limit), query.offset)
        .await?;
    Ok(posts_response(posts))
}

async fn recommended(
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.recommended(clamp_limit(query.limit)).await?;
    Ok(posts_response(posts))
}

async fn saved(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .saved(&id, clamp_limit(query.limit), query.until_id.as_deref())
        .await?;
    Ok(posts_response(posts))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/search", get(search))
        .route("/recommended", get(recommended))
        .route("/saved", get(saved))
        .route("/comments/{id}/reply", post(reply))
        .route("/{id}", get(get_post).delete(delete_post))
        .route("/{id}/like", post(toggle_like))
        .route("/{id}/comments", get(list_comments).post(add_comment))
        .route("/{id}/bookmark", post(toggle_bookmark))
}
