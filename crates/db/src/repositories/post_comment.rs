//! Post comment repository.

use std::sync::Arc;

use crate::entities::{PostComment, post_comment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tutorhub_common::{AppError, AppResult};

/// Post comment repository for database operations.
#[derive(Clone)]
pub struct PostCommentRepository {
    db: Arc<DatabaseConnection>,
}

impl PostCommentRepository {
    /// Create a new post comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post_comment::Model> {
        PostComment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))
    }

    /// Create a comment or reply.
    pub async fn create(&self, model: post_comment::ActiveModel) -> AppResult<post_comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments and replies on a post, oldest first.
    pub async fn find_by_post(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post_comment::Model>> {
        PostComment::find()
            .filter(post_comment::Column::PostId.eq(post_id))
            .order_by_asc(post_comment::Column::CreatedAt)
            .order_by_asc(post_comment::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
