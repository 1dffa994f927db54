//! Post bookmark repository.

use std::sync::Arc;

use crate::entities::{PostBookmark, post_bookmark};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tutorhub_common::{AppError, AppResult};

/// Post bookmark repository for database operations.
#[derive(Clone)]
pub struct PostBookmarkRepository {
    db: Arc<DatabaseConnection>,
}

impl PostBookmarkRepository {
    /// Create a new post bookmark repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an account's bookmark of a post.
    pub async fn find(
        &self,
        post_id: &str,
        account_id: &str,
    ) -> AppResult<Option<post_bookmark::Model>> {
        PostBookmark::find()
            .filter(post_bookmark::Column::PostId.eq(post_id))
            .filter(post_bookmark::Column::AccountId.eq(account_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a bookmark.
    pub async fn create(
        &self,
        model: post_bookmark::ActiveModel,
    ) -> AppResult<post_bookmark::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| crate::map_insert_err(e, "Post already bookmarked"))
    }

    /// Delete a bookmark by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        PostBookmark::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Bookmarks of an account, most recent first.
    pub async fn find_by_account(
        &self,
        account_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post_bookmark::Model>> {
        let mut query = PostBookmark::find()
            .filter(post_bookmark::Column::AccountId.eq(account_id))
            .order_by_desc(post_bookmark::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(post_bookmark::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
