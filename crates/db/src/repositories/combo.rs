//! Combo catalog repository.

use std::sync::Arc;

use crate::entities::{Combo, combo};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tutorhub_common::{AppError, AppResult};

/// Combo repository for database operations.
#[derive(Clone)]
pub struct ComboRepository {
    db: Arc<DatabaseConnection>,
}

impl ComboRepository {
    /// Create a new combo repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a combo by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<combo::Model>> {
        Combo::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a combo by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<combo::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Combo not found: {id}")))
    }

    /// Active combos, cheapest first.
    pub async fn list_active(&self) -> AppResult<Vec<combo::Model>> {
        Combo::find()
            .filter(combo::Column::IsActive.eq(true))
            .order_by_asc(combo::Column::Price)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a combo.
    pub async fn create(&self, model: combo::ActiveModel) -> AppResult<combo::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
