//! Schedule repository.

use std::sync::Arc;

use crate::entities::{Schedule, schedule};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use tutorhub_common::{AppError, AppResult};

/// Schedule repository for database operations.
#[derive(Clone)]
pub struct ScheduleRepository {
    db: Arc<DatabaseConnection>,
}

impl ScheduleRepository {
    /// Create a new schedule repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a schedule window by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<schedule::Model>> {
        Schedule::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a schedule window by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<schedule::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule not found: {id}")))
    }

    /// Windows of a tutor in chronological order.
    pub async fn find_by_tutor(&self, tutor_id: &str) -> AppResult<Vec<schedule::Model>> {
        Schedule::find()
            .filter(schedule::Column::TutorId.eq(tutor_id))
            .order_by_asc(schedule::Column::StartAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether `[start_at, end_at)` intersects any existing window of the tutor.
    pub async fn overlaps(
        &self,
        tutor_id: &str,
        start_at: DateTimeWithTimeZone,
        end_at: DateTimeWithTimeZone,
    ) -> AppResult<bool> {
        let count = Schedule::find()
            .filter(schedule::Column::TutorId.eq(tutor_id))
            .filter(schedule::Column::StartAt.lt(end_at))
            .filter(schedule::Column::EndAt.gt(start_at))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Create a schedule window.
    pub async fn create(&self, model: schedule::ActiveModel) -> AppResult<schedule::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Claim a free window. Returns `false` if it was already booked.
    pub async fn mark_booked<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let result = Schedule::update_many()
            .col_expr(schedule::Column::IsBooked, Expr::value(true))
            .filter(schedule::Column::Id.eq(id))
            .filter(schedule::Column::IsBooked.eq(false))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Release a window after its booking was cancelled.
    pub async fn release<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Schedule::update_many()
            .col_expr(schedule::Column::IsBooked, Expr::value(false))
            .filter(schedule::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Delete a window if it is not booked. Returns `false` otherwise.
    pub async fn delete_unbooked(&self, id: &str) -> AppResult<bool> {
        let result = Schedule::delete_many()
            .filter(schedule::Column::Id.eq(id))
            .filter(schedule::Column::IsBooked.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }
}
