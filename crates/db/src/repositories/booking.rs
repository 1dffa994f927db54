//! Booking repository.

use std::sync::Arc;

use crate::entities::{Booking, booking, booking::BookingStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    prelude::DateTimeWithTimeZone,
};
use tutorhub_common::{AppError, AppResult};

/// Booking repository for database operations.
#[derive(Clone)]
pub struct BookingRepository {
    db: Arc<DatabaseConnection>,
}

impl BookingRepository {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Begin a transaction on this repository's connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        crate::begin(&self.db).await
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<booking::Model>> {
        Booking::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a booking by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<booking::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking not found: {id}")))
    }

    /// Create a booking.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: booking::ActiveModel,
    ) -> AppResult<booking::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Bookings where the account is the student or the tutor, newest first.
    pub async fn find_for_participant(
        &self,
        account_id: &str,
        status: Option<BookingStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<booking::Model>> {
        let mut query = Booking::find()
            .filter(
                Condition::any()
                    .add(booking::Column::StudentId.eq(account_id))
                    .add(booking::Column::TutorId.eq(account_id)),
            )
            .order_by_desc(booking::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(booking::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a booking from `from` to `to`. Returns `false` if it changed underneath.
    pub async fn transition<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTimeWithTimeZone,
    ) -> AppResult<bool> {
        let changes = booking::ActiveModel {
            status: Set(to),
            updated_at: Set(Some(at)),
            ..Default::default()
        };

        let result = Booking::update_many()
            .set(changes)
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(from))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Total number of bookings.
    pub async fn count(&self) -> AppResult<u64> {
        Booking::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
