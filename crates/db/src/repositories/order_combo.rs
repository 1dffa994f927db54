//! Order combo repository.

use std::sync::Arc;

use crate::entities::{OrderCombo, order_combo, order_combo::OrderApprovalStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, prelude::DateTimeWithTimeZone,
};
use tutorhub_common::{AppError, AppResult};

/// Order combo repository for database operations.
#[derive(Clone)]
pub struct OrderComboRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderComboRepository {
    /// Create a new order combo repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<order_combo::Model>> {
        OrderCombo::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an order by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<order_combo::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order not found: {id}")))
    }

    /// Create an order.
    pub async fn create(&self, model: order_combo::ActiveModel) -> AppResult<order_combo::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List orders, newest first, with optional approval filter.
    pub async fn list(
        &self,
        approval_status: Option<OrderApprovalStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<order_combo::Model>> {
        let mut query = OrderCombo::find().order_by_desc(order_combo::Column::CreatedAt);

        if let Some(s) = approval_status {
            query = query.filter(order_combo::Column::ApprovalStatus.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Orders placed by an account, newest first.
    pub async fn find_by_account(&self, account_id: &str) -> AppResult<Vec<order_combo::Model>> {
        OrderCombo::find()
            .filter(order_combo::Column::AccountId.eq(account_id))
            .order_by_desc(order_combo::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the approval status if it is still `expected`.
    ///
    /// Rejection also clears the active flag. Slot counters are not touched.
    /// Returns `false` when another reviewer got there first.
    pub async fn set_approval(
        &self,
        id: &str,
        expected: OrderApprovalStatus,
        to: OrderApprovalStatus,
        reviewed_by: &str,
        at: DateTimeWithTimeZone,
    ) -> AppResult<bool> {
        let mut changes = order_combo::ActiveModel {
            approval_status: Set(to),
            reviewed_by: Set(Some(reviewed_by.to_string())),
            updated_at: Set(Some(at)),
            ..Default::default()
        };
        if to == OrderApprovalStatus::Rejected {
            changes.status = Set(false);
        }

        let result = OrderCombo::update_many()
            .set(changes)
            .filter(order_combo::Column::Id.eq(id))
            .filter(order_combo::Column::ApprovalStatus.eq(expected))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Count orders in an approval status.
    pub async fn count_by_approval(&self, status: OrderApprovalStatus) -> AppResult<u64> {
        OrderCombo::find()
            .filter(order_combo::Column::ApprovalStatus.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
