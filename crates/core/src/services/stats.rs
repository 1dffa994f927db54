//! Admin dashboard counters.

use serde::Serialize;
use tutorhub_common::AppResult;
use tutorhub_db::{
    entities::{
        account::AccountRole, order_combo::OrderApprovalStatus,
        tutor_request::TutorRequestStatus,
    },
    repositories::{
        AccountRepository, BookingRepository, OrderComboRepository, PostRepository,
        TutorRequestRepository,
    },
};

/// Snapshot of platform counters.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub students: u64,
    pub tutors: u64,
    pub pending_tutor_requests: u64,
    pub pending_orders: u64,
    pub bookings: u64,
    pub posts: u64,
}

/// Admin stats service.
#[derive(Clone)]
pub struct AdminStatsService {
    account_repo: AccountRepository,
    request_repo: TutorRequestRepository,
    order_repo: OrderComboRepository,
    booking_repo: BookingRepository,
    post_repo: PostRepository,
}

impl AdminStatsService {
    /// Create a new stats service.
    #[must_use]
    pub const fn new(
        account_repo: AccountRepository,
        request_repo: TutorRequestRepository,
        order_repo: OrderComboRepository,
        booking_repo: BookingRepository,
        post_repo: PostRepository,
    ) -> Self {
        Self {
            account_repo,
            request_repo,
            order_repo,
            booking_repo,
            post_repo,
        }
    }

    /// Collect the current counters.
    pub async fn collect(&self) -> AppResult<AdminStats> {
        let students = self.account_repo.count_by_role(AccountRole::Student).await?;
        let tutors = self.account_repo.count_by_role(AccountRole::Tutor).await?;
        let pending_tutor_requests = self
            .request_repo
            .count_by_status(TutorRequestStatus::Pending)
            .await?;
        let pending_orders = self
            .order_repo
            .count_by_approval(OrderApprovalStatus::Pending)
            .await?;
        let bookings = self.booking_repo.count().await?;
        let posts = self.post_repo.count().await?;

        tracing::debug!(students, tutors, pending_tutor_requests, "Collected admin stats");

        Ok(AdminStats {
            students,
            tutors,
            pending_tutor_requests,
            pending_orders,
            bookings,
            posts,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn counts(values: &[i64]) -> Arc<sea_orm::DatabaseConnection> {
        let rows: Vec<Vec<_>> = values
            .iter()
            .map(|n| vec![maplit::btreemap! { "num_items" => Value::BigInt(Some(*n)) }])
            .collect();
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(rows)
                .into_connection(),
        )
    }

    #[tokio::test]
    async fn test_collect_counts() {
        let service = AdminStatsService::new(
            AccountRepository::new(counts(&[40, 7])),
            TutorRequestRepository::new(counts(&[3])),
            OrderComboRepository::new(counts(&[2])),
            BookingRepository::new(counts(&[15])),
            PostRepository::new(counts(&[120])),
        );

        let stats = service.collect().await.unwrap();

        assert_eq!(
            stats,
            AdminStats {
                students: 40,
                tutors: 7,
                pending_tutor_requests: 3,
                pending_orders: 2,
                bookings: 15,
                posts: 120,
            }
        );
    }
}
