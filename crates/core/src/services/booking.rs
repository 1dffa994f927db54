//! Booking service.

use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::Deserialize;
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::{
        booking::{self, BookingStatus},
        notification::NotificationType,
    },
    repositories::{AccountRepository, BookingRepository, ScheduleRepository},
};
use validator::Validate;

use super::notification::{Notice, NotificationService};

/// Input for booking a tutor.
///
/// Either `schedule_id` or both `start_at` and `end_at` must be given.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub tutor_id: String,

    pub schedule_id: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub subject: String,

    #[validate(length(max = 2048))]
    pub note: Option<String>,

    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Who may move a booking to `next`: the tutor confirms and completes,
/// either side may cancel.
#[must_use]
pub fn may_set_status(booking: &booking::Model, caller_id: &str, next: BookingStatus) -> bool {
    match next {
        BookingStatus::Cancelled => caller_id == booking.student_id || caller_id == booking.tutor_id,
        BookingStatus::Confirmed | BookingStatus::Completed => caller_id == booking.tutor_id,
        BookingStatus::Pending => false,
    }
}

/// Booking service.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    schedule_repo: ScheduleRepository,
    account_repo: AccountRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(
        booking_repo: BookingRepository,
        schedule_repo: ScheduleRepository,
        account_repo: AccountRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            booking_repo,
            schedule_repo,
            account_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Book a session with an approved tutor.
    pub async fn create(
        &self,
        student_id: &str,
        input: CreateBookingInput,
    ) -> AppResult<booking::Model> {
        input.validate()?;

        if input.tutor_id == student_id {
            return Err(AppError::BadRequest("Cannot book yourself".to_string()));
        }

        let tutor = self.account_repo.get_by_id(&input.tutor_id).await?;
        if !tutor.is_active_tutor() {
            return Err(AppError::BadRequest(
                "Account is not an approved tutor".to_string(),
            ));
        }

        let (start_at, end_at): (DateTimeWithTimeZone, DateTimeWithTimeZone) =
            if let Some(schedule_id) = &input.schedule_id {
                let window = self.schedule_repo.get_by_id(schedule_id).await?;
                if window.tutor_id != tutor.id {
                    return Err(AppError::BadRequest(
                        "Schedule belongs to another tutor".to_string(),
                    ));
                }
                (window.start_at, window.end_at)
            } else {
                match (input.start_at, input.end_at) {
                    (Some(start), Some(end)) if end > start => (start.into(), end.into()),
                    (Some(_), Some(_)) => {
                        return Err(AppError::Validation(
                            "endAt must be after startAt".to_string(),
                        ));
                    }
                    _ => {
                        return Err(AppError::Validation(
                            "Either scheduleId or startAt and endAt are required".to_string(),
                        ));
                    }
                }
            };

        // The window claim and the insert commit together.
        let txn = self.booking_repo.begin().await?;
        if let Some(schedule_id) = &input.schedule_id
            && !self.schedule_repo.mark_booked(&txn, schedule_id).await?
        {
            return Err(AppError::Conflict("Schedule already booked".to_string()));
        }

        let booking = self
            .booking_repo
            .create(
                &txn,
                booking::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    student_id: Set(student_id.to_string()),
                    tutor_id: Set(tutor.id.clone()),
                    schedule_id: Set(input.schedule_id),
                    subject: Set(input.subject),
                    note: Set(input.note),
                    start_at: Set(start_at),
                    end_at: Set(end_at),
                    status: Set(BookingStatus::Pending),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                },
            )
            .await?;
        tutorhub_db::commit(txn).await?;

        tracing::info!(booking_id = %booking.id, tutor_id = %tutor.id, "Booking created");

        self.notifications
            .deliver(vec![
                Notice::new(
                    tutor.id,
                    NotificationType::BookingCreated,
                    "New booking",
                    format!("New booking request for {}", booking.subject),
                )
                .related_to(booking.id.clone()),
            ])
            .await;

        Ok(booking)
    }

    /// Bookings the caller takes part in.
    pub async fn list(
        &self,
        account_id: &str,
        status: Option<BookingStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<booking::Model>> {
        self.booking_repo
            .find_for_participant(account_id, status, limit, offset)
            .await
    }

    /// Get a booking visible to the caller.
    pub async fn get(&self, id: &str, caller_id: &str, is_admin: bool) -> AppResult<booking::Model> {
        let booking = self.booking_repo.get_by_id(id).await?;
        if !is_admin && caller_id != booking.student_id && caller_id != booking.tutor_id {
            return Err(AppError::Forbidden("Not a participant".to_string()));
        }
        Ok(booking)
    }

    /// Move a booking through its lifecycle.
    pub async fn update_status(
        &self,
        id: &str,
        caller_id: &str,
        next: BookingStatus,
    ) -> AppResult<booking::Model> {
        let booking = self.booking_repo.get_by_id(id).await?;

        if caller_id != booking.student_id && caller_id != booking.tutor_id {
            return Err(AppError::Forbidden("Not a participant".to_string()));
        }
        if !booking.status.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Cannot move booking from {} to {}",
                booking.status.as_str(),
                next.as_str()
            )));
        }
        if !may_set_status(&booking, caller_id, next) {
            return Err(AppError::Forbidden(format!(
                "Only the tutor can mark a booking {}",
                next.as_str()
            )));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.booking_repo.begin().await?;
        if !self
            .booking_repo
            .transition(&txn, id, booking.status, next, now)
            .await?
        {
            return Err(AppError::Conflict(
                "Booking was updated concurrently".to_string(),
            ));
        }
        if next == BookingStatus::Cancelled
            && let Some(schedule_id) = &booking.schedule_id
        {
            self.schedule_repo.release(&txn, schedule_id).await?;
        }
        tutorhub_db::commit(txn).await?;

        let counterpart = if caller_id == booking.tutor_id {
            booking.student_id.clone()
        } else {
            booking.tutor_id.clone()
        };

        let updated = booking::Model {
            status: next,
            updated_at: Some(now),
            ..booking
        };

        self.notifications
            .deliver(vec![
                Notice::new(
                    counterpart,
                    NotificationType::BookingStatusChanged,
                    "Booking updated",
                    format!("Booking for {} is now {}", updated.subject, next.as_str()),
                )
                .related_to(updated.id.clone()),
            ])
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use tutorhub_db::{
        entities::account::AccountRole, repositories::NotificationRepository,
        test_utils::fixtures,
    };

    fn service(bookings: MockDatabase, schedules: MockDatabase, accounts: MockDatabase) -> BookingService {
        service_on(Arc::new(bookings.into_connection()), schedules, accounts)
    }

    fn service_on(
        bookings: Arc<DatabaseConnection>,
        schedules: MockDatabase,
        accounts: MockDatabase,
    ) -> BookingService {
        BookingService::new(
            BookingRepository::new(bookings),
            ScheduleRepository::new(Arc::new(schedules.into_connection())),
            AccountRepository::new(Arc::new(accounts.into_connection())),
            NotificationService::new(NotificationRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            ))),
        )
    }

    fn empty() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    /// SQL issued on a mock connection, transaction markers included.
    fn statements(db: Arc<DatabaseConnection>) -> Vec<String> {
        Arc::try_unwrap(db)
            .ok()
            .unwrap()
            .into_transaction_log()
            .iter()
            .flat_map(|t| t.statements().iter().map(|s| s.sql.clone()))
            .collect()
    }

    fn scheduled_input() -> CreateBookingInput {
        CreateBookingInput {
            tutor_id: "t1".to_string(),
            schedule_id: Some("sc1".to_string()),
            subject: "math".to_string(),
            note: None,
            start_at: None,
            end_at: None,
        }
    }

    #[test]
    fn test_students_may_only_cancel() {
        let booking = fixtures::booking("b1", "s1", "t1", BookingStatus::Pending);

        assert!(may_set_status(&booking, "s1", BookingStatus::Cancelled));
        assert!(!may_set_status(&booking, "s1", BookingStatus::Confirmed));
        assert!(may_set_status(&booking, "t1", BookingStatus::Confirmed));
        assert!(may_set_status(&booking, "t1", BookingStatus::Completed));
    }

    #[tokio::test]
    async fn test_booking_unapproved_tutor_rejected() {
        let accounts = empty().append_query_results([vec![fixtures::account("x1", AccountRole::Student)]]);

        let result = service(empty(), empty(), accounts)
            .create(
                "s1",
                CreateBookingInput {
                    tutor_id: "x1".to_string(),
                    schedule_id: None,
                    subject: "math".to_string(),
                    note: None,
                    start_at: None,
                    end_at: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_booked_schedule_conflicts() {
        let accounts = empty().append_query_results([vec![fixtures::account("t1", AccountRole::Tutor)]]);
        let schedules = empty().append_query_results([vec![fixtures::schedule("sc1", "t1")]]);
        let bookings = Arc::new(empty().append_exec_results([exec(0)]).into_connection());

        let result = service_on(Arc::clone(&bookings), schedules, accounts)
            .create("s1", scheduled_input())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let sql = statements(bookings);
        assert!(sql.iter().any(|s| s == "ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"));
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_schedule_claim() {
        let accounts = empty().append_query_results([vec![fixtures::account("t1", AccountRole::Tutor)]]);
        let schedules = empty().append_query_results([vec![fixtures::schedule("sc1", "t1")]]);
        let bookings = Arc::new(
            empty()
                .append_exec_results([exec(1)])
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );

        let result = service_on(Arc::clone(&bookings), schedules, accounts)
            .create("s1", scheduled_input())
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        let sql = statements(bookings);
        assert!(sql.iter().any(|s| s.contains("\"is_booked\"")));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"));
    }

    #[tokio::test]
    async fn test_scheduled_booking_commits_claim_and_insert() {
        let accounts = empty().append_query_results([vec![fixtures::account("t1", AccountRole::Tutor)]]);
        let schedules = empty().append_query_results([vec![fixtures::schedule("sc1", "t1")]]);
        let mut created = fixtures::booking("b1", "s1", "t1", BookingStatus::Pending);
        created.schedule_id = Some("sc1".to_string());
        let bookings = Arc::new(
            empty()
                .append_exec_results([exec(1)])
                .append_query_results([vec![created]])
                .into_connection(),
        );

        let booking = service_on(Arc::clone(&bookings), schedules, accounts)
            .create("s1", scheduled_input())
            .await
            .unwrap();

        assert_eq!(booking.schedule_id.as_deref(), Some("sc1"));
        assert_eq!(statements(bookings).last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_cancel_releases_window_in_same_transaction() {
        let mut booking = fixtures::booking("b1", "s1", "t1", BookingStatus::Confirmed);
        booking.schedule_id = Some("sc1".to_string());
        let bookings = Arc::new(
            empty()
                .append_query_results([vec![booking]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );

        let updated = service_on(Arc::clone(&bookings), empty(), empty())
            .update_status("b1", "s1", BookingStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Cancelled);
        let sql = statements(bookings);
        let release = sql.iter().position(|s| s.contains("\"schedule\"")).unwrap();
        let commit = sql.iter().position(|s| s == "COMMIT").unwrap();
        assert!(release < commit);
    }

    #[tokio::test]
    async fn test_completed_booking_cannot_change() {
        let bookings = empty().append_query_results([vec![fixtures::booking(
            "b1",
            "s1",
            "t1",
            BookingStatus::Completed,
        )]]);

        let result = service(bookings, empty(), empty())
            .update_status("b1", "t1", BookingStatus::Cancelled)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_tutor_confirms_pending_booking() {
        let bookings = empty()
            .append_query_results([vec![fixtures::booking("b1", "s1", "t1", BookingStatus::Pending)]])
            .append_exec_results([exec(1)]);

        let updated = service(bookings, empty(), empty())
            .update_status("b1", "t1", BookingStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_outsider_cannot_view_booking() {
        let bookings = empty().append_query_results([vec![fixtures::booking(
            "b1",
            "s1",
            "t1",
            BookingStatus::Pending,
        )]]);

        let result = service(bookings, empty(), empty()).get("b1", "x9", false).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
