//! Tutor request repository, including the request's certificates and evidence.

use std::sync::Arc;

use crate::entities::{
    TutorCertificate, TutorEvidence, TutorRequest, tutor_certificate, tutor_evidence,
    tutor_request, tutor_request::TutorRequestStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    prelude::DateTimeWithTimeZone,
};
use tutorhub_common::{AppError, AppResult};

/// Tutor request repository for database operations.
#[derive(Clone)]
pub struct TutorRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl TutorRequestRepository {
    /// Create a new tutor request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Begin a transaction on this repository's connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        crate::begin(&self.db).await
    }

    /// Find a tutor request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tutor_request::Model>> {
        TutorRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tutor request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tutor_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tutor request not found: {id}")))
    }

    /// Most recent request submitted by an account.
    pub async fn find_latest_by_account(
        &self,
        account_id: &str,
    ) -> AppResult<Option<tutor_request::Model>> {
        TutorRequest::find()
            .filter(tutor_request::Column::AccountId.eq(account_id))
            .order_by_desc(tutor_request::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether an account has a request awaiting review.
    pub async fn has_pending(&self, account_id: &str) -> AppResult<bool> {
        let count = TutorRequest::find()
            .filter(tutor_request::Column::AccountId.eq(account_id))
            .filter(tutor_request::Column::Status.eq(TutorRequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Create a tutor request.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: tutor_request::ActiveModel,
    ) -> AppResult<tutor_request::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Attach a certificate to a request.
    pub async fn create_certificate<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: tutor_certificate::ActiveModel,
    ) -> AppResult<tutor_certificate::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Attach an evidence file to a request.
    pub async fn create_evidence<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: tutor_evidence::ActiveModel,
    ) -> AppResult<tutor_evidence::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Certificates of a request, in submission order.
    pub async fn find_certificates(
        &self,
        tutor_request_id: &str,
    ) -> AppResult<Vec<tutor_certificate::Model>> {
        TutorCertificate::find()
            .filter(tutor_certificate::Column::TutorRequestId.eq(tutor_request_id))
            .order_by_asc(tutor_certificate::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Evidence of a request, in submission order.
    pub async fn find_evidence(
        &self,
        tutor_request_id: &str,
    ) -> AppResult<Vec<tutor_evidence::Model>> {
        TutorEvidence::find()
            .filter(tutor_evidence::Column::TutorRequestId.eq(tutor_request_id))
            .order_by_asc(tutor_evidence::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List requests, newest first, with optional status filter.
    pub async fn list(
        &self,
        status: Option<TutorRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<tutor_request::Model>> {
        let mut query = TutorRequest::find().order_by_desc(tutor_request::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(tutor_request::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a request from `from` to `to` in a single conditional update.
    ///
    /// Returns `false` when the request was no longer in `from`.
    pub async fn transition<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        from: TutorRequestStatus,
        to: TutorRequestStatus,
        reviewed_by: &str,
        reason: Option<String>,
        reviewed_at: DateTimeWithTimeZone,
    ) -> AppResult<bool> {
        let changes = tutor_request::ActiveModel {
            status: Set(to),
            reviewed_by: Set(Some(reviewed_by.to_string())),
            reason: Set(reason),
            reviewed_at: Set(Some(reviewed_at)),
            ..Default::default()
        };

        let result = TutorRequest::update_many()
            .set(changes)
            .filter(tutor_request::Column::Id.eq(id))
            .filter(tutor_request::Column::Status.eq(from))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Replace the admin note.
    pub async fn update_note(
        &self,
        request: tutor_request::Model,
        note: Option<String>,
    ) -> AppResult<tutor_request::Model> {
        let mut active: tutor_request::ActiveModel = request.into();
        active.note = Set(note);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count requests in a status.
    pub async fn count_by_status(&self, status: TutorRequestStatus) -> AppResult<u64> {
        TutorRequest::find()
            .filter(tutor_request::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_transition_applies_when_status_matches() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = TutorRequestRepository::new(Arc::clone(&db));
        let applied = repo
            .transition(
                db.as_ref(),
                "tr1",
                TutorRequestStatus::Pending,
                TutorRequestStatus::Approved,
                "admin1",
                None,
                chrono::Utc::now().into(),
            )
            .await
            .unwrap();

        assert!(applied);
    }

    #[tokio::test]
    async fn test_transition_reports_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = TutorRequestRepository::new(Arc::clone(&db));
        let applied = repo
            .transition(
                db.as_ref(),
                "tr1",
                TutorRequestStatus::Pending,
                TutorRequestStatus::Rejected,
                "admin1",
                Some("incomplete".to_string()),
                chrono::Utc::now().into(),
            )
            .await
            .unwrap();

        assert!(!applied);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tutor_request::Model>::new()])
                .into_connection(),
        );

        let repo = TutorRequestRepository::new(db);
        assert!(matches!(
            repo.get_by_id("nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
