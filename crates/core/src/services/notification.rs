//! Notification service.
//!
//! Workflows compute [`Notice`] values describing who should hear about a
//! change; [`NotificationService::deliver`] persists them. Delivery is
//! best-effort: a failed write is logged and never fails the caller.

use chrono::Utc;
use sea_orm::Set;
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};

/// A notification to be written for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Account that receives the notification.
    pub recipient_id: String,
    /// Notification type.
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// ID of the request, order, booking or post the notice is about.
    pub related_id: Option<String>,
}

impl Notice {
    /// Create a notice with no related entity.
    #[must_use]
    pub fn new(
        recipient_id: impl Into<String>,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            related_id: None,
        }
    }

    /// Attach the ID of the entity the notice is about.
    #[must_use]
    pub fn related_to(mut self, id: impl Into<String>) -> Self {
        self.related_id = Some(id.into());
        self
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Write every notice, logging and skipping the ones that fail.
    ///
    /// Returns how many were stored.
    pub async fn deliver(&self, notices: Vec<Notice>) -> usize {
        let mut delivered = 0;

        for notice in notices {
            let recipient_id = notice.recipient_id.clone();
            let kind = notice.kind;

            match self.store(notice).await {
                Ok(_) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        recipient_id = %recipient_id,
                        kind = ?kind,
                        "Failed to store notification"
                    );
                }
            }
        }

        delivered
    }

    async fn store(&self, notice: Notice) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(notice.recipient_id),
            notification_type: Set(notice.kind),
            title: Set(notice.title),
            message: Set(notice.message),
            related_id: Set(notice.related_id),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    /// Get notifications for a recipient.
    pub async fn list(
        &self,
        recipient_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(recipient_id, limit, until_id, unread_only)
            .await
    }

    /// Mark one of the recipient's notifications as read.
    pub async fn mark_read(&self, id: &str, recipient_id: &str) -> AppResult<()> {
        let updated = self.notification_repo.mark_as_read(id, recipient_id).await?;
        if updated == 0
            && self
                .notification_repo
                .find_owned(id, recipient_id)
                .await?
                .is_none()
        {
            return Err(AppError::NotFound(format!("Notification not found: {id}")));
        }
        Ok(())
    }

    /// Mark all of the recipient's notifications as read.
    pub async fn mark_all_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(recipient_id).await
    }

    /// Count unread notifications.
    pub async fn count_unread(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(recipient_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use tutorhub_db::test_utils::fixtures;

    fn service(db: MockDatabase) -> NotificationService {
        NotificationService::new(NotificationRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_deliver_skips_failures() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .append_query_results([vec![fixtures::notification("n2", "a2")]]);

        let delivered = service(db)
            .deliver(vec![
                Notice::new("a1", NotificationType::OrderCreated, "t", "m"),
                Notice::new("a2", NotificationType::OrderCreated, "t", "m"),
            ])
            .await;

        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<notification::Model>::new()]);

        let result = service(db).mark_read("n1", "a1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_read_twice_is_ok() {
        let mut already_read = fixtures::notification("n1", "a1");
        already_read.is_read = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![already_read]]);

        assert!(service(db).mark_read("n1", "a1").await.is_ok());
    }

    #[test]
    fn test_notice_related_to() {
        let notice =
            Notice::new("a1", NotificationType::PostLiked, "Liked", "msg").related_to("p1");
        assert_eq!(notice.related_id.as_deref(), Some("p1"));
    }
}
