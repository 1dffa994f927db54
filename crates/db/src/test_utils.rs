//! Test utilities: Postgres-backed test databases and model fixtures.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Connection settings for the integration test database.
///
/// Each field can be overridden with a `TEST_DB_*` environment variable.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: env_or("TEST_DB_HOST", "localhost"),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: env_or("TEST_DB_USER", "tutorhub_test"),
            password: env_or("TEST_DB_PASSWORD", "tutorhub_test"),
            database: env_or("TEST_DB_NAME", "tutorhub_test"),
        }
    }
}

impl TestDbConfig {
    /// URL of the test database itself.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    /// URL of the maintenance database, used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        self.url_for("postgres")
    }

    fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, database
        )
    }
}

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Settings the connection was made with.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the shared test database and bring its schema up to date.
    pub async fn new() -> Result<Self, DbErr> {
        Self::connect(TestDbConfig::default()).await
    }

    /// Create a throwaway database for a single test, then migrate it.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("tutorhub_test_{}", &suffix[..8]);

        let admin = Database::connect(&config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        admin.close().await?;

        Self::connect(config).await
    }

    async fn connect(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Test database ready");
        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Truncate every application table.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let rows = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public' \
                 AND tablename <> 'seaql_migrations'"
                    .to_string(),
            ))
            .await?;

        let tables: Vec<String> = rows
            .iter()
            .filter_map(|row| row.try_get::<String>("", "tablename").ok())
            .map(|t| format!("\"{t}\""))
            .collect();

        if !tables.is_empty() {
            self.conn
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("TRUNCATE TABLE {} CASCADE", tables.join(", ")),
                ))
                .await?;
        }

        Ok(())
    }

    /// Drop a database made by [`Self::create_unique`].
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let admin = Database::connect(&self.config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.config.database),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

/// Model builders shared by unit tests across the workspace.
#[cfg(any(test, feature = "test-utils"))]
#[allow(missing_docs)]
pub mod fixtures {
    use crate::entities::{
        account::{self, AccountRole},
        booking::{self, BookingStatus},
        combo, notification,
        notification::NotificationType,
        order_combo::{self, OrderApprovalStatus},
        post, post_bookmark, post_comment, post_like, review, schedule, tutor_certificate,
        tutor_evidence,
        tutor_request::{self, TutorRequestStatus},
    };
    use chrono::{Duration, Utc};
    use sea_orm::prelude::DateTimeWithTimeZone;

    fn now() -> DateTimeWithTimeZone {
        Utc::now().into()
    }

    #[must_use]
    pub fn account(id: &str, role: AccountRole) -> account::Model {
        account::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            email_lower: format!("{id}@example.com"),
            password_hash: String::new(),
            name: format!("Account {id}"),
            avatar_url: None,
            phone: None,
            bio: None,
            role,
            is_approved: role == AccountRole::Tutor,
            education: None,
            scores: serde_json::json!([]),
            certificates: serde_json::json!([]),
            evidence: serde_json::json!([]),
            created_at: now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn tutor_request(
        id: &str,
        account_id: &str,
        status: TutorRequestStatus,
    ) -> tutor_request::Model {
        tutor_request::Model {
            id: id.to_string(),
            account_id: account_id.to_string(),
            education: Some("BSc Mathematics".to_string()),
            scores: serde_json::json!([{ "subject": "math", "score": 9.5 }]),
            status,
            note: None,
            reason: None,
            reviewed_by: None,
            created_at: now(),
            reviewed_at: None,
        }
    }

    #[must_use]
    pub fn certificate(id: &str, tutor_request_id: &str) -> tutor_certificate::Model {
        tutor_certificate::Model {
            id: id.to_string(),
            tutor_request_id: tutor_request_id.to_string(),
            name: format!("Certificate {id}"),
            image_url: format!("https://files.example.com/{id}.png"),
            created_at: now(),
        }
    }

    #[must_use]
    pub fn evidence(id: &str, tutor_request_id: &str) -> tutor_evidence::Model {
        tutor_evidence::Model {
            id: id.to_string(),
            tutor_request_id: tutor_request_id.to_string(),
            description: None,
            file_url: format!("https://files.example.com/{id}.pdf"),
            created_at: now(),
        }
    }

    #[must_use]
    pub fn combo(id: &str, slot: i32) -> combo::Model {
        combo::Model {
            id: id.to_string(),
            name: format!("{slot} sessions"),
            description: None,
            slot,
            price: i64::from(slot) * 100_000,
            is_active: true,
            created_at: now(),
        }
    }

    #[must_use]
    pub fn order(
        id: &str,
        account_id: &str,
        slot: i32,
        approval_status: OrderApprovalStatus,
    ) -> order_combo::Model {
        order_combo::Model {
            id: id.to_string(),
            account_id: account_id.to_string(),
            combo_id: "c1".to_string(),
            used_slot: 0,
            remaining_slot: slot,
            price: i64::from(slot) * 100_000,
            status: true,
            approval_status,
            reviewed_by: None,
            created_at: now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn notification(id: &str, recipient_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            notification_type: NotificationType::OrderCreated,
            title: "New order".to_string(),
            message: "An order was placed".to_string(),
            related_id: None,
            is_read: false,
            created_at: now(),
        }
    }

    #[must_use]
    pub fn schedule(id: &str, tutor_id: &str) -> schedule::Model {
        let start = now() + Duration::days(1);
        schedule::Model {
            id: id.to_string(),
            tutor_id: tutor_id.to_string(),
            start_at: start,
            end_at: start + Duration::hours(1),
            is_booked: false,
            created_at: now(),
        }
    }

    #[must_use]
    pub fn booking(
        id: &str,
        student_id: &str,
        tutor_id: &str,
        status: BookingStatus,
    ) -> booking::Model {
        let start = now() + Duration::days(1);
        booking::Model {
            id: id.to_string(),
            student_id: student_id.to_string(),
            tutor_id: tutor_id.to_string(),
            schedule_id: None,
            subject: "math".to_string(),
            note: None,
            start_at: start,
            end_at: start + Duration::hours(1),
            status,
            created_at: now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn review(id: &str, student_id: &str, tutor_id: &str, rating: i16) -> review::Model {
        review::Model {
            id: id.to_string(),
            student_id: student_id.to_string(),
            tutor_id: tutor_id.to_string(),
            rating,
            comment: None,
            created_at: now(),
        }
    }

    #[must_use]
    pub fn post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            content: format!("Post {id}"),
            image_urls: serde_json::json!([]),
            like_count: 0,
            comment_count: 0,
            created_at: now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn post_like(id: &str, post_id: &str, account_id: &str) -> post_like::Model {
        post_like::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            account_id: account_id.to_string(),
            created_at: now(),
        }
    }

    #[must_use]
    pub fn post_bookmark(id: &str, post_id: &str, account_id: &str) -> post_bookmark::Model {
        post_bookmark::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            account_id: account_id.to_string(),
            created_at: now(),
        }
    }

    #[must_use]
    pub fn comment(
        id: &str,
        post_id: &str,
        author_id: &str,
        parent_id: Option<&str>,
    ) -> post_comment::Model {
        post_comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            parent_id: parent_id.map(String::from),
            content: format!("Comment {id}"),
            created_at: now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default() {
        let config = TestDbConfig::default();
        assert_eq!(config.port, 5433);
        assert_eq!(config.database, "tutorhub_test");
    }

    #[test]
    fn test_db_config_urls() {
        let config = TestDbConfig {
            host: "db".to_string(),
            port: 5433,
            username: "user".to_string(),
            password: "pass".to_string(),
            database: "testdb".to_string(),
        };
        assert_eq!(config.database_url(), "postgres://user:pass@db:5433/testdb");
        assert_eq!(config.postgres_url(), "postgres://user:pass@db:5433/postgres");
    }

    #[test]
    fn test_tutor_fixture_is_approved() {
        let tutor = fixtures::account("t1", crate::entities::account::AccountRole::Tutor);
        assert!(tutor.is_active_tutor());
    }
}
