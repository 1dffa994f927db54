//! Account service: registration, login and profile.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::account::{self, AccountRole},
    repositories::AccountRepository,
};
use validator::Validate;

use super::token::TokenService;

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email, length(max = 256))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for updating the caller's profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[validate(url, length(max = 1024))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,
}

/// A signed-in account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub account: account::Model,
}

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    account_repo: AccountRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(account_repo: AccountRepository, tokens: TokenService) -> Self {
        Self {
            account_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a student account and sign it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        if self.account_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let model = account::ActiveModel {
            id: Set(self.id_gen.generate()),
            email_lower: Set(input.email.to_lowercase()),
            email: Set(input.email),
            password_hash: Set(hash_password(&input.password)?),
            name: Set(input.name),
            avatar_url: Set(None),
            phone: Set(input.phone),
            bio: Set(None),
            role: Set(AccountRole::Student),
            is_approved: Set(false),
            education: Set(None),
            scores: Set(serde_json::json!([])),
            certificates: Set(serde_json::json!([])),
            evidence: Set(serde_json::json!([])),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let account = self.account_repo.create(model).await?;
        tracing::info!(account_id = %account.id, "Account registered");

        self.session_for(account)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let account = self
            .account_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &account.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        self.session_for(account)
    }

    fn session_for(&self, account: account::Model) -> AppResult<AuthSession> {
        let token = self.tokens.issue(&account.id, account.role)?;
        Ok(AuthSession { token, account })
    }

    /// Get an account by ID.
    pub async fn get(&self, id: &str) -> AppResult<account::Model> {
        self.account_repo.get_by_id(id).await
    }

    /// Update the caller's profile fields.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<account::Model> {
        input.validate()?;

        let account = self.account_repo.get_by_id(id).await?;
        let mut active: account::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.account_repo.update(active).await
    }
}

/// Hash a password with argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use tutorhub_common::config::AuthConfig;
    use tutorhub_db::test_utils::fixtures;

    fn tokens() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
        })
    }

    fn service(db: MockDatabase) -> AccountService {
        AccountService::new(
            AccountRepository::new(Arc::new(db.into_connection())),
            tokens(),
        )
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fixtures::account("a1", AccountRole::Student)]]);

        let result = service(db)
            .register(RegisterInput {
                email: "A1@Example.com".to_string(),
                password: "password123".to_string(),
                name: "Ann".to_string(),
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db)
            .register(RegisterInput {
                email: "ann@example.com".to_string(),
                password: "short".to_string(),
                name: "Ann".to_string(),
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_issues_token_with_role() {
        let mut tutor = fixtures::account("t1", AccountRole::Tutor);
        tutor.password_hash = hash_password("password123").unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![tutor]]);

        let session = service(db)
            .login(LoginInput {
                email: "t1@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let claims = tokens().verify(&session.token).unwrap();
        assert_eq!(claims.sub, "t1");
        assert_eq!(claims.role, AccountRole::Tutor);
    }

    #[tokio::test]
    async fn test_login_wrong_password_unauthorized() {
        let mut student = fixtures::account("s1", AccountRole::Student);
        student.password_hash = hash_password("password123").unwrap();

        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![student]]);

        let result = service(db)
            .login(LoginInput {
                email: "s1@example.com".to_string(),
                password: "nope-nope".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
