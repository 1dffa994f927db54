//! Combo catalog service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tutorhub_common::{AppResult, IdGenerator};
use tutorhub_db::{entities::combo, repositories::ComboRepository};
use validator::Validate;

/// Input for creating a combo.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComboInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 2048))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 1000))]
    pub slot: i32,

    #[validate(range(min = 0))]
    pub price: i64,
}

/// Combo service.
#[derive(Clone)]
pub struct ComboService {
    combo_repo: ComboRepository,
    id_gen: IdGenerator,
}

impl ComboService {
    /// Create a new combo service.
    #[must_use]
    pub const fn new(combo_repo: ComboRepository) -> Self {
        Self {
            combo_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Combos available for purchase.
    pub async fn list_active(&self) -> AppResult<Vec<combo::Model>> {
        self.combo_repo.list_active().await
    }

    /// Add a combo to the catalog.
    pub async fn create(&self, input: CreateComboInput) -> AppResult<combo::Model> {
        input.validate()?;

        let model = combo::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            description: Set(input.description),
            slot: Set(input.slot),
            price: Set(input.price),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        self.combo_repo.create(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use tutorhub_common::AppError;

    #[tokio::test]
    async fn test_create_rejects_zero_slots() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = ComboService::new(ComboRepository::new(Arc::new(db)));

        let result = service
            .create(CreateComboInput {
                name: "Empty".to_string(),
                description: None,
                slot: 0,
                price: 0,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
