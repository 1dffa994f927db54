//! Tutor availability windows.

use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::Deserialize;
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::schedule,
    repositories::{AccountRepository, ScheduleRepository},
};

/// Input for publishing an availability window.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleInput {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Schedule service.
#[derive(Clone)]
pub struct ScheduleService {
    schedule_repo: ScheduleRepository,
    account_repo: AccountRepository,
    id_gen: IdGenerator,
}

impl ScheduleService {
    /// Create a new schedule service.
    #[must_use]
    pub const fn new(schedule_repo: ScheduleRepository, account_repo: AccountRepository) -> Self {
        Self {
            schedule_repo,
            account_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a window for the calling tutor.
    pub async fn create(
        &self,
        tutor_id: &str,
        input: CreateScheduleInput,
    ) -> AppResult<schedule::Model> {
        if input.end_at <= input.start_at {
            return Err(AppError::Validation(
                "endAt must be after startAt".to_string(),
            ));
        }

        let tutor = self.account_repo.get_by_id(tutor_id).await?;
        if !tutor.is_active_tutor() {
            return Err(AppError::Forbidden(
                "Only approved tutors can publish schedules".to_string(),
            ));
        }

        let (start_at, end_at): (DateTimeWithTimeZone, DateTimeWithTimeZone) =
            (input.start_at.into(), input.end_at.into());
        if self.schedule_repo.overlaps(tutor_id, start_at, end_at).await? {
            return Err(AppError::Conflict(
                "Schedule overlaps an existing window".to_string(),
            ));
        }

        self.schedule_repo
            .create(schedule::ActiveModel {
                id: Set(self.id_gen.generate()),
                tutor_id: Set(tutor_id.to_string()),
                start_at: Set(start_at),
                end_at: Set(end_at),
                is_booked: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Windows published by a tutor.
    pub async fn list_for_tutor(&self, tutor_id: &str) -> AppResult<Vec<schedule::Model>> {
        self.schedule_repo.find_by_tutor(tutor_id).await
    }

    /// Remove one of the caller's unbooked windows.
    pub async fn delete(&self, id: &str, tutor_id: &str) -> AppResult<()> {
        let window = self.schedule_repo.get_by_id(id).await?;
        if window.tutor_id != tutor_id {
            return Err(AppError::Forbidden(
                "Schedule belongs to another tutor".to_string(),
            ));
        }
        if window.is_booked || !self.schedule_repo.delete_unbooked(id).await? {
            return Err(AppError::BadRequest(
                "Booked schedules cannot be deleted".to_string(),
            ));
        }
        Ok(())
    }
}
