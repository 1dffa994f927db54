//! Tutor reviews.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::{notification::NotificationType, review},
    repositories::{AccountRepository, ReviewRepository},
};
use validator::Validate;

use super::notification::{Notice, NotificationService};

/// Input for reviewing a tutor.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub tutor_id: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(max = 2048))]
    pub comment: Option<String>,
}

/// A tutor's reviews with their average rating.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReviews {
    pub average_rating: Option<f64>,
    pub reviews: Vec<review::Model>,
}

/// Mean rating, or `None` without reviews.
#[must_use]
pub fn average_rating(reviews: &[review::Model]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    Some(total as f64 / reviews.len() as f64)
}

/// Review service.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    account_repo: AccountRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        account_repo: AccountRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            review_repo,
            account_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Leave a review. One review per student per tutor.
    pub async fn create(&self, student_id: &str, input: CreateReviewInput) -> AppResult<review::Model> {
        input.validate()?;

        if input.tutor_id == student_id {
            return Err(AppError::BadRequest("Cannot review yourself".to_string()));
        }

        let tutor = self.account_repo.get_by_id(&input.tutor_id).await?;
        if !tutor.is_active_tutor() {
            return Err(AppError::BadRequest(
                "Account is not an approved tutor".to_string(),
            ));
        }

        if self
            .review_repo
            .find_by_pair(student_id, &input.tutor_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Tutor already reviewed".to_string()));
        }

        let review = self
            .review_repo
            .create(review::ActiveModel {
                id: Set(self.id_gen.generate()),
                student_id: Set(student_id.to_string()),
                tutor_id: Set(input.tutor_id),
                rating: Set(input.rating),
                comment: Set(input.comment),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.notifications
            .deliver(vec![
                Notice::new(
                    review.tutor_id.clone(),
                    NotificationType::ReviewReceived,
                    "New review",
                    format!("You received a {}-star review", review.rating),
                )
                .related_to(review.id.clone()),
            ])
            .await;

        Ok(review)
    }

    /// Reviews of a tutor.
    pub async fn list_for_tutor(
        &self,
        tutor_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<TutorReviews> {
        let reviews = self.review_repo.find_by_tutor(tutor_id, limit, offset).await?;
        Ok(TutorReviews {
            average_rating: average_rating(&reviews),
            reviews,
        })
    }

    /// Delete a review. Only its author or an admin may do so.
    pub async fn delete(&self, id: &str, caller_id: &str, is_admin: bool) -> AppResult<()> {
        let review = self.review_repo.get_by_id(id).await?;
        if !is_admin && review.student_id != caller_id {
            return Err(AppError::Forbidden("Not the author of this review".to_string()));
        }
        self.review_repo.delete(review).await
    }
}
