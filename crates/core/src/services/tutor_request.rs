//! Tutor request workflow.
//!
//! A request moves Pending -> Approved or Pending -> Rejected exactly once.
//! The move is a conditional update on the current status, so of two
//! concurrent reviewers only one succeeds and the other sees
//! "already processed". Approval copies the submitted qualifications onto
//! the applicant's account. Notifications and email are best-effort.

use chrono::Utc;
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::{
        account::{self, AccountRole},
        notification::NotificationType,
        tutor_certificate, tutor_evidence,
        tutor_request::{self, SubjectScore, TutorRequestStatus},
    },
    repositories::{AccountRepository, TutorRequestRepository},
};
use validator::Validate;

use super::email::{EmailService, tutor_approved_email, tutor_rejected_email};
use super::notification::{Notice, NotificationService};

const ALREADY_PROCESSED: &str = "Tutor request already processed";

/// A certificate attached to a submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(url, length(max = 1024))]
    pub image_url: String,
}

/// An evidence file attached to a submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceInput {
    #[validate(length(max = 1024))]
    pub description: Option<String>,

    #[validate(url, length(max = 1024))]
    pub file_url: String,
}

/// Input for submitting a tutor request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTutorRequestInput {
    #[validate(length(max = 2048))]
    pub education: Option<String>,

    #[serde(default)]
    pub scores: Vec<SubjectScore>,

    #[serde(default)]
    #[validate(nested, length(max = 20))]
    pub certificates: Vec<CertificateInput>,

    #[serde(default)]
    #[validate(nested, length(max = 20))]
    pub evidence: Vec<EvidenceInput>,
}

/// A request together with its attachments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequestDetail {
    #[serde(flatten)]
    pub request: tutor_request::Model,
    pub certificates: Vec<tutor_certificate::Model>,
    pub evidence: Vec<tutor_evidence::Model>,
}

/// Tutor request service.
#[derive(Clone)]
pub struct TutorRequestService {
    request_repo: TutorRequestRepository,
    account_repo: AccountRepository,
    notifications: NotificationService,
    email: EmailService,
    id_gen: IdGenerator,
}

impl TutorRequestService {
    /// Create a new tutor request service.
    #[must_use]
    pub const fn new(
        request_repo: TutorRequestRepository,
        account_repo: AccountRepository,
        notifications: NotificationService,
        email: EmailService,
    ) -> Self {
        Self {
            request_repo,
            account_repo,
            notifications,
            email,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a request to become a tutor.
    pub async fn submit(
        &self,
        account_id: &str,
        input: SubmitTutorRequestInput,
    ) -> AppResult<TutorRequestDetail> {
        input.validate()?;
        if let Some(bad) = input.scores.iter().find(|s| !(0.0..=10.0).contains(&s.score)) {
            return Err(AppError::Validation(format!(
                "Score for {} must be between 0 and 10",
                bad.subject
            )));
        }

        let applicant = self.account_repo.get_by_id(account_id).await?;
        match applicant.role {
            AccountRole::Tutor if applicant.is_approved => {
                return Err(AppError::BadRequest("Account is already a tutor".to_string()));
            }
            AccountRole::Admin => {
                return Err(AppError::BadRequest(
                    "Admins cannot apply as tutors".to_string(),
                ));
            }
            _ => {}
        }

        if self.request_repo.has_pending(account_id).await? {
            return Err(AppError::Conflict(
                "A tutor request is already pending".to_string(),
            ));
        }

        let now = Utc::now();
        let request_id = self.id_gen.generate();
        let scores = serde_json::to_value(&input.scores)
            .map_err(|e| AppError::Internal(format!("Failed to encode scores: {e}")))?;

        // The request and its attachments commit together.
        let txn = self.request_repo.begin().await?;
        let request = self
            .request_repo
            .create(&txn, tutor_request::ActiveModel {
                id: Set(request_id.clone()),
                account_id: Set(account_id.to_string()),
                education: Set(input.education),
                scores: Set(scores),
                status: Set(TutorRequestStatus::Pending),
                note: Set(None),
                reason: Set(None),
                reviewed_by: Set(None),
                created_at: Set(now.into()),
                reviewed_at: Set(None),
            })
            .await?;

        let mut certificates = Vec::with_capacity(input.certificates.len());
        for cert in input.certificates {
            certificates.push(
                self.request_repo
                    .create_certificate(&txn, tutor_certificate::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        tutor_request_id: Set(request_id.clone()),
                        name: Set(cert.name),
                        image_url: Set(cert.image_url),
                        created_at: Set(now.into()),
                    })
                    .await?,
            );
        }

        let mut evidence = Vec::with_capacity(input.evidence.len());
        for item in input.evidence {
            evidence.push(
                self.request_repo
                    .create_evidence(&txn, tutor_evidence::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        tutor_request_id: Set(request_id.clone()),
                        description: Set(item.description),
                        file_url: Set(item.file_url),
                        created_at: Set(now.into()),
                    })
                    .await?,
            );
        }

        tutorhub_db::commit(txn).await?;

        tracing::info!(request_id = %request.id, account_id = %account_id, "Tutor request submitted");

        match self.account_repo.find_admin_ids().await {
            Ok(admin_ids) => {
                self.notifications
                    .deliver(submission_notices(&admin_ids, &request, &applicant.name))
                    .await;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to look up admins for tutor request"),
        }

        Ok(TutorRequestDetail {
            request,
            certificates,
            evidence,
        })
    }

    /// The caller's most recent request.
    pub async fn latest_for_account(&self, account_id: &str) -> AppResult<TutorRequestDetail> {
        let request = self
            .request_repo
            .find_latest_by_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No tutor request submitted".to_string()))?;

        self.with_attachments(request).await
    }

    /// List requests for review.
    pub async fn list(
        &self,
        status: Option<TutorRequestStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<tutor_request::Model>> {
        self.request_repo.list(status, limit, offset).await
    }

    /// Get a request with its attachments.
    pub async fn get_detail(&self, id: &str) -> AppResult<TutorRequestDetail> {
        let request = self.request_repo.get_by_id(id).await?;
        self.with_attachments(request).await
    }

    async fn with_attachments(
        &self,
        request: tutor_request::Model,
    ) -> AppResult<TutorRequestDetail> {
        let certificates = self.request_repo.find_certificates(&request.id).await?;
        let evidence = self.request_repo.find_evidence(&request.id).await?;

        Ok(TutorRequestDetail {
            request,
            certificates,
            evidence,
        })
    }

    /// Approve a pending request and promote the applicant to tutor.
    pub async fn approve(&self, id: &str, admin_id: &str) -> AppResult<tutor_request::Model> {
        let request = self.request_repo.get_by_id(id).await?;
        if request.status.is_resolved() {
            return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
        }

        let certificates = self.request_repo.find_certificates(id).await?;
        let evidence = self.request_repo.find_evidence(id).await?;
        let applicant = self.account_repo.get_by_id(&request.account_id).await?;
        let (email, name) = (applicant.email.clone(), applicant.name.clone());

        // Status change and promotion commit together.
        let reviewed_at: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.request_repo.begin().await?;
        let applied = self
            .request_repo
            .transition(
                &txn,
                id,
                TutorRequestStatus::Pending,
                TutorRequestStatus::Approved,
                admin_id,
                None,
                reviewed_at,
            )
            .await?;
        if !applied {
            return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
        }

        let approved = tutor_request::Model {
            status: TutorRequestStatus::Approved,
            reviewed_by: Some(admin_id.to_string()),
            reason: None,
            reviewed_at: Some(reviewed_at),
            ..request
        };

        self.account_repo
            .update_in(
                &txn,
                promote_account(applicant, &approved, &certificates, &evidence),
            )
            .await?;
        tutorhub_db::commit(txn).await?;

        tracing::info!(request_id = %id, admin_id = %admin_id, "Tutor request approved");

        self.notifications
            .deliver(vec![decision_notice(&approved)])
            .await;
        self.send_email_best_effort(tutor_approved_email(&email, &name))
            .await;

        Ok(approved)
    }

    /// Reject a pending request with an optional reason.
    pub async fn reject(
        &self,
        id: &str,
        admin_id: &str,
        reason: Option<String>,
    ) -> AppResult<tutor_request::Model> {
        let request = self.request_repo.get_by_id(id).await?;
        if request.status.is_resolved() {
            return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
        }

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let reviewed_at: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.request_repo.begin().await?;
        let applied = self
            .request_repo
            .transition(
                &txn,
                id,
                TutorRequestStatus::Pending,
                TutorRequestStatus::Rejected,
                admin_id,
                reason.clone(),
                reviewed_at,
            )
            .await?;
        if !applied {
            return Err(AppError::BadRequest(ALREADY_PROCESSED.to_string()));
        }
        tutorhub_db::commit(txn).await?;

        let rejected = tutor_request::Model {
            status: TutorRequestStatus::Rejected,
            reviewed_by: Some(admin_id.to_string()),
            reason,
            reviewed_at: Some(reviewed_at),
            ..request
        };

        tracing::info!(request_id = %id, admin_id = %admin_id, "Tutor request rejected");

        self.notifications
            .deliver(vec![decision_notice(&rejected)])
            .await;

        match self.account_repo.find_by_id(&rejected.account_id).await {
            Ok(Some(applicant)) => {
                self.send_email_best_effort(tutor_rejected_email(
                    &applicant.email,
                    &applicant.name,
                    rejected.reason.as_deref(),
                ))
                .await;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load applicant for rejection email"),
        }

        Ok(rejected)
    }

    /// Replace the admin note. Allowed in any status.
    pub async fn update_note(
        &self,
        id: &str,
        note: Option<String>,
    ) -> AppResult<tutor_request::Model> {
        let request = self.request_repo.get_by_id(id).await?;
        self.request_repo.update_note(request, note).await
    }

    async fn send_email_best_effort(&self, message: super::email::EmailMessage) {
        let to = message.to.clone();
        if let Err(e) = self.email.send(message).await {
            tracing::warn!(error = %e, to = %to, "Failed to send email");
        }
    }
}

/// Account changes applied when a request is approved.
#[must_use]
pub fn promote_account(
    account: account::Model,
    request: &tutor_request::Model,
    certificates: &[tutor_certificate::Model],
    evidence: &[tutor_evidence::Model],
) -> account::ActiveModel {
    let certificates: Vec<serde_json::Value> = certificates
        .iter()
        .map(|c| serde_json::json!({ "name": c.name, "imageUrl": c.image_url }))
        .collect();
    let evidence: Vec<serde_json::Value> = evidence
        .iter()
        .map(|e| serde_json::json!({ "description": e.description, "fileUrl": e.file_url }))
        .collect();

    let mut active: account::ActiveModel = account.into();
    active.role = Set(AccountRole::Tutor);
    active.is_approved = Set(true);
    active.education = Set(request.education.clone());
    active.scores = Set(request.scores.clone());
    active.certificates = Set(serde_json::Value::Array(certificates));
    active.evidence = Set(serde_json::Value::Array(evidence));
    active.updated_at = Set(Some(Utc::now().into()));
    active
}

/// Notices sent to admins when a request is submitted.
#[must_use]
pub fn submission_notices(
    admin_ids: &[String],
    request: &tutor_request::Model,
    applicant_name: &str,
) -> Vec<Notice> {
    admin_ids
        .iter()
        .map(|admin_id| {
            Notice::new(
                admin_id.clone(),
                NotificationType::TutorRequestSubmitted,
                "New tutor request",
                format!("{applicant_name} applied to become a tutor"),
            )
            .related_to(request.id.clone())
        })
        .collect()
}

/// Notice sent to the applicant once a request is resolved.
#[must_use]
pub fn decision_notice(request: &tutor_request::Model) -> Notice {
    let notice = match request.status {
        TutorRequestStatus::Approved => Notice::new(
            request.account_id.clone(),
            NotificationType::TutorRequestApproved,
            "Tutor request approved",
            "Your tutor request was approved. You can now publish your schedule.",
        ),
        _ => Notice::new(
            request.account_id.clone(),
            NotificationType::TutorRequestRejected,
            "Tutor request rejected",
            request.reason.as_ref().map_or_else(
                || "Your tutor request was rejected.".to_string(),
                |r| format!("Your tutor request was rejected: {r}"),
            ),
        ),
    };
    notice.related_to(request.id.clone())
}
