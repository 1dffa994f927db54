//! Tutor request entity for the student-to-tutor upgrade workflow.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a tutor request.
///
/// Stored as a small integer: 1 = pending, 2 = approved, 3 = rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum TutorRequestStatus {
    #[sea_orm(num_value = 1)]
    #[default]
    Pending,
    #[sea_orm(num_value = 2)]
    Approved,
    #[sea_orm(num_value = 3)]
    Rejected,
}

impl TutorRequestStatus {
    /// Whether the request has been decided.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A subject score submitted with a tutor request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tutor_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Applicant
    pub account_id: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub education: Option<String>,

    /// Array of [`SubjectScore`]
    #[sea_orm(column_type = "JsonBinary")]
    pub scores: Json,

    pub status: TutorRequestStatus,

    /// Free-text admin note, editable after resolution
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,

    /// Rejection reason
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,

    #[sea_orm(has_many = "super::tutor_certificate::Entity")]
    Certificates,

    #[sea_orm(has_many = "super::tutor_evidence::Entity")]
    Evidence,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::tutor_certificate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificates.def()
    }
}

impl Related<super::tutor_evidence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evidence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
