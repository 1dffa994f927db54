//! Account entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AccountRole {
    #[sea_orm(string_value = "student")]
    #[default]
    Student,
    #[sea_orm(string_value = "tutor")]
    Tutor,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl AccountRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Tutor => "tutor",
            Self::Admin => "admin",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Self::Student),
            "tutor" => Some(Self::Tutor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub email: String,

    /// Lowercased email, unique.
    #[sea_orm(unique)]
    pub email_lower: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    pub role: AccountRole,

    /// Set when a tutor request is approved
    #[sea_orm(default_value = false)]
    pub is_approved: bool,

    // Copied from the approved tutor request.
    #[sea_orm(column_type = "Text", nullable)]
    pub education: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub scores: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub certificates: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub evidence: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether this account may act as a tutor.
    #[must_use]
    pub fn is_active_tutor(&self) -> bool {
        self.role == AccountRole::Tutor && self.is_approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tutor_request::Entity")]
    TutorRequests,

    #[sea_orm(has_many = "super::order_combo::Entity")]
    Orders,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::tutor_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TutorRequests.def()
    }
}

impl Related<super::order_combo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
