//! Certificate attached to a tutor request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tutor_certificate")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub tutor_request_id: String,

    pub name: String,

    /// URL returned by the upload service
    pub image_url: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tutor_request::Entity",
        from = "Column::TutorRequestId",
        to = "super::tutor_request::Column::Id",
        on_delete = "Cascade"
    )]
    TutorRequest,
}

impl Related<super::tutor_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TutorRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
