//! Schedule entity: a tutor's availability window.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub tutor_id: String,

    pub start_at: DateTimeWithTimeZone,

    pub end_at: DateTimeWithTimeZone,

    #[sea_orm(default_value = false)]
    pub is_booked: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::TutorId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Tutor,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tutor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
