//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    #[sea_orm(string_value = "tutorRequestSubmitted")]
    TutorRequestSubmitted,
    #[sea_orm(string_value = "tutorRequestApproved")]
    TutorRequestApproved,
    #[sea_orm(string_value = "tutorRequestRejected")]
    TutorRequestRejected,
    #[sea_orm(string_value = "orderCreated")]
    OrderCreated,
    #[sea_orm(string_value = "orderApproved")]
    OrderApproved,
    #[sea_orm(string_value = "orderRejected")]
    OrderRejected,
    #[sea_orm(string_value = "bookingCreated")]
    BookingCreated,
    #[sea_orm(string_value = "bookingStatusChanged")]
    BookingStatusChanged,
    #[sea_orm(string_value = "reviewReceived")]
    ReviewReceived,
    #[sea_orm(string_value = "postLiked")]
    PostLiked,
    #[sea_orm(string_value = "postCommented")]
    PostCommented,
    #[sea_orm(string_value = "commentReplied")]
    CommentReplied,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The account receiving the notification
    pub recipient_id: String,

    pub notification_type: NotificationType,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// ID of the tutor request, order, booking, post or review concerned
    #[sea_orm(nullable)]
    pub related_id: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::RecipientId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
