//! Create schedule, booking and review tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedule::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedule::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedule::TutorId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Schedule::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Schedule::EndAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Schedule::IsBooked).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Schedule::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_tutor")
                            .from(Schedule::Table, Schedule::TutorId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_tutor_start")
                    .table(Schedule::Table)
                    .col(Schedule::TutorId)
                    .col(Schedule::StartAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Booking::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Booking::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::TutorId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::ScheduleId).string_len(32))
                    .col(ColumnDef::new(Booking::Subject).string_len(128).not_null())
                    .col(ColumnDef::new(Booking::Note).text())
                    .col(ColumnDef::new(Booking::StartAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Booking::EndAt).timestamp_with_time_zone().not_null())
                    .col(
                        ColumnDef::new(Booking::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Booking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Booking::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_student")
                            .from(Booking::Table, Booking::StudentId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_tutor")
                            .from(Booking::Table, Booking::TutorId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_schedule")
                            .from(Booking::Table, Booking::ScheduleId)
                            .to(Schedule::Table, Schedule::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_student_id")
                    .table(Booking::Table)
                    .col(Booking::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_tutor_id")
                    .table(Booking::Table)
                    .col(Booking::TutorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Review::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Review::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::TutorId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Review::Comment).text())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_student")
                            .from(Review::Table, Review::StudentId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_tutor")
                            .from(Review::Table, Review::TutorId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one review per student per tutor
        manager
            .create_index(
                Index::create()
                    .name("idx_review_student_tutor")
                    .table(Review::Table)
                    .col(Review::StudentId)
                    .col(Review::TutorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_tutor_id")
                    .table(Review::Table)
                    .col(Review::TutorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedule::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Schedule {
    Table,
    Id,
    TutorId,
    StartAt,
    EndAt,
    IsBooked,
    CreatedAt,
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
    StudentId,
    TutorId,
    ScheduleId,
    Subject,
    Note,
    StartAt,
    EndAt,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    StudentId,
    TutorId,
    Rating,
    Comment,
    CreatedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
