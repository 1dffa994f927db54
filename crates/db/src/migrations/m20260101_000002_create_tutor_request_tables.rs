//! Create tutor request, certificate and evidence tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TutorRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutorRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TutorRequest::AccountId).string_len(32).not_null())
                    .col(ColumnDef::new(TutorRequest::Education).text())
                    .col(
                        ColumnDef::new(TutorRequest::Scores)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    // 1 = pending, 2 = approved, 3 = rejected
                    .col(
                        ColumnDef::new(TutorRequest::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(TutorRequest::Note).text())
                    .col(ColumnDef::new(TutorRequest::Reason).text())
                    .col(ColumnDef::new(TutorRequest::ReviewedBy).string_len(32))
                    .col(
                        ColumnDef::new(TutorRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(TutorRequest::ReviewedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutor_request_account")
                            .from(TutorRequest::Table, TutorRequest::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tutor_request_status")
                    .table(TutorRequest::Table)
                    .col(TutorRequest::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tutor_request_account_id")
                    .table(TutorRequest::Table)
                    .col(TutorRequest::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TutorCertificate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutorCertificate::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TutorCertificate::TutorRequestId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TutorCertificate::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(TutorCertificate::ImageUrl)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TutorCertificate::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutor_certificate_request")
                            .from(TutorCertificate::Table, TutorCertificate::TutorRequestId)
                            .to(TutorRequest::Table, TutorRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TutorEvidence::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutorEvidence::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TutorEvidence::TutorRequestId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TutorEvidence::Description).text())
                    .col(ColumnDef::new(TutorEvidence::FileUrl).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(TutorEvidence::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tutor_evidence_request")
                            .from(TutorEvidence::Table, TutorEvidence::TutorRequestId)
                            .to(TutorRequest::Table, TutorRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TutorEvidence::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TutorCertificate::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TutorRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TutorRequest {
    Table,
    Id,
    AccountId,
    Education,
    Scores,
    Status,
    Note,
    Reason,
    ReviewedBy,
    CreatedAt,
    ReviewedAt,
}

#[derive(Iden)]
enum TutorCertificate {
    Table,
    Id,
    TutorRequestId,
    Name,
    ImageUrl,
    CreatedAt,
}

#[derive(Iden)]
enum TutorEvidence {
    Table,
    Id,
    TutorRequestId,
    Description,
    FileUrl,
    CreatedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
