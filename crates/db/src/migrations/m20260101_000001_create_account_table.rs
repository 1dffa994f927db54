//! Create account table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Account::Email).string_len(256).not_null())
                    .col(ColumnDef::new(Account::EmailLower).string_len(256).not_null())
                    .col(ColumnDef::new(Account::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(Account::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Account::AvatarUrl).string_len(1024))
                    .col(ColumnDef::new(Account::Phone).string_len(32))
                    .col(ColumnDef::new(Account::Bio).text())
                    .col(
                        ColumnDef::new(Account::Role)
                            .string_len(16)
                            .not_null()
                            .default("student"),
                    )
                    .col(
                        ColumnDef::new(Account::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Account::Education).text())
                    .col(ColumnDef::new(Account::Scores).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Account::Certificates)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Account::Evidence).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Account::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // One account per email, case-insensitively
        manager
            .create_index(
                Index::create()
                    .name("idx_account_email_lower")
                    .table(Account::Table)
                    .col(Account::EmailLower)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_account_role")
                    .table(Account::Table)
                    .col(Account::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
    Email,
    EmailLower,
    PasswordHash,
    Name,
    AvatarUrl,
    Phone,
    Bio,
    Role,
    IsApproved,
    Education,
    Scores,
    Certificates,
    Evidence,
    CreatedAt,
    UpdatedAt,
}
