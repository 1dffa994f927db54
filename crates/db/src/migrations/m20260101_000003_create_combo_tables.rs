//! Create combo and order_combo tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Combo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Combo::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Combo::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Combo::Description).text())
                    .col(ColumnDef::new(Combo::Slot).integer().not_null())
                    .col(ColumnDef::new(Combo::Price).big_integer().not_null())
                    .col(ColumnDef::new(Combo::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Combo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderCombo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderCombo::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderCombo::AccountId).string_len(32).not_null())
                    .col(ColumnDef::new(OrderCombo::ComboId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(OrderCombo::UsedSlot)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(OrderCombo::RemainingSlot).integer().not_null())
                    .col(ColumnDef::new(OrderCombo::Price).big_integer().not_null())
                    .col(ColumnDef::new(OrderCombo::Status).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(OrderCombo::ApprovalStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(OrderCombo::ReviewedBy).string_len(32))
                    .col(
                        ColumnDef::new(OrderCombo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(OrderCombo::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_combo_account")
                            .from(OrderCombo::Table, OrderCombo::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_combo_combo")
                            .from(OrderCombo::Table, OrderCombo::ComboId)
                            .to(Combo::Table, Combo::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_combo_account_id")
                    .table(OrderCombo::Table)
                    .col(OrderCombo::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_combo_approval_status")
                    .table(OrderCombo::Table)
                    .col(OrderCombo::ApprovalStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderCombo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Combo::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Combo {
    Table,
    Id,
    Name,
    Description,
    Slot,
    Price,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum OrderCombo {
    Table,
    Id,
    AccountId,
    ComboId,
    UsedSlot,
    RemainingSlot,
    Price,
    Status,
    ApprovalStatus,
    ReviewedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
