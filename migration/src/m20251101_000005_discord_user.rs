use sea_orm_migration::{prelude::*, schema::*};

use crate::m20251101_000002_auth_user::AuthUser;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscordUser::Table)
                    .if_not_exists()
                    .col(integer(DiscordUser::UserId).primary_key())
                    .col(big_integer_uniq(DiscordUser::Uid))
                    .col(string_null(DiscordUser::Username))
                    .col(timestamp(DiscordUser::ActivatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(DiscordUser::Table, DiscordUser::UserId)
                            .to(AuthUser::Table, AuthUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscordUser::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum DiscordUser {
    Table,
    UserId,
    Uid,
    Username,
    ActivatedAt,
}
