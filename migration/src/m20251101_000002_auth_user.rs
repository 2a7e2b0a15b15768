use sea_orm_migration::{prelude::*, schema::*};

use crate::m20251101_000001_eve_character::EveCharacter;

static FK_AUTH_USER_MAIN_CHARACTER_ID: &str = "fk-auth_user-main_character_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthUser::Table)
                    .if_not_exists()
                    .col(pk_auto(AuthUser::Id))
                    .col(string_uniq(AuthUser::Username))
                    .col(integer_null(AuthUser::MainCharacterId))
                    .col(timestamp(AuthUser::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name(FK_AUTH_USER_MAIN_CHARACTER_ID)
                    .from_tbl(AuthUser::Table)
                    .from_col(AuthUser::MainCharacterId)
                    .to_tbl(EveCharacter::Table)
                    .to_col(EveCharacter::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name(FK_AUTH_USER_MAIN_CHARACTER_ID)
                    .table(AuthUser::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AuthUser::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum AuthUser {
    Table,
    Id,
    Username,
    MainCharacterId,
    CreatedAt,
}
