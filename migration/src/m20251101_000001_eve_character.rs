use sea_orm_migration::{prelude::*, schema::*};

static IDX_EVE_CHARACTER_CORPORATION_ID: &str = "idx-eve_character-corporation_id";
static IDX_EVE_CHARACTER_ALLIANCE_ID: &str = "idx-eve_character-alliance_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EveCharacter::Table)
                    .if_not_exists()
                    .col(pk_auto(EveCharacter::Id))
                    .col(big_integer_uniq(EveCharacter::CharacterId))
                    .col(string(EveCharacter::CharacterName))
                    .col(big_integer(EveCharacter::CorporationId))
                    .col(string(EveCharacter::CorporationName))
                    .col(string(EveCharacter::CorporationTicker))
                    .col(big_integer_null(EveCharacter::AllianceId))
                    .col(string_null(EveCharacter::AllianceName))
                    .col(string_null(EveCharacter::AllianceTicker))
                    .col(timestamp(EveCharacter::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_EVE_CHARACTER_CORPORATION_ID)
                    .table(EveCharacter::Table)
                    .col(EveCharacter::CorporationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_EVE_CHARACTER_ALLIANCE_ID)
                    .table(EveCharacter::Table)
                    .col(EveCharacter::AllianceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_EVE_CHARACTER_ALLIANCE_ID)
                    .table(EveCharacter::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(IDX_EVE_CHARACTER_CORPORATION_ID)
                    .table(EveCharacter::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(EveCharacter::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum EveCharacter {
    Table,
    Id,
    CharacterId,
    CharacterName,
    CorporationId,
    CorporationName,
    CorporationTicker,
    AllianceId,
    AllianceName,
    AllianceTicker,
    UpdatedAt,
}
