use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthState::Table)
                    .if_not_exists()
                    .col(pk_auto(AuthState::Id))
                    .col(string_uniq(AuthState::Name))
                    .col(integer(AuthState::Priority))
                    .col(boolean(AuthState::Public).default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthStateMemberCharacter::Table)
                    .if_not_exists()
                    .col(integer(AuthStateMemberCharacter::StateId))
                    .col(big_integer(AuthStateMemberCharacter::CharacterId))
                    .primary_key(
                        Index::create()
                            .col(AuthStateMemberCharacter::StateId)
                            .col(AuthStateMemberCharacter::CharacterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthStateMemberCharacter::Table, AuthStateMemberCharacter::StateId)
                            .to(AuthState::Table, AuthState::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthStateMemberCorporation::Table)
                    .if_not_exists()
                    .col(integer(AuthStateMemberCorporation::StateId))
                    .col(big_integer(AuthStateMemberCorporation::CorporationId))
                    .primary_key(
                        Index::create()
                            .col(AuthStateMemberCorporation::StateId)
                            .col(AuthStateMemberCorporation::CorporationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthStateMemberCorporation::Table, AuthStateMemberCorporation::StateId)
                            .to(AuthState::Table, AuthState::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthStateMemberAlliance::Table)
                    .if_not_exists()
                    .col(integer(AuthStateMemberAlliance::StateId))
                    .col(big_integer(AuthStateMemberAlliance::AllianceId))
                    .primary_key(
                        Index::create()
                            .col(AuthStateMemberAlliance::StateId)
                            .col(AuthStateMemberAlliance::AllianceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthStateMemberAlliance::Table, AuthStateMemberAlliance::StateId)
                            .to(AuthState::Table, AuthState::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthStatePermission::Table)
                    .if_not_exists()
                    .col(integer(AuthStatePermission::StateId))
                    .col(string(AuthStatePermission::Permission))
                    .primary_key(
                        Index::create()
                            .col(AuthStatePermission::StateId)
                            .col(AuthStatePermission::Permission),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthStatePermission::Table, AuthStatePermission::StateId)
                            .to(AuthState::Table, AuthState::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthStatePermission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AuthStateMemberAlliance::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AuthStateMemberCorporation::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AuthStateMemberCharacter::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AuthState::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum AuthState {
    Table,
    Id,
    Name,
    Priority,
    Public,
}

#[derive(DeriveIden)]
pub enum AuthStateMemberCharacter {
    Table,
    StateId,
    CharacterId,
}

#[derive(DeriveIden)]
pub enum AuthStateMemberCorporation {
    Table,
    StateId,
    CorporationId,
}

#[derive(DeriveIden)]
pub enum AuthStateMemberAlliance {
    Table,
    StateId,
    AllianceId,
}

#[derive(DeriveIden)]
pub enum AuthStatePermission {
    Table,
    StateId,
    Permission,
}
