use sea_orm_migration::{prelude::*, schema::*};

use crate::{
    m20251101_000002_auth_user::AuthUser, m20251101_000003_auth_state::AuthState,
    m20251101_000004_auth_group::AuthGroup,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teamspeak3User::Table)
                    .if_not_exists()
                    .col(integer(Teamspeak3User::UserId).primary_key())
                    .col(string_uniq(Teamspeak3User::Uid))
                    .col(string(Teamspeak3User::PermKey))
                    .col(timestamp(Teamspeak3User::ActivatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teamspeak3User::Table, Teamspeak3User::UserId)
                            .to(AuthUser::Table, AuthUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teamspeak3GroupMapping::Table)
                    .if_not_exists()
                    .col(integer(Teamspeak3GroupMapping::GroupId))
                    .col(big_integer(Teamspeak3GroupMapping::TsGroupId))
                    .primary_key(
                        Index::create()
                            .col(Teamspeak3GroupMapping::GroupId)
                            .col(Teamspeak3GroupMapping::TsGroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                Teamspeak3GroupMapping::Table,
                                Teamspeak3GroupMapping::GroupId,
                            )
                            .to(AuthGroup::Table, AuthGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teamspeak3StateGroup::Table)
                    .if_not_exists()
                    .col(integer(Teamspeak3StateGroup::StateId).primary_key())
                    .col(big_integer(Teamspeak3StateGroup::TsGroupId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teamspeak3StateGroup::Table, Teamspeak3StateGroup::StateId)
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
            .drop_table(Table::drop().table(Teamspeak3StateGroup::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teamspeak3GroupMapping::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teamspeak3User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Teamspeak3User {
    Table,
    UserId,
    Uid,
    PermKey,
    ActivatedAt,
}

#[derive(DeriveIden)]
pub enum Teamspeak3GroupMapping {
    Table,
    GroupId,
    TsGroupId,
}

#[derive(DeriveIden)]
pub enum Teamspeak3StateGroup {
    Table,
    StateId,
    TsGroupId,
}
