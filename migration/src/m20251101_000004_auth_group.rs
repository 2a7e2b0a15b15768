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
                    .table(AuthGroup::Table)
                    .if_not_exists()
                    .col(pk_auto(AuthGroup::Id))
                    .col(string_uniq(AuthGroup::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthUserGroup::Table)
                    .if_not_exists()
                    .col(integer(AuthUserGroup::UserId))
                    .col(integer(AuthUserGroup::GroupId))
                    .primary_key(
                        Index::create()
                            .col(AuthUserGroup::UserId)
                            .col(AuthUserGroup::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthUserGroup::Table, AuthUserGroup::UserId)
                            .to(AuthUser::Table, AuthUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthUserGroup::Table, AuthUserGroup::GroupId)
                            .to(AuthGroup::Table, AuthGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthGroupPermission::Table)
                    .if_not_exists()
                    .col(integer(AuthGroupPermission::GroupId))
                    .col(string(AuthGroupPermission::Permission))
                    .primary_key(
                        Index::create()
                            .col(AuthGroupPermission::GroupId)
                            .col(AuthGroupPermission::Permission),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthGroupPermission::Table, AuthGroupPermission::GroupId)
                            .to(AuthGroup::Table, AuthGroup::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthGroupPermission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AuthUserGroup::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AuthGroup::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum AuthGroup {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum AuthUserGroup {
    Table,
    UserId,
    GroupId,
}

#[derive(DeriveIden)]
pub enum AuthGroupPermission {
    Table,
    GroupId,
    Permission,
}
