//! Remote account link repository.
//!
//! Links live in one table per service (`discord_user`, `teamspeak3_user`); this repository
//! maps both onto [`ServiceAccount`] so the reconciliation engine can stay service agnostic.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryOrder, QuerySelect,
};

use crate::server::model::service::{ServiceAccount, ServiceKind};

pub struct AccountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AccountRepository<'a> {
    /// Creates a new instance of [`AccountRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a user's linked account on a service
    pub async fn find(
        &self,
        user_id: i32,
        service: ServiceKind,
    ) -> Result<Option<ServiceAccount>, DbErr> {
        match service {
            ServiceKind::Discord => Ok(entity::prelude::DiscordUser::find_by_id(user_id)
                .one(self.db)
                .await?
                .map(discord_account)),
            ServiceKind::Teamspeak3 => Ok(entity::prelude::Teamspeak3User::find_by_id(user_id)
                .one(self.db)
                .await?
                .map(teamspeak3_account)),
        }
    }

    /// Get every account a user has linked, across all services
    pub async fn find_all_for_user(&self, user_id: i32) -> Result<Vec<ServiceAccount>, DbErr> {
        let mut accounts = Vec::new();

        for service in ServiceKind::ALL {
            if let Some(account) = self.find(user_id, service).await? {
                accounts.push(account);
            }
        }

        Ok(accounts)
    }

    /// Create a Discord account link
    ///
    /// # Arguments
    /// - `user_id` - Local user ID
    /// - `uid` - Discord user snowflake
    /// - `username` - Discord username at activation time
    pub async fn create_discord(
        &self,
        user_id: i32,
        uid: u64,
        username: Option<String>,
    ) -> Result<ServiceAccount, DbErr> {
        let link = entity::discord_user::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            uid: ActiveValue::Set(uid as i64),
            username: ActiveValue::Set(username),
            activated_at: ActiveValue::Set(Utc::now().naive_utc()),
        };

        Ok(discord_account(link.insert(self.db).await?))
    }

    /// Create a TeamSpeak account link
    ///
    /// # Arguments
    /// - `user_id` - Local user ID
    /// - `uid` - Value of the `sso_uid` custom property bound to the privilege key
    /// - `perm_key` - Privilege key the user redeems on the server
    pub async fn create_teamspeak3(
        &self,
        user_id: i32,
        uid: String,
        perm_key: String,
    ) -> Result<ServiceAccount, DbErr> {
        let link = entity::teamspeak3_user::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            uid: ActiveValue::Set(uid),
            perm_key: ActiveValue::Set(perm_key),
            activated_at: ActiveValue::Set(Utc::now().naive_utc()),
        };

        Ok(teamspeak3_account(link.insert(self.db).await?))
    }

    /// Deletes a user's link on a service
    ///
    /// # Returns
    /// - `Ok(true)` - The link was deleted
    /// - `Ok(false)` - No link existed
    pub async fn delete(&self, user_id: i32, service: ServiceKind) -> Result<bool, DbErr> {
        let result = match service {
            ServiceKind::Discord => {
                entity::prelude::DiscordUser::delete_by_id(user_id)
                    .exec(self.db)
                    .await?
            }
            ServiceKind::Teamspeak3 => {
                entity::prelude::Teamspeak3User::delete_by_id(user_id)
                    .exec(self.db)
                    .await?
            }
        };

        Ok(result.rows_affected > 0)
    }

    /// Get the IDs of every user with a linked account on a service
    pub async fn get_linked_user_ids(&self, service: ServiceKind) -> Result<Vec<i32>, DbErr> {
        match service {
            ServiceKind::Discord => {
                entity::prelude::DiscordUser::find()
                    .select_only()
                    .column(entity::discord_user::Column::UserId)
                    .order_by_asc(entity::discord_user::Column::UserId)
                    .into_tuple::<i32>()
                    .all(self.db)
                    .await
            }
            ServiceKind::Teamspeak3 => {
                entity::prelude::Teamspeak3User::find()
                    .select_only()
                    .column(entity::teamspeak3_user::Column::UserId)
                    .order_by_asc(entity::teamspeak3_user::Column::UserId)
                    .into_tuple::<i32>()
                    .all(self.db)
                    .await
            }
        }
    }

    /// Count the accounts linked on a service
    pub async fn count(&self, service: ServiceKind) -> Result<u64, DbErr> {
        match service {
            ServiceKind::Discord => entity::prelude::DiscordUser::find().count(self.db).await,
            ServiceKind::Teamspeak3 => entity::prelude::Teamspeak3User::find().count(self.db).await,
        }
    }
}

fn discord_account(model: entity::discord_user::Model) -> ServiceAccount {
    ServiceAccount {
        user_id: model.user_id,
        service: ServiceKind::Discord,
        uid: (model.uid as u64).to_string(),
        username: model.username,
        perm_key: None,
    }
}

fn teamspeak3_account(model: entity::teamspeak3_user::Model) -> ServiceAccount {
    ServiceAccount {
        user_id: model.user_id,
        service: ServiceKind::Teamspeak3,
        uid: model.uid,
        username: None,
        perm_key: Some(model.perm_key),
    }
}
