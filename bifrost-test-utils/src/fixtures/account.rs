//! Remote account links & TeamSpeak group mappings.

use chrono::Utc;
use sea_orm::{ActiveValue, EntityTrait};

use crate::{error::TestError, TestContext};

pub struct AccountFixtures<'a> {
    pub test: &'a mut TestContext,
}

impl<'a> AccountFixtures<'a> {
    /// Link a Discord account to a user.
    ///
    /// # Arguments
    /// - `user_id` - Local user ID, the user must exist
    /// - `uid` - Discord user snowflake
    pub async fn insert_discord_user(
        &self,
        user_id: i32,
        uid: i64,
    ) -> Result<entity::discord_user::Model, TestError> {
        Ok(
            entity::prelude::DiscordUser::insert(entity::discord_user::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                uid: ActiveValue::Set(uid),
                username: ActiveValue::Set(None),
                activated_at: ActiveValue::Set(Utc::now().naive_utc()),
            })
            .exec_with_returning(&self.test.db)
            .await?,
        )
    }

    /// Link a TeamSpeak identity to a user.
    pub async fn insert_teamspeak3_user(
        &self,
        user_id: i32,
        uid: &str,
        perm_key: &str,
    ) -> Result<entity::teamspeak3_user::Model, TestError> {
        Ok(
            entity::prelude::Teamspeak3User::insert(entity::teamspeak3_user::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                uid: ActiveValue::Set(uid.to_string()),
                perm_key: ActiveValue::Set(perm_key.to_string()),
                activated_at: ActiveValue::Set(Utc::now().naive_utc()),
            })
            .exec_with_returning(&self.test.db)
            .await?,
        )
    }

    /// Map a local group to a TeamSpeak server group.
    pub async fn insert_teamspeak3_group_mapping(
        &self,
        group_id: i32,
        ts_group_id: i64,
    ) -> Result<(), TestError> {
        entity::prelude::Teamspeak3GroupMapping::insert(
            entity::teamspeak3_group_mapping::ActiveModel {
                group_id: ActiveValue::Set(group_id),
                ts_group_id: ActiveValue::Set(ts_group_id),
            },
        )
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }

    /// Map a state to the TeamSpeak server group its holders receive.
    pub async fn insert_teamspeak3_state_group(
        &self,
        state_id: i32,
        ts_group_id: i64,
    ) -> Result<(), TestError> {
        entity::prelude::Teamspeak3StateGroup::insert(
            entity::teamspeak3_state_group::ActiveModel {
                state_id: ActiveValue::Set(state_id),
                ts_group_id: ActiveValue::Set(ts_group_id),
            },
        )
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }
}
