//! Local authorization records: characters, users, groups & states.

use chrono::Utc;
use sea_orm::{ActiveValue, EntityTrait};

use crate::{error::TestError, TestContext};

pub struct AuthFixtures<'a> {
    pub test: &'a mut TestContext,
}

impl<'a> AuthFixtures<'a> {
    /// Insert a character with generated names.
    ///
    /// The character is named `Character {character_id}`, its corporation `Corporation
    /// {corporation_id}` with ticker `CORP`, and its alliance (if any) `Alliance {alliance_id}`
    /// with ticker `ALLY`.
    ///
    /// # Arguments
    /// - `character_id` - EVE Online character ID
    /// - `corporation_id` - EVE Online corporation ID the character belongs to
    /// - `alliance_id` - Optional EVE Online alliance ID of the corporation
    pub async fn insert_character(
        &self,
        character_id: i64,
        corporation_id: i64,
        alliance_id: Option<i64>,
    ) -> Result<entity::eve_character::Model, TestError> {
        self.insert_named_character(
            character_id,
            &format!("Character {}", character_id),
            corporation_id,
            "CORP",
            alliance_id,
        )
        .await
    }

    /// Insert a character with the provided name & corporation ticker.
    pub async fn insert_named_character(
        &self,
        character_id: i64,
        character_name: &str,
        corporation_id: i64,
        corporation_ticker: &str,
        alliance_id: Option<i64>,
    ) -> Result<entity::eve_character::Model, TestError> {
        Ok(
            entity::prelude::EveCharacter::insert(entity::eve_character::ActiveModel {
                character_id: ActiveValue::Set(character_id),
                character_name: ActiveValue::Set(character_name.to_string()),
                corporation_id: ActiveValue::Set(corporation_id),
                corporation_name: ActiveValue::Set(format!("Corporation {}", corporation_id)),
                corporation_ticker: ActiveValue::Set(corporation_ticker.to_string()),
                alliance_id: ActiveValue::Set(alliance_id),
                alliance_name: ActiveValue::Set(alliance_id.map(|id| format!("Alliance {}", id))),
                alliance_ticker: ActiveValue::Set(alliance_id.map(|_| "ALLY".to_string())),
                updated_at: ActiveValue::Set(Utc::now().naive_utc()),
                ..Default::default()
            })
            .exec_with_returning(&self.test.db)
            .await?,
        )
    }

    /// Insert a user.
    ///
    /// # Arguments
    /// - `username` - Unique username
    /// - `main_character_id` - Optional record ID (not EVE ID) of the user's main character
    pub async fn insert_user(
        &self,
        username: &str,
        main_character_id: Option<i32>,
    ) -> Result<entity::auth_user::Model, TestError> {
        Ok(
            entity::prelude::AuthUser::insert(entity::auth_user::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                main_character_id: ActiveValue::Set(main_character_id),
                created_at: ActiveValue::Set(Utc::now().naive_utc()),
                ..Default::default()
            })
            .exec_with_returning(&self.test.db)
            .await?,
        )
    }

    pub async fn insert_group(&self, name: &str) -> Result<entity::auth_group::Model, TestError> {
        Ok(
            entity::prelude::AuthGroup::insert(entity::auth_group::ActiveModel {
                name: ActiveValue::Set(name.to_string()),
                ..Default::default()
            })
            .exec_with_returning(&self.test.db)
            .await?,
        )
    }

    pub async fn add_user_to_group(&self, user_id: i32, group_id: i32) -> Result<(), TestError> {
        entity::prelude::AuthUserGroup::insert(entity::auth_user_group::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            group_id: ActiveValue::Set(group_id),
        })
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }

    pub async fn add_group_permission(
        &self,
        group_id: i32,
        permission: &str,
    ) -> Result<(), TestError> {
        entity::prelude::AuthGroupPermission::insert(entity::auth_group_permission::ActiveModel {
            group_id: ActiveValue::Set(group_id),
            permission: ActiveValue::Set(permission.to_string()),
        })
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }

    /// Insert a state.
    ///
    /// # Arguments
    /// - `name` - Unique state name
    /// - `priority` - Higher priority states win when a user qualifies for several
    /// - `public` - Public states are held by every user
    pub async fn insert_state(
        &self,
        name: &str,
        priority: i32,
        public: bool,
    ) -> Result<entity::auth_state::Model, TestError> {
        Ok(
            entity::prelude::AuthState::insert(entity::auth_state::ActiveModel {
                name: ActiveValue::Set(name.to_string()),
                priority: ActiveValue::Set(priority),
                public: ActiveValue::Set(public),
                ..Default::default()
            })
            .exec_with_returning(&self.test.db)
            .await?,
        )
    }

    pub async fn add_state_permission(
        &self,
        state_id: i32,
        permission: &str,
    ) -> Result<(), TestError> {
        entity::prelude::AuthStatePermission::insert(entity::auth_state_permission::ActiveModel {
            state_id: ActiveValue::Set(state_id),
            permission: ActiveValue::Set(permission.to_string()),
        })
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }

    pub async fn add_state_member_character(
        &self,
        state_id: i32,
        character_id: i64,
    ) -> Result<(), TestError> {
        entity::prelude::AuthStateMemberCharacter::insert(
            entity::auth_state_member_character::ActiveModel {
                state_id: ActiveValue::Set(state_id),
                character_id: ActiveValue::Set(character_id),
            },
        )
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }

    pub async fn add_state_member_corporation(
        &self,
        state_id: i32,
        corporation_id: i64,
    ) -> Result<(), TestError> {
        entity::prelude::AuthStateMemberCorporation::insert(
            entity::auth_state_member_corporation::ActiveModel {
                state_id: ActiveValue::Set(state_id),
                corporation_id: ActiveValue::Set(corporation_id),
            },
        )
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }

    pub async fn add_state_member_alliance(
        &self,
        state_id: i32,
        alliance_id: i64,
    ) -> Result<(), TestError> {
        entity::prelude::AuthStateMemberAlliance::insert(
            entity::auth_state_member_alliance::ActiveModel {
                state_id: ActiveValue::Set(state_id),
                alliance_id: ActiveValue::Set(alliance_id),
            },
        )
        .exec_without_returning(&self.test.db)
        .await?;

        Ok(())
    }
}
