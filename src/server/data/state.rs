use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

pub struct StateRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StateRepository<'a> {
    /// Creates a new instance of [`StateRepository`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get all states ordered by priority descending, ties broken by ascending ID
    pub async fn get_all(&self) -> Result<Vec<entity::auth_state::Model>, DbErr> {
        entity::prelude::AuthState::find()
            .order_by_desc(entity::auth_state::Column::Priority)
            .order_by_asc(entity::auth_state::Column::Id)
            .all(self.db)
            .await
    }

    /// Get the IDs of states a character qualifies for through explicit membership or by
    /// the state being public
    ///
    /// # Arguments
    /// - `character` - The user's main character
    pub async fn get_qualifying_state_ids(
        &self,
        character: &entity::eve_character::Model,
    ) -> Result<BTreeSet<i32>, DbErr> {
        let mut state_ids = BTreeSet::new();

        state_ids.extend(
            entity::prelude::AuthStateMemberCharacter::find()
                .filter(
                    entity::auth_state_member_character::Column::CharacterId
                        .eq(character.character_id),
                )
                .select_only()
                .column(entity::auth_state_member_character::Column::StateId)
                .into_tuple::<i32>()
                .all(self.db)
                .await?,
        );

        state_ids.extend(
            entity::prelude::AuthStateMemberCorporation::find()
                .filter(
                    entity::auth_state_member_corporation::Column::CorporationId
                        .eq(character.corporation_id),
                )
                .select_only()
                .column(entity::auth_state_member_corporation::Column::StateId)
                .into_tuple::<i32>()
                .all(self.db)
                .await?,
        );

        if let Some(alliance_id) = character.alliance_id {
            state_ids.extend(
                entity::prelude::AuthStateMemberAlliance::find()
                    .filter(entity::auth_state_member_alliance::Column::AllianceId.eq(alliance_id))
                    .select_only()
                    .column(entity::auth_state_member_alliance::Column::StateId)
                    .into_tuple::<i32>()
                    .all(self.db)
                    .await?,
            );
        }

        state_ids.extend(
            entity::prelude::AuthState::find()
                .filter(entity::auth_state::Column::Public.eq(true))
                .select_only()
                .column(entity::auth_state::Column::Id)
                .into_tuple::<i32>()
                .all(self.db)
                .await?,
        );

        Ok(state_ids)
    }

    /// Get the permission codenames granted by a state
    pub async fn get_permissions(&self, state_id: i32) -> Result<Vec<String>, DbErr> {
        entity::prelude::AuthStatePermission::find()
            .filter(entity::auth_state_permission::Column::StateId.eq(state_id))
            .select_only()
            .column(entity::auth_state_permission::Column::Permission)
            .into_tuple::<String>()
            .all(self.db)
            .await
    }
}
