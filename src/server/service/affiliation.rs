//! Affiliation resolver.
//!
//! Computes the canonical set of groups, qualifying states and permissions for a user from
//! the local database. Resolution is a pure read and is redone for every reconciliation so
//! that later jobs always act on current data.

use std::collections::BTreeSet;

use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        character::CharacterRepository, group::GroupRepository, state::StateRepository,
        user::UserRepository,
    },
    error::Error,
    model::affiliation::{Affiliation, LocalRoleCatalog},
};

pub struct AffiliationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AffiliationService<'a> {
    /// Creates a new instance of [`AffiliationService`]
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the affiliation of a user
    ///
    /// States are those the user's main character qualifies for, ordered by priority
    /// descending with ties broken by ascending ID. A user without a main character or
    /// without any qualifying state falls back to the lowest-priority state.
    ///
    /// Permissions are the union of the effective state's permissions and the permissions
    /// of every group the user belongs to.
    ///
    /// # Returns
    /// - `Ok(Some(Affiliation))` - The user exists
    /// - `Ok(None)` - No user with the provided ID exists
    pub async fn resolve(&self, user_id: i32) -> Result<Option<Affiliation>, Error> {
        let Some(user) = UserRepository::new(self.db).find_by_id(user_id).await? else {
            return Ok(None);
        };

        let main_character = match user.main_character_id {
            Some(id) => CharacterRepository::new(self.db).find_by_id(id).await?,
            None => None,
        };

        let state_repo = StateRepository::new(self.db);
        let all_states = state_repo.get_all().await?;

        let qualifying = match &main_character {
            Some(character) => state_repo.get_qualifying_state_ids(character).await?,
            None => BTreeSet::new(),
        };

        let mut states: Vec<_> = all_states
            .iter()
            .filter(|s| qualifying.contains(&s.id))
            .cloned()
            .collect();

        if states.is_empty() {
            if let Some(default) = all_states
                .iter()
                .min_by_key(|s| (s.priority, s.id))
                .cloned()
            {
                states.push(default);
            }
        }

        let group_repo = GroupRepository::new(self.db);
        let groups = group_repo.get_for_user(user.id).await?;
        let group_ids: Vec<i32> = groups.iter().map(|g| g.id).collect();

        let mut permissions: BTreeSet<String> = group_repo
            .get_permissions(&group_ids)
            .await?
            .into_iter()
            .collect();

        if let Some(state) = states.first() {
            permissions.extend(state_repo.get_permissions(state.id).await?);
        }

        Ok(Some(Affiliation {
            user,
            main_character,
            states,
            groups,
            permissions,
        }))
    }

    /// Lists every local group & state name
    pub async fn local_catalog(&self) -> Result<LocalRoleCatalog, Error> {
        let group_names = GroupRepository::new(self.db).get_all_names().await?;
        let state_names = StateRepository::new(self.db)
            .get_all()
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();

        Ok(LocalRoleCatalog {
            group_names,
            state_names,
        })
    }
}
