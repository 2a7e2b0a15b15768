//! Resolved user affiliation.
//!
//! An [`Affiliation`] is the canonical, read-only view of everything that decides which remote
//! roles a user should hold: their main character, the states they qualify for and the groups
//! they belong to. It is recomputed from the database for every reconciliation.

use std::collections::BTreeSet;

/// Canonical local affiliation of a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct Affiliation {
    /// The user the affiliation was resolved for.
    pub user: entity::auth_user::Model,
    /// The user's main character, if one is set.
    pub main_character: Option<entity::eve_character::Model>,
    /// States the user qualifies for, ordered by priority descending (ties by ascending ID).
    ///
    /// When the user qualifies for no state this holds the lowest-priority state as the
    /// default, or nothing if no states exist.
    pub states: Vec<entity::auth_state::Model>,
    /// Groups the user is a member of, ordered by name.
    pub groups: Vec<entity::auth_group::Model>,
    /// Permission codenames granted by the effective state and all groups.
    pub permissions: BTreeSet<String>,
}

impl Affiliation {
    /// Returns the state whose permissions and role apply to the user.
    pub fn effective_state(&self) -> Option<&entity::auth_state::Model> {
        self.states.first()
    }

    /// Returns true when the user holds the provided permission codename.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Local role names the user should hold remotely: every group plus the effective state.
    pub fn desired_role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.iter().map(|g| g.name.clone()).collect();

        if let Some(state) = self.effective_state() {
            names.push(state.name.clone());
        }

        names
    }
}

/// Every local group and state known to Bifrost, used to decide which remote roles are tracked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalRoleCatalog {
    /// All local group names.
    pub group_names: Vec<String>,
    /// All local state names.
    pub state_names: Vec<String>,
}

impl LocalRoleCatalog {
    /// Iterates over every local role name, groups first.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.group_names.iter().chain(self.state_names.iter())
    }
}
