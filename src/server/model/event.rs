//! Local data change notifications.
//!
//! Changes to characters, users, groups and states are reported as [`SyncEvent`]s. The
//! notifier expands each event into the per-user reconciliation jobs it affects.

use std::fmt;

use crate::server::model::service::ServiceAccount;

/// A change to local data that may require remote memberships to be reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A character's name, corporation, alliance or one of their tickers changed.
    ///
    /// Nicknames and TeamSpeak UIDs are built from the main character, so a rename has to be
    /// reported as well as an affiliation change.
    CharacterChanged {
        /// EVE Online character ID.
        character_id: i64,
    },
    /// A user selected a different main character.
    MainCharacterChanged {
        /// Local user ID.
        user_id: i32,
    },
    /// A user joined or left a group.
    GroupMembershipChanged {
        /// Local user ID.
        user_id: i32,
    },
    /// Permissions granted by a group changed.
    GroupPermissionsChanged {
        /// Local group ID.
        group_id: i32,
    },
    /// A state's member characters, corporations, alliances, or public flag changed.
    StateMembershipChanged {
        /// Local state ID.
        state_id: i32,
    },
    /// Permissions granted by a state changed.
    StatePermissionsChanged {
        /// Local state ID.
        state_id: i32,
    },
    /// A user was deleted locally.
    ///
    /// Carries the accounts the user had linked since the link rows are gone once the user is
    /// removed.
    UserDeleted {
        /// Local user ID.
        user_id: i32,
        /// Remote accounts linked at deletion time.
        accounts: Vec<ServiceAccount>,
    },
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::UserDeleted { user_id, accounts } => write!(
                f,
                "UserDeleted {{ user_id: {}, accounts: {} }}",
                user_id,
                accounts.len()
            ),
            other => write!(f, "{:?}", other),
        }
    }
}
