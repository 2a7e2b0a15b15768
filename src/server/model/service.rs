//! Remote service models.
//!
//! Types describing the remote services Bifrost synchronizes into, the accounts linking a
//! user to them, and the role sets exchanged between the reconciliation engine and the
//! service adapters.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Identifier of a remote role (Discord role snowflake, TeamSpeak server group ID).
pub type RoleId = u64;

/// Remote services supported by the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Discord guild membership & roles.
    Discord,
    /// TeamSpeak 3 server groups.
    Teamspeak3,
}

impl ServiceKind {
    /// Every service kind, in a stable order.
    pub const ALL: [ServiceKind; 2] = [ServiceKind::Discord, ServiceKind::Teamspeak3];

    /// Short machine name used in logs and Redis keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Discord => "discord",
            ServiceKind::Teamspeak3 => "teamspeak3",
        }
    }

    /// Permission codename a user must hold to keep an account on this service.
    pub fn access_permission(&self) -> &'static str {
        match self {
            ServiceKind::Discord => "discord.access_discord",
            ServiceKind::Teamspeak3 => "teamspeak3.access_teamspeak3",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Discord => write!(f, "Discord"),
            ServiceKind::Teamspeak3 => write!(f, "TeamSpeak 3"),
        }
    }
}

/// A role or server group as known by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRole {
    /// Remote identifier.
    pub id: RoleId,
    /// Display name as stored remotely.
    pub name: String,
    /// Whether the role is owned by the remote platform (bot & integration roles) and must
    /// never be assigned or removed by Bifrost.
    pub managed: bool,
}

/// Link between a local user and their account on a remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    /// Local user ID.
    pub user_id: i32,
    /// Service the account lives on.
    pub service: ServiceKind,
    /// Remote account identifier (Discord user ID, TeamSpeak unique ID).
    pub uid: String,
    /// Remote display name at activation time, if known.
    pub username: Option<String>,
    /// TeamSpeak privilege key handed out on activation.
    pub perm_key: Option<String>,
}

/// Account data returned by a service adapter after a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Remote account identifier.
    pub uid: String,
    /// Remote display name, if known.
    pub username: Option<String>,
    /// TeamSpeak privilege key the user redeems to receive their groups.
    pub perm_key: Option<String>,
}

/// Data supplied by the user-facing activation flow.
#[derive(Debug, Clone)]
pub enum ActivationRequest {
    /// Discord OAuth2 user access token with the `identify` & `guilds.join` scopes.
    Discord {
        /// The user's OAuth2 access token.
        access_token: String,
    },
    /// TeamSpeak activation needs no user-supplied data, a privilege key is generated.
    Teamspeak3,
}

impl ActivationRequest {
    /// Service this request is meant for.
    pub fn service(&self) -> ServiceKind {
        match self {
            ActivationRequest::Discord { .. } => ServiceKind::Discord,
            ActivationRequest::Teamspeak3 => ServiceKind::Teamspeak3,
        }
    }
}

/// Roles currently held by a remote member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSnapshot {
    /// Remote role IDs assigned to the member.
    pub roles: BTreeSet<RoleId>,
    /// Current nickname, for services that support one.
    pub nickname: Option<String>,
}

/// Result of resolving a user's local affiliation into remote role identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTargets {
    /// Remote roles the member should hold.
    pub desired: BTreeSet<RoleId>,
    /// Remote roles corresponding to any local group or state. Only these are ever removed.
    pub tracked: BTreeSet<RoleId>,
    /// Nickname the member should carry, `None` when names are not synchronized.
    pub nickname: Option<String>,
}

/// Minimal set of changes bringing a remote member in line with local state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDiff {
    /// Full role set the member ends up with (untracked roles kept, desired roles added).
    pub target: BTreeSet<RoleId>,
    /// Roles to be added.
    pub add: BTreeSet<RoleId>,
    /// Tracked roles to be removed.
    pub remove: BTreeSet<RoleId>,
    /// New nickname, only set when it differs from the current one.
    pub nickname: Option<String>,
}

impl RoleDiff {
    /// Returns true when no remote write is required.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.nickname.is_none()
    }

    /// Returns true when the role set changes.
    pub fn roles_changed(&self) -> bool {
        !self.add.is_empty() || !self.remove.is_empty()
    }
}

/// How the engine treats a member the remote service does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMemberPolicy {
    /// The account was removed remotely, delete the local link.
    Unlink,
    /// The account has not been claimed yet (e.g. TeamSpeak privilege key not redeemed).
    Defer,
}

/// Outcome of applying a [`RoleDiff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Changes were written remotely.
    Applied,
    /// The remote service reported the member as unknown.
    MemberGone,
}

/// Outcome of removing a remote account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The account was removed.
    Removed,
    /// The remote service no longer knew the account.
    AlreadyGone,
}

/// Reason a link was deleted during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkReason {
    /// The user no longer holds the service's access permission.
    AccessRevoked,
    /// The remote service reported the account gone.
    RemoteAccountGone,
}

/// Outcome of a single reconciliation attempt for a user on one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The user has no linked account on the service.
    NoAccount,
    /// Remote state already matches, no write was issued.
    InSync,
    /// A corrective write was applied.
    Updated,
    /// The remote account exists locally but has not been claimed yet.
    Pending,
    /// The local link was deleted.
    Unlinked(UnlinkReason),
    /// The rate-limit budget was exhausted, nothing was changed.
    Deferred,
}

/// Summary of a service's remote namespace and its linked accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Service described.
    pub service: ServiceKind,
    /// Name of the Discord guild or TeamSpeak virtual server.
    pub namespace_name: String,
    /// Number of local accounts linked to the service.
    pub linked_accounts: u64,
}
