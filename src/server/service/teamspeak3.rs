//! TeamSpeak 3 service adapter.
//!
//! Accounts are created as privilege keys bound to a Bifrost UID through the `sso_uid` custom
//! client property. Until the user redeems the key no client exists on the server and the
//! account is reported as pending. Explicit group & state mappings configured by administrators
//! take precedence over name-based server group lookup.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::server::{
    client::teamspeak3::Teamspeak3Client,
    data::teamspeak3::Teamspeak3MappingRepository,
    error::{lifecycle::LifecycleError, Error},
    model::{
        affiliation::{Affiliation, LocalRoleCatalog},
        service::{
            ActivationRequest, ApplyOutcome, MemberSnapshot, MissingMemberPolicy, NewAccount,
            RemoteRole, RemoveOutcome, RoleDiff, RoleId, RoleTargets, ServiceAccount,
            ServiceKind,
        },
    },
    service::{
        adapter::ServiceAdapter,
        role_mapper::{RoleDirectory, RoleMapper},
    },
};

/// Longest server group name TeamSpeak accepts.
pub const TEAMSPEAK_GROUP_NAME_LIMIT: usize = 30;
/// Longest UID Bifrost binds to a privilege key.
pub const TEAMSPEAK_UID_LIMIT: usize = 30;

pub struct Teamspeak3Adapter {
    client: Teamspeak3Client,
    mapper: RoleMapper,
}

impl Teamspeak3Adapter {
    /// Creates a new instance of [`Teamspeak3Adapter`]
    pub fn new(client: Teamspeak3Client, mapper: RoleMapper) -> Self {
        Self { client, mapper }
    }

    fn directory(&self) -> Teamspeak3Directory<'_> {
        Teamspeak3Directory {
            client: &self.client,
        }
    }
}

/// Builds the UID a user's TeamSpeak identity is bound to: `[TICKER]Character Name` of the main
/// character, falling back to the username. Characters outside letters, digits, spaces and
/// `-_.'[]` are dropped.
///
/// A name that had to be shortened or cleaned ends in `~<user id>` instead, `~` never occurs in
/// a cleaned name so the UID stays unique per user.
pub fn teamspeak3_uid(affiliation: &Affiliation) -> String {
    let raw = match &affiliation.main_character {
        Some(character) => format!(
            "[{}]{}",
            character.corporation_ticker, character.character_name
        ),
        None => affiliation.user.username.clone(),
    };
    let raw = raw.trim();

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '\'' | '[' | ']'))
        .collect();

    if cleaned == raw && cleaned.chars().count() <= TEAMSPEAK_UID_LIMIT {
        return cleaned;
    }

    let suffix = format!("~{}", affiliation.user.id);
    let kept: String = cleaned
        .chars()
        .take(TEAMSPEAK_UID_LIMIT.saturating_sub(suffix.chars().count()))
        .collect();

    format!("{}{}", kept.trim_end(), suffix)
}

struct Teamspeak3Directory<'a> {
    client: &'a Teamspeak3Client,
}

#[async_trait]
impl RoleDirectory for Teamspeak3Directory<'_> {
    fn namespace(&self) -> String {
        format!("teamspeak3:{}", self.client.server_id())
    }

    fn max_name_len(&self) -> usize {
        TEAMSPEAK_GROUP_NAME_LIMIT
    }

    async fn list_roles(&self) -> Result<Vec<RemoteRole>, Error> {
        Ok(self
            .client
            .list_server_groups()
            .await?
            .into_iter()
            .map(|(id, name)| RemoteRole {
                id,
                name,
                managed: false,
            })
            .collect())
    }

    async fn create_role(&self, name: &str) -> Result<RemoteRole, Error> {
        let id = self.client.add_server_group(name).await?;

        Ok(RemoteRole {
            id,
            name: name.to_string(),
            managed: false,
        })
    }
}

#[async_trait]
impl ServiceAdapter for Teamspeak3Adapter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Teamspeak3
    }

    fn missing_member_policy(&self) -> MissingMemberPolicy {
        MissingMemberPolicy::Defer
    }

    async fn namespace_name(&self) -> Result<String, Error> {
        self.client.server_name().await
    }

    async fn resolve_desired_roles(
        &self,
        db: &DatabaseConnection,
        affiliation: &Affiliation,
        catalog: &LocalRoleCatalog,
    ) -> Result<RoleTargets, Error> {
        let mappings = Teamspeak3MappingRepository::new(db).get_all().await?;

        let mut desired: BTreeSet<RoleId> = BTreeSet::new();
        let mut by_name: Vec<String> = Vec::new();

        for group in &affiliation.groups {
            match mappings.groups.get(&group.id) {
                Some(sgids) => desired.extend(sgids.iter().copied()),
                None => by_name.push(group.name.clone()),
            }
        }

        if let Some(state) = affiliation.effective_state() {
            match mappings.states.get(&state.id) {
                Some(sgid) => {
                    desired.insert(*sgid);
                }
                None => by_name.push(state.name.clone()),
            }
        }

        let snapshot = self.mapper.resolve(&self.directory(), &by_name).await?;
        desired.extend(by_name.iter().filter_map(|n| snapshot.id_for(n)));

        let mut tracked: BTreeSet<RoleId> =
            catalog.names().filter_map(|n| snapshot.id_for(n)).collect();
        tracked.extend(mappings.groups.values().flatten().copied());
        tracked.extend(mappings.states.values().copied());
        tracked.extend(desired.iter().copied());

        Ok(RoleTargets {
            desired,
            tracked,
            nickname: None,
        })
    }

    async fn fetch_actual_roles(
        &self,
        account: &ServiceAccount,
    ) -> Result<Option<MemberSnapshot>, Error> {
        let Some(cldbid) = self.client.find_client_dbid(&account.uid).await? else {
            return Ok(None);
        };

        match self.client.client_server_groups(cldbid).await {
            Ok(roles) => Ok(Some(MemberSnapshot {
                roles,
                nickname: None,
            })),
            Err(Error::RemoteError(e)) if e.is_unknown_member() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn apply_diff(
        &self,
        account: &ServiceAccount,
        diff: &RoleDiff,
    ) -> Result<ApplyOutcome, Error> {
        let Some(cldbid) = self.client.find_client_dbid(&account.uid).await? else {
            return Ok(ApplyOutcome::MemberGone);
        };

        let result = async {
            for sgid in &diff.add {
                self.client.add_client_to_group(*sgid, cldbid).await?;
            }
            for sgid in &diff.remove {
                self.client.remove_client_from_group(*sgid, cldbid).await?;
            }
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => Ok(ApplyOutcome::Applied),
            Err(Error::RemoteError(e)) if e.is_unknown_member() => Ok(ApplyOutcome::MemberGone),
            Err(e) => Err(e),
        }
    }

    async fn create_account(
        &self,
        affiliation: &Affiliation,
        request: ActivationRequest,
        targets: &RoleTargets,
    ) -> Result<NewAccount, Error> {
        if let ActivationRequest::Discord { .. } = request {
            return Err(LifecycleError::WrongActivationRequest {
                expected: ServiceKind::Teamspeak3,
                got: request.service(),
            }
            .into());
        }

        // Further groups are granted by the first reconciliation after the key is redeemed
        let Some(sgid) = targets.desired.iter().next().copied() else {
            return Err(LifecycleError::NoRoleToGrant {
                user_id: affiliation.user.id,
                service: ServiceKind::Teamspeak3,
            }
            .into());
        };

        let uid = teamspeak3_uid(affiliation);
        let perm_key = self
            .client
            .add_privilege_key(
                sgid,
                &uid,
                &format!("Bifrost account of {}", affiliation.user.username),
            )
            .await?;

        Ok(NewAccount {
            uid,
            username: None,
            perm_key: Some(perm_key),
        })
    }

    async fn remove_account(&self, account: &ServiceAccount) -> Result<RemoveOutcome, Error> {
        let Some(cldbid) = self.client.find_client_dbid(&account.uid).await? else {
            // Never redeemed, the key would still grant its server group
            if let Some(perm_key) = &account.perm_key {
                self.client.delete_privilege_key(perm_key).await?;
            }
            return Ok(RemoveOutcome::AlreadyGone);
        };

        match self.client.delete_client(cldbid).await {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(Error::RemoteError(e)) if e.is_unknown_member() => Ok(RemoveOutcome::AlreadyGone),
            Err(e) => Err(e),
        }
    }
}
