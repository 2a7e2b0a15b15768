//! Discord service adapter.
//!
//! Members join the guild through OAuth2 (`PUT add-member` with the user's access token) and
//! are synchronized with a single `PATCH modify-member` carrying the full target role list.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dioxus_logger::tracing;
use sea_orm::DatabaseConnection;

use crate::server::{
    client::discord::{model::GuildMember, parse_snowflake, DiscordClient},
    error::{
        lifecycle::LifecycleError,
        remote::{RemoteError, DISCORD_UNKNOWN_ROLE},
        Error,
    },
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
        reconcile::diff::compute_diff,
        role_mapper::{RoleDirectory, RoleMapper},
    },
};

/// Longest role name Discord accepts.
pub const DISCORD_ROLE_NAME_LIMIT: usize = 100;
/// Longest guild nickname Discord accepts.
pub const DISCORD_NICKNAME_LIMIT: usize = 32;

pub struct DiscordAdapter {
    client: DiscordClient,
    mapper: RoleMapper,
    sync_names: bool,
}

impl DiscordAdapter {
    /// Creates a new instance of [`DiscordAdapter`]
    ///
    /// # Arguments
    /// - `client` - Client for the synchronized guild
    /// - `mapper` - Shared role mapper
    /// - `sync_names` - Whether guild nicknames are set to the member's main character name
    pub fn new(client: DiscordClient, mapper: RoleMapper, sync_names: bool) -> Self {
        Self {
            client,
            mapper,
            sync_names,
        }
    }

    fn directory(&self) -> DiscordDirectory<'_> {
        DiscordDirectory {
            client: &self.client,
        }
    }

    fn desired_nickname(&self, affiliation: &Affiliation) -> Option<String> {
        if !self.sync_names {
            return None;
        }

        affiliation
            .main_character
            .as_ref()
            .map(|c| c.character_name.chars().take(DISCORD_NICKNAME_LIMIT).collect())
    }

    fn is_unknown_role(error: &Error) -> bool {
        matches!(
            error,
            Error::RemoteError(RemoteError::Api {
                service: ServiceKind::Discord,
                code: Some(DISCORD_UNKNOWN_ROLE),
                ..
            })
        )
    }
}

fn member_snapshot(member: GuildMember) -> Result<MemberSnapshot, Error> {
    Ok(MemberSnapshot {
        roles: member
            .roles
            .iter()
            .map(|id| parse_snowflake(id))
            .collect::<Result<_, _>>()?,
        nickname: member.nick,
    })
}

struct DiscordDirectory<'a> {
    client: &'a DiscordClient,
}

#[async_trait]
impl RoleDirectory for DiscordDirectory<'_> {
    fn namespace(&self) -> String {
        format!("discord:{}", self.client.guild_id())
    }

    fn max_name_len(&self) -> usize {
        DISCORD_ROLE_NAME_LIMIT
    }

    async fn list_roles(&self) -> Result<Vec<RemoteRole>, Error> {
        let guild_id = self.client.guild_id();
        let mut roles = Vec::new();

        for role in self.client.list_roles().await? {
            let id = parse_snowflake(&role.id)?;

            // @everyone shares the guild's ID and cannot be assigned
            if id == guild_id {
                continue;
            }

            roles.push(RemoteRole {
                id,
                name: role.name,
                managed: role.managed,
            });
        }

        Ok(roles)
    }

    async fn create_role(&self, name: &str) -> Result<RemoteRole, Error> {
        let role = self.client.create_role(name).await?;

        Ok(RemoteRole {
            id: parse_snowflake(&role.id)?,
            name: role.name,
            managed: role.managed,
        })
    }
}

#[async_trait]
impl ServiceAdapter for DiscordAdapter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Discord
    }

    fn missing_member_policy(&self) -> MissingMemberPolicy {
        MissingMemberPolicy::Unlink
    }

    async fn namespace_name(&self) -> Result<String, Error> {
        Ok(self.client.get_guild().await?.name)
    }

    async fn resolve_desired_roles(
        &self,
        _db: &DatabaseConnection,
        affiliation: &Affiliation,
        catalog: &LocalRoleCatalog,
    ) -> Result<RoleTargets, Error> {
        let names = affiliation.desired_role_names();
        let snapshot = self.mapper.resolve(&self.directory(), &names).await?;

        let desired: BTreeSet<RoleId> = names.iter().filter_map(|n| snapshot.id_for(n)).collect();
        let mut tracked: BTreeSet<RoleId> =
            catalog.names().filter_map(|n| snapshot.id_for(n)).collect();
        tracked.extend(desired.iter().copied());

        Ok(RoleTargets {
            desired,
            tracked,
            nickname: self.desired_nickname(affiliation),
        })
    }

    async fn fetch_actual_roles(
        &self,
        account: &ServiceAccount,
    ) -> Result<Option<MemberSnapshot>, Error> {
        let user_id = parse_snowflake(&account.uid)?;

        self.client
            .get_member(user_id)
            .await?
            .map(member_snapshot)
            .transpose()
    }

    async fn apply_diff(
        &self,
        account: &ServiceAccount,
        diff: &RoleDiff,
    ) -> Result<ApplyOutcome, Error> {
        let user_id = parse_snowflake(&account.uid)?;

        match self
            .client
            .modify_member(user_id, &diff.target, diff.nickname.as_deref())
            .await
        {
            Ok(()) => Ok(ApplyOutcome::Applied),
            Err(Error::RemoteError(e)) if e.is_unknown_member() => Ok(ApplyOutcome::MemberGone),
            Err(e) => {
                if Self::is_unknown_role(&e) {
                    tracing::warn!("Discord role was deleted remotely, invalidating role cache");
                    self.mapper.invalidate(&self.directory().namespace()).await;
                }
                Err(e)
            }
        }
    }

    async fn create_account(
        &self,
        affiliation: &Affiliation,
        request: ActivationRequest,
        targets: &RoleTargets,
    ) -> Result<NewAccount, Error> {
        let access_token = match request {
            ActivationRequest::Discord { access_token } => access_token,
            other => {
                return Err(LifecycleError::WrongActivationRequest {
                    expected: ServiceKind::Discord,
                    got: other.service(),
                }
                .into())
            }
        };

        let user = self.client.get_current_user(&access_token).await?;
        let user_id = parse_snowflake(&user.id)?;

        let joined = self
            .client
            .add_member(
                user_id,
                &access_token,
                &targets.desired,
                targets.nickname.as_deref(),
            )
            .await?;

        // Discord ignores roles & nick when the user already is a member
        if !joined {
            tracing::debug!(
                "Discord user {} already in guild, synchronizing roles of user {}",
                user_id,
                affiliation.user.id
            );

            if let Some(member) = self.client.get_member(user_id).await? {
                let actual = member_snapshot(member)?;
                let diff = compute_diff(targets, &actual);
                if !diff.is_empty() {
                    self.client
                        .modify_member(user_id, &diff.target, diff.nickname.as_deref())
                        .await?;
                }
            }
        }

        Ok(NewAccount {
            uid: user_id.to_string(),
            username: Some(user.username),
            perm_key: None,
        })
    }

    async fn remove_account(&self, account: &ServiceAccount) -> Result<RemoveOutcome, Error> {
        let user_id = parse_snowflake(&account.uid)?;

        if self.client.remove_member(user_id).await? {
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::AlreadyGone)
        }
    }
}
