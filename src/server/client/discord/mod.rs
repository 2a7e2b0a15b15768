//! Discord REST API client.
//!
//! Covers the handful of guild endpoints used for membership synchronization. Requests are
//! authenticated with the bot token, except `GET users/@me` which uses the member's OAuth2
//! access token.

pub mod model;
pub mod oauth;

use std::{collections::BTreeSet, time::Duration};

use dioxus_logger::tracing;
use reqwest::{header::HeaderMap, Method, RequestBuilder, Response, StatusCode};

use crate::server::{
    client::discord::model::{
        AddMemberRequest, CreateRoleRequest, DiscordErrorBody, DiscordGuild, DiscordRole,
        DiscordUser, GuildMember, ModifyMemberRequest,
    },
    config::DiscordConfig,
    error::{remote::RemoteError, Error},
    model::service::{RoleId, ServiceKind},
    service::rate_limit::SharedRateLimitGate,
};

/// Client for a single Discord guild.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_url: String,
    bot_token: String,
    guild_id: u64,
    gate: SharedRateLimitGate,
}

impl DiscordClient {
    /// Creates a new Discord client.
    ///
    /// # Arguments
    /// - `http` - Shared HTTP client
    /// - `config` - Discord configuration (API base URL, guild & bot token)
    /// - `gate` - Rate-limit gate every request acquires budget from
    pub fn new(http: reqwest::Client, config: &DiscordConfig, gate: SharedRateLimitGate) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            guild_id: config.guild_id,
            gate,
        }
    }

    /// Guild this client operates on.
    pub fn guild_id(&self) -> u64 {
        self.guild_id
    }

    /// Fetches the user owning the provided OAuth2 access token.
    pub async fn get_current_user(&self, access_token: &str) -> Result<DiscordUser, Error> {
        let request = self
            .http
            .get(format!("{}/users/@me", self.api_url))
            .bearer_auth(access_token);

        let response = self.send(request).await?;

        Ok(response.json().await?)
    }

    /// Fetches the guild's name and ID.
    pub async fn get_guild(&self) -> Result<DiscordGuild, Error> {
        let response = self
            .send(self.bot(Method::GET, &format!("guilds/{}", self.guild_id)))
            .await?;

        Ok(response.json().await?)
    }

    /// Lists every role of the guild.
    pub async fn list_roles(&self) -> Result<Vec<DiscordRole>, Error> {
        let response = self
            .send(self.bot(Method::GET, &format!("guilds/{}/roles", self.guild_id)))
            .await?;

        Ok(response.json().await?)
    }

    /// Creates a role without permissions.
    pub async fn create_role(&self, name: &str) -> Result<DiscordRole, Error> {
        let request = self
            .bot(Method::POST, &format!("guilds/{}/roles", self.guild_id))
            .json(&CreateRoleRequest {
                name,
                permissions: "0",
                mentionable: false,
                hoist: false,
            });

        let response = self.send(request).await?;

        Ok(response.json().await?)
    }

    /// Fetches a guild member.
    ///
    /// # Returns
    /// - `Ok(Some(GuildMember))` - The user is a member of the guild
    /// - `Ok(None)` - The user is not a member of the guild
    /// - `Err(Error)` - The request failed or was rate limited
    pub async fn get_member(&self, user_id: u64) -> Result<Option<GuildMember>, Error> {
        let result = self
            .send(self.bot(
                Method::GET,
                &format!("guilds/{}/members/{}", self.guild_id, user_id),
            ))
            .await;

        match result {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(Error::RemoteError(e)) if e.is_unknown_member() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Adds a user to the guild with the provided roles and nickname.
    ///
    /// # Returns
    /// - `Ok(true)` - The user joined the guild
    /// - `Ok(false)` - The user was already a member, roles and nickname were not applied
    pub async fn add_member(
        &self,
        user_id: u64,
        access_token: &str,
        roles: &BTreeSet<RoleId>,
        nick: Option<&str>,
    ) -> Result<bool, Error> {
        let request = self
            .bot(
                Method::PUT,
                &format!("guilds/{}/members/{}", self.guild_id, user_id),
            )
            .json(&AddMemberRequest {
                access_token,
                roles: role_strings(roles),
                nick,
            });

        let response = self.send(request).await?;

        Ok(response.status() == StatusCode::CREATED)
    }

    /// Replaces a member's roles and optionally their nickname.
    pub async fn modify_member(
        &self,
        user_id: u64,
        roles: &BTreeSet<RoleId>,
        nick: Option<&str>,
    ) -> Result<(), Error> {
        let request = self
            .bot(
                Method::PATCH,
                &format!("guilds/{}/members/{}", self.guild_id, user_id),
            )
            .json(&ModifyMemberRequest {
                roles: role_strings(roles),
                nick,
            });

        self.send(request).await?;

        Ok(())
    }

    /// Kicks a member from the guild.
    ///
    /// # Returns
    /// - `Ok(true)` - The member was removed
    /// - `Ok(false)` - The user was not a member of the guild
    pub async fn remove_member(&self, user_id: u64) -> Result<bool, Error> {
        let result = self
            .send(self.bot(
                Method::DELETE,
                &format!("guilds/{}/members/{}", self.guild_id, user_id),
            ))
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(Error::RemoteError(e)) if e.is_unknown_member() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn bot(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.api_url, path))
            .header("Authorization", format!("Bot {}", self.bot_token))
    }

    /// Sends a request once budget has been acquired from the rate-limit gate.
    ///
    /// Non-success responses are converted into [`RemoteError`]s, 429 responses and exhausted
    /// rate-limit buckets pause the gate.
    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        if !self.gate.try_acquire().await? {
            return Err(RemoteError::RateLimited {
                service: ServiceKind::Discord,
                retry_after: None,
            }
            .into());
        }

        let response = request.send().await?;

        if let Some(reset_after) = exhausted_bucket_reset(response.headers()) {
            tracing::debug!("Discord rate limit bucket exhausted, pausing for {:?}", reset_after);
            self.gate.pause(reset_after).await?;
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: DiscordErrorBody = response.json().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = body.retry_after.and_then(|s| Duration::try_from_secs_f64(s).ok());

            tracing::warn!("Discord answered 429, retry after {:?}", retry_after);
            if let Some(retry_after) = retry_after {
                self.gate.pause(retry_after).await?;
            }

            return Err(RemoteError::RateLimited {
                service: ServiceKind::Discord,
                retry_after,
            }
            .into());
        }

        Err(RemoteError::Api {
            service: ServiceKind::Discord,
            status: status.as_u16(),
            code: body.code,
            message: body.message.unwrap_or_default(),
        }
        .into())
    }
}

/// Parses a Discord snowflake string.
pub fn parse_snowflake(value: &str) -> Result<u64, Error> {
    value.parse().map_err(|_| {
        RemoteError::UnexpectedResponse {
            service: ServiceKind::Discord,
            reason: format!("invalid snowflake {:?}", value),
        }
        .into()
    })
}

fn role_strings(roles: &BTreeSet<RoleId>) -> Vec<String> {
    roles.iter().map(|id| id.to_string()).collect()
}

/// Returns the bucket reset delay when the response reports the bucket as exhausted.
fn exhausted_bucket_reset(headers: &HeaderMap) -> Option<Duration> {
    let remaining = headers.get("X-RateLimit-Remaining")?.to_str().ok()?;
    if remaining.trim() != "0" {
        return None;
    }

    let reset_after: f64 = headers
        .get("X-RateLimit-Reset-After")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;

    Duration::try_from_secs_f64(reset_after).ok()
}
