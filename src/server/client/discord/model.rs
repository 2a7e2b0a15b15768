//! Discord REST API payloads.

use serde::{Deserialize, Serialize};

/// User returned by `GET users/@me`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    /// User snowflake.
    pub id: String,
    /// Unique username.
    pub username: String,
    /// Display name, if the user set one.
    #[serde(default)]
    pub global_name: Option<String>,
}

/// Guild returned by `GET guilds/{guild_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordGuild {
    /// Guild snowflake.
    pub id: String,
    /// Guild name.
    pub name: String,
}

/// Role returned by `GET guilds/{guild_id}/roles` & `POST guilds/{guild_id}/roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordRole {
    /// Role snowflake.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Whether the role is managed by an integration (bot roles, boosters).
    #[serde(default)]
    pub managed: bool,
}

/// Member returned by `GET guilds/{guild_id}/members/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    /// Role snowflakes held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Guild nickname.
    #[serde(default)]
    pub nick: Option<String>,
}

/// Error body returned with non-success responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordErrorBody {
    /// JSON error code.
    #[serde(default)]
    pub code: Option<u64>,
    /// Human readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Seconds to wait before retrying, present on 429 responses.
    #[serde(default)]
    pub retry_after: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateRoleRequest<'a> {
    pub name: &'a str,
    pub permissions: &'a str,
    pub mentionable: bool,
    pub hoist: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct AddMemberRequest<'a> {
    pub access_token: &'a str,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct ModifyMemberRequest<'a> {
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<&'a str>,
}
