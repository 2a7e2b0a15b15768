//! Environment configuration.
//!
//! Configuration is read once at startup from environment variables (optionally loaded from a
//! `.env` file by `dotenvy`). Discord and TeamSpeak are each enabled only when their
//! connection variables are present.

use std::{str::FromStr, time::Duration};

use crate::server::error::config::ConfigError;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_RESYNC_CRON: &str = "0 0 * * * *";
const DEFAULT_ROLE_CACHE_TTL_SECS: u64 = 300;

const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";
const DEFAULT_DISCORD_RATE_LIMIT: u32 = 50;

const DEFAULT_TEAMSPEAK3_SERVER_ID: u64 = 1;
const DEFAULT_TEAMSPEAK3_RATE_LIMIT: u32 = 10;

pub struct Config {
    pub database_url: String,
    pub valkey_url: String,
    /// Maximum number of reconciliation jobs processed concurrently
    pub workers: usize,
    /// Cron expression for the periodic full resync
    pub resync_cron: String,
    /// How long listed remote roles are trusted before the role mapper lists them again
    pub role_cache_ttl: Duration,
    pub discord: Option<DiscordConfig>,
    pub teamspeak3: Option<Teamspeak3Config>,
}

#[derive(Clone)]
pub struct DiscordConfig {
    pub guild_id: u64,
    pub bot_token: String,
    pub app_id: String,
    pub app_secret: String,
    pub callback_url: String,
    pub api_url: String,
    /// Set member nicknames to their main character's name
    pub sync_names: bool,
    /// Requests allowed per second across all workers
    pub rate_limit: u32,
}

#[derive(Clone)]
pub struct Teamspeak3Config {
    pub webquery_url: String,
    pub api_key: String,
    pub server_id: u64,
    /// Requests allowed per second across all workers
    pub rate_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let discord = match (env.optional("DISCORD_GUILD_ID"), env.optional("DISCORD_BOT_TOKEN")) {
            (Some(guild_id), Some(bot_token)) => Some(DiscordConfig {
                guild_id: parse("DISCORD_GUILD_ID", &guild_id)?,
                bot_token,
                app_id: env.required("DISCORD_APP_ID")?,
                app_secret: env.required("DISCORD_APP_SECRET")?,
                callback_url: env.required("DISCORD_CALLBACK_URL")?,
                api_url: env
                    .optional("DISCORD_API_URL")
                    .unwrap_or_else(|| DEFAULT_DISCORD_API_URL.to_string()),
                sync_names: env.parse_or("DISCORD_SYNC_NAMES", false)?,
                rate_limit: env.parse_or("DISCORD_RATE_LIMIT", DEFAULT_DISCORD_RATE_LIMIT)?,
            }),
            _ => None,
        };

        let teamspeak3 = match (
            env.optional("TEAMSPEAK3_WEBQUERY_URL"),
            env.optional("TEAMSPEAK3_API_KEY"),
        ) {
            (Some(webquery_url), Some(api_key)) => Some(Teamspeak3Config {
                webquery_url,
                api_key,
                server_id: env.parse_or("TEAMSPEAK3_SERVER_ID", DEFAULT_TEAMSPEAK3_SERVER_ID)?,
                rate_limit: env.parse_or("TEAMSPEAK3_RATE_LIMIT", DEFAULT_TEAMSPEAK3_RATE_LIMIT)?,
            }),
            _ => None,
        };

        let workers = env.parse_or("WORKERS", DEFAULT_WORKERS)?;
        if workers == 0 {
            return Err(ConfigError::InvalidEnvValue {
                var: "WORKERS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            valkey_url: env.required("VALKEY_URL")?,
            workers,
            resync_cron: env
                .optional("RESYNC_CRON")
                .unwrap_or_else(|| DEFAULT_RESYNC_CRON.to_string()),
            role_cache_ttl: Duration::from_secs(
                env.parse_or("ROLE_CACHE_TTL_SECS", DEFAULT_ROLE_CACHE_TTL_SECS)?,
            ),
            discord,
            teamspeak3,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, var: &str) -> Result<String, ConfigError> {
        self.optional(var)
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    }

    fn parse_or<T>(&self, var: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(var) {
            Some(value) => parse(var, &value),
            None => Ok(default),
        }
    }
}

fn parse<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: e.to_string(),
        })
}
