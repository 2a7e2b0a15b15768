use std::sync::Arc;

use bifrost_sync::server::{
    client::discord::DiscordClient,
    config::DiscordConfig,
    service::{
        discord::DiscordAdapter,
        rate_limit::{LocalRateLimitGate, SharedRateLimitGate},
        registry::ServiceRegistry,
        role_mapper::RoleMapper,
    },
};
use serde_json::{json, Value};

pub const GUILD_ID: u64 = 1000;
pub const ROLES_PATH: &str = "/guilds/1000/roles";

pub fn config(api_url: String) -> DiscordConfig {
    DiscordConfig {
        guild_id: GUILD_ID,
        bot_token: "bot-token".to_string(),
        app_id: "app".to_string(),
        app_secret: "secret".to_string(),
        callback_url: "http://localhost:8080/discord/callback".to_string(),
        api_url,
        sync_names: false,
        rate_limit: 1000,
    }
}

pub fn adapter(api_url: String, gate: SharedRateLimitGate, sync_names: bool) -> DiscordAdapter {
    let config = config(api_url);
    let client = DiscordClient::new(reqwest::Client::new(), &config, gate);

    DiscordAdapter::new(client, RoleMapper::default(), sync_names)
}

/// Registry holding only a Discord adapter with a budget no test exhausts
pub fn registry(api_url: String) -> ServiceRegistry {
    registry_with_gate(api_url, Arc::new(LocalRateLimitGate::per_second(1000)))
}

pub fn registry_with_gate(api_url: String, gate: SharedRateLimitGate) -> ServiceRegistry {
    ServiceRegistry::new().with_adapter(Arc::new(adapter(api_url, gate, false)))
}

pub fn member_path(uid: u64) -> String {
    format!("/guilds/1000/members/{}", uid)
}

/// Role list including the guild's @everyone role
pub fn roles_body(roles: &[(&str, &str)]) -> String {
    let mut body = vec![json!({ "id": GUILD_ID.to_string(), "name": "@everyone", "managed": false })];
    body.extend(
        roles
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name, "managed": false })),
    );

    Value::Array(body).to_string()
}

pub fn member_body(roles: &[&str], nick: Option<&str>) -> String {
    json!({ "roles": roles, "nick": nick }).to_string()
}

pub fn unknown_member_body() -> String {
    json!({ "code": 10007, "message": "Unknown Member" }).to_string()
}
