use std::sync::Arc;

use bifrost_sync::server::{
    client::teamspeak3::Teamspeak3Client,
    config::Teamspeak3Config,
    service::{
        rate_limit::{LocalRateLimitGate, SharedRateLimitGate},
        registry::ServiceRegistry,
        role_mapper::RoleMapper,
        teamspeak3::Teamspeak3Adapter,
    },
};
use serde_json::{json, Value};

pub fn config(webquery_url: String) -> Teamspeak3Config {
    Teamspeak3Config {
        webquery_url,
        api_key: "api-key".to_string(),
        server_id: 1,
        rate_limit: 1000,
    }
}

/// Registry holding only a TeamSpeak adapter with a budget no test exhausts
pub fn registry(webquery_url: String) -> ServiceRegistry {
    registry_with_gate(webquery_url, Arc::new(LocalRateLimitGate::per_second(1000)))
}

pub fn registry_with_gate(webquery_url: String, gate: SharedRateLimitGate) -> ServiceRegistry {
    let config = config(webquery_url);
    let client = Teamspeak3Client::new(reqwest::Client::new(), &config, gate);

    ServiceRegistry::new().with_adapter(Arc::new(Teamspeak3Adapter::new(
        client,
        RoleMapper::default(),
    )))
}

pub fn command_path(command: &str) -> String {
    format!("/1/{}", command)
}

/// Successful WebQuery response carrying the provided rows
pub fn ok(rows: Value) -> String {
    json!({ "body": rows, "status": { "code": 0, "message": "ok" } }).to_string()
}

/// WebQuery response for a command without result rows
pub fn empty() -> String {
    json!({ "status": { "code": 1281, "message": "database empty result set" } }).to_string()
}

pub fn server_groups(groups: &[(&str, &str)]) -> String {
    ok(Value::Array(
        groups
            .iter()
            .map(|(sgid, name)| json!({ "sgid": sgid, "name": name, "type": "1" }))
            .collect(),
    ))
}
