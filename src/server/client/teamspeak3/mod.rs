//! TeamSpeak 3 WebQuery client.
//!
//! Commands are sent as `POST {base}/{server_id}/{command}` with a JSON object holding the
//! command parameters and authenticated with the `x-api-key` header.

pub mod model;

use std::collections::BTreeSet;

use dioxus_logger::tracing;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::server::{
    client::teamspeak3::model::{
        ClientServerGroup, CreatedServerGroup, CustomSearchRow, PrivilegeKey, ServerGroup,
        ServerInfo, WebQueryResponse,
    },
    config::Teamspeak3Config,
    error::{
        remote::{RemoteError, TEAMSPEAK_EMPTY_RESULT},
        Error,
    },
    model::service::{RoleId, ServiceKind},
    service::rate_limit::SharedRateLimitGate,
};

/// Custom client property linking a TeamSpeak identity to its Bifrost account.
pub const SSO_IDENT: &str = "sso_uid";

/// Server group type for regular groups.
const REGULAR_GROUP_TYPE: &str = "1";

/// Client for a single TeamSpeak 3 virtual server.
#[derive(Clone)]
pub struct Teamspeak3Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    server_id: u64,
    gate: SharedRateLimitGate,
}

impl Teamspeak3Client {
    /// Creates a new TeamSpeak client.
    ///
    /// # Arguments
    /// - `http` - Shared HTTP client
    /// - `config` - WebQuery URL, API key & virtual server ID
    /// - `gate` - Rate-limit gate every command acquires budget from
    pub fn new(http: reqwest::Client, config: &Teamspeak3Config, gate: SharedRateLimitGate) -> Self {
        Self {
            http,
            base_url: config.webquery_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            server_id: config.server_id,
            gate,
        }
    }

    /// Virtual server this client operates on.
    pub fn server_id(&self) -> u64 {
        self.server_id
    }

    /// Fetches the virtual server's name.
    pub async fn server_name(&self) -> Result<String, Error> {
        let rows: Vec<ServerInfo> = self.command("serverinfo", json!({})).await?;

        rows.into_iter()
            .next()
            .map(|info| info.virtualserver_name)
            .ok_or_else(|| unexpected("serverinfo returned no rows"))
    }

    /// Lists regular server groups as `(sgid, name)` pairs, template & query groups are skipped.
    pub async fn list_server_groups(&self) -> Result<Vec<(RoleId, String)>, Error> {
        let rows: Vec<ServerGroup> = self.command("servergrouplist", json!({})).await?;

        rows.into_iter()
            .filter(|group| group.group_type == REGULAR_GROUP_TYPE)
            .map(|group| Ok((parse_id(&group.sgid)?, group.name)))
            .collect()
    }

    /// Creates a regular server group and returns its ID.
    pub async fn add_server_group(&self, name: &str) -> Result<RoleId, Error> {
        let rows: Vec<CreatedServerGroup> = self
            .command("servergroupadd", json!({ "name": name, "type": 1 }))
            .await?;

        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| unexpected("servergroupadd returned no sgid"))?;

        parse_id(&created.sgid)
    }

    /// Looks up the client database ID of the identity carrying the provided Bifrost UID.
    ///
    /// # Returns
    /// - `Ok(Some(u64))` - Client database ID
    /// - `Ok(None)` - No identity has redeemed the privilege key yet
    pub async fn find_client_dbid(&self, uid: &str) -> Result<Option<u64>, Error> {
        let rows: Vec<CustomSearchRow> = self
            .command(
                "customsearch",
                json!({ "ident": SSO_IDENT, "pattern": uid }),
            )
            .await?;

        rows.into_iter()
            .next()
            .map(|row| parse_id(&row.cldbid))
            .transpose()
    }

    /// Lists the server groups a client belongs to.
    pub async fn client_server_groups(&self, cldbid: u64) -> Result<BTreeSet<RoleId>, Error> {
        let rows: Vec<ClientServerGroup> = self
            .command("servergroupsbyclientid", json!({ "cldbid": cldbid }))
            .await?;

        rows.iter().map(|row| parse_id(&row.sgid)).collect()
    }

    /// Adds a client to a server group.
    pub async fn add_client_to_group(&self, sgid: RoleId, cldbid: u64) -> Result<(), Error> {
        let _: Vec<Value> = self
            .command(
                "servergroupaddclient",
                json!({ "sgid": sgid, "cldbid": cldbid }),
            )
            .await?;

        Ok(())
    }

    /// Removes a client from a server group.
    pub async fn remove_client_from_group(&self, sgid: RoleId, cldbid: u64) -> Result<(), Error> {
        let _: Vec<Value> = self
            .command(
                "servergroupdelclient",
                json!({ "sgid": sgid, "cldbid": cldbid }),
            )
            .await?;

        Ok(())
    }

    /// Creates a privilege key granting a server group and binding the redeeming identity to
    /// the provided Bifrost UID.
    pub async fn add_privilege_key(
        &self,
        sgid: RoleId,
        uid: &str,
        description: &str,
    ) -> Result<String, Error> {
        let rows: Vec<PrivilegeKey> = self
            .command(
                "privilegekeyadd",
                json!({
                    "tokentype": 0,
                    "tokenid1": sgid,
                    "tokenid2": 0,
                    "tokendescription": description,
                    "tokencustomset": format!("ident={} value={}", SSO_IDENT, uid),
                }),
            )
            .await?;

        rows.into_iter()
            .next()
            .map(|key| key.token)
            .ok_or_else(|| unexpected("privilegekeyadd returned no token"))
    }

    /// Deletes an unredeemed privilege key so it can no longer be used to join.
    pub async fn delete_privilege_key(&self, token: &str) -> Result<(), Error> {
        let _: Vec<Value> = self
            .command("privilegekeydelete", json!({ "token": token }))
            .await?;

        Ok(())
    }

    /// Deletes a client from the server database.
    pub async fn delete_client(&self, cldbid: u64) -> Result<(), Error> {
        let _: Vec<Value> = self
            .command("clientdbdelete", json!({ "cldbid": cldbid }))
            .await?;

        Ok(())
    }

    /// Sends a WebQuery command once budget has been acquired from the rate-limit gate.
    ///
    /// An empty result set is returned as an empty list rather than an error.
    async fn command<T: DeserializeOwned>(
        &self,
        command: &str,
        params: Value,
    ) -> Result<Vec<T>, Error> {
        if !self.gate.try_acquire().await? {
            return Err(RemoteError::RateLimited {
                service: ServiceKind::Teamspeak3,
                retry_after: None,
            }
            .into());
        }

        tracing::debug!("TeamSpeak command {} {}", command, params);

        let response = self
            .http
            .post(format!("{}/{}/{}", self.base_url, self.server_id, command))
            .header("x-api-key", &self.api_key)
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited {
                service: ServiceKind::Teamspeak3,
                retry_after: None,
            }
            .into());
        }

        let body: WebQueryResponse<T> = response.json().await.map_err(|e| {
            Error::from(RemoteError::UnexpectedResponse {
                service: ServiceKind::Teamspeak3,
                reason: format!("{} (HTTP {}): {}", command, status.as_u16(), e),
            })
        })?;

        match body.status.code {
            0 => Ok(body.body),
            TEAMSPEAK_EMPTY_RESULT => Ok(Vec::new()),
            code => Err(RemoteError::Api {
                service: ServiceKind::Teamspeak3,
                status: status.as_u16(),
                code: Some(code),
                message: body.status.message,
            }
            .into()),
        }
    }
}

fn parse_id(value: &str) -> Result<u64, Error> {
    value
        .parse()
        .map_err(|_| unexpected(&format!("invalid ID {:?}", value)))
}

fn unexpected(reason: &str) -> Error {
    RemoteError::UnexpectedResponse {
        service: ServiceKind::Teamspeak3,
        reason: reason.to_string(),
    }
    .into()
}
