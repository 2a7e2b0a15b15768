//! TeamSpeak 3 WebQuery payloads.
//!
//! WebQuery returns every value as a string, numeric IDs are parsed by the client.

use serde::Deserialize;

/// Envelope wrapping every WebQuery response.
#[derive(Debug, Clone, Deserialize)]
pub struct WebQueryResponse<T> {
    /// Result rows, absent on errors and for commands without output.
    #[serde(default = "Vec::new")]
    pub body: Vec<T>,
    /// Command status.
    pub status: WebQueryStatus,
}

/// Status of a WebQuery command.
#[derive(Debug, Clone, Deserialize)]
pub struct WebQueryStatus {
    /// 0 on success, TeamSpeak error ID otherwise.
    pub code: u64,
    /// Status message.
    pub message: String,
}

/// Row of `serverinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    /// Virtual server name.
    pub virtualserver_name: String,
}

/// Row of `servergrouplist`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerGroup {
    /// Server group ID.
    pub sgid: String,
    /// Server group name.
    pub name: String,
    /// Group type: 0 template, 1 regular, 2 query.
    #[serde(rename = "type")]
    pub group_type: String,
}

/// Row of `servergroupadd`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedServerGroup {
    /// ID of the created server group.
    pub sgid: String,
}

/// Row of `customsearch`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomSearchRow {
    /// Client database ID holding the custom property.
    pub cldbid: String,
}

/// Row of `servergroupsbyclientid`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientServerGroup {
    /// Server group ID.
    pub sgid: String,
}

/// Row of `privilegekeyadd`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrivilegeKey {
    /// Generated privilege key.
    pub token: String,
}
