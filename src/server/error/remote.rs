//! Remote service error types.
//!
//! Errors returned by the Discord REST API and the TeamSpeak 3 WebQuery interface. Error
//! responses carrying a well-known code (unknown member, duplicate entry, ...) are preserved
//! so callers can tell a stale link or a creation race apart from a genuine failure.

use std::time::Duration;

use thiserror::Error;

use crate::server::model::service::ServiceKind;

/// Discord JSON error code for an unknown guild member.
pub const DISCORD_UNKNOWN_MEMBER: u64 = 10007;
/// Discord JSON error code for an unknown user.
pub const DISCORD_UNKNOWN_USER: u64 = 10013;
/// Discord JSON error code for an unknown role.
pub const DISCORD_UNKNOWN_ROLE: u64 = 10011;

/// TeamSpeak error code for an invalid client/database ID.
pub const TEAMSPEAK_INVALID_CLIENT: u64 = 512;
/// TeamSpeak error code for an empty result set.
pub const TEAMSPEAK_EMPTY_RESULT: u64 = 1281;
/// TeamSpeak error code for a duplicate database entry.
pub const TEAMSPEAK_DUPLICATE_ENTRY: u64 = 1282;

/// Remote service error type.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The shared rate-limit budget for the service is exhausted.
    ///
    /// No request was sent, the caller should defer the work to a later run.
    #[error("Rate limit budget for {service} is exhausted")]
    RateLimited {
        /// Service whose budget is exhausted.
        service: ServiceKind,
        /// Time until the remote asked us to resume, when known.
        retry_after: Option<Duration>,
    },

    /// The remote API answered with an error response.
    ///
    /// # Fields
    /// - `service` - Service that answered
    /// - `status` - HTTP status code (TeamSpeak reports errors with HTTP 200 or 400)
    /// - `code` - Service specific error code, if the body carried one
    /// - `message` - Error message from the body
    #[error("{service} API error (status {status}, code {code:?}): {message}")]
    Api {
        /// Service that answered.
        service: ServiceKind,
        /// HTTP status code.
        status: u16,
        /// Service specific error code.
        code: Option<u64>,
        /// Error message.
        message: String,
    },

    /// The remote answered with a payload Bifrost could not interpret.
    #[error("Unexpected response from {service}: {reason}")]
    UnexpectedResponse {
        /// Service that answered.
        service: ServiceKind,
        /// What was wrong with the response.
        reason: String,
    },
}

impl RemoteError {
    /// Returns true when the error reports that the remote member or account is unknown.
    pub fn is_unknown_member(&self) -> bool {
        match self {
            RemoteError::Api {
                service: ServiceKind::Discord,
                status,
                code,
                ..
            } => {
                *status == 404
                    && matches!(code, None | Some(DISCORD_UNKNOWN_MEMBER) | Some(DISCORD_UNKNOWN_USER))
            }
            RemoteError::Api {
                service: ServiceKind::Teamspeak3,
                code: Some(code),
                ..
            } => *code == TEAMSPEAK_INVALID_CLIENT,
            _ => false,
        }
    }

    /// Returns true when the error reports that the entity being created already exists.
    pub fn is_conflict(&self) -> bool {
        match self {
            RemoteError::Api {
                service: ServiceKind::Discord,
                status,
                ..
            } => *status == 409,
            RemoteError::Api {
                service: ServiceKind::Teamspeak3,
                code: Some(code),
                ..
            } => *code == TEAMSPEAK_DUPLICATE_ENTRY,
            _ => false,
        }
    }
}
