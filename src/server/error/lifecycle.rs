//! Account lifecycle error types.
//!
//! Returned by activation and deactivation so the web layer can tell the user why their
//! request was refused.

use thiserror::Error;

use crate::server::model::service::ServiceKind;

/// Account lifecycle error type.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The user does not exist.
    #[error("User ID {0} not found")]
    UserNotFound(i32),

    /// The user lacks the permission required to hold an account on the service.
    #[error("User ID {user_id} lacks the {permission} permission required for {service}")]
    MissingPermission {
        /// Local user ID.
        user_id: i32,
        /// Service the user tried to activate.
        service: ServiceKind,
        /// Required permission codename.
        permission: &'static str,
    },

    /// The user already has a linked account on the service.
    #[error("User ID {user_id} already has a {service} account")]
    AlreadyLinked {
        /// Local user ID.
        user_id: i32,
        /// Service already linked.
        service: ServiceKind,
    },

    /// The user has no linked account on the service.
    #[error("User ID {user_id} has no {service} account")]
    NotLinked {
        /// Local user ID.
        user_id: i32,
        /// Service without a link.
        service: ServiceKind,
    },

    /// The activation request does not match the service it was sent to.
    #[error("Activation request for {got} sent to {expected}")]
    WrongActivationRequest {
        /// Service handling the request.
        expected: ServiceKind,
        /// Service the request was built for.
        got: ServiceKind,
    },

    /// The user holds no role a TeamSpeak privilege key could grant.
    #[error("User ID {user_id} holds no {service} role to grant")]
    NoRoleToGrant {
        /// Local user ID.
        user_id: i32,
        /// Service the user tried to activate.
        service: ServiceKind,
    },

    /// The Discord OAuth2 code exchange failed.
    #[error("Failed to exchange Discord authorization code: {0}")]
    OAuthExchange(String),
}
