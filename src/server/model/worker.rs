//! Worker job definitions for background task processing.
//!
//! This module defines the `WorkerJob` enum representing all types of background jobs that
//! can be dispatched to the worker queue. Jobs are serialized to JSON for Redis storage and
//! deserialized by worker handlers for processing. Each job variant contains the minimal
//! data needed to perform the task, the desired remote state is always recomputed from the
//! database when the job runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::server::{
    error::{worker::WorkerError, Error},
    model::service::ServiceKind,
};

/// Background job types for remote membership synchronization.
///
/// # Job Types
/// - `ReconcileUser` - Bring a user's roles on one service in line with local state
/// - `RemoveAccount` - Remove a remote account whose local link no longer exists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkerJob {
    /// Reconcile a user's remote roles and account on a single service.
    ///
    /// # Fields
    /// - `user_id` - Local user ID
    /// - `service` - Remote service to reconcile
    ReconcileUser {
        /// Local user ID.
        user_id: i32,
        /// Remote service to reconcile.
        service: ServiceKind,
    },

    /// Remove a remote account outright.
    ///
    /// Used when the local user has been deleted, so there is no link left to reconcile.
    ///
    /// # Fields
    /// - `user_id` - Local user ID the account belonged to (for logging)
    /// - `service` - Remote service holding the account
    /// - `uid` - Remote account identifier
    /// - `perm_key` - Unredeemed TeamSpeak privilege key to revoke, if any
    RemoveAccount {
        /// Local user ID the account belonged to.
        user_id: i32,
        /// Remote service holding the account.
        service: ServiceKind,
        /// Remote account identifier.
        uid: String,
        /// TeamSpeak privilege key issued on activation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        perm_key: Option<String>,
    },
}

impl WorkerJob {
    /// Serializes the job into the identity string stored in the queue.
    ///
    /// The identity holds all job data, two jobs with equal data share an identity and are
    /// therefore deduplicated by the queue.
    ///
    /// # Returns
    /// - `Ok(String)` - JSON identity of the job
    /// - `Err(Error::WorkerError)` - Serialization failed
    pub fn identity(&self) -> Result<String, Error> {
        serde_json::to_string(self)
            .map_err(|e| WorkerError::SerializationError(e.to_string()).into())
    }

    /// Parses a job back from its queue identity string.
    ///
    /// # Arguments
    /// - `identity` - Identity previously produced by [`WorkerJob::identity`]
    ///
    /// # Returns
    /// - `Ok(WorkerJob)` - Parsed job
    /// - `Err(Error::WorkerError)` - The identity is not a valid job
    pub fn from_identity(identity: &str) -> Result<Self, Error> {
        serde_json::from_str(identity)
            .map_err(|e| WorkerError::SerializationError(e.to_string()).into())
    }

    /// Service the job operates on.
    pub fn service(&self) -> ServiceKind {
        match self {
            WorkerJob::ReconcileUser { service, .. } => *service,
            WorkerJob::RemoveAccount { service, .. } => *service,
        }
    }
}

impl fmt::Display for WorkerJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerJob::ReconcileUser { user_id, service } => {
                write!(f, "ReconcileUser {{ user_id: {}, service: {} }}", user_id, service.as_str())
            }
            WorkerJob::RemoveAccount {
                user_id,
                service,
                uid,
                ..
            } => write!(
                f,
                "RemoveAccount {{ user_id: {}, service: {}, uid: {} }}",
                user_id,
                service.as_str(),
                uid
            ),
        }
    }
}
