//! Error types for the Bifrost sync service.
//!
//! This module provides a comprehensive error handling system with specialized error types
//! for different domains (configuration, remote service APIs, account lifecycle, worker queue).
//! All errors use `thiserror` for ergonomic error definitions with automatic `Display` and
//! `Error` trait implementations.

pub mod config;
pub mod lifecycle;
pub mod remote;
pub mod retry;
pub mod worker;

use thiserror::Error;

use crate::server::error::{
    config::ConfigError, lifecycle::LifecycleError, remote::RemoteError,
    retry::ErrorRetryStrategy, worker::WorkerError,
};

/// Main error type for the Bifrost sync service.
///
/// This enum aggregates all domain-specific error types and external library errors into a
/// single unified error type. It uses `thiserror`'s `#[from]` attribute to enable automatic
/// conversion from underlying error types via the `?` operator.
///
/// # Error Categories
/// - Configuration errors (missing/invalid environment variables)
/// - Remote service errors (Discord & TeamSpeak API failures, rate limiting)
/// - Account lifecycle errors (missing permission, duplicate activation)
/// - Worker queue errors (job serialization)
/// - External library errors (database, Redis, HTTP client, scheduler)
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Remote service error (API error responses, rate limiting, unexpected payloads).
    #[error(transparent)]
    RemoteError(#[from] RemoteError),
    /// Account lifecycle error (activation or deactivation refused).
    #[error(transparent)]
    LifecycleError(#[from] LifecycleError),
    /// Worker queue error (job serialization).
    #[error(transparent)]
    WorkerError(#[from] WorkerError),
    /// Parse error (failed to parse a value from string or other format).
    #[error("Failed to parse value: {0:?}")]
    ParseError(String),
    /// Internal error indicating a bug in Bifrost's code.
    ///
    /// This error should never occur in normal operation and indicates a programming error
    /// that needs to be reported as a GitHub issue.
    #[error("Internal error with Bifrost's code, please open a GitHub issue as this indicates a bug: {0:?}")]
    InternalError(String),
    /// Database error (query failures, connection issues, constraint violations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// Valkey/Redis error (connection, command or Lua script execution).
    #[error(transparent)]
    RedisError(#[from] fred::error::Error),
    /// HTTP client error (connection failures, timeouts, body decoding).
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    /// Cron scheduler error (job registration, scheduler startup).
    #[error(transparent)]
    SchedulerError(#[from] tokio_cron_scheduler::JobSchedulerError),
}

impl Error {
    /// Returns true when the error reports an exhausted rate-limit budget.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RemoteError(RemoteError::RateLimited { .. }))
    }

    /// Returns true when the same request may succeed later without any local change.
    ///
    /// Covers exhausted rate-limit budget, remote server errors, transport failures and
    /// database connection errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RemoteError(RemoteError::RateLimited { .. }) => true,
            Error::RemoteError(RemoteError::Api { status, .. }) => *status >= 500,
            Error::ReqwestError(_) | Error::RedisError(_) => true,
            Error::DbErr(_) => matches!(self.to_retry_strategy(), ErrorRetryStrategy::Retry),
            _ => false,
        }
    }
}
