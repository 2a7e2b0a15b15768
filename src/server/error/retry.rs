use sea_orm::DbErr;

use super::Error;

/// Strategy for handling errors in a retry context
pub enum ErrorRetryStrategy {
    /// Retry with exponential backoff (connection errors)
    Retry,
    /// Failed permanently (bad request, remote rejection)
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::DbErr(db_err) => {
                match db_err {
                    // Connection acquisition errors - transient, should retry
                    DbErr::ConnectionAcquire(_) => ErrorRetryStrategy::Retry,
                    // Connection errors - transient, should retry
                    DbErr::Conn(_) => ErrorRetryStrategy::Retry,

                    // All other database errors are permanent failures:
                    // - Query errors (constraint violations, syntax errors, etc.)
                    // - Type conversion errors
                    // - Record not found/inserted/updated
                    _ => ErrorRetryStrategy::Fail,
                }
            }

            // Remote errors - never retried in-process, the periodic resync picks them up.
            Self::RemoteError(_) => ErrorRetryStrategy::Fail,
            Self::ReqwestError(_) => ErrorRetryStrategy::Fail,

            // Redis errors - Lua script or connection failures, resync picks them up
            Self::RedisError(_) => ErrorRetryStrategy::Fail,

            // Configuration errors - permanent failures, won't resolve with retry
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,

            // Lifecycle errors - permanent failures (refused requests)
            Self::LifecycleError(_) => ErrorRetryStrategy::Fail,

            // Parse errors - permanent failures (bad data format)
            Self::ParseError(_) => ErrorRetryStrategy::Fail,

            // InternalError - permanent failures (internal error within Bifrost's code)
            Self::InternalError(_) => ErrorRetryStrategy::Fail,

            // Worker errors - permanent failures (serialization errors)
            Self::WorkerError(_) => ErrorRetryStrategy::Fail,

            // Job scheduler errors - permanent failures (configuration issue)
            Self::SchedulerError(_) => ErrorRetryStrategy::Fail,
        }
    }
}
