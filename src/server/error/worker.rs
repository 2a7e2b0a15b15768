//! Worker queue error types.
//!
//! This module defines errors related to worker job serialization and scheduling. Worker
//! errors typically indicate programming bugs or corruption in the Redis queue data rather
//! than problems with the remote services being synchronized.

use thiserror::Error;

/// Worker queue error type.
///
/// These errors occur during worker job serialization, deserialization, or scheduling.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Failed to serialize or deserialize a WorkerJob.
    ///
    /// This error occurs when converting a WorkerJob to/from JSON for Redis storage.
    /// It may indicate a schema mismatch or corruption in the Redis data, or an issue
    /// with the serde implementation.
    #[error("Failed to serialize/deserialize WorkerJob: {0}")]
    SerializationError(String),

    /// No adapter is registered for the service a job targets.
    ///
    /// Occurs when a job was queued by a process built with a service feature the
    /// current process lacks, or whose configuration no longer enables the service.
    #[error("No adapter registered for service: {0}")]
    ServiceUnavailable(String),
}
