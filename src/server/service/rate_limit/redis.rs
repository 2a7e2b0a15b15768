use std::time::Duration;

use async_trait::async_trait;
use fred::{prelude::*, types::Expiration};

use super::{lua::ACQUIRE_BUDGET_SCRIPT, RateLimitGate, DEFAULT_WINDOW};
use crate::server::{error::Error, model::service::ServiceKind};

const KEY_PREFIX: &str = "bifrost:ratelimit";

/// Rate-limit gate shared by every worker process through Valkey/Redis.
#[derive(Clone)]
pub struct RedisRateLimitGate {
    pool: Pool,
    key: String,
    limit: u32,
    window: Duration,
}

impl RedisRateLimitGate {
    /// Creates a gate allowing `limit` calls per second for the provided service.
    ///
    /// # Arguments
    /// - `pool` - Redis connection pool
    /// - `service` - Service the budget applies to, used to namespace the key
    /// - `limit` - Calls allowed per second
    pub fn new(pool: Pool, service: ServiceKind, limit: u32) -> Self {
        Self::with_key(
            pool,
            format!("{}:{}", KEY_PREFIX, service.as_str()),
            limit,
            DEFAULT_WINDOW,
        )
    }

    /// Creates a gate with a custom key and window (useful for testing)
    pub fn with_key(pool: Pool, key: String, limit: u32, window: Duration) -> Self {
        Self {
            pool,
            key,
            limit,
            window,
        }
    }
}

#[async_trait]
impl RateLimitGate for RedisRateLimitGate {
    async fn try_acquire(&self) -> Result<bool, Error> {
        let window_ms = (self.window.as_millis() as u64).max(1);

        let result: i64 = self
            .pool
            .eval(
                ACQUIRE_BUDGET_SCRIPT,
                vec![&self.key],
                vec![self.limit.to_string(), window_ms.to_string()],
            )
            .await?;

        Ok(result == 1)
    }

    async fn pause(&self, duration: Duration) -> Result<(), Error> {
        let pause_ms = (duration.as_millis() as i64).max(1);

        let _: () = self
            .pool
            .set(&self.key, 0, Some(Expiration::PX(pause_ms)), None, false)
            .await?;

        Ok(())
    }
}
