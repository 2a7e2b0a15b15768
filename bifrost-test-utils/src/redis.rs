use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use fred::prelude::*;

use crate::TestError;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Redis connection for tests, with keys unique to the test instance
///
/// Requires a Valkey/Redis server on `127.0.0.1:6379`, tests using it are gated behind the
/// `redis-test` feature.
pub struct RedisTest {
    pub redis_pool: Pool,
    prefix: String,
}

impl RedisTest {
    pub async fn new() -> Result<Self, TestError> {
        let redis_config = Config::from_url("redis://127.0.0.1:6379")?;
        let redis_pool = Pool::new(redis_config, None, None, None, 5)?;
        redis_pool.init().await?;

        let prefix = format!(
            "test:{}:{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        );

        Ok(RedisTest { redis_pool, prefix })
    }

    /// Queue key unique to this test instance
    pub fn queue_name(&self) -> String {
        self.key("sync:queue")
    }

    /// Rate-limit key unique to this test instance
    pub fn rate_limit_key(&self) -> String {
        self.key("ratelimit")
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}:{}", self.prefix, name)
    }

    /// Deletes the keys handed out by this instance
    pub async fn cleanup(self) -> Result<(), TestError> {
        let keys = vec![self.queue_name(), self.rate_limit_key()];
        let _: i64 = self.redis_pool.del(keys).await?;

        Ok(())
    }
}
