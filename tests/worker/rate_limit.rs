use std::time::Duration;

use bifrost_sync::server::service::rate_limit::{RateLimitGate, RedisRateLimitGate};
use bifrost_test_utils::RedisTest;

use crate::util::Error;

/// Expect the shared budget to be exhausted within a window and refilled in the next one
#[tokio::test]
async fn test_shared_budget() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let gate = RedisRateLimitGate::with_key(
        redis.redis_pool.clone(),
        redis.rate_limit_key(),
        2,
        Duration::from_millis(300),
    );
    // A second gate over the same key, as held by another worker process
    let other = RedisRateLimitGate::with_key(
        redis.redis_pool.clone(),
        redis.rate_limit_key(),
        2,
        Duration::from_millis(300),
    );

    assert!(gate.try_acquire().await?);
    assert!(other.try_acquire().await?);
    assert!(!gate.try_acquire().await?);

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(other.try_acquire().await?);

    redis.cleanup().await?;
    Ok(())
}

/// Expect a paused gate to reject calls until the pause has elapsed
#[tokio::test]
async fn test_pause() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let gate = RedisRateLimitGate::with_key(
        redis.redis_pool.clone(),
        redis.rate_limit_key(),
        10,
        Duration::from_millis(1000),
    );

    gate.pause(Duration::from_millis(200)).await?;
    assert!(!gate.try_acquire().await?);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(gate.try_acquire().await?);

    redis.cleanup().await?;
    Ok(())
}

/// Expect a zero budget to reject every call
#[tokio::test]
async fn test_zero_budget() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let gate = RedisRateLimitGate::with_key(
        redis.redis_pool.clone(),
        redis.rate_limit_key(),
        0,
        Duration::from_millis(1000),
    );

    assert!(!gate.try_acquire().await?);

    redis.cleanup().await?;
    Ok(())
}
