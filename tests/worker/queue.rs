use std::time::Duration;

use bifrost_sync::server::{
    model::{event::SyncEvent, service::ServiceKind, worker::WorkerJob},
    scheduler::enqueue_resync,
    service::notify::SyncNotifier,
    worker::{queue::config::WorkerQueueConfig, WorkerQueue},
};
use bifrost_test_utils::{prelude::*, RedisTest};
use chrono::Utc;

use crate::util::{discord::registry, insert_member, Error};

fn queue(redis: &RedisTest, job_ttl: Duration) -> WorkerQueue {
    WorkerQueue::with_config(
        redis.redis_pool.clone(),
        WorkerQueueConfig {
            queue_name: redis.queue_name(),
            job_ttl,
            cleanup_interval: Duration::from_millis(50),
        },
    )
}

fn reconcile(user_id: i32) -> WorkerJob {
    WorkerJob::ReconcileUser {
        user_id,
        service: ServiceKind::Discord,
    }
}

/// Expect a job already waiting in the queue not to be added twice
#[tokio::test]
async fn test_push_deduplicates() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(3600));

    assert!(queue.push(reconcile(1)).await?);
    assert!(!queue.push(reconcile(1)).await?);
    assert!(queue.push(reconcile(2)).await?);
    assert_eq!(queue.len().await?, 2);

    redis.cleanup().await?;
    Ok(())
}

/// Expect jobs to be popped earliest first, and popped jobs to be queueable again
#[tokio::test]
async fn test_pop_earliest_first() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(3600));
    let now = Utc::now();

    queue
        .schedule(reconcile(2), now - chrono::Duration::seconds(1))
        .await?;
    queue
        .schedule(reconcile(1), now - chrono::Duration::seconds(5))
        .await?;

    assert_eq!(queue.pop().await?, Some(reconcile(1)));
    assert_eq!(queue.pop().await?, Some(reconcile(2)));
    assert_eq!(queue.pop().await?, None);
    assert!(queue.is_empty().await?);

    assert!(queue.push(reconcile(1)).await?);

    redis.cleanup().await?;
    Ok(())
}

/// Expect a job scheduled in the future to stay queued
#[tokio::test]
async fn test_future_job_not_due() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(3600));

    queue
        .schedule(reconcile(1), Utc::now() + chrono::Duration::minutes(5))
        .await?;

    assert_eq!(queue.pop().await?, None);
    assert_eq!(queue.len().await?, 1);

    redis.cleanup().await?;
    Ok(())
}

/// Expect only jobs older than the TTL to be removed
#[tokio::test]
async fn test_cleanup_stale_jobs() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(60));
    let now = Utc::now();

    queue
        .schedule(reconcile(1), now - chrono::Duration::minutes(10))
        .await?;
    queue
        .schedule(reconcile(2), now - chrono::Duration::minutes(5))
        .await?;
    queue.push(reconcile(3)).await?;

    assert_eq!(queue.cleanup_stale_jobs().await?, 2);
    assert_eq!(queue.pop().await?, Some(reconcile(3)));

    redis.cleanup().await?;
    Ok(())
}

/// Expect the periodic cleanup to remove stale jobs until stopped
#[tokio::test]
async fn test_periodic_cleanup() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(60));

    queue.start_cleanup().await;
    assert!(queue.is_cleanup_running().await);

    queue
        .schedule(reconcile(1), Utc::now() - chrono::Duration::minutes(10))
        .await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(queue.is_empty().await?);

    queue.stop_cleanup().await;
    assert!(!queue.is_cleanup_running().await);

    redis.cleanup().await?;
    Ok(())
}

/// Expect the resync to queue every linked account once
#[tokio::test]
async fn test_enqueue_resync() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(3600));

    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let bruce = test.auth().insert_user("bruce", None).await?;
    let dick = test.auth().insert_user("dick", None).await?;
    test.auth().insert_user("alfred", None).await?;
    test.account().insert_discord_user(bruce.id, 1).await?;
    test.account().insert_discord_user(dick.id, 2).await?;

    let registry = registry(test.server_url());

    assert_eq!(enqueue_resync(&test.db, &registry, &queue).await?, 2);
    // Jobs still waiting are not queued again
    assert_eq!(enqueue_resync(&test.db, &registry, &queue).await?, 0);
    assert_eq!(queue.len().await?, 2);

    redis.cleanup().await?;
    Ok(())
}

/// Expect notifications for users with pending jobs not to add duplicates
#[tokio::test]
async fn test_notify_deduplicates() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = queue(&redis, Duration::from_secs(3600));

    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let alpha = test.auth().insert_group("Alpha").await?;
    let bruce = insert_member(&mut test, "bruce", &[alpha.id]).await?;
    let dick = insert_member(&mut test, "dick", &[alpha.id]).await?;
    test.account().insert_discord_user(bruce.id, 1).await?;
    test.account().insert_discord_user(dick.id, 2).await?;

    let registry = registry(test.server_url());
    let notifier = SyncNotifier::new(&test.db, &registry, &queue);

    assert_eq!(
        notifier
            .notify(SyncEvent::GroupMembershipChanged { user_id: bruce.id })
            .await?,
        1
    );
    assert_eq!(
        notifier
            .notify(SyncEvent::GroupPermissionsChanged { group_id: alpha.id })
            .await?,
        1
    );
    assert_eq!(queue.len().await?, 2);

    redis.cleanup().await?;
    Ok(())
}
