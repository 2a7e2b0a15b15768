use std::{sync::Arc, time::Duration};

use bifrost_sync::server::{
    data::account::AccountRepository,
    model::{service::ServiceKind, worker::WorkerJob},
    service::rate_limit::LocalRateLimitGate,
    worker::{
        handler::WorkerJobHandler,
        pool::{WorkerPool, WorkerPoolConfig},
        queue::config::WorkerQueueConfig,
        WorkerQueue,
    },
};
use bifrost_test_utils::{prelude::*, RedisTest};
use mockito::Matcher;
use serde_json::json;

use crate::util::{
    discord::{member_body, member_path, registry, registry_with_gate, roles_body, ROLES_PATH},
    insert_member, Error,
};

/// Expect queued jobs to be executed by the pool until it is stopped
#[tokio::test]
async fn test_pool_executes_queued_jobs() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = WorkerQueue::with_config(
        redis.redis_pool.clone(),
        WorkerQueueConfig {
            queue_name: redis.queue_name(),
            ..Default::default()
        },
    );

    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let alpha = test.auth().insert_group("Alpha").await?;
    test.auth()
        .add_group_permission(alpha.id, "discord.access_discord")
        .await?;
    let bruce = insert_member(&mut test, "bruce", &[alpha.id]).await?;
    let alfred = test.auth().insert_user("alfred", None).await?;
    test.account().insert_discord_user(bruce.id, 1).await?;
    test.account().insert_discord_user(alfred.id, 2).await?;
    let url = test.server_url();

    test.server()
        .mock("GET", ROLES_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(roles_body(&[("10", "Alpha")]))
        .create();
    test.server()
        .mock("GET", member_path(1).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(member_body(&[], None))
        .create();
    let patch_mock = test
        .server()
        .mock("PATCH", member_path(1).as_str())
        .match_body(Matcher::Json(json!({ "roles": ["10"] })))
        .with_status(204)
        .expect(1)
        .create();
    let kick_mock = test
        .server()
        .mock("DELETE", member_path(2).as_str())
        .with_status(204)
        .expect(1)
        .create();

    queue
        .push(WorkerJob::ReconcileUser {
            user_id: bruce.id,
            service: ServiceKind::Discord,
        })
        .await?;
    queue
        .push(WorkerJob::ReconcileUser {
            user_id: alfred.id,
            service: ServiceKind::Discord,
        })
        .await?;

    let handler = WorkerJobHandler::new(test.db.clone(), registry(url));
    let pool = WorkerPool::new(WorkerPoolConfig::new(2), queue.clone(), handler);

    pool.start().await?;
    assert!(pool.is_running().await);

    for _ in 0..50 {
        if patch_mock.matched_async().await && kick_mock.matched_async().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    pool.stop().await?;
    assert!(!pool.is_running().await);

    patch_mock.assert_async().await;
    kick_mock.assert_async().await;
    assert!(queue.is_empty().await?);
    // The kicked user lacked the access permission and was unlinked
    assert!(AccountRepository::new(&test.db)
        .find(alfred.id, ServiceKind::Discord)
        .await?
        .is_none());

    redis.cleanup().await?;
    Ok(())
}

/// Expect start & stop to be idempotent
#[tokio::test]
async fn test_start_stop_idempotent() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = WorkerQueue::with_config(
        redis.redis_pool.clone(),
        WorkerQueueConfig {
            queue_name: redis.queue_name(),
            ..Default::default()
        },
    );

    let test = TestBuilder::new().with_sync_tables().build().await?;
    let handler = WorkerJobHandler::new(test.db.clone(), registry(test.server_url()));
    let pool = WorkerPool::new(WorkerPoolConfig::new(4), queue, handler);

    pool.start().await?;
    pool.start().await?;
    assert_eq!(pool.dispatcher_count().await, 1);
    assert_eq!(pool.active_job_count(), 0);

    pool.stop().await?;
    pool.stop().await?;
    assert_eq!(pool.dispatcher_count().await, 0);

    redis.cleanup().await?;
    Ok(())
}

/// Expect a removal for a deleted user to stay queued for later when the budget is exhausted
#[tokio::test]
async fn test_rate_limited_removal_is_rescheduled() -> Result<(), Error> {
    let redis = RedisTest::new().await?;
    let queue = WorkerQueue::with_config(
        redis.redis_pool.clone(),
        WorkerQueueConfig {
            queue_name: redis.queue_name(),
            ..Default::default()
        },
    );

    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let url = test.server_url();
    let kick_mock = test
        .server()
        .mock("DELETE", member_path(555).as_str())
        .expect(0)
        .create();

    let job = WorkerJob::RemoveAccount {
        user_id: 7,
        service: ServiceKind::Discord,
        uid: "555".to_string(),
        perm_key: None,
    };
    queue.push(job.clone()).await?;

    let registry = registry_with_gate(url, Arc::new(LocalRateLimitGate::per_second(0)));
    let handler = WorkerJobHandler::new(test.db.clone(), registry);
    let pool = WorkerPool::new(WorkerPoolConfig::new(1), queue.clone(), handler);

    pool.start().await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    pool.stop().await?;

    // Still queued, but not due before the retry delay has passed
    assert_eq!(queue.len().await?, 1);
    assert_eq!(queue.pop().await?, None);
    assert!(!queue.push(job).await?);
    kick_mock.assert_async().await;

    redis.cleanup().await?;
    Ok(())
}
