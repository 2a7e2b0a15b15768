use bifrost_sync::server::{
    model::{
        event::SyncEvent,
        service::{ServiceAccount, ServiceKind},
        worker::WorkerJob,
    },
    service::notify::SyncNotifier,
    worker::WorkerQueue,
};
use bifrost_test_utils::prelude::*;
use fred::prelude::{Config as RedisConfig, Pool};

use crate::util::{discord::registry, insert_member, Error};

/// Queue over a pool that is never connected, computing jobs does not touch Redis
fn offline_queue() -> Result<WorkerQueue, Error> {
    let pool = Pool::new(RedisConfig::default(), None, None, None, 1)?;

    Ok(WorkerQueue::new(pool))
}

fn reconcile(user_id: i32) -> WorkerJob {
    WorkerJob::ReconcileUser {
        user_id,
        service: ServiceKind::Discord,
    }
}

/// Expect a job for the user whose group membership changed, only for enabled services
#[tokio::test]
async fn test_group_membership_changed() -> Result<(), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let user = test.auth().insert_user("bruce", None).await?;
    test.account().insert_discord_user(user.id, 1).await?;
    // TeamSpeak is not enabled in the registry
    test.account()
        .insert_teamspeak3_user(user.id, "bruce", "key")
        .await?;

    let registry = registry(test.server_url());
    let queue = offline_queue()?;
    let jobs = SyncNotifier::new(&test.db, &registry, &queue)
        .affected_jobs(&SyncEvent::GroupMembershipChanged { user_id: user.id })
        .await?;

    assert_eq!(jobs, vec![reconcile(user.id)]);

    Ok(())
}

/// Expect no job for a user without linked accounts
#[tokio::test]
async fn test_unlinked_user_is_ignored() -> Result<(), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let user = test.auth().insert_user("bruce", None).await?;

    let registry = registry(test.server_url());
    let queue = offline_queue()?;
    let jobs = SyncNotifier::new(&test.db, &registry, &queue)
        .affected_jobs(&SyncEvent::MainCharacterChanged { user_id: user.id })
        .await?;

    assert!(jobs.is_empty());

    Ok(())
}

/// Expect a job for every linked member of the group whose permissions changed
#[tokio::test]
async fn test_group_permissions_changed() -> Result<(), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let alpha = test.auth().insert_group("Alpha").await?;
    let bravo = test.auth().insert_group("Bravo").await?;
    let bruce = insert_member(&mut test, "bruce", &[alpha.id]).await?;
    let dick = insert_member(&mut test, "dick", &[alpha.id]).await?;
    let alfred = insert_member(&mut test, "alfred", &[bravo.id]).await?;
    for (user_id, uid) in [(bruce.id, 1), (dick.id, 2), (alfred.id, 3)] {
        test.account().insert_discord_user(user_id, uid).await?;
    }

    let registry = registry(test.server_url());
    let queue = offline_queue()?;
    let jobs = SyncNotifier::new(&test.db, &registry, &queue)
        .affected_jobs(&SyncEvent::GroupPermissionsChanged { group_id: alpha.id })
        .await?;

    assert_eq!(jobs, vec![reconcile(bruce.id), reconcile(dick.id)]);

    Ok(())
}

/// Expect a job for the user whose main character changed
#[tokio::test]
async fn test_character_changed() -> Result<(), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let main = test
        .auth()
        .insert_character(2114794365, 98000001, None)
        .await?;
    let other = test.auth().insert_character(2117053828, 98000001, None).await?;
    let bruce = test.auth().insert_user("bruce", Some(main.id)).await?;
    let dick = test.auth().insert_user("dick", Some(other.id)).await?;
    test.account().insert_discord_user(bruce.id, 1).await?;
    test.account().insert_discord_user(dick.id, 2).await?;

    let registry = registry(test.server_url());
    let queue = offline_queue()?;
    let jobs = SyncNotifier::new(&test.db, &registry, &queue)
        .affected_jobs(&SyncEvent::CharacterChanged {
            character_id: 2114794365,
        })
        .await?;

    assert_eq!(jobs, vec![reconcile(bruce.id)]);

    Ok(())
}

/// Expect state changes to affect every linked account
#[tokio::test]
async fn test_state_changes_affect_everyone() -> Result<(), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let state = test.auth().insert_state("Member", 10, false).await?;
    let bruce = test.auth().insert_user("bruce", None).await?;
    let dick = test.auth().insert_user("dick", None).await?;
    test.auth().insert_user("alfred", None).await?;
    test.account().insert_discord_user(bruce.id, 1).await?;
    test.account().insert_discord_user(dick.id, 2).await?;

    let registry = registry(test.server_url());
    let queue = offline_queue()?;
    let notifier = SyncNotifier::new(&test.db, &registry, &queue);

    for event in [
        SyncEvent::StateMembershipChanged { state_id: state.id },
        SyncEvent::StatePermissionsChanged { state_id: state.id },
    ] {
        let mut jobs = notifier.affected_jobs(&event).await?;
        jobs.sort_by_key(|job| match job {
            WorkerJob::ReconcileUser { user_id, .. } => *user_id,
            WorkerJob::RemoveAccount { user_id, .. } => *user_id,
        });

        assert_eq!(jobs, vec![reconcile(bruce.id), reconcile(dick.id)]);
    }

    Ok(())
}

/// Expect a removal job per account of a deleted user, for enabled services only
#[tokio::test]
async fn test_user_deleted() -> Result<(), Error> {
    let test = TestBuilder::new().with_sync_tables().build().await?;

    let accounts = vec![
        ServiceAccount {
            user_id: 7,
            service: ServiceKind::Discord,
            uid: "555".to_string(),
            username: Some("bruce".to_string()),
            perm_key: None,
        },
        ServiceAccount {
            user_id: 7,
            service: ServiceKind::Teamspeak3,
            uid: "bruce".to_string(),
            username: None,
            perm_key: Some("key".to_string()),
        },
    ];

    let registry = registry(test.server_url());
    let queue = offline_queue()?;
    let jobs = SyncNotifier::new(&test.db, &registry, &queue)
        .affected_jobs(&SyncEvent::UserDeleted {
            user_id: 7,
            accounts,
        })
        .await?;

    assert_eq!(
        jobs,
        vec![WorkerJob::RemoveAccount {
            user_id: 7,
            service: ServiceKind::Discord,
            uid: "555".to_string(),
            perm_key: None,
        }]
    );

    Ok(())
}
