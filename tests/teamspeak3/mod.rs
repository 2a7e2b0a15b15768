use std::sync::Arc;

use bifrost_sync::server::{
    data::account::AccountRepository,
    model::service::{ActivationRequest, ReconcileOutcome, ServiceKind, UnlinkReason},
    service::{
        lifecycle::LifecycleService, rate_limit::LocalRateLimitGate, reconcile::ReconcileService,
    },
    worker::handler::WorkerJobHandler,
};
use bifrost_test_utils::prelude::*;
use mockito::{Matcher, Mock};
use serde_json::json;

use crate::util::{
    insert_member,
    teamspeak3::{command_path, empty, ok, registry, registry_with_gate, server_groups},
    Error,
};

const ACCESS: &str = "teamspeak3.access_teamspeak3";

fn command_mock(test: &mut TestContext, command: &str, body: String) -> Mock {
    test.server()
        .mock("POST", command_path(command).as_str())
        .match_header("x-api-key", "api-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

/// Linked member of Alpha (mapped to server group 12) with Bravo mapped to server group 13
async fn linked_member() -> Result<(TestContext, i32), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let alpha = test.auth().insert_group("Alpha").await?;
    let bravo = test.auth().insert_group("Bravo").await?;
    test.auth().add_group_permission(alpha.id, ACCESS).await?;
    test.account()
        .insert_teamspeak3_group_mapping(alpha.id, 12)
        .await?;
    test.account()
        .insert_teamspeak3_group_mapping(bravo.id, 13)
        .await?;

    let user = insert_member(&mut test, "bruce", &[alpha.id]).await?;
    test.account()
        .insert_teamspeak3_user(user.id, "bruce", "privilege-key")
        .await?;

    Ok((test, user.id))
}

mod activate {
    use super::*;

    /// Expect a privilege key granting the mapped server group, bound to the user's UID
    #[tokio::test]
    async fn test_activate_with_mapped_group() -> Result<(), Error> {
        let mut test = TestBuilder::new().with_sync_tables().build().await?;
        let alpha = test.auth().insert_group("Alpha").await?;
        test.auth().add_group_permission(alpha.id, ACCESS).await?;
        test.account()
            .insert_teamspeak3_group_mapping(alpha.id, 12)
            .await?;
        let user = insert_member(&mut test, "bruce", &[alpha.id]).await?;
        let url = test.server_url();

        command_mock(&mut test, "servergrouplist", server_groups(&[("12", "Alpha")]));
        let key_mock = test
            .server()
            .mock("POST", command_path("privilegekeyadd").as_str())
            .match_body(Matcher::PartialJson(json!({
                "tokentype": 0,
                "tokenid1": 12,
                "tokencustomset": "ident=sso_uid value=bruce",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([{ "token": "privilege-key" }])))
            .expect(1)
            .create();

        let registry = registry(url);
        let account = LifecycleService::new(&test.db, &registry)
            .activate(user.id, ActivationRequest::Teamspeak3)
            .await?;

        assert_eq!(account.uid, "bruce");
        assert_eq!(account.perm_key.as_deref(), Some("privilege-key"));

        let stored = AccountRepository::new(&test.db)
            .find(user.id, ServiceKind::Teamspeak3)
            .await?;
        assert_eq!(
            stored.and_then(|a| a.perm_key).as_deref(),
            Some("privilege-key")
        );
        key_mock.assert_async().await;

        Ok(())
    }

    /// Expect the server group of an unmapped state to be created by name
    #[tokio::test]
    async fn test_activate_creates_state_group() -> Result<(), Error> {
        let mut test = TestBuilder::new().with_sync_tables().build().await?;
        let state = test.auth().insert_state("Guest", 0, false).await?;
        test.auth().add_state_permission(state.id, ACCESS).await?;
        let user = test.auth().insert_user("bruce", None).await?;
        let url = test.server_url();

        let list_mock = test
            .server()
            .mock("POST", command_path("servergrouplist").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(server_groups(&[("6", "Server Admin")]))
            .expect(1)
            .create();
        let create_mock = test
            .server()
            .mock("POST", command_path("servergroupadd").as_str())
            .match_body(Matcher::Json(json!({ "name": "Guest", "type": 1 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([{ "sgid": "20" }])))
            .expect(1)
            .create();
        let key_mock = test
            .server()
            .mock("POST", command_path("privilegekeyadd").as_str())
            .match_body(Matcher::PartialJson(json!({ "tokenid1": 20 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([{ "token": "guest-key" }])))
            .expect(1)
            .create();

        let registry = registry(url);
        let account = LifecycleService::new(&test.db, &registry)
            .activate(user.id, ActivationRequest::Teamspeak3)
            .await?;

        assert_eq!(account.perm_key.as_deref(), Some("guest-key"));
        list_mock.assert_async().await;
        create_mock.assert_async().await;
        key_mock.assert_async().await;

        Ok(())
    }
}

mod reconcile {
    use super::*;

    /// Expect an unredeemed privilege key to leave the account pending & linked
    #[tokio::test]
    async fn test_unredeemed_key_is_pending() -> Result<(), Error> {
        let (mut test, user_id) = linked_member().await?;
        let url = test.server_url();

        command_mock(&mut test, "servergrouplist", server_groups(&[]));
        command_mock(&mut test, "customsearch", empty());

        let registry = registry(url);
        let outcome = ReconcileService::new(&test.db, &registry)
            .reconcile(user_id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(outcome, ReconcileOutcome::Pending);
        assert!(AccountRepository::new(&test.db)
            .find(user_id, ServiceKind::Teamspeak3)
            .await?
            .is_some());

        Ok(())
    }

    /// Expect missing mapped groups to be added & stale tracked groups removed, untracked kept
    #[tokio::test]
    async fn test_adds_and_removes_groups() -> Result<(), Error> {
        let (mut test, user_id) = linked_member().await?;
        let url = test.server_url();

        command_mock(&mut test, "servergrouplist", server_groups(&[]));
        let search_mock = test
            .server()
            .mock("POST", command_path("customsearch").as_str())
            .match_body(Matcher::Json(json!({ "ident": "sso_uid", "pattern": "bruce" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([{ "cldbid": "7", "ident": "sso_uid", "value": "bruce" }])))
            .expect(2)
            .create();
        command_mock(
            &mut test,
            "servergroupsbyclientid",
            ok(json!([{ "sgid": "8" }, { "sgid": "13" }])),
        );
        let add_mock = test
            .server()
            .mock("POST", command_path("servergroupaddclient").as_str())
            .match_body(Matcher::Json(json!({ "sgid": 12, "cldbid": 7 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([])))
            .expect(1)
            .create();
        let remove_mock = test
            .server()
            .mock("POST", command_path("servergroupdelclient").as_str())
            .match_body(Matcher::Json(json!({ "sgid": 13, "cldbid": 7 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([])))
            .expect(1)
            .create();

        let registry = registry(url);
        let outcome = ReconcileService::new(&test.db, &registry)
            .reconcile(user_id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(outcome, ReconcileOutcome::Updated);
        search_mock.assert_async().await;
        add_mock.assert_async().await;
        remove_mock.assert_async().await;

        Ok(())
    }

    /// Expect a client already holding exactly its groups to be left alone
    #[tokio::test]
    async fn test_in_sync_client() -> Result<(), Error> {
        let (mut test, user_id) = linked_member().await?;
        let url = test.server_url();

        command_mock(&mut test, "servergrouplist", server_groups(&[]));
        command_mock(&mut test, "customsearch", ok(json!([{ "cldbid": "7" }])));
        command_mock(
            &mut test,
            "servergroupsbyclientid",
            ok(json!([{ "sgid": "8" }, { "sgid": "12" }])),
        );
        let add_mock = test
            .server()
            .mock("POST", command_path("servergroupaddclient").as_str())
            .expect(0)
            .create();

        let registry = registry(url);
        let outcome = ReconcileService::new(&test.db, &registry)
            .reconcile(user_id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(outcome, ReconcileOutcome::InSync);
        add_mock.assert_async().await;

        Ok(())
    }

    /// Expect a user without access whose key was never redeemed to have the key revoked &
    /// be unlinked
    #[tokio::test]
    async fn test_access_revoked_while_pending() -> Result<(), Error> {
        let mut test = TestBuilder::new().with_sync_tables().build().await?;
        let user = test.auth().insert_user("bruce", None).await?;
        test.account()
            .insert_teamspeak3_user(user.id, "bruce", "privilege-key")
            .await?;
        let url = test.server_url();

        command_mock(&mut test, "customsearch", empty());
        let key_delete_mock = test
            .server()
            .mock("POST", command_path("privilegekeydelete").as_str())
            .match_body(Matcher::Json(json!({ "token": "privilege-key" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([])))
            .expect(1)
            .create();
        let delete_mock = test
            .server()
            .mock("POST", command_path("clientdbdelete").as_str())
            .expect(0)
            .create();

        let registry = registry(url);
        let outcome = ReconcileService::new(&test.db, &registry)
            .reconcile(user.id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(
            outcome,
            ReconcileOutcome::Unlinked(UnlinkReason::AccessRevoked)
        );
        assert!(AccountRepository::new(&test.db)
            .find(user.id, ServiceKind::Teamspeak3)
            .await?
            .is_none());
        key_delete_mock.assert_async().await;
        delete_mock.assert_async().await;

        Ok(())
    }

    /// Expect no command and an untouched link when the rate-limit budget is exhausted
    #[tokio::test]
    async fn test_rate_limited_is_deferred() -> Result<(), Error> {
        let (mut test, user_id) = linked_member().await?;
        let url = test.server_url();

        let any_command = test
            .server()
            .mock("POST", Matcher::Regex(r"^/1/".to_string()))
            .expect(0)
            .create();

        let registry = registry_with_gate(url, Arc::new(LocalRateLimitGate::per_second(0)));
        let outcome = ReconcileService::new(&test.db, &registry)
            .reconcile(user_id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(outcome, ReconcileOutcome::Deferred);
        assert!(AccountRepository::new(&test.db)
            .find(user_id, ServiceKind::Teamspeak3)
            .await?
            .is_some());
        any_command.assert_async().await;

        Ok(())
    }

    /// Expect a user who lost access to keep their link while the budget is exhausted
    #[tokio::test]
    async fn test_rate_limited_revocation_is_deferred() -> Result<(), Error> {
        let mut test = TestBuilder::new().with_sync_tables().build().await?;
        let user = test.auth().insert_user("bruce", None).await?;
        test.account()
            .insert_teamspeak3_user(user.id, "bruce", "privilege-key")
            .await?;
        let url = test.server_url();

        let any_command = test
            .server()
            .mock("POST", Matcher::Regex(r"^/1/".to_string()))
            .expect(0)
            .create();

        let registry = registry_with_gate(url, Arc::new(LocalRateLimitGate::per_second(0)));
        let outcome = ReconcileService::new(&test.db, &registry)
            .reconcile(user.id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(outcome, ReconcileOutcome::Deferred);
        assert!(AccountRepository::new(&test.db)
            .find(user.id, ServiceKind::Teamspeak3)
            .await?
            .is_some());
        any_command.assert_async().await;

        Ok(())
    }
}

mod deactivate {
    use super::*;

    /// Expect the unredeemed privilege key of a deleted user to be revoked
    #[tokio::test]
    async fn test_deleted_user_key_revoked() -> Result<(), Error> {
        let mut test = TestBuilder::new().with_sync_tables().build().await?;
        let url = test.server_url();

        command_mock(&mut test, "customsearch", empty());
        let key_delete_mock = test
            .server()
            .mock("POST", command_path("privilegekeydelete").as_str())
            .match_body(Matcher::Json(json!({ "token": "privilege-key" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([])))
            .expect(1)
            .create();

        WorkerJobHandler::new(test.db.clone(), registry(url))
            .remove_account(
                7,
                ServiceKind::Teamspeak3,
                "bruce".to_string(),
                Some("privilege-key".to_string()),
            )
            .await?;

        key_delete_mock.assert_async().await;

        Ok(())
    }

    /// Expect the client to be deleted from the server database and the link removed
    #[tokio::test]
    async fn test_deactivate() -> Result<(), Error> {
        let (mut test, user_id) = linked_member().await?;
        let url = test.server_url();

        command_mock(&mut test, "customsearch", ok(json!([{ "cldbid": "7" }])));
        let delete_mock = test
            .server()
            .mock("POST", command_path("clientdbdelete").as_str())
            .match_body(Matcher::Json(json!({ "cldbid": 7 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ok(json!([])))
            .expect(1)
            .create();

        let registry = registry(url);
        LifecycleService::new(&test.db, &registry)
            .deactivate(user_id, ServiceKind::Teamspeak3)
            .await?;

        assert_eq!(
            AccountRepository::new(&test.db)
                .count(ServiceKind::Teamspeak3)
                .await?,
            0
        );
        delete_mock.assert_async().await;

        Ok(())
    }
}

/// Expect the virtual server name and the number of linked accounts
#[tokio::test]
async fn test_status() -> Result<(), Error> {
    let (mut test, _) = linked_member().await?;
    let url = test.server_url();

    command_mock(
        &mut test,
        "serverinfo",
        ok(json!([{ "virtualserver_name": "Gotham Comms" }])),
    );

    let registry = registry(url);
    let status = LifecycleService::new(&test.db, &registry)
        .status(ServiceKind::Teamspeak3)
        .await?;

    assert_eq!(status.namespace_name, "Gotham Comms");
    assert_eq!(status.linked_accounts, 1);

    Ok(())
}
