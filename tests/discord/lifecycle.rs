use std::sync::Arc;

use bifrost_sync::server::{
    client::discord::oauth::DiscordOAuth,
    data::account::AccountRepository,
    error::{lifecycle::LifecycleError, Error as SyncError},
    model::service::{ActivationRequest, RemoveOutcome, ServiceKind},
    service::{lifecycle::LifecycleService, rate_limit::LocalRateLimitGate},
};
use bifrost_test_utils::prelude::*;
use mockito::Matcher;
use serde_json::json;

use crate::util::{
    discord::{
        config, member_body, member_path, registry, registry_with_gate, roles_body,
        unknown_member_body, ROLES_PATH,
    },
    insert_member, Error,
};

const UID: u64 = 555;

/// Group Alpha granting Discord access and a member of it without a link
async fn setup() -> Result<(TestContext, i32), Error> {
    let mut test = TestBuilder::new().with_sync_tables().build().await?;
    let alpha = test.auth().insert_group("Alpha").await?;
    test.auth()
        .add_group_permission(alpha.id, "discord.access_discord")
        .await?;
    let user = insert_member(&mut test, "bruce", &[alpha.id]).await?;

    Ok((test, user.id))
}

fn current_user_mock(test: &mut TestContext) -> mockito::Mock {
    test.server()
        .mock("GET", "/users/@me")
        .match_header("authorization", "Bearer user-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": UID.to_string(), "username": "bruce" }).to_string())
        .expect(1)
        .create()
}

fn discord_request() -> ActivationRequest {
    ActivationRequest::Discord {
        access_token: "user-token".to_string(),
    }
}

mod activate {
    use super::*;

    /// Expect the user to join the guild with their roles and the link to be written
    #[tokio::test]
    async fn test_activate_joins_guild() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        let url = test.server_url();

        let user_mock = current_user_mock(&mut test);
        test.server()
            .mock("GET", ROLES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(roles_body(&[("1", "Alpha")]))
            .create();
        let join_mock = test
            .server()
            .mock("PUT", member_path(UID).as_str())
            .match_body(Matcher::Json(json!({
                "access_token": "user-token",
                "roles": ["1"],
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(member_body(&["1"], None))
            .expect(1)
            .create();

        let registry = registry(url);
        let account = LifecycleService::new(&test.db, &registry)
            .activate(user_id, discord_request())
            .await?;

        assert_eq!(account.uid, UID.to_string());
        assert_eq!(account.username.as_deref(), Some("bruce"));
        assert!(AccountRepository::new(&test.db)
            .find(user_id, ServiceKind::Discord)
            .await?
            .is_some());
        user_mock.assert_async().await;
        join_mock.assert_async().await;

        Ok(())
    }

    /// Expect a user already in the guild to have their roles synchronized instead
    #[tokio::test]
    async fn test_activate_existing_member() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        let url = test.server_url();

        current_user_mock(&mut test);
        test.server()
            .mock("GET", ROLES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(roles_body(&[("1", "Alpha"), ("7", "Manual")]))
            .create();
        test.server()
            .mock("PUT", member_path(UID).as_str())
            .with_status(204)
            .expect(1)
            .create();
        test.server()
            .mock("GET", member_path(UID).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(member_body(&["7"], None))
            .create();
        let patch_mock = test
            .server()
            .mock("PATCH", member_path(UID).as_str())
            .match_body(Matcher::Json(json!({ "roles": ["1", "7"] })))
            .with_status(204)
            .expect(1)
            .create();

        let registry = registry(url);
        LifecycleService::new(&test.db, &registry)
            .activate(user_id, discord_request())
            .await?;

        assert_eq!(
            AccountRepository::new(&test.db)
                .count(ServiceKind::Discord)
                .await?,
            1
        );
        patch_mock.assert_async().await;

        Ok(())
    }

    /// Expect an error and no remote call when the user lacks the access permission
    #[tokio::test]
    async fn test_activate_missing_permission() -> Result<(), Error> {
        let mut test = TestBuilder::new().with_sync_tables().build().await?;
        let user = test.auth().insert_user("bruce", None).await?;
        let url = test.server_url();

        let user_mock = test
            .server()
            .mock("GET", "/users/@me")
            .expect(0)
            .create();

        let registry = registry(url);
        let result = LifecycleService::new(&test.db, &registry)
            .activate(user.id, discord_request())
            .await;

        assert!(matches!(
            result,
            Err(SyncError::LifecycleError(
                LifecycleError::MissingPermission { .. }
            ))
        ));
        user_mock.assert_async().await;

        Ok(())
    }

    /// Expect an error for a user that does not exist
    #[tokio::test]
    async fn test_activate_unknown_user() -> Result<(), Error> {
        let test = TestBuilder::new().with_sync_tables().build().await?;

        let registry = registry(test.server_url());
        let result = LifecycleService::new(&test.db, &registry)
            .activate(42, discord_request())
            .await;

        assert!(matches!(
            result,
            Err(SyncError::LifecycleError(LifecycleError::UserNotFound(42)))
        ));

        Ok(())
    }

    /// Expect an error when the user already has a Discord link
    #[tokio::test]
    async fn test_activate_already_linked() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        test.account().insert_discord_user(user_id, UID as i64).await?;

        let registry = registry(test.server_url());
        let result = LifecycleService::new(&test.db, &registry)
            .activate(user_id, discord_request())
            .await;

        assert!(matches!(
            result,
            Err(SyncError::LifecycleError(LifecycleError::AlreadyLinked { .. }))
        ));

        Ok(())
    }

    /// Expect no link to be written when joining the guild fails
    #[tokio::test]
    async fn test_activate_join_failure() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        let url = test.server_url();

        current_user_mock(&mut test);
        test.server()
            .mock("GET", ROLES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(roles_body(&[("1", "Alpha")]))
            .create();
        test.server()
            .mock("PUT", member_path(UID).as_str())
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(json!({ "code": 50013, "message": "Missing Permissions" }).to_string())
            .create();

        let registry = registry(url);
        let result = LifecycleService::new(&test.db, &registry)
            .activate(user_id, discord_request())
            .await;

        assert!(result.is_err());
        assert_eq!(
            AccountRepository::new(&test.db)
                .count(ServiceKind::Discord)
                .await?,
            0
        );

        Ok(())
    }

    /// Expect no request and no link when the rate-limit budget is exhausted
    #[tokio::test]
    async fn test_activate_rate_limited() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        let url = test.server_url();

        let user_mock = test
            .server()
            .mock("GET", "/users/@me")
            .expect(0)
            .create();
        let join_mock = test
            .server()
            .mock("PUT", member_path(UID).as_str())
            .expect(0)
            .create();

        let registry = registry_with_gate(url, Arc::new(LocalRateLimitGate::per_second(0)));
        let result = LifecycleService::new(&test.db, &registry)
            .activate(user_id, discord_request())
            .await;

        assert!(matches!(result, Err(ref e) if e.is_rate_limited()));
        assert_eq!(
            AccountRepository::new(&test.db)
                .count(ServiceKind::Discord)
                .await?,
            0
        );
        user_mock.assert_async().await;
        join_mock.assert_async().await;

        Ok(())
    }

    /// Expect the authorization code to be exchanged before joining the guild
    #[tokio::test]
    async fn test_activate_discord_oauth() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        let url = test.server_url();

        let token_mock = test
            .server()
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"user-token","token_type":"Bearer","expires_in":604800}"#)
            .expect(1)
            .create();
        current_user_mock(&mut test);
        test.server()
            .mock("GET", ROLES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(roles_body(&[("1", "Alpha")]))
            .create();
        test.server()
            .mock("PUT", member_path(UID).as_str())
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(member_body(&["1"], None))
            .create();

        let oauth = DiscordOAuth::new(reqwest::Client::new(), &config(url.clone()))?;
        let registry = registry(url);
        let account = LifecycleService::new(&test.db, &registry)
            .activate_discord(user_id, &oauth, "code".to_string())
            .await?;

        assert_eq!(account.uid, UID.to_string());
        token_mock.assert_async().await;

        Ok(())
    }
}

mod deactivate {
    use super::*;

    /// Expect the member to be kicked and the link deleted
    #[tokio::test]
    async fn test_deactivate() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        test.account().insert_discord_user(user_id, UID as i64).await?;
        let url = test.server_url();

        let delete_mock = test
            .server()
            .mock("DELETE", member_path(UID).as_str())
            .with_status(204)
            .expect(1)
            .create();

        let registry = registry(url);
        LifecycleService::new(&test.db, &registry)
            .deactivate(user_id, ServiceKind::Discord)
            .await?;

        assert!(AccountRepository::new(&test.db)
            .find(user_id, ServiceKind::Discord)
            .await?
            .is_none());
        delete_mock.assert_async().await;

        Ok(())
    }

    /// Expect a member who already left the guild to count as removed
    #[tokio::test]
    async fn test_remove_member_already_gone() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        test.account().insert_discord_user(user_id, UID as i64).await?;
        let url = test.server_url();

        test.server()
            .mock("DELETE", member_path(UID).as_str())
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(unknown_member_body())
            .expect(1)
            .create();

        let registry = registry(url);
        let lifecycle = LifecycleService::new(&test.db, &registry);
        let account = AccountRepository::new(&test.db)
            .find(user_id, ServiceKind::Discord)
            .await?
            .ok_or(LifecycleError::NotLinked {
                user_id,
                service: ServiceKind::Discord,
            })
            .map_err(SyncError::from)?;

        let outcome = lifecycle.remove_account(&account).await?;

        assert_eq!(outcome, RemoveOutcome::AlreadyGone);
        assert_eq!(
            AccountRepository::new(&test.db)
                .count(ServiceKind::Discord)
                .await?,
            0
        );

        Ok(())
    }

    /// Expect the link to be kept when the remote removal fails
    #[tokio::test]
    async fn test_deactivate_remote_failure_keeps_link() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        test.account().insert_discord_user(user_id, UID as i64).await?;
        let url = test.server_url();

        test.server()
            .mock("DELETE", member_path(UID).as_str())
            .with_status(500)
            .create();

        let registry = registry(url);
        let result = LifecycleService::new(&test.db, &registry)
            .deactivate(user_id, ServiceKind::Discord)
            .await;

        assert!(result.is_err());
        assert!(AccountRepository::new(&test.db)
            .find(user_id, ServiceKind::Discord)
            .await?
            .is_some());

        Ok(())
    }

    /// Expect an error when the user has no Discord link
    #[tokio::test]
    async fn test_deactivate_not_linked() -> Result<(), Error> {
        let (test, user_id) = setup().await?;

        let registry = registry(test.server_url());
        let result = LifecycleService::new(&test.db, &registry)
            .deactivate(user_id, ServiceKind::Discord)
            .await;

        assert!(matches!(
            result,
            Err(SyncError::LifecycleError(LifecycleError::NotLinked { .. }))
        ));

        Ok(())
    }
}

mod status {
    use super::*;

    /// Expect the guild name and the number of linked accounts
    #[tokio::test]
    async fn test_status() -> Result<(), Error> {
        let (mut test, user_id) = setup().await?;
        test.account().insert_discord_user(user_id, UID as i64).await?;
        let url = test.server_url();

        test.server()
            .mock("GET", "/guilds/1000")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "1000", "name": "Wayne Enterprises" }).to_string())
            .expect(1)
            .create();

        let registry = registry(url);
        let status = LifecycleService::new(&test.db, &registry)
            .status(ServiceKind::Discord)
            .await?;

        assert_eq!(status.namespace_name, "Wayne Enterprises");
        assert_eq!(status.linked_accounts, 1);

        Ok(())
    }
}
