#[cfg(feature = "discord")]
pub mod discord;
#[cfg(feature = "teamspeak3")]
pub mod teamspeak3;

use bifrost_test_utils::prelude::*;
use thiserror::Error;

/// Error type for integration tests, covering fixtures and the code under test
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Test(#[from] TestError),
    #[error(transparent)]
    Sync(#[from] bifrost_sync::server::error::Error),
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Redis(#[from] fred::error::Error),
}

/// Inserts a user without main character and adds them to the provided groups
pub async fn insert_member(
    test: &mut TestContext,
    username: &str,
    group_ids: &[i32],
) -> Result<entity::auth_user::Model, TestError> {
    let user = test.auth().insert_user(username, None).await?;

    for group_id in group_ids {
        test.auth().add_user_to_group(user.id, *group_id).await?;
    }

    Ok(user)
}
