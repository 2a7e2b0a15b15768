//! Test context returned by [`TestBuilder`](crate::TestBuilder).
//!
//! The context owns an in-memory SQLite database and a mock HTTP server standing in for the
//! Discord API and the TeamSpeak WebQuery interface.

use mockito::{Mock, Server, ServerGuard};
use sea_orm::{sea_query::TableCreateStatement, ConnectionTrait, Database, DatabaseConnection};

use crate::error::TestError;

/// Test environment
///
/// ```ignore
/// let mut test = TestBuilder::new().with_sync_tables().build().await?;
///
/// let user = test.auth().insert_user("bruce", None).await?;
/// test.account().insert_discord_user(user.id, 1).await?;
///
/// let url = test.server_url();
/// test.assert_mocks();
/// ```
pub struct TestContext {
    /// Connection to the in-memory SQLite database
    pub db: DatabaseConnection,

    pub(crate) server: ServerGuard,
    pub(crate) mocks: Vec<Mock>,
}

impl TestContext {
    /// Creates a context with an empty database and a fresh mock server.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Database connected
    /// - `Err(TestError::DbErr)` - Database connection failed
    pub(crate) async fn new() -> Result<Self, TestError> {
        let server = Server::new_async().await;
        let db = Database::connect("sqlite::memory:").await?;

        Ok(TestContext {
            db,
            server,
            mocks: Vec::new(),
        })
    }

    pub(crate) async fn with_tables(
        &self,
        stmts: Vec<TableCreateStatement>,
    ) -> Result<(), TestError> {
        for stmt in stmts {
            self.db.execute(&stmt).await?;
        }

        Ok(())
    }

    /// Base URL of the mock HTTP server
    pub fn server_url(&self) -> String {
        self.server.url()
    }

    /// Mock server for registering endpoints after the context has been built.
    ///
    /// Mocks created this way are not tracked by [`TestContext::assert_mocks`], keep the
    /// returned [`Mock`] and assert it directly, or hand it to [`TestContext::track`].
    pub fn server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    /// Adds a mock to the ones checked by [`TestContext::assert_mocks`]
    pub fn track(&mut self, mock: Mock) {
        self.mocks.push(mock);
    }

    /// Assert every tracked mock was called as many times as it expects.
    ///
    /// # Panics
    /// Panics if any tracked mock was not matched the expected number of times
    pub fn assert_mocks(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }
}
