//! Declarative test setup.
//!
//! Configuration methods only queue work, everything runs in order during
//! [`TestBuilder::build`]: tables first, then mock endpoints.

use mockito::{Mock, ServerGuard};
use sea_orm::{sea_query::TableCreateStatement, DbBackend, EntityTrait, Schema};

use crate::{error::TestError, TestContext};

type MockBuilder = Box<dyn FnOnce(&mut ServerGuard) -> Mock>;

/// Builder for a [`TestContext`]
#[derive(Default)]
pub struct TestBuilder {
    tables: Vec<TableCreateStatement>,
    include_sync_tables: bool,
    mock_builders: Vec<MockBuilder>,
}

impl TestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create every table used by the synchronizer.
    ///
    /// Characters, users, groups, states and their memberships & permissions, the Discord and
    /// TeamSpeak account links and the TeamSpeak group mappings.
    pub fn with_sync_tables(mut self) -> Self {
        self.include_sync_tables = true;
        self
    }

    /// Create the table of a single entity.
    ///
    /// Tables are created in the order they are added, after the sync tables.
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Add a mock endpoint to the mock server.
    ///
    /// The created mock is checked by [`TestContext::assert_mocks`].
    ///
    /// # Arguments
    /// - `setup` - Closure receiving the mock server and returning the configured mock
    pub fn with_mock_endpoint<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut ServerGuard) -> Mock + 'static,
    {
        self.mock_builders.push(Box::new(setup));
        self
    }

    /// Build the test context.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Tables created & mocks registered
    /// - `Err(TestError::DbErr)` - Connecting to the database or creating a table failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut test = TestContext::new().await?;

        let mut tables = Vec::new();
        if self.include_sync_tables {
            tables.extend(sync_tables());
        }
        tables.extend(self.tables);

        test.with_tables(tables).await?;

        for builder in self.mock_builders {
            let mock = builder(&mut test.server);
            test.mocks.push(mock);
        }

        Ok(test)
    }
}

/// Table statements in foreign key order
fn sync_tables() -> Vec<TableCreateStatement> {
    use entity::prelude::*;

    let schema = Schema::new(DbBackend::Sqlite);

    vec![
        schema.create_table_from_entity(EveCharacter),
        schema.create_table_from_entity(AuthUser),
        schema.create_table_from_entity(AuthGroup),
        schema.create_table_from_entity(AuthGroupPermission),
        schema.create_table_from_entity(AuthUserGroup),
        schema.create_table_from_entity(AuthState),
        schema.create_table_from_entity(AuthStateMemberCharacter),
        schema.create_table_from_entity(AuthStateMemberCorporation),
        schema.create_table_from_entity(AuthStateMemberAlliance),
        schema.create_table_from_entity(AuthStatePermission),
        schema.create_table_from_entity(DiscordUser),
        schema.create_table_from_entity(Teamspeak3User),
        schema.create_table_from_entity(Teamspeak3GroupMapping),
        schema.create_table_from_entity(Teamspeak3StateGroup),
    ]
}
