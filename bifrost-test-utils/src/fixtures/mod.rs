//! Database fixtures used during test execution.
//!
//! - `auth` - Characters, users, groups, states and their permissions
//! - `account` - Discord & TeamSpeak account links and TeamSpeak group mappings

pub mod account;
pub mod auth;

use crate::TestContext;

impl TestContext {
    pub fn auth(&mut self) -> auth::AuthFixtures<'_> {
        auth::AuthFixtures { test: self }
    }

    pub fn account(&mut self) -> account::AccountFixtures<'_> {
        account::AccountFixtures { test: self }
    }
}
