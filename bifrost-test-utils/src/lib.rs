//! Test utilities for the Bifrost sync crate.
//!
//! Tests are set up in two phases: a [`TestBuilder`] declares tables & mock endpoints, and the
//! [`TestContext`] it builds gives access to the in-memory database, the mock HTTP server and
//! fixture helpers for inserting users, states, groups and linked accounts.

pub mod builder;
pub mod context;
pub mod error;
pub mod fixtures;
pub mod redis;

pub use builder::TestBuilder;
pub use context::TestContext;
pub use error::TestError;
pub use redis::RedisTest;

pub mod prelude {
    pub use crate::{TestBuilder, TestContext, TestError};
}
