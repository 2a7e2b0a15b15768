//! Data access layer repositories.
//!
//! This module contains all database repository implementations for the application.
//! Repositories provide an abstraction layer over database operations, organizing
//! data access by domain. The character directory, users, states and groups are only read
//! here; remote account links are the only rows this crate writes.

pub mod account;
pub mod character;
pub mod group;
pub mod state;
pub mod teamspeak3;
pub mod user;
