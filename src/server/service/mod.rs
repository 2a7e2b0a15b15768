//! Service layer for business logic and orchestration.
//!
//! This module contains the reconciliation core: affiliation resolution, remote role mapping,
//! the diff-and-apply engine, account lifecycle handling, the rate-limit gates shared by the
//! remote clients, change notification and retry logic. Remote services are reached through
//! the [`adapter::ServiceAdapter`] implementations held by the [`registry::ServiceRegistry`].

pub mod adapter;
pub mod affiliation;
#[cfg(feature = "discord")]
pub mod discord;
pub mod lifecycle;
pub mod notify;
pub mod rate_limit;
pub mod reconcile;
pub mod registry;
pub mod retry;
pub mod role_mapper;
#[cfg(feature = "teamspeak3")]
pub mod teamspeak3;
