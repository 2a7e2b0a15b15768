//! Server-side core of the Bifrost membership synchronizer.
//!
//! This module contains the reconciliation engine that keeps remote service memberships
//! (Discord guild roles, TeamSpeak server groups) aligned with the groups and states users
//! hold locally, together with the infrastructure around it: configuration, the database
//! access layer, HTTP clients for the remote services, the Redis-backed worker queue and
//! pool that execute reconciliation jobs, and the cron scheduler that periodically sweeps
//! every linked account.


pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod worker;
