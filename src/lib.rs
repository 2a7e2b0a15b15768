//! Bifrost sync keeps Discord and TeamSpeak memberships aligned with the groups and states
//! users hold in Bifrost.

pub mod server;
