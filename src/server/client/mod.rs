//! HTTP clients for the remote services Bifrost synchronizes into.
//!
//! Every client acquires budget from its service's rate-limit gate before sending a request
//! and feeds remote rate-limit responses back into the gate.

#[cfg(feature = "discord")]
pub mod discord;
#[cfg(feature = "teamspeak3")]
pub mod teamspeak3;
