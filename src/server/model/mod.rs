//! Domain models shared across the service, worker and client layers.
//!
//! These types are deliberately decoupled from the `entity` crate so that services can be
//! tested and reasoned about without database models leaking into their signatures.

pub mod affiliation;
pub mod event;
pub mod service;
pub mod worker;
