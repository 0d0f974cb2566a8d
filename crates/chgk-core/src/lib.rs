//! Core domain + application logic for the chgk group-chat trivia bot.
//!
//! This crate is intentionally framework-agnostic. The messaging backend and
//! any real persistence live behind ports (traits) implemented in adapter
//! crates; everything here is the ingestion-and-dispatch core: poller, queue,
//! worker pool, command router and the per-chat game state machine.

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod game;
pub mod logging;
pub mod messages;
pub mod poller;
pub mod ports;
pub mod router;
pub mod store;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::{Error, Result};
