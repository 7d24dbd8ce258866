//! Tempbox: a disposable email service.
//!
//! A client obtains a randomly generated address, receives mail sent to it
//! for a bounded lifetime, and can later re-derive the address from a
//! password-like token. The crate carries an inbound SMTP receiver, a
//! SQLite-backed mailbox store, a retention sweeper and a JSON web API.

pub mod config;
pub mod credential;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod mailbox;
pub mod sweep;
pub mod turnstile;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, TempboxError};
