//! Core formatting and dispatch logic for the Telegram alert bot.
//!
//! This crate is intentionally framework-agnostic. The Telegram Bot API lives
//! behind [`messaging::port::MessagingPort`], implemented in the adapter crate.

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod tag;

pub use bot::{AlertBot, AlertBotBuilder};
pub use config::AlertConfig;
pub use domain::{AlertRequest, Metadata, Severity};
pub use errors::{Error, Result};
