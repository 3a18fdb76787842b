//! Telegram adapter (teloxide).
//!
//! This crate implements the `tab-core` MessagingPort over the Telegram Bot API
//! and wires it into [`AlertBot`] construction.

use std::sync::Arc;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ParseMode, Recipient},
};

use tab_core::{
    bot::{AlertBot, AlertBotBuilder},
    config::AlertConfig,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{RenderMode, SendOptions},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

/// Numeric ids address a chat directly; anything else (`@channel`) is a username.
fn recipient(destination: &str) -> Recipient {
    match destination.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(teloxide::types::ChatId(id)),
        Err(_) => Recipient::ChannelUsername(destination.to_string()),
    }
}

/// Telegram carries forum topic ids as 32-bit integers.
fn tg_thread_id(thread_id: i64) -> Result<i32> {
    i32::try_from(thread_id)
        .map_err(|_| Error::External(format!("thread id out of range: {thread_id}")))
}

fn tg_parse_mode(mode: RenderMode) -> ParseMode {
    match mode {
        RenderMode::Html => ParseMode::Html,
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send(&self, destination: &str, body: &str, options: SendOptions) -> Result<()> {
        let thread_id = tg_thread_id(options.thread_id)?;
        self.bot
            .send_message(recipient(destination), body.to_string())
            .parse_mode(tg_parse_mode(options.render_mode))
            .message_thread_id(thread_id)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

/// Create a Bot API client for `token`.
pub fn connect(token: &str) -> Arc<dyn MessagingPort> {
    Arc::new(TelegramMessenger::new(Bot::new(token)))
}

/// Validate and build an alert bot that delivers through Telegram.
pub fn new_alert_bot(token: &str, config: AlertConfig) -> Result<AlertBot> {
    AlertBot::new(token, config, connect)
}

/// Finish a staged builder with a Telegram client.
pub fn build_alert_bot(builder: AlertBotBuilder) -> Result<AlertBot> {
    builder.build(connect)
}
