use serde::{de, Deserialize, Deserializer};

use crate::{errors::Error, Result};

/// Destination and identity of an alert bot.
///
/// Field names accept both the current camelCase spelling and the older
/// `chatId` / `projectId` / `projectName` keys when decoded from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    /// Target chat: a numeric chat id or an `@channel` username.
    #[serde(alias = "chatId")]
    pub destination_id: String,
    /// Forum topic inside the chat. Must be positive.
    #[serde(alias = "projectId", deserialize_with = "integral_i64")]
    pub thread_id: i64,
    /// Human-readable project name; the project tag is derived from it.
    #[serde(alias = "projectName")]
    pub display_name: String,
}

impl AlertConfig {
    pub fn new(
        destination_id: impl Into<String>,
        thread_id: i64,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            destination_id: destination_id.into(),
            thread_id,
            display_name: display_name.into(),
        }
    }

    /// Decode a raw JSON config. Missing fields, non-text values and
    /// non-integral thread ids are reported as config errors.
    ///
    /// Decoding does not validate; that happens when the bot is built.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    /// Check every field. Returns the config unchanged on success.
    pub fn validate(self) -> Result<Self> {
        if self.destination_id.is_empty() {
            return Err(Error::Config("invalid destination id".to_string()));
        }
        if self.thread_id <= 0 {
            return Err(Error::Config(format!(
                "invalid thread id: {} (must be a positive integer)",
                self.thread_id
            )));
        }
        if self.display_name.is_empty() {
            return Err(Error::Config("invalid display name".to_string()));
        }
        Ok(self)
    }
}

/// Accept any JSON number with an integral value (`7` or `7.0`); reject `2.5`.
fn integral_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        // `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(de::Error::custom(format!(
            "thread id must be an integer, got {n}"
        ))),
    }
}

/// The bot token only has to be non-empty here; the messaging client owns its format.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(Error::Config("invalid bot token".to_string()));
    }
    Ok(())
}
