use std::{collections::HashMap, env, fs, path::Path};

use tab_core::{config::AlertConfig, errors::Error, Result};

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "ALERT_CHAT_ID";
pub const THREAD_ID_VAR: &str = "ALERT_THREAD_ID";
pub const PROJECT_NAME_VAR: &str = "ALERT_PROJECT_NAME";

/// Process environment layered over an optional `.env` file.
///
/// The process environment always wins and is never modified.
#[derive(Debug, Default)]
pub struct EnvSource {
    dotenv: HashMap<String, String>,
}

impl EnvSource {
    pub fn load() -> Self {
        let contents = fs::read_to_string(".env").unwrap_or_default();
        Self::from_dotenv(&contents)
    }

    fn from_dotenv(contents: &str) -> Self {
        Self {
            dotenv: parse_dotenv(contents).into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.dotenv.get(key).cloned())
    }
}

/// Token and config for one run. Validation is left to the bot.
#[derive(Debug)]
pub struct EnvSettings {
    pub token: String,
    pub config: AlertConfig,
}

impl EnvSettings {
    /// Read the token from the environment; read the config from `config_file`
    /// when given, otherwise from the `ALERT_*` variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let source = EnvSource::load();
        let config_json = match config_file {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read config {}: {e}", path.display()))
            })?),
            None => None,
        };
        Self::from_sources(|key| source.get(key), config_json.as_deref())
    }

    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        config_json: Option<&str>,
    ) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };

        let token = required(TOKEN_VAR)?;

        let config = match config_json {
            Some(raw) => {
                let value = serde_json::from_str(raw)
                    .map_err(|e| Error::Config(format!("config file is not JSON: {e}")))?;
                AlertConfig::from_json(value)?
            }
            None => {
                let destination_id = required(CHAT_ID_VAR)?;
                let raw_thread = required(THREAD_ID_VAR)?;
                let display_name = required(PROJECT_NAME_VAR)?;

                let thread_id = raw_thread.trim().parse::<i64>().map_err(|_| {
                    Error::Config(format!(
                        "{THREAD_ID_VAR} must be an integer, got {raw_thread:?}"
                    ))
                })?;
                AlertConfig::new(destination_id, thread_id, display_name)
            }
        };

        Ok(Self { token, config })
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}
