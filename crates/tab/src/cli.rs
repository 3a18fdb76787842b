use std::path::PathBuf;

use clap::Parser;

use tab_core::{domain::Metadata, errors::Error, AlertRequest, Result, Severity};

/// Send one alert to a Telegram forum thread.
///
/// The bot token is read from `TELEGRAM_BOT_TOKEN`. Destination, thread and
/// project name come from `--config` or from `ALERT_*` variables.
#[derive(Debug, Parser)]
#[command(name = "tab")]
#[command(version)]
pub struct Cli {
    /// Severity: error, warning (warn) or log (info)
    #[arg(value_parser = parse_severity)]
    pub severity: Severity,

    /// Alert text
    pub message: String,

    /// Extra context as a JSON object
    #[arg(value_parser = parse_metadata)]
    pub metadata: Option<Metadata>,

    /// JSON config file with destinationId, threadId and displayName
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn request(&self) -> AlertRequest {
        AlertRequest {
            severity: self.severity,
            message: self.message.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

fn parse_severity(raw: &str) -> Result<Severity> {
    raw.parse()
}

fn parse_metadata(raw: &str) -> Result<Metadata> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::Config("metadata must be a JSON object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use serde_json::json;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tab").chain(args.iter().copied()))
    }

    fn kind(args: &[&str]) -> ErrorKind {
        parse(args).unwrap_err().kind()
    }

    #[test]
    fn parses_severity_and_message() {
        let req = parse(&["warning", "queue is backing up"]).unwrap().request();
        assert_eq!(req.severity, Severity::Warning);
        assert_eq!(req.message, "queue is backing up");
        assert!(req.metadata.is_none());
    }

    #[test]
    fn accepts_severity_aliases() {
        assert_eq!(parse(&["INFO", "x"]).unwrap().severity, Severity::Log);
        assert_eq!(parse(&["warn", "x"]).unwrap().severity, Severity::Warning);
    }

    #[test]
    fn parses_metadata_object() {
        let req = parse(&["error", "boom", r#"{"code": 500}"#])
            .unwrap()
            .request();
        assert_eq!(req.metadata, json!({ "code": 500 }).as_object().cloned());
    }

    #[test]
    fn parses_config_flag() {
        let cli = parse(&["--config", "alerts.json", "log", "x"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alerts.json")));
    }

    #[test]
    fn help_is_not_a_severity() {
        assert_eq!(kind(&["--help"]), ErrorKind::DisplayHelp);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(kind(&["error"]), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind(&["fatal", "x"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["log", "x", "[1, 2]"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["log", "x", "{not json"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["log", "x", "{}", "extra"]), ErrorKind::UnknownArgument);
    }
}
