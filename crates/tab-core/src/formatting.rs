//! Alert rendering (Telegram HTML parse mode).

use chrono::{DateTime, TimeZone};

use crate::{domain::AlertRequest, tag::ProjectTag, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render an alert into a single HTML message body.
///
/// Sections are separated by a blank line: hashtags, bold header, message and
/// (when the metadata has at least one key) pretty-printed metadata.
pub fn format_alert<Tz>(req: &AlertRequest, tag: &ProjectTag, now: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let severity = req.severity;
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

    let mut parts = vec![
        format!("#{} #{}", severity.hashtag(), tag),
        format!(
            "<b>{} {} - {}</b>",
            severity.emoji(),
            escape_html(severity.label()),
            escape_html(&timestamp)
        ),
        format!("<b>Message:</b>\n<pre>{}</pre>", escape_html(&req.message)),
    ];

    if let Some(metadata) = req.metadata.as_ref().filter(|m| !m.is_empty()) {
        let json = serde_json::to_string_pretty(metadata)?;
        parts.push(format!("<b>Metadata:</b>\n<pre>{}</pre>", escape_html(&json)));
    }

    Ok(parts.join("\n\n"))
}
