use std::{fmt, sync::OnceLock};

use regex::Regex;

const MAX_TAG_LEN: usize = 32;
const FALLBACK_TAG: &str = "unnamed_project";

/// Hashtag-safe project identifier: `[a-z0-9_]`, 1..=32 chars.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProjectTag(String);

impl ProjectTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_alnum_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// Derive the project tag from a human-readable project name.
///
/// Runs of anything outside `[a-z0-9]` collapse to a single `_`. Names that start
/// with a digit get a `project_` prefix. The result is cut to 32 characters
/// after all other steps, so it may end in `_`.
pub fn derive_project_tag(display_name: &str) -> ProjectTag {
    let lowered = display_name.trim().to_lowercase();
    let collapsed = non_alnum_runs().replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');

    let mut tag = if trimmed.is_empty() {
        FALLBACK_TAG.to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("project_{trimmed}")
    } else {
        trimmed.to_string()
    };

    // Only ASCII survives the replacement, so byte truncation is char-safe.
    tag.truncate(MAX_TAG_LEN);
    ProjectTag(tag)
}
