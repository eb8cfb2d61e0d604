//! Marker tables for structural text decisions shared across decoders.
//!
//! Kept declarative so each table can be unit-tested and extended without
//! touching the parsing pipeline.

use regex::Regex;
use std::sync::LazyLock;

/// Prefixes that mark a user record as an interruption of the assistant's
/// turn rather than ordinary input.
pub(crate) const INTERRUPTION_MARKERS: &[&str] = &[
    "[Request interrupted by user",
    "[Request cancelled by user",
];

pub(crate) fn is_interruption(text: &str) -> bool {
    let trimmed = text.trim_start();
    INTERRUPTION_MARKERS
        .iter()
        .any(|marker| trimmed.starts_with(marker))
}

/// Slash commands always start with '/'; the anchor prevents matching
/// documentation text that merely mentions the tag.
static COMMAND_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<command-name>\s*(/[^<\s][^<]*?)\s*</command-name>").unwrap());

static COMMAND_ARGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<command-args>\s*([^<]*?)\s*</command-args>").unwrap());

/// Regex for extracting exit codes from tool output
/// Example: "Exit code: 0" or "Exit Code: 1" (case-insensitive)
static EXIT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)exit code:\s*(-?\d+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandInvocation {
    pub name: String,
    pub args: Option<String>,
}

/// Extract a slash command from user text carrying frontend XML tags.
pub(crate) fn extract_command(text: &str) -> Option<CommandInvocation> {
    let name = COMMAND_NAME_RE.captures(text)?.get(1)?.as_str().to_string();
    let args = COMMAND_ARGS_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|args| !args.is_empty());
    Some(CommandInvocation { name, args })
}

pub(crate) fn extract_exit_code(output: &str) -> Option<i64> {
    EXIT_CODE_RE
        .captures(output)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
