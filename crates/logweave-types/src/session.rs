use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::ParsedMessage;

/// The source format family a session was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    ClaudeCode,
    Codex,
    Gemini,
    Amp,
    OpenCode,
    Cline,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::ClaudeCode => "claude_code",
            SourceFormat::Codex => "codex",
            SourceFormat::Gemini => "gemini",
            SourceFormat::Amp => "amp",
            SourceFormat::OpenCode => "opencode",
            SourceFormat::Cline => "cline",
        }
    }
}

/// Structural counters and capability flags, computed once by the
/// aggregator in a single pass over the final message list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub message_count: usize,

    /// Candidate records seen in the input (lines, or array elements for
    /// document-shaped sources).
    pub records_total: usize,

    /// Records that contributed at least one message. The gap to
    /// `records_total` is the dropped-line count.
    pub records_consumed: usize,

    pub has_reasoning: bool,
    pub has_redacted_reasoning: bool,
    pub has_images: bool,
    pub has_tool_calls: bool,

    /// Whether any message carried a usage sidecar reporting cache-read
    /// tokens.
    pub has_cached_token_usage: bool,

    /// Tool outcomes whose join key matched no known invocation.
    pub orphaned_outcomes: usize,
}

/// The canonical, provider-independent session all collaborators consume.
///
/// Built once per parse call; never mutated afterwards. Invariants:
/// `start_time <= end_time`, `duration_ms` is their clamped difference,
/// `messages` is ordered by non-decreasing timestamp (input order preserved
/// on ties), and `session_id` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSession {
    pub session_id: String,

    pub source_format: SourceFormat,

    pub messages: Vec<ParsedMessage>,

    pub start_time: DateTime<Utc>,

    pub end_time: DateTime<Utc>,

    pub duration_ms: i64,

    pub stats: SessionStats,

    /// Provider-level sidecar (cwd, model, tool version) when the source
    /// supplied one. Opaque to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ParsedSession {
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.duration_ms)
    }

    /// Messages carrying a given role, in timeline order.
    pub fn messages_with_role(&self, role: crate::Role) -> impl Iterator<Item = &ParsedMessage> {
        self.messages.iter().filter(move |m| m.role == role)
    }
}
