use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::ContentBlock;

/// Who (or what) a message represents in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    ToolInvocation,
    ToolOutcome,
    System,
    /// The user cut the assistant off mid-turn.
    Interruption,
    /// A slash command the user issued through the agent frontend.
    Command,
    /// Conversational bookkeeping from the source (summaries, queue notes).
    Meta,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::ToolInvocation => "tool_invocation",
            Role::ToolOutcome => "tool_outcome",
            Role::System => "system",
            Role::Interruption => "interruption",
            Role::Command => "command",
            Role::Meta => "meta",
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Role::ToolInvocation | Role::ToolOutcome)
    }
}

/// The atomic canonical unit of a normalized session.
///
/// Created once during decode/split and immutable afterwards; downstream
/// consumers only read it. Invariant: a `ToolInvocation`-role message carries
/// exactly one `ToolInvocation` block, and likewise for `ToolOutcome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// Unique within the session. Split messages derive theirs as
    /// `{originalId}-{blockIndex}`.
    pub id: String,

    pub timestamp: DateTime<Utc>,

    pub role: Role,

    /// Ordered typed fragments of this message.
    pub content: Vec<ContentBlock>,

    /// Source-record parent reference, inherited unchanged by split
    /// messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Provider-specific sidecar (usage, model, raw flags). Opaque to the
    /// normalization core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ParsedMessage {
    /// All text blocks concatenated in order, newline-separated.
    ///
    /// A projection, computed on demand; the structured blocks remain the
    /// single source of truth.
    pub fn flattened_text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let Some(text) = block.text_fragment() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    /// The single tool block of a tool-role message.
    pub fn tool_block(&self) -> Option<&ContentBlock> {
        if self.role.is_tool() {
            self.content.iter().find(|b| b.is_tool())
        } else {
            None
        }
    }
}
