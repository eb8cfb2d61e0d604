use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// NOTE: Schema Design Goals
//
// 1. Self-description: every block variant carries everything a consumer
//    needs; no consumer inspects provider-specific raw shapes.
// 2. Forward compatibility: content shapes no variant recognizes are
//    preserved verbatim as Opaque, never dropped.
// 3. Correlation: tool invocations and outcomes share a JoinKey that is
//    either the provider's native call id or a deterministic synthetic key,
//    so pairing survives providers without correlation ids.

/// Correlation value pairing a tool invocation with its eventual outcome.
///
/// Native keys come from the provider verbatim. Synthetic keys are derived
/// from `(parent message id, tool name, occurrence index)` and are stable
/// across repeated parses of the same input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinKey(String);

impl JoinKey {
    /// Wrap a provider-supplied call id.
    pub fn native(id: impl Into<String>) -> Self {
        JoinKey(id.into())
    }

    /// Derive a key for an invocation without a native id. `occurrence`
    /// counts prior same-named invocations within the same parent record.
    pub fn synthetic(parent_id: &str, tool_name: &str, occurrence: usize) -> Self {
        JoinKey(format!("{}:{}:{}", parent_id, tool_name, occurrence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One typed fragment of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    /// Prose.
    Text { text: String },

    /// A request to run a tool.
    ToolInvocation {
        key: JoinKey,
        name: String,
        input: Value,
    },

    /// The result of a tool run. `orphaned` marks outcomes whose key matched
    /// no known invocation; they are kept, never discarded.
    ToolOutcome {
        key: JoinKey,
        payload: Value,
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        orphaned: bool,
    },

    /// A reasoning trace. Encrypted traces (a signature with no readable
    /// text) keep `redacted: true` and no text, so consumers can render a
    /// placeholder without fabricating content.
    Reasoning {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default)]
        redacted: bool,
    },

    /// An inline image.
    Image { media_type: String, data: String },

    /// Unrecognized content, preserved verbatim.
    Opaque { raw: Value },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        ContentBlock::Reasoning {
            text: Some(text.into()),
            redacted: false,
        }
    }

    /// Reasoning the provider delivered in encrypted, undisplayable form.
    pub fn redacted_reasoning() -> Self {
        ContentBlock::Reasoning {
            text: None,
            redacted: true,
        }
    }

    pub fn opaque(raw: Value) -> Self {
        ContentBlock::Opaque { raw }
    }

    /// Whether this block is a tool invocation or outcome.
    pub fn is_tool(&self) -> bool {
        matches!(
            self,
            ContentBlock::ToolInvocation { .. } | ContentBlock::ToolOutcome { .. }
        )
    }

    /// The prose carried by this block, if it is a text block.
    pub fn text_fragment(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }

    /// The join key carried by this block, if it is tool-related.
    pub fn join_key(&self) -> Option<&JoinKey> {
        match self {
            ContentBlock::ToolInvocation { key, .. } => Some(key),
            ContentBlock::ToolOutcome { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_keys_are_deterministic() {
        let a = JoinKey::synthetic("msg-1", "bash", 0);
        let b = JoinKey::synthetic("msg-1", "bash", 0);
        let c = JoinKey::synthetic("msg-1", "bash", 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "msg-1:bash:0");
    }

    #[test]
    fn block_serialization_round_trips() {
        let block = ContentBlock::ToolInvocation {
            key: JoinKey::native("toolu_123"),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "ls"}),
        };

        let json = serde_json::to_string(&block).unwrap();
        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
    }

    #[test]
    fn redacted_reasoning_has_no_text() {
        let block = ContentBlock::redacted_reasoning();
        match &block {
            ContentBlock::Reasoning { text, redacted } => {
                assert!(text.is_none());
                assert!(redacted);
            }
            _ => panic!("expected reasoning block"),
        }
        assert!(block.text_fragment().is_none());
    }
}
