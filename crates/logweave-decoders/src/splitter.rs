use chrono::{DateTime, Utc};
use logweave_types::{ContentBlock, ParsedMessage, Role};
use serde_json::Value;

/// A decoded record before splitting: one source record, possibly encoding
/// several semantic acts. Ephemeral; consumed by `split_message`.
#[derive(Debug, Clone)]
pub struct ProvisionalMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub content: Vec<ContentBlock>,
    pub parent_id: Option<String>,
    pub metadata: Option<Value>,
}

/// Split one provisional message into canonical messages.
///
/// Records mixing prose with tool blocks emit one prose message (original
/// id and role, non-tool blocks only) plus one message per tool block with
/// its own role and the derived id `{originalId}-{blockIndex}`. Timestamp,
/// parent and metadata are inherited unchanged, so two runs over identical
/// input yield identical derived ids and ordering.
pub fn split_message(provisional: ProvisionalMessage) -> Vec<ParsedMessage> {
    let ProvisionalMessage {
        id,
        timestamp,
        role,
        content,
        parent_id,
        metadata,
    } = provisional;

    let tool_count = content.iter().filter(|block| block.is_tool()).count();

    if tool_count == 0 {
        let content: Vec<ContentBlock> =
            content.into_iter().filter(|block| !is_blank(block)).collect();
        if content.is_empty() {
            return Vec::new();
        }
        return vec![ParsedMessage {
            id,
            timestamp,
            role,
            content,
            parent_id,
            metadata,
        }];
    }

    // A record that is exactly one tool block passes through under the
    // corresponding tool role, keeping its original id.
    let pass_through = tool_count == 1 && content.len() == 1;

    let mut prose = Vec::new();
    let mut tools = Vec::new();
    for (index, block) in content.into_iter().enumerate() {
        match block {
            ContentBlock::ToolInvocation { .. } => tools.push((index, Role::ToolInvocation, block)),
            ContentBlock::ToolOutcome { .. } => tools.push((index, Role::ToolOutcome, block)),
            block if !is_blank(&block) => prose.push(block),
            _ => {}
        }
    }

    let mut out = Vec::with_capacity(tools.len() + 1);
    if !prose.is_empty() {
        out.push(ParsedMessage {
            id: id.clone(),
            timestamp,
            role,
            content: prose,
            parent_id: parent_id.clone(),
            metadata: metadata.clone(),
        });
    }
    for (index, tool_role, block) in tools {
        out.push(ParsedMessage {
            id: if pass_through {
                id.clone()
            } else {
                format!("{}-{}", id, index)
            },
            timestamp,
            role: tool_role,
            content: vec![block],
            parent_id: parent_id.clone(),
            metadata: metadata.clone(),
        });
    }
    out
}

fn is_blank(block: &ContentBlock) -> bool {
    matches!(block, ContentBlock::Text { text } if text.trim().is_empty())
}
