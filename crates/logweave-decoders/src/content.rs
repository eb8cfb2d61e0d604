use logweave_types::ContentBlock;
use serde_json::Value;

use crate::linker::{OutcomeRef, ToolLinker};

// Part-type discriminator tables. Classification decisions are table-driven
// so new provider spellings extend a slice instead of a match arm.
const TEXT_PART_TYPES: &[&str] = &["text", "input_text", "output_text"];
const REASONING_PART_TYPES: &[&str] = &["thinking", "reasoning"];
const REDACTED_REASONING_PART_TYPES: &[&str] = &["redacted_thinking"];
const INVOCATION_PART_TYPES: &[&str] = &["tool_use", "toolUse"];
const OUTCOME_PART_TYPES: &[&str] = &["tool_result", "toolResult"];
const IMAGE_PART_TYPES: &[&str] = &["image"];

/// Keys under which providers wrap a nested part array.
const WRAPPER_KEYS: &[&str] = &["content", "parts", "blocks"];

const NATIVE_ID_KEYS: &[&str] = &["id", "call_id", "callID"];
const TOOL_NAME_KEYS: &[&str] = &["name", "tool"];
const TOOL_INPUT_KEYS: &[&str] = &["input", "args", "arguments"];
const OUTCOME_REF_KEYS: &[&str] = &["tool_use_id", "toolUseID", "call_id"];
const OUTCOME_PAYLOAD_KEYS: &[&str] = &["content", "output", "result"];

/// Classifies one raw content payload of unknown shape into typed blocks.
///
/// Stateless; shared by value across all decoders. Join keys for tool
/// blocks are assigned through the per-parse `ToolLinker` handed in by the
/// caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockClassifier;

impl BlockClassifier {
    pub fn new() -> Self {
        BlockClassifier
    }

    /// Produce an ordered block list from a raw content value.
    ///
    /// Priority: plain string, array of parts, wrapper object with a nested
    /// array, anything else verbatim as opaque. Unrecognized part types are
    /// preserved as opaque blocks, never dropped.
    pub fn classify(
        &self,
        raw: &Value,
        parent_id: &str,
        linker: &mut ToolLinker,
    ) -> Vec<ContentBlock> {
        match raw {
            Value::String(text) => vec![ContentBlock::text(text.clone())],
            Value::Array(parts) => parts
                .iter()
                .map(|part| self.classify_part(part, parent_id, linker))
                .collect(),
            Value::Object(map) => {
                for key in WRAPPER_KEYS {
                    if let Some(Value::Array(parts)) = map.get(*key) {
                        return parts
                            .iter()
                            .map(|part| self.classify_part(part, parent_id, linker))
                            .collect();
                    }
                }
                vec![ContentBlock::opaque(raw.clone())]
            }
            other => vec![ContentBlock::opaque(other.clone())],
        }
    }

    fn classify_part(&self, part: &Value, parent_id: &str, linker: &mut ToolLinker) -> ContentBlock {
        // A bare string part is prose.
        if let Value::String(text) = part {
            return ContentBlock::text(text.clone());
        }

        let Some(map) = part.as_object() else {
            return ContentBlock::opaque(part.clone());
        };
        let Some(part_type) = map.get("type").and_then(Value::as_str) else {
            return ContentBlock::opaque(part.clone());
        };

        if TEXT_PART_TYPES.contains(&part_type) {
            return match map.get("text").and_then(Value::as_str) {
                Some(text) => ContentBlock::text(text),
                None => ContentBlock::opaque(part.clone()),
            };
        }

        if REDACTED_REASONING_PART_TYPES.contains(&part_type) {
            return ContentBlock::redacted_reasoning();
        }

        if REASONING_PART_TYPES.contains(&part_type) {
            let text = map
                .get("thinking")
                .or_else(|| map.get("text"))
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty());
            return match text {
                Some(text) => ContentBlock::reasoning(text),
                // A signature (or encrypted payload) with no readable text:
                // keep the block, tagged redacted, instead of dropping it.
                None => ContentBlock::redacted_reasoning(),
            };
        }

        if INVOCATION_PART_TYPES.contains(&part_type) {
            let Some(name) = first_str(map, TOOL_NAME_KEYS) else {
                return ContentBlock::opaque(part.clone());
            };
            let native_id = first_str(map, NATIVE_ID_KEYS);
            let input = first_value(map, TOOL_INPUT_KEYS).unwrap_or(Value::Null);
            let key = linker.invocation_key(parent_id, name, native_id);
            return ContentBlock::ToolInvocation {
                key,
                name: name.to_string(),
                input,
            };
        }

        if OUTCOME_PART_TYPES.contains(&part_type) {
            let link = linker.outcome_key(OutcomeRef {
                reference: first_str(map, OUTCOME_REF_KEYS),
                tool_name: first_str(map, TOOL_NAME_KEYS),
                parent_id,
                ..Default::default()
            });
            let payload = first_value(map, OUTCOME_PAYLOAD_KEYS).unwrap_or(Value::Null);
            let is_error = map
                .get("is_error")
                .or_else(|| map.get("isError"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            return ContentBlock::ToolOutcome {
                key: link.key,
                payload,
                is_error,
                orphaned: link.orphaned,
            };
        }

        if IMAGE_PART_TYPES.contains(&part_type) {
            if let Some(block) = image_block(map) {
                return block;
            }
        }

        ContentBlock::opaque(part.clone())
    }
}

fn first_str<'a>(map: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| map.get(*key).and_then(Value::as_str))
}

fn first_value(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| map.get(*key).cloned())
}

fn image_block(map: &serde_json::Map<String, Value>) -> Option<ContentBlock> {
    // Nested form: {"type":"image","source":{"media_type":...,"data":...}}
    let source = map.get("source").and_then(Value::as_object).unwrap_or(map);
    let media_type = source
        .get("media_type")
        .or_else(|| source.get("mediaType"))
        .and_then(Value::as_str)?;
    let data = source.get("data").and_then(Value::as_str)?;
    Some(ContentBlock::Image {
        media_type: media_type.to_string(),
        data: data.to_string(),
    })
}
