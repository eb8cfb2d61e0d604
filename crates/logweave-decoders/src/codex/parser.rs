use chrono::{DateTime, Utc};
use logweave_types::{ContentBlock, ParsedMessage, Role, SourceFormat};
use serde_json::{Value, json};

use super::schema::*;
use crate::content::BlockClassifier;
use crate::linker::{OutcomeRef, ToolLinker};
use crate::patterns;
use crate::splitter::{ProvisionalMessage, split_message};
use crate::traits::{DecodedTranscript, RecordDecoder};

const DETECT_PREFIX_LINES: usize = 10;

/// Context payloads the frontend injects as user messages. They are session
/// bookkeeping, not conversation.
const CONTEXT_WRAPPER_PREFIXES: &[&str] = &[
    "<user_instructions>",
    "<environment_context>",
    "<turn_context>",
];

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decoder for Codex CLI JSONL transcripts.
///
/// Every line is an envelope `{timestamp, type, payload}`; tool calls are
/// separate `function_call` / `function_call_output` records correlated by
/// `call_id`; token counts arrive as trailing `event_msg` sidecars.
pub struct CodexDecoder;

impl RecordDecoder for CodexDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Codex
    }

    fn can_decode(&self, sample: &str) -> bool {
        sample
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(DETECT_PREFIX_LINES)
            .any(|line| {
                line.contains("\"session_meta\"")
                    || line.contains("\"response_item\"")
                    || line.contains("\"event_msg\"")
            })
    }

    fn decode(&self, input: &str) -> DecodedTranscript {
        let classifier = BlockClassifier::new();
        let mut linker = ToolLinker::new();
        let mut transcript = DecodedTranscript::new(SourceFormat::Codex);
        // Codex repeats token_count envelopes with identical usage values.
        let mut last_usage: Option<(u64, u64, u64)> = None;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            transcript.records_total += 1;
            let row = transcript.records_total - 1;

            let Ok(value) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            transcript.records_parsed += 1;

            let Ok(record) = serde_json::from_value::<CodexRecord>(value) else {
                continue;
            };
            let consumed = match record {
                CodexRecord::SessionMeta(meta) => {
                    decode_session_meta(meta, &mut transcript);
                    true
                }
                CodexRecord::TurnContext(context) => {
                    if let Some(model) = &context.payload.model {
                        transcript.observe_metadata("model", json!(model));
                    }
                    if let Some(cwd) = &context.payload.cwd {
                        transcript.observe_metadata("cwd", json!(cwd));
                    }
                    false
                }
                CodexRecord::ResponseItem(item) => {
                    decode_response_item(item, row, &classifier, &mut linker, &mut transcript) > 0
                }
                CodexRecord::EventMsg(event) => match event.payload {
                    EventMsgPayload::TokenCount(count) => {
                        attach_token_count(count, &mut last_usage, &mut transcript)
                    }
                    EventMsgPayload::Unknown => false,
                },
                CodexRecord::Unknown => false,
            };
            if consumed {
                transcript.records_consumed += 1;
            }
        }

        transcript
    }
}

fn decode_session_meta(record: SessionMetaRecord, transcript: &mut DecodedTranscript) {
    transcript.observe_session_id(&record.payload.id);
    if let Some(cwd) = &record.payload.cwd {
        transcript.observe_metadata("cwd", json!(cwd));
    }
    if let Some(originator) = &record.payload.originator {
        transcript.observe_metadata("originator", json!(originator));
    }
    if let Some(version) = &record.payload.cli_version {
        transcript.observe_metadata("tool_version", json!(version));
    }
}

fn decode_response_item(
    record: ResponseItemRecord,
    row: usize,
    classifier: &BlockClassifier,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    let Some(timestamp) = parse_timestamp(&record.timestamp) else {
        return 0;
    };
    let id = format!("row-{}", row);

    match record.payload {
        ResponseItemPayload::Message { role, content } => {
            let content = classifier.classify(&content, &id, linker);
            let role = message_role(&role, &content);
            let messages = split_message(ProvisionalMessage {
                id,
                timestamp,
                role,
                content,
                parent_id: None,
                metadata: None,
            });
            let emitted = messages.len();
            transcript.messages.extend(messages);
            emitted
        }

        ResponseItemPayload::Reasoning(reasoning) => {
            let Some(block) = reasoning_block(&reasoning) else {
                return 0;
            };
            transcript.messages.push(ParsedMessage {
                id,
                timestamp,
                role: Role::Assistant,
                content: vec![block],
                parent_id: None,
                metadata: None,
            });
            1
        }

        ResponseItemPayload::FunctionCall(call) => {
            let key = linker.invocation_key(&id, &call.name, Some(call.call_id.as_str()));
            transcript.messages.push(ParsedMessage {
                id,
                timestamp,
                role: Role::ToolInvocation,
                content: vec![ContentBlock::ToolInvocation {
                    key,
                    name: call.name,
                    input: parse_json_arguments(call.arguments),
                }],
                parent_id: None,
                metadata: None,
            });
            1
        }

        ResponseItemPayload::FunctionCallOutput(output) => {
            let link = linker.outcome_key(OutcomeRef {
                reference: Some(output.call_id.as_str()),
                parent_id: &id,
                ..Default::default()
            });
            let is_error = patterns::extract_exit_code(&output.output)
                .map(|code| code != 0)
                .unwrap_or(false);
            transcript.messages.push(ParsedMessage {
                id,
                timestamp,
                role: Role::ToolOutcome,
                content: vec![ContentBlock::ToolOutcome {
                    key: link.key,
                    payload: Value::String(output.output),
                    is_error,
                    orphaned: link.orphaned,
                }],
                parent_id: None,
                metadata: None,
            });
            1
        }

        ResponseItemPayload::Unknown => 0,
    }
}

fn message_role(raw_role: &str, content: &[ContentBlock]) -> Role {
    if raw_role != "user" {
        return Role::Assistant;
    }
    if let Some(text) = content.iter().find_map(ContentBlock::text_fragment) {
        let trimmed = text.trim_start();
        if CONTEXT_WRAPPER_PREFIXES
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
        {
            return Role::Meta;
        }
        if patterns::is_interruption(text) {
            return Role::Interruption;
        }
    }
    Role::User
}

fn reasoning_block(reasoning: &ReasoningPayload) -> Option<ContentBlock> {
    let mut text = String::new();
    for summary in &reasoning.summary {
        if let SummaryText::SummaryText { text: fragment } = summary {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(fragment);
        }
    }
    if text.is_empty()
        && let Some(content) = &reasoning.content
    {
        text.push_str(content);
    }

    if !text.trim().is_empty() {
        Some(ContentBlock::reasoning(text))
    } else if reasoning.encrypted_content.is_some() {
        // Encrypted trace with no visible summary: preserved, not dropped.
        Some(ContentBlock::redacted_reasoning())
    } else {
        None
    }
}

/// Arguments are JSON encoded as a string; fall back to the raw string when
/// a crashed process truncated them.
fn parse_json_arguments(arguments: String) -> Value {
    serde_json::from_str(&arguments).unwrap_or(Value::String(arguments))
}

fn attach_token_count(
    count: TokenCountPayload,
    last_usage: &mut Option<(u64, u64, u64)>,
    transcript: &mut DecodedTranscript,
) -> bool {
    let Some(info) = count.info else {
        return false;
    };
    let usage = info.last_token_usage;
    let triple = (usage.input_tokens, usage.output_tokens, usage.total_tokens);
    if *last_usage == Some(triple) {
        return false;
    }
    *last_usage = Some(triple);

    // Attach to the most recent generation message.
    let Some(message) = transcript
        .messages
        .iter_mut()
        .rev()
        .find(|m| matches!(m.role, Role::Assistant | Role::ToolInvocation))
    else {
        return false;
    };
    let usage_value = json!({
        "input_tokens": usage.input_tokens,
        "cached_input_tokens": usage.cached_input_tokens,
        "output_tokens": usage.output_tokens,
        "reasoning_output_tokens": usage.reasoning_output_tokens,
        "total_tokens": usage.total_tokens,
    });
    match message.metadata {
        Some(Value::Object(ref mut map)) => {
            map.insert("usage".to_string(), usage_value);
        }
        _ => {
            message.metadata = Some(json!({ "usage": usage_value }));
        }
    }
    true
}
