use chrono::{DateTime, TimeZone, Utc};
use logweave_types::{ContentBlock, ParsedMessage, Role, SourceFormat};
use serde_json::{Value, json};

use super::schema::ClineRecord;
use crate::linker::{OutcomeRef, ToolLinker};
use crate::traits::{DecodedTranscript, RecordDecoder};

const DETECT_PREFIX_CHARS: usize = 2048;

/// Progress bookkeeping the frontend writes between conversational events;
/// internal markers, dropped.
const INTERNAL_SAY_KINDS: &[&str] = &[
    "api_req_started",
    "api_req_finished",
    "api_req_retried",
    "checkpoint_saved",
];

/// Prompts that resume or close out a task rather than ask the user
/// something conversational.
const META_ASK_KINDS: &[&str] = &["resume_task", "resume_completed_task"];

fn parse_timestamp(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Decoder for Cline UI-message documents.
///
/// The whole log is one JSON array of `{ts, type, say/ask, text}` events.
/// Tool invocations are JSON-encoded strings inside `text` with no native
/// call ids, so every join key here is synthetic.
pub struct ClineDecoder;

impl RecordDecoder for ClineDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Cline
    }

    fn can_decode(&self, sample: &str) -> bool {
        let prefix: String = sample.trim_start().chars().take(DETECT_PREFIX_CHARS).collect();
        prefix.starts_with('[')
            && (prefix.contains("\"say\"") || prefix.contains("\"ask\""))
            && prefix.contains("\"ts\"")
    }

    fn decode(&self, input: &str) -> DecodedTranscript {
        let mut transcript = DecodedTranscript::new(SourceFormat::Cline);

        let Ok(Value::Array(elements)) = serde_json::from_str::<Value>(input) else {
            return transcript;
        };

        let mut linker = ToolLinker::new();
        for (index, element) in elements.iter().enumerate() {
            transcript.records_total += 1;
            transcript.records_parsed += 1;

            let Ok(record) = serde_json::from_value::<ClineRecord>(element.clone()) else {
                continue;
            };
            if decode_record(record, index, &mut linker, &mut transcript) > 0 {
                transcript.records_consumed += 1;
            }
        }

        transcript
    }
}

fn decode_record(
    record: ClineRecord,
    index: usize,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    let Some(timestamp) = parse_timestamp(record.ts) else {
        return 0;
    };
    let id = format!("rec-{}", index);

    let message = match record.kind.as_str() {
        "say" => decode_say(&record, id, timestamp, linker),
        "ask" => decode_ask(&record, id, timestamp),
        _ => None,
    };
    match message {
        Some(message) => {
            transcript.messages.push(message);
            1
        }
        None => 0,
    }
}

fn decode_say(
    record: &ClineRecord,
    id: String,
    timestamp: DateTime<Utc>,
    linker: &mut ToolLinker,
) -> Option<ParsedMessage> {
    let say = record.say.as_deref().unwrap_or("text");
    if INTERNAL_SAY_KINDS.contains(&say) {
        return None;
    }
    let text = record.text.as_deref().unwrap_or("");

    let (role, content, metadata) = match say {
        "text" | "completion_result" => {
            if text.trim().is_empty() {
                return None;
            }
            (Role::Assistant, vec![ContentBlock::text(text)], None)
        }
        "user_feedback" => {
            if text.trim().is_empty() {
                return None;
            }
            (Role::User, vec![ContentBlock::text(text)], None)
        }
        "reasoning" => {
            if text.trim().is_empty() {
                return None;
            }
            (Role::Assistant, vec![ContentBlock::reasoning(text)], None)
        }
        "error" => {
            if text.trim().is_empty() {
                return None;
            }
            (
                Role::System,
                vec![ContentBlock::text(text)],
                Some(json!({"level": "error"})),
            )
        }
        "tool" => {
            // `text` is a JSON-encoded descriptor like
            // {"tool":"readFile","path":"src/main.rs"}.
            let descriptor: Value =
                serde_json::from_str(text).unwrap_or(Value::String(text.to_string()));
            let name = descriptor
                .get("tool")
                .and_then(Value::as_str)
                .unwrap_or("tool")
                .to_string();
            let key = linker.invocation_key(&id, &name, None);
            (
                Role::ToolInvocation,
                vec![ContentBlock::ToolInvocation {
                    key,
                    name,
                    input: descriptor,
                }],
                None,
            )
        }
        "command" => {
            let key = linker.invocation_key(&id, "execute_command", None);
            (
                Role::ToolInvocation,
                vec![ContentBlock::ToolInvocation {
                    key,
                    name: "execute_command".to_string(),
                    input: json!({"command": text}),
                }],
                None,
            )
        }
        "command_output" => {
            let link = linker.outcome_key(OutcomeRef {
                tool_name: Some("execute_command"),
                parent_id: &id,
                ..Default::default()
            });
            (
                Role::ToolOutcome,
                vec![ContentBlock::ToolOutcome {
                    key: link.key,
                    payload: Value::String(text.to_string()),
                    is_error: false,
                    orphaned: link.orphaned,
                }],
                None,
            )
        }
        _ => return None,
    };

    Some(ParsedMessage {
        id,
        timestamp,
        role,
        content,
        parent_id: None,
        metadata,
    })
}

fn decode_ask(
    record: &ClineRecord,
    id: String,
    timestamp: DateTime<Utc>,
) -> Option<ParsedMessage> {
    let ask = record.ask.as_deref()?;
    let text = record.text.as_deref().unwrap_or("");
    if text.trim().is_empty() {
        return None;
    }

    let role = if META_ASK_KINDS.contains(&ask) {
        Role::Meta
    } else {
        // followup questions, command approvals: the assistant addressing
        // the user.
        Role::Assistant
    };

    Some(ParsedMessage {
        id,
        timestamp,
        role,
        content: vec![ContentBlock::text(text)],
        parent_id: None,
        metadata: Some(json!({"ask": ask})),
    })
}
