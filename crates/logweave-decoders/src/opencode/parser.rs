use chrono::{DateTime, TimeZone, Utc};
use logweave_types::{ContentBlock, Role, SourceFormat};
use serde_json::{Value, json};

use super::schema::*;
use crate::linker::{OutcomeRef, ToolLinker};
use crate::splitter::{ProvisionalMessage, split_message};
use crate::traits::{DecodedTranscript, RecordDecoder};

const DETECT_PREFIX_LINES: usize = 10;

fn parse_timestamp(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Decoder for OpenCode message-log JSONL.
///
/// Each line is one message with epoch-millisecond `time.created` and a
/// `parts` array; `tool` parts carry the call and its result together in
/// `state`, so one part can unfold into an invocation and an outcome.
pub struct OpenCodeDecoder;

impl RecordDecoder for OpenCodeDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::OpenCode
    }

    fn can_decode(&self, sample: &str) -> bool {
        sample
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(DETECT_PREFIX_LINES)
            .any(|line| line.contains("\"sessionID\"") && line.contains("\"parts\""))
    }

    fn decode(&self, input: &str) -> DecodedTranscript {
        let mut linker = ToolLinker::new();
        let mut transcript = DecodedTranscript::new(SourceFormat::OpenCode);

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            transcript.records_total += 1;

            let Ok(value) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            transcript.records_parsed += 1;

            let Ok(message) = serde_json::from_value::<OpenCodeMessage>(value) else {
                continue;
            };
            if decode_message(message, &mut linker, &mut transcript) > 0 {
                transcript.records_consumed += 1;
            }
        }

        transcript
    }
}

fn decode_message(
    message: OpenCodeMessage,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    if let Some(session) = &message.session_id {
        transcript.observe_session_id(session);
    }
    if let Some(model) = &message.model_id {
        transcript.observe_metadata("model", json!(model));
    }
    if let Some(provider) = &message.provider_id {
        transcript.observe_metadata("provider", json!(provider));
    }
    let Some(timestamp) = parse_timestamp(message.time.created) else {
        return 0;
    };

    let role = match message.role.as_str() {
        "user" => Role::User,
        _ => Role::Assistant,
    };

    let mut content = Vec::new();
    for raw_part in &message.parts {
        let Ok(part) = serde_json::from_value::<OpenCodePart>(raw_part.clone()) else {
            content.push(ContentBlock::opaque(raw_part.clone()));
            continue;
        };
        match part {
            OpenCodePart::Text { text } => content.push(ContentBlock::text(text)),
            OpenCodePart::Reasoning { text } => {
                match text.filter(|t| !t.trim().is_empty()) {
                    Some(text) => content.push(ContentBlock::reasoning(text)),
                    None => content.push(ContentBlock::redacted_reasoning()),
                }
            }
            OpenCodePart::Tool(tool) => unfold_tool_part(tool, &message.id, linker, &mut content),
            OpenCodePart::Unknown => content.push(ContentBlock::opaque(raw_part.clone())),
        }
    }

    let messages = split_message(ProvisionalMessage {
        id: message.id,
        timestamp,
        role,
        content,
        parent_id: None,
        metadata: message.model_id.as_ref().map(|m| json!({"model": m})),
    });
    let emitted = messages.len();
    transcript.messages.extend(messages);
    emitted
}

fn unfold_tool_part(
    tool: ToolPart,
    parent_id: &str,
    linker: &mut ToolLinker,
    content: &mut Vec<ContentBlock>,
) {
    let (status, input, output, error) = match tool.state {
        Some(state) => (state.status, state.input, state.output, state.error),
        None => (None, None, None, None),
    };

    let key = linker.invocation_key(parent_id, &tool.tool, tool.call_id.as_deref());
    content.push(ContentBlock::ToolInvocation {
        key,
        name: tool.tool.clone(),
        input: input.unwrap_or(Value::Null),
    });

    let finished = matches!(status.as_deref(), Some("completed") | Some("error"));
    if finished || output.is_some() || error.is_some() {
        let link = linker.outcome_key(OutcomeRef {
            reference: tool.call_id.as_deref(),
            tool_name: Some(tool.tool.as_str()),
            parent_id,
            ..Default::default()
        });
        let is_error = status.as_deref() == Some("error") || error.is_some();
        let payload = match (output, error) {
            (Some(output), _) => output,
            (None, Some(error)) => Value::String(error),
            (None, None) => Value::Null,
        };
        content.push(ContentBlock::ToolOutcome {
            key: link.key,
            payload,
            is_error,
            orphaned: link.orphaned,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> DecodedTranscript {
        OpenCodeDecoder.decode(input)
    }

    #[test]
    fn epoch_millisecond_timestamps_parse() {
        let input = r#"{"id":"msg_1","sessionID":"ses_9","role":"user","time":{"created":1741942800000},"parts":[{"type":"text","text":"hello"}]}"#;
        let transcript = decode(input);
        assert_eq!(transcript.messages.len(), 1);
        assert_eq!(
            transcript.messages[0].timestamp.timestamp_millis(),
            1741942800000
        );
    }

    #[test]
    fn completed_tool_part_unfolds_into_invocation_and_outcome() {
        let input = r#"{"id":"msg_2","sessionID":"ses_9","role":"assistant","time":{"created":1741942805000},"parts":[{"type":"text","text":"done"},{"type":"tool","callID":"call_3","tool":"bash","state":{"status":"completed","input":{"command":"ls"},"output":"README.md"}}]}"#;
        let transcript = decode(input);

        assert_eq!(transcript.messages.len(), 3);
        assert_eq!(transcript.messages[1].role, Role::ToolInvocation);
        assert_eq!(transcript.messages[2].role, Role::ToolOutcome);
        assert_eq!(
            transcript.messages[1].content[0].join_key(),
            transcript.messages[2].content[0].join_key()
        );
    }

    #[test]
    fn running_tool_part_emits_only_the_invocation() {
        let input = r#"{"id":"msg_3","sessionID":"ses_9","role":"assistant","time":{"created":1741942806000},"parts":[{"type":"tool","callID":"call_4","tool":"bash","state":{"status":"running","input":{"command":"sleep 60"}}}]}"#;
        let transcript = decode(input);
        assert_eq!(transcript.messages.len(), 1);
        assert_eq!(transcript.messages[0].role, Role::ToolInvocation);
    }

    #[test]
    fn unknown_part_types_survive_as_opaque() {
        let input = r#"{"id":"msg_4","sessionID":"ses_9","role":"assistant","time":{"created":1741942807000},"parts":[{"type":"step-start"},{"type":"text","text":"hi"}]}"#;
        let transcript = decode(input);

        assert_eq!(transcript.messages.len(), 1);
        assert!(matches!(
            transcript.messages[0].content[0],
            ContentBlock::Opaque { .. }
        ));
    }

    #[test]
    fn error_state_marks_the_outcome() {
        let input = r#"{"id":"msg_5","sessionID":"ses_9","role":"assistant","time":{"created":1741942808000},"parts":[{"type":"tool","callID":"call_5","tool":"bash","state":{"status":"error","input":{},"error":"command not found"}}]}"#;
        let transcript = decode(input);
        match &transcript.messages[1].content[0] {
            ContentBlock::ToolOutcome {
                is_error, payload, ..
            } => {
                assert!(is_error);
                assert_eq!(payload, &Value::String("command not found".to_string()));
            }
            other => panic!("expected outcome, got {:?}", other),
        }
    }
}
