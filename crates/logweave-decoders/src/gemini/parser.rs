use chrono::{DateTime, Utc};
use logweave_types::{ContentBlock, ParsedMessage, Role, SourceFormat};
use serde_json::{Value, json};

use super::schema::*;
use crate::linker::{OutcomeRef, ToolLinker};
use crate::splitter::{ProvisionalMessage, split_message};
use crate::traits::{DecodedTranscript, RecordDecoder};

const DETECT_PREFIX_CHARS: usize = 2048;

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decoder for Gemini CLI session documents.
///
/// The whole session is one JSON value with an embedded `messages` array;
/// the array elements are this format's record sequence. Assistant records
/// fold reasoning and tool activity into nested `thoughts[]`/`toolCalls[]`
/// side channels that are unfolded here.
pub struct GeminiDecoder;

impl RecordDecoder for GeminiDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Gemini
    }

    fn can_decode(&self, sample: &str) -> bool {
        let prefix: String = sample.trim_start().chars().take(DETECT_PREFIX_CHARS).collect();
        prefix.starts_with('{')
            && prefix.contains("\"messages\"")
            && (prefix.contains("\"sessionId\"") || prefix.contains("\"projectHash\""))
    }

    fn decode(&self, input: &str) -> DecodedTranscript {
        let mut transcript = DecodedTranscript::new(SourceFormat::Gemini);

        let Ok(session) = serde_json::from_str::<GeminiSession>(input) else {
            // The document itself is unreadable: zero parseable records.
            return transcript;
        };
        if let Some(id) = &session.session_id {
            transcript.observe_session_id(id);
        }
        if let Some(hash) = &session.project_hash {
            transcript.observe_metadata("project_hash", json!(hash));
        }

        let mut linker = ToolLinker::new();
        for element in &session.messages {
            transcript.records_total += 1;
            transcript.records_parsed += 1;

            let Ok(message) = serde_json::from_value::<GeminiMessage>(element.clone()) else {
                continue;
            };
            let emitted = match message {
                GeminiMessage::User(user) => decode_user(user, &mut transcript),
                GeminiMessage::Gemini(assistant) => {
                    decode_assistant(assistant, &mut linker, &mut transcript)
                }
                GeminiMessage::Info(info) => decode_info(info, &mut transcript),
                GeminiMessage::Unknown => 0,
            };
            if emitted > 0 {
                transcript.records_consumed += 1;
            }
        }

        transcript
    }
}

fn decode_user(user: UserMessage, transcript: &mut DecodedTranscript) -> usize {
    let Some(timestamp) = parse_timestamp(&user.timestamp) else {
        return 0;
    };
    if user.content.trim().is_empty() {
        return 0;
    }
    transcript.messages.push(ParsedMessage {
        id: user.id,
        timestamp,
        role: Role::User,
        content: vec![ContentBlock::text(user.content)],
        parent_id: None,
        metadata: None,
    });
    1
}

fn decode_assistant(
    assistant: AssistantMessage,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    let Some(timestamp) = parse_timestamp(&assistant.timestamp) else {
        return 0;
    };
    if let Some(model) = &assistant.model {
        transcript.observe_metadata("model", json!(model));
    }

    let mut content = Vec::new();
    for thought in &assistant.thoughts {
        content.push(ContentBlock::reasoning(format!(
            "{}: {}",
            thought.subject, thought.description
        )));
    }
    for call in &assistant.tool_calls {
        let key = linker.invocation_key(&assistant.id, &call.name, Some(call.id.as_str()));
        content.push(ContentBlock::ToolInvocation {
            key,
            name: call.name.clone(),
            input: call.args.clone(),
        });

        // The entry doubles as the outcome once a result is recorded.
        if !call.result.is_empty()
            || matches!(call.status.as_deref(), Some("success") | Some("error"))
        {
            let link = linker.outcome_key(OutcomeRef {
                reference: Some(call.id.as_str()),
                parent_id: &assistant.id,
                ..Default::default()
            });
            let payload = match &call.result_display {
                Some(display) => Value::String(display.clone()),
                None => Value::Array(call.result.clone()),
            };
            content.push(ContentBlock::ToolOutcome {
                key: link.key,
                payload,
                is_error: call.status.as_deref() == Some("error"),
                orphaned: link.orphaned,
            });
        }
    }
    if !assistant.content.trim().is_empty() {
        content.push(ContentBlock::text(assistant.content.clone()));
    }

    let metadata = assistant_metadata(&assistant);
    let messages = split_message(ProvisionalMessage {
        id: assistant.id,
        timestamp,
        role: Role::Assistant,
        content,
        parent_id: None,
        metadata,
    });
    let emitted = messages.len();
    transcript.messages.extend(messages);
    emitted
}

fn assistant_metadata(assistant: &AssistantMessage) -> Option<Value> {
    let mut map = serde_json::Map::new();
    if let Some(model) = &assistant.model {
        map.insert("model".to_string(), json!(model));
    }
    if let Some(tokens) = &assistant.tokens {
        map.insert(
            "usage".to_string(),
            json!({
                "input": tokens.input,
                "output": tokens.output,
                "cached": tokens.cached,
                "thoughts": tokens.thoughts,
                "tool": tokens.tool,
                "total": tokens.total,
            }),
        );
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn decode_info(info: InfoMessage, transcript: &mut DecodedTranscript) -> usize {
    let Some(timestamp) = parse_timestamp(&info.timestamp) else {
        return 0;
    };
    if info.content.trim().is_empty() {
        return 0;
    }
    transcript.messages.push(ParsedMessage {
        id: info.id,
        timestamp,
        role: Role::System,
        content: vec![ContentBlock::text(info.content)],
        parent_id: None,
        metadata: Some(json!({"level": "info"})),
    });
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = r#"{
        "sessionId": "g-123",
        "projectHash": "abc9",
        "startTime": "2025-03-14T09:00:00Z",
        "lastUpdated": "2025-03-14T09:05:00Z",
        "messages": [
            {"type": "user", "id": "u1", "timestamp": "2025-03-14T09:00:00Z", "content": "List the files"},
            {"type": "gemini", "id": "a1", "timestamp": "2025-03-14T09:00:04Z", "content": "Done.",
             "model": "gemini-2.5-pro",
             "thoughts": [{"subject": "Plan", "description": "list directory", "timestamp": "2025-03-14T09:00:02Z"}],
             "toolCalls": [{"id": "tc-1", "name": "list_directory", "args": {"path": "."},
                            "result": [{"functionResponse": {"id": "tc-1", "name": "list_directory", "response": {"output": "README.md"}}}],
                            "status": "success", "resultDisplay": "README.md"}],
             "tokens": {"input": 900, "output": 40, "cached": 300, "thoughts": 12, "tool": 5, "total": 957}},
            {"type": "info", "id": "i1", "timestamp": "2025-03-14T09:00:05Z", "content": "Model switched"}
        ]
    }"#;

    #[test]
    fn document_messages_are_the_record_sequence() {
        let transcript = GeminiDecoder.decode(SESSION);
        assert_eq!(transcript.session_id.as_deref(), Some("g-123"));
        assert_eq!(transcript.records_total, 3);
        assert_eq!(transcript.records_consumed, 3);
    }

    #[test]
    fn assistant_side_channels_unfold_into_split_messages() {
        let transcript = GeminiDecoder.decode(SESSION);
        // user, assistant prose (reasoning + text), invocation, outcome, info
        assert_eq!(transcript.messages.len(), 5);

        let roles: Vec<Role> = transcript.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::ToolInvocation,
                Role::ToolOutcome,
                Role::System,
            ]
        );

        // Invocation and outcome share the native entry id.
        assert_eq!(
            transcript.messages[2].content[0].join_key().unwrap().as_str(),
            "tc-1"
        );
        assert_eq!(
            transcript.messages[3].content[0].join_key().unwrap().as_str(),
            "tc-1"
        );
    }

    #[test]
    fn usage_sidecar_reports_cached_tokens() {
        let transcript = GeminiDecoder.decode(SESSION);
        let assistant = &transcript.messages[1];
        let usage = &assistant.metadata.as_ref().unwrap()["usage"];
        assert_eq!(usage["cached"], 300);
    }

    #[test]
    fn unreadable_document_yields_zero_parsed_records() {
        let transcript = GeminiDecoder.decode("{ not json");
        assert_eq!(transcript.records_parsed, 0);
        assert!(transcript.messages.is_empty());
    }

    #[test]
    fn corrupt_element_drops_alone() {
        let input = r#"{"sessionId": "g-1", "messages": [
            {"type": "user", "id": "u1", "timestamp": "2025-03-14T09:00:00Z", "content": "hi"},
            {"type": "user", "id": "u2", "content": "no timestamp field"}
        ]}"#;
        let transcript = GeminiDecoder.decode(input);
        assert_eq!(transcript.records_total, 2);
        assert_eq!(transcript.messages.len(), 1);
    }
}
