use chrono::{DateTime, Utc};
use logweave_types::{ContentBlock, ParsedMessage, Role, SourceFormat};
use serde_json::{Value, json};

use super::schema::*;
use crate::content::BlockClassifier;
use crate::linker::ToolLinker;
use crate::patterns;
use crate::splitter::{ProvisionalMessage, split_message};
use crate::traits::{DecodedTranscript, RecordDecoder};

const DETECT_PREFIX_LINES: usize = 10;

/// Parse Claude Code timestamps (RFC 3339)
fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decoder for Claude Code JSONL transcripts.
///
/// camelCase records discriminated by `type`; content is a string or a
/// block array; tool results ride along inside user records, referencing
/// the invocation via `tool_use_id`.
pub struct ClaudeCodeDecoder;

impl RecordDecoder for ClaudeCodeDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::ClaudeCode
    }

    fn can_decode(&self, sample: &str) -> bool {
        sample
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(DETECT_PREFIX_LINES)
            .any(|line| {
                line.contains("\"parentUuid\"")
                    || (line.contains("\"sessionId\"") && line.contains("\"isSidechain\""))
            })
    }

    fn decode(&self, input: &str) -> DecodedTranscript {
        let classifier = BlockClassifier::new();
        let mut linker = ToolLinker::new();
        let mut transcript = DecodedTranscript::new(SourceFormat::ClaudeCode);

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

            let Ok(record) = serde_json::from_value::<ClaudeRecord>(value) else {
                continue;
            };
            let emitted = match record {
                ClaudeRecord::User(record) => {
                    decode_conversation(record, Role::User, &classifier, &mut linker, &mut transcript)
                }
                ClaudeRecord::Assistant(record) => decode_conversation(
                    record,
                    Role::Assistant,
                    &classifier,
                    &mut linker,
                    &mut transcript,
                ),
                ClaudeRecord::System(record) => decode_system(record, &mut transcript),
                ClaudeRecord::Summary(record) => decode_summary(record, &mut transcript),
                ClaudeRecord::Unknown => 0,
            };
            if emitted > 0 {
                transcript.records_consumed += 1;
            }
        }

        transcript
    }
}

fn decode_conversation(
    record: ConversationRecord,
    base_role: Role,
    classifier: &BlockClassifier,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    if let Some(id) = &record.session_id {
        transcript.observe_session_id(id);
    }
    if let Some(cwd) = &record.cwd {
        transcript.observe_metadata("cwd", json!(cwd));
    }
    if let Some(version) = &record.version {
        transcript.observe_metadata("tool_version", json!(version));
    }
    if let Some(branch) = &record.git_branch {
        transcript.observe_metadata("git_branch", json!(branch));
    }
    if let Some(model) = &record.message.model {
        transcript.observe_metadata("model", json!(model));
    }

    // Internal marker records are dropped, not represented.
    if record.is_meta {
        return 0;
    }
    let Some(timestamp) = parse_timestamp(&record.timestamp) else {
        return 0;
    };

    let content = classifier.classify(&record.message.content, &record.uuid, linker);

    let mut role = base_role;
    let mut command = None;
    if base_role == Role::User
        && let Some(text) = content.iter().find_map(ContentBlock::text_fragment)
    {
        if patterns::is_interruption(text) {
            role = Role::Interruption;
        } else if let Some(invocation) = patterns::extract_command(text) {
            role = Role::Command;
            command = Some(json!({
                "name": invocation.name,
                "args": invocation.args,
            }));
        }
    }

    let messages = split_message(ProvisionalMessage {
        id: record.uuid.clone(),
        timestamp,
        role,
        content,
        parent_id: record.parent_uuid.clone(),
        metadata: record_metadata(&record, command),
    });
    let emitted = messages.len();
    transcript.messages.extend(messages);
    emitted
}

fn record_metadata(record: &ConversationRecord, command: Option<Value>) -> Option<Value> {
    let mut map = serde_json::Map::new();
    if let Some(model) = &record.message.model {
        map.insert("model".to_string(), json!(model));
    }
    if let Some(usage) = &record.message.usage {
        map.insert("usage".to_string(), usage.clone());
    }
    if record.is_sidechain {
        map.insert("is_sidechain".to_string(), json!(true));
    }
    if let Some(command) = command {
        map.insert("command".to_string(), command);
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn decode_system(record: SystemRecord, transcript: &mut DecodedTranscript) -> usize {
    if let Some(id) = &record.session_id {
        transcript.observe_session_id(id);
    }
    if record.is_meta {
        return 0;
    }
    let Some(timestamp) = record.timestamp.as_deref().and_then(parse_timestamp) else {
        return 0;
    };
    let Some(content) = record.content.filter(|c| !c.trim().is_empty()) else {
        return 0;
    };
    let id = record
        .uuid
        .unwrap_or_else(|| format!("system-{}", timestamp.timestamp_millis()));

    let (role, metadata) = if record.subtype.as_deref() == Some("local_command") {
        // Content is "/command args".
        let (name, args) = match content.find(' ') {
            Some(space) => (
                content[..space].to_string(),
                Some(content[space + 1..].to_string()),
            ),
            None => (content.clone(), None),
        };
        (
            Role::Command,
            Some(json!({"command": {"name": name, "args": args}})),
        )
    } else {
        (
            Role::System,
            record.level.map(|level| json!({"level": level})),
        )
    };

    transcript.messages.push(ParsedMessage {
        id,
        timestamp,
        role,
        content: vec![ContentBlock::text(content)],
        parent_id: None,
        metadata,
    });
    1
}

fn decode_summary(record: SummaryRecord, transcript: &mut DecodedTranscript) -> usize {
    if let Some(id) = &record.session_id {
        transcript.observe_session_id(id);
    }
    // Summary records usually carry no timestamp; those are dropped like any
    // other untimestamped record.
    let Some(timestamp) = record.timestamp.as_deref().and_then(parse_timestamp) else {
        return 0;
    };
    let Some(summary) = record.summary.filter(|s| !s.trim().is_empty()) else {
        return 0;
    };

    transcript.messages.push(ParsedMessage {
        id: record
            .leaf_uuid
            .clone()
            .unwrap_or_else(|| format!("summary-{}", timestamp.timestamp_millis())),
        timestamp,
        role: Role::Meta,
        content: vec![ContentBlock::text(summary)],
        parent_id: record.leaf_uuid,
        metadata: None,
    });
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> DecodedTranscript {
        ClaudeCodeDecoder.decode(input)
    }

    #[test]
    fn user_text_line_becomes_one_user_message() {
        let input = r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"s1","timestamp":"2025-03-14T09:00:00Z","isSidechain":false,"message":{"role":"user","content":"Fix the bug"}}"#;
        let transcript = decode(input);

        assert_eq!(transcript.session_id.as_deref(), Some("s1"));
        assert_eq!(transcript.messages.len(), 1);
        assert_eq!(transcript.messages[0].role, Role::User);
        assert_eq!(transcript.messages[0].flattened_text(), "Fix the bug");
        assert_eq!(transcript.records_consumed, 1);
    }

    #[test]
    fn assistant_record_with_prose_and_two_tool_uses_splits() {
        let input = r#"{"type":"assistant","uuid":"a1","parentUuid":"u1","sessionId":"s1","timestamp":"2025-03-14T09:00:05Z","message":{"role":"assistant","model":"claude-sonnet-4-5","content":[{"type":"text","text":"Running checks."},{"type":"tool_use","id":"toolu_1","name":"Bash","input":{"command":"ls"}},{"type":"tool_use","id":"toolu_2","name":"Bash","input":{"command":"pwd"}}]}}"#;
        let transcript = decode(input);

        assert_eq!(transcript.messages.len(), 3);
        assert_eq!(transcript.messages[0].role, Role::Assistant);
        assert_eq!(transcript.messages[0].id, "a1");
        assert_eq!(transcript.messages[1].role, Role::ToolInvocation);
        assert_eq!(transcript.messages[1].id, "a1-1");
        assert_eq!(transcript.messages[2].id, "a1-2");
    }

    #[test]
    fn tool_result_in_user_record_links_to_invocation() {
        let input = r#"{"type":"assistant","uuid":"a1","parentUuid":"u1","sessionId":"s1","timestamp":"2025-03-14T09:00:05Z","message":{"role":"assistant","content":[{"type":"tool_use","id":"toolu_1","name":"Bash","input":{"command":"ls"}}]}}
{"type":"user","uuid":"u2","parentUuid":"a1","sessionId":"s1","timestamp":"2025-03-14T09:00:07Z","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_1","content":"README.md","is_error":false}]}}"#;
        let transcript = decode(input);

        assert_eq!(transcript.messages.len(), 2);
        assert_eq!(transcript.messages[1].role, Role::ToolOutcome);
        match &transcript.messages[1].content[0] {
            ContentBlock::ToolOutcome { key, orphaned, .. } => {
                assert_eq!(key.as_str(), "toolu_1");
                assert!(!orphaned);
            }
            other => panic!("expected tool outcome, got {:?}", other),
        }
    }

    #[test]
    fn meta_records_are_dropped_but_counted_as_parsed() {
        let input = r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2025-03-14T09:00:00Z","isMeta":true,"message":{"role":"user","content":"<local-command-caveat>"}}"#;
        let transcript = decode(input);

        assert!(transcript.messages.is_empty());
        assert_eq!(transcript.records_parsed, 1);
        assert_eq!(transcript.records_consumed, 0);
    }

    #[test]
    fn interruption_marker_changes_role() {
        let input = r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2025-03-14T09:00:00Z","message":{"role":"user","content":"[Request interrupted by user]"}}"#;
        let transcript = decode(input);
        assert_eq!(transcript.messages[0].role, Role::Interruption);
    }

    #[test]
    fn command_tags_change_role_and_record_the_command() {
        let input = r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2025-03-14T09:00:00Z","message":{"role":"user","content":"<command-name>/commit</command-name>\n<command-args>--amend</command-args>"}}"#;
        let transcript = decode(input);

        assert_eq!(transcript.messages[0].role, Role::Command);
        let metadata = transcript.messages[0].metadata.as_ref().unwrap();
        assert_eq!(metadata["command"]["name"], "/commit");
        assert_eq!(metadata["command"]["args"], "--amend");
    }

    #[test]
    fn malformed_lines_are_dropped_silently() {
        let input = "not json at all\n{\"type\":\"user\",\"uuid\":\"u1\",\"sessionId\":\"s1\",\"timestamp\":\"2025-03-14T09:00:00Z\",\"message\":{\"role\":\"user\",\"content\":\"hi\"}}";
        let transcript = decode(input);

        assert_eq!(transcript.records_total, 2);
        assert_eq!(transcript.records_parsed, 1);
        assert_eq!(transcript.messages.len(), 1);
    }

    #[test]
    fn detection_requires_claude_shaped_fields() {
        assert!(ClaudeCodeDecoder.can_decode(r#"{"parentUuid":null,"uuid":"u1"}"#));
        assert!(!ClaudeCodeDecoder.can_decode(r#"{"type":"response_item","payload":{}}"#));
    }
}
