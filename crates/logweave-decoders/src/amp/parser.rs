use chrono::{DateTime, Utc};
use logweave_types::{ContentBlock, ParsedMessage, Role, SourceFormat};
use serde_json::Value;

use super::schema::*;
use crate::content::BlockClassifier;
use crate::linker::{OutcomeRef, ToolLinker};
use crate::patterns;
use crate::splitter::{ProvisionalMessage, split_message};
use crate::traits::{DecodedTranscript, RecordDecoder};

const DETECT_PREFIX_LINES: usize = 10;

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decoder for Amp thread JSONL exports.
///
/// Messages nest under `message` with `createdAt` timestamps; tool outcomes
/// are whole records with role `toolResult`, referencing the invocation via
/// `toolUseID` when the export kept it.
pub struct AmpDecoder;

impl RecordDecoder for AmpDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Amp
    }

    fn can_decode(&self, sample: &str) -> bool {
        sample
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(DETECT_PREFIX_LINES)
            .any(|line| line.contains("\"message\"") && line.contains("\"createdAt\""))
    }

    fn decode(&self, input: &str) -> DecodedTranscript {
        let classifier = BlockClassifier::new();
        let mut linker = ToolLinker::new();
        let mut transcript = DecodedTranscript::new(SourceFormat::Amp);

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

            let Ok(record) = serde_json::from_value::<AmpRecord>(value) else {
                continue;
            };
            if decode_record(record, row, &classifier, &mut linker, &mut transcript) > 0 {
                transcript.records_consumed += 1;
            }
        }

        transcript
    }
}

fn decode_record(
    record: AmpRecord,
    row: usize,
    classifier: &BlockClassifier,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    if let Some(thread) = &record.thread_id {
        transcript.observe_session_id(thread);
    }
    let Some(timestamp) = record
        .message
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
    else {
        return 0;
    };
    let id = record.id.unwrap_or_else(|| format!("line-{}", row));

    if record.message.role == "toolResult" {
        return decode_tool_result(record.message, id, timestamp, classifier, linker, transcript);
    }

    let role = match record.message.role.as_str() {
        "user" => Role::User,
        _ => Role::Assistant,
    };
    let content = classifier.classify(&record.message.content, &id, linker);

    let role = if role == Role::User
        && content
            .iter()
            .find_map(ContentBlock::text_fragment)
            .is_some_and(patterns::is_interruption)
    {
        Role::Interruption
    } else {
        role
    };

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

fn decode_tool_result(
    message: AmpMessage,
    id: String,
    timestamp: DateTime<Utc>,
    classifier: &BlockClassifier,
    linker: &mut ToolLinker,
    transcript: &mut DecodedTranscript,
) -> usize {
    // `toolUseID` lives on the record envelope, not in the content parts:
    // a metadata-level reference.
    let link = linker.outcome_key(OutcomeRef {
        metadata_reference: message.tool_use_id.as_deref(),
        tool_name: message.tool_name.as_deref(),
        parent_id: &id,
        ..Default::default()
    });

    // The result body is the flattened text of the content parts; exports
    // with non-text payloads keep them verbatim. A scratch linker keeps the
    // real linker's pending state untouched.
    let mut scratch = ToolLinker::new();
    let fragments: Vec<String> = classifier
        .classify(&message.content, &id, &mut scratch)
        .iter()
        .filter_map(|block| block.text_fragment())
        .map(|t| t.trim_end().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let payload = if fragments.is_empty() {
        message.content.clone()
    } else {
        Value::String(fragments.join("\n"))
    };

    transcript.messages.push(ParsedMessage {
        id,
        timestamp,
        role: Role::ToolOutcome,
        content: vec![ContentBlock::ToolOutcome {
            key: link.key,
            payload,
            is_error: message.is_error,
            orphaned: link.orphaned,
        }],
        parent_id: None,
        metadata: None,
    });
    1
}
