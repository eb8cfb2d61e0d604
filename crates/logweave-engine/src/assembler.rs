use chrono::Utc;
use logweave_decoders::DecodedTranscript;
use logweave_types::{ContentBlock, ParsedMessage, ParsedSession, SessionStats};
use serde_json::Value;
use uuid::Uuid;

/// Field names under which provider usage sidecars report cache-read
/// tokens.
const CACHE_USAGE_FIELDS: &[&str] = &["cache_read_input_tokens", "cached_input_tokens", "cached"];

/// Fold a decoded transcript into the canonical session.
///
/// Messages are ordered by non-decreasing timestamp with the decoder's
/// emission order preserved on ties (the sort is stable). Time bounds come
/// from the ordered list; the degenerate zero-message transcript gets
/// "now" for both bounds and a zero duration.
pub fn assemble(transcript: DecodedTranscript) -> ParsedSession {
    let DecodedTranscript {
        format,
        session_id,
        mut messages,
        records_total,
        records_parsed: _,
        records_consumed,
        metadata,
    } = transcript;

    messages.sort_by_key(|message| message.timestamp);

    let now = Utc::now();
    let (start_time, end_time) = match (messages.first(), messages.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp),
        _ => (now, now),
    };
    let duration_ms = (end_time - start_time).num_milliseconds().max(0);

    let session_id = session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback_session_id(&messages));
    let stats = session_stats(&messages, records_total, records_consumed);

    ParsedSession {
        session_id,
        source_format: format,
        messages,
        start_time,
        end_time,
        duration_ms,
        stats,
        metadata,
    }
}

/// Sessions whose source never names itself still need a non-empty id.
/// With messages present the id is derived deterministically so repeated
/// parses agree; only the zero-message case falls back to a time seed.
fn fallback_session_id(messages: &[ParsedMessage]) -> String {
    match messages.first() {
        Some(first) => Uuid::new_v5(&Uuid::NAMESPACE_OID, first.id.as_bytes()).to_string(),
        None => format!("session-{}", Utc::now().timestamp_millis()),
    }
}

/// One pass over the final message list; callers read these instead of
/// recomputing ad hoc.
fn session_stats(
    messages: &[ParsedMessage],
    records_total: usize,
    records_consumed: usize,
) -> SessionStats {
    let mut stats = SessionStats {
        message_count: messages.len(),
        records_total,
        records_consumed,
        ..SessionStats::default()
    };

    for message in messages {
        for block in &message.content {
            match block {
                ContentBlock::Reasoning { redacted, .. } => {
                    stats.has_reasoning = true;
                    if *redacted {
                        stats.has_redacted_reasoning = true;
                    }
                }
                ContentBlock::Image { .. } => stats.has_images = true,
                ContentBlock::ToolInvocation { .. } => stats.has_tool_calls = true,
                ContentBlock::ToolOutcome { orphaned, .. } => {
                    stats.has_tool_calls = true;
                    if *orphaned {
                        stats.orphaned_outcomes += 1;
                    }
                }
                ContentBlock::Text { .. } | ContentBlock::Opaque { .. } => {}
            }
        }
        if usage_reports_cache(message.metadata.as_ref()) {
            stats.has_cached_token_usage = true;
        }
    }

    stats
}

fn usage_reports_cache(metadata: Option<&Value>) -> bool {
    let Some(usage) = metadata.and_then(|m| m.get("usage")).and_then(Value::as_object) else {
        return false;
    };
    CACHE_USAGE_FIELDS.iter().any(|field| {
        usage
            .get(*field)
            .and_then(Value::as_u64)
            .is_some_and(|tokens| tokens > 0)
    })
}
