use logweave_decoders::{ClaudeCodeDecoder, CodexDecoder, DecoderRegistry};
use logweave_engine::{parse_auto, parse_session};
use logweave_testing::fixtures;
use logweave_types::{ContentBlock, ParseError, Role};

#[test]
fn single_user_line_yields_one_user_message_with_one_text_block() {
    let input = r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2025-03-14T09:00:00Z","message":{"role":"user","content":"hello there"}}"#;
    let session = parse_session(&ClaudeCodeDecoder, input).unwrap();

    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].role, Role::User);
    assert_eq!(
        session.messages[0].content,
        vec![ContentBlock::text("hello there")]
    );
    assert_eq!(session.session_id, "s1");
}

#[test]
fn prose_plus_two_same_named_calls_split_with_distinct_occurrence_keys() {
    let input = r#"{"type":"assistant","uuid":"b-01","sessionId":"s-b","timestamp":"2025-03-14T09:00:00Z","message":{"role":"assistant","content":[{"type":"text","text":"Searching twice."},{"type":"tool_use","name":"grep","input":{"pattern":"foo"}},{"type":"tool_use","name":"grep","input":{"pattern":"bar"}}]}}"#;
    let session = parse_session(&ClaudeCodeDecoder, input).unwrap();

    assert_eq!(session.messages.len(), 3);
    assert_eq!(session.messages[0].role, Role::Assistant);
    assert_eq!(session.messages[1].role, Role::ToolInvocation);
    assert_eq!(session.messages[2].role, Role::ToolInvocation);

    let keys: Vec<&str> = session.messages[1..]
        .iter()
        .map(|m| m.content[0].join_key().unwrap().as_str())
        .collect();
    assert_eq!(keys, vec!["b-01:grep:0", "b-01:grep:1"]);
}

#[test]
fn empty_input_is_a_fatal_error_before_any_decoding() {
    assert_eq!(
        parse_session(&ClaudeCodeDecoder, "").unwrap_err(),
        ParseError::EmptyInput
    );
    assert_eq!(
        parse_session(&ClaudeCodeDecoder, "   \n\t\n").unwrap_err(),
        ParseError::EmptyInput
    );
    assert_eq!(
        parse_auto(&DecoderRegistry::with_defaults(), "").unwrap_err(),
        ParseError::EmptyInput
    );
}

#[test]
fn garbage_input_is_no_usable_records_not_a_panic() {
    let err = parse_session(&ClaudeCodeDecoder, "not json\nalso not json").unwrap_err();
    assert_eq!(err, ParseError::NoUsableRecords);

    let err = parse_auto(&DecoderRegistry::with_defaults(), fixtures::UNKNOWN_FORMAT).unwrap_err();
    assert_eq!(err, ParseError::NoUsableRecords);
}

#[test]
fn one_malformed_line_among_ten_drops_alone() {
    let session = parse_session(&ClaudeCodeDecoder, fixtures::CLAUDE_SESSION_WITH_NOISE).unwrap();

    assert_eq!(session.stats.records_total, 10);
    assert_eq!(session.stats.records_consumed, 9);
    assert_eq!(session.messages.len(), 9);
}

#[test]
fn outcome_referencing_unknown_invocation_is_flagged_orphaned() {
    let input = r#"{"timestamp":"2025-03-14T10:00:09Z","type":"response_item","payload":{"type":"function_call_output","call_id":"call_ghost","output":"too late"}}"#;
    let session = parse_session(&CodexDecoder, input).unwrap();

    assert_eq!(session.messages.len(), 1);
    match &session.messages[0].content[0] {
        ContentBlock::ToolOutcome { key, orphaned, .. } => {
            assert_eq!(key.as_str(), "call_ghost");
            assert!(orphaned);
        }
        other => panic!("expected outcome, got {:?}", other),
    }
    assert_eq!(session.stats.orphaned_outcomes, 1);
}

#[test]
fn all_lines_dropped_is_a_valid_empty_session() {
    let input = r#"{"type":"user","uuid":"m1","sessionId":"s-meta","timestamp":"2025-03-14T09:00:00Z","isMeta":true,"message":{"role":"user","content":"internal"}}"#;
    let session = parse_session(&ClaudeCodeDecoder, input).unwrap();

    assert_eq!(session.stats.message_count, 0);
    assert_eq!(session.duration_ms, 0);
    assert_eq!(session.start_time, session.end_time);
    assert_eq!(session.session_id, "s-meta");
}

#[test]
fn parsing_identical_input_twice_is_idempotent() -> anyhow::Result<()> {
    let first = parse_session(&ClaudeCodeDecoder, fixtures::CLAUDE_SESSION)?;
    let second = parse_session(&ClaudeCodeDecoder, fixtures::CLAUDE_SESSION)?;
    assert_eq!(first, second);

    let first = parse_session(&CodexDecoder, fixtures::CODEX_SESSION)?;
    let second = parse_session(&CodexDecoder, fixtures::CODEX_SESSION)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn auto_detection_matches_explicit_decoding() -> anyhow::Result<()> {
    let registry = DecoderRegistry::with_defaults();
    let auto = parse_auto(&registry, fixtures::CLAUDE_SESSION)?;
    let explicit = parse_session(&ClaudeCodeDecoder, fixtures::CLAUDE_SESSION)?;
    assert_eq!(auto, explicit);
    Ok(())
}

#[test]
fn messages_are_in_timestamp_order_for_every_fixture() {
    let registry = DecoderRegistry::with_defaults();
    for fixture in [
        fixtures::CLAUDE_SESSION,
        fixtures::CODEX_SESSION,
        fixtures::GEMINI_SESSION,
        fixtures::AMP_SESSION,
        fixtures::OPENCODE_SESSION,
        fixtures::CLINE_SESSION,
    ] {
        let session = parse_auto(&registry, fixture).unwrap();
        assert!(!session.messages.is_empty());
        assert!(
            session
                .messages
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp)
        );
        assert!(session.start_time <= session.end_time);
        assert_eq!(
            session.duration_ms,
            (session.end_time - session.start_time).num_milliseconds()
        );
    }
}

#[test]
fn every_outcome_key_matches_an_invocation_or_is_orphaned() {
    let registry = DecoderRegistry::with_defaults();
    for fixture in [
        fixtures::CLAUDE_SESSION,
        fixtures::CODEX_SESSION,
        fixtures::GEMINI_SESSION,
        fixtures::AMP_SESSION,
        fixtures::OPENCODE_SESSION,
        fixtures::CLINE_SESSION,
    ] {
        let session = parse_auto(&registry, fixture).unwrap();
        let invocation_keys: Vec<&str> = session
            .messages
            .iter()
            .flat_map(|m| &m.content)
            .filter_map(|block| match block {
                ContentBlock::ToolInvocation { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();

        for message in &session.messages {
            for block in &message.content {
                if let ContentBlock::ToolOutcome { key, orphaned, .. } = block {
                    assert!(
                        invocation_keys.contains(&key.as_str()) || *orphaned,
                        "outcome key {} silently mismatched",
                        key
                    );
                }
            }
        }
    }
}

#[test]
fn flattened_text_projection_serves_downstream_consumers() {
    let session = parse_session(&ClaudeCodeDecoder, fixtures::CLAUDE_SESSION).unwrap();

    let assistant_text: Vec<String> = session
        .messages_with_role(Role::Assistant)
        .map(|m| m.flattened_text())
        .collect();
    assert_eq!(assistant_text[0], "Looking at the loader now.");
    // Reasoning blocks are structural, not part of the text projection.
    assert!(!assistant_text[0].contains("duplicates env parsing"));
}

#[test]
fn capability_flags_reflect_fixture_contents() {
    let claude = parse_session(&ClaudeCodeDecoder, fixtures::CLAUDE_SESSION).unwrap();
    assert!(claude.stats.has_reasoning);
    assert!(claude.stats.has_tool_calls);
    assert!(claude.stats.has_cached_token_usage);
    assert_eq!(claude.stats.orphaned_outcomes, 0);

    let codex = parse_session(&CodexDecoder, fixtures::CODEX_SESSION).unwrap();
    assert!(codex.stats.has_redacted_reasoning);
    assert!(codex.stats.has_cached_token_usage);
}

#[test]
fn message_count_is_bounded_by_records_and_split_factor() {
    let registry = DecoderRegistry::with_defaults();
    for fixture in [
        fixtures::CLAUDE_SESSION,
        fixtures::CODEX_SESSION,
        fixtures::GEMINI_SESSION,
        fixtures::AMP_SESSION,
        fixtures::OPENCODE_SESSION,
        fixtures::CLINE_SESSION,
    ] {
        let session = parse_auto(&registry, fixture).unwrap();
        assert!(session.stats.message_count >= 1);
        // No fixture record splits into more than eight messages.
        assert!(session.stats.message_count <= session.stats.records_total * 8);
    }
}
