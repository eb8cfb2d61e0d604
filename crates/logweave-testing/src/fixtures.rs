//! One realistic transcript per source format, with fixed timestamps so
//! every derived value (ordering, bounds, join keys) is deterministic.

/// Claude Code JSONL: camelCase records, inline tool blocks, a usage
/// sidecar with cache reads, one meta record and one summary record (both
/// dropped).
pub const CLAUDE_SESSION: &str = r#"{"type":"user","uuid":"u-001","parentUuid":null,"sessionId":"cc-7f3a","timestamp":"2025-03-14T09:00:00Z","isSidechain":false,"cwd":"/home/dev/project","version":"1.0.38","message":{"role":"user","content":"Refactor the config loader"}}
{"type":"assistant","uuid":"a-001","parentUuid":"u-001","sessionId":"cc-7f3a","timestamp":"2025-03-14T09:00:04Z","message":{"role":"assistant","model":"claude-sonnet-4-5","content":[{"type":"thinking","thinking":"The loader duplicates env parsing.","signature":"EqQBCkgIARABGAI="},{"type":"text","text":"Looking at the loader now."},{"type":"tool_use","id":"toolu_01","name":"Read","input":{"file_path":"src/config.rs"}}],"usage":{"input_tokens":1800,"output_tokens":95,"cache_read_input_tokens":1200}}}
{"type":"user","uuid":"u-002","parentUuid":"a-001","sessionId":"cc-7f3a","timestamp":"2025-03-14T09:00:06Z","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_01","content":"pub fn load() -> Config { .. }","is_error":false}]}}
{"type":"assistant","uuid":"a-002","parentUuid":"u-002","sessionId":"cc-7f3a","timestamp":"2025-03-14T09:00:11Z","message":{"role":"assistant","model":"claude-sonnet-4-5","content":[{"type":"text","text":"The loader re-reads the environment on every call; caching the parsed value fixes it."}],"usage":{"input_tokens":2100,"output_tokens":60,"cache_read_input_tokens":1900}}}
{"type":"user","uuid":"u-003","parentUuid":"a-002","sessionId":"cc-7f3a","timestamp":"2025-03-14T09:00:15Z","isMeta":true,"message":{"role":"user","content":"Caveat: the messages below were generated by the user while running local commands."}}
{"type":"summary","summary":"Config loader refactor","leafUuid":"a-002"}"#;

/// Codex CLI JSONL: envelope records, side-channel function calls joined
/// by `call_id`, an encrypted reasoning item, a trailing token count.
pub const CODEX_SESSION: &str = r#"{"timestamp":"2025-03-14T10:00:00Z","type":"session_meta","payload":{"id":"0195f3a2-44d1","cwd":"/home/dev/project","originator":"codex_cli_rs","cli_version":"0.42.0","source":"cli"}}
{"timestamp":"2025-03-14T10:00:02Z","type":"response_item","payload":{"type":"message","role":"user","content":[{"type":"input_text","text":"Why does the watcher leak file handles?"}]}}
{"timestamp":"2025-03-14T10:00:05Z","type":"response_item","payload":{"type":"reasoning","summary":[],"encrypted_content":"gAAAAABl8x2v"}}
{"timestamp":"2025-03-14T10:00:07Z","type":"response_item","payload":{"type":"function_call","name":"shell","arguments":"{\"command\":[\"lsof\",\"-p\",\"4242\"]}","call_id":"call_a1"}}
{"timestamp":"2025-03-14T10:00:09Z","type":"response_item","payload":{"type":"function_call_output","call_id":"call_a1","output":"watcher 4242 dev 17r REG /tmp/queue\nExit code: 0"}}
{"timestamp":"2025-03-14T10:00:14Z","type":"response_item","payload":{"type":"message","role":"assistant","content":[{"type":"output_text","text":"The watcher never closes descriptors for rotated logs."}]}}
{"timestamp":"2025-03-14T10:00:15Z","type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":3200,"cached_input_tokens":2700,"output_tokens":84,"reasoning_output_tokens":20,"total_tokens":3284},"model_context_window":272000}}}"#;

/// Gemini CLI: one JSON document, messages embedded as an array, tool
/// calls and their results folded into the assistant record.
pub const GEMINI_SESSION: &str = r#"{
  "sessionId": "gem-55c0",
  "projectHash": "9b1d4f",
  "startTime": "2025-03-14T11:00:00Z",
  "lastUpdated": "2025-03-14T11:00:20Z",
  "messages": [
    {"type": "user", "id": "g-u1", "timestamp": "2025-03-14T11:00:00Z", "content": "Show me the failing test"},
    {"type": "gemini", "id": "g-a1", "timestamp": "2025-03-14T11:00:06Z", "content": "The assertion compares floats exactly.",
     "model": "gemini-2.5-pro",
     "thoughts": [{"subject": "Locate", "description": "grep for the test name", "timestamp": "2025-03-14T11:00:02Z"}],
     "toolCalls": [{"id": "gt-1", "name": "read_file", "args": {"path": "tests/math.rs"},
                    "result": [{"functionResponse": {"id": "gt-1", "name": "read_file", "response": {"output": "assert_eq!(x, 0.1);"}}}],
                    "status": "success", "resultDisplay": "assert_eq!(x, 0.1);"}],
     "tokens": {"input": 1500, "output": 55, "cached": 900, "thoughts": 30, "tool": 12, "total": 1597}},
    {"type": "info", "id": "g-i1", "timestamp": "2025-03-14T11:00:20Z", "content": "Switched to gemini-2.5-pro"}
  ]
}"#;

/// Amp thread JSONL: messages nested under `message`, outcomes as whole
/// `toolResult` records referencing `toolUseID`.
pub const AMP_SESSION: &str = r#"{"id":"am-1","threadID":"T-e99b","message":{"role":"user","createdAt":"2025-03-14T12:00:00Z","content":[{"type":"text","text":"Rename the helper module"}]}}
{"id":"am-2","threadID":"T-e99b","message":{"role":"assistant","createdAt":"2025-03-14T12:00:03Z","content":[{"type":"text","text":"Renaming it now."},{"type":"toolUse","id":"tu-7","name":"edit","input":{"path":"src/util.rs","new_path":"src/helpers.rs"}}]}}
{"id":"am-3","threadID":"T-e99b","message":{"role":"toolResult","createdAt":"2025-03-14T12:00:05Z","toolUseID":"tu-7","content":[{"type":"text","text":"renamed src/util.rs -> src/helpers.rs"}]}}"#;

/// OpenCode JSONL: epoch-millisecond clocks, `tool` parts carrying call and
/// result together.
pub const OPENCODE_SESSION: &str = r#"{"id":"msg_01","sessionID":"ses_f00d","role":"user","time":{"created":1741957200000},"parts":[{"type":"text","text":"Add a retry to the fetcher"}]}
{"id":"msg_02","sessionID":"ses_f00d","role":"assistant","modelID":"gpt-5","providerID":"openai","time":{"created":1741957204000},"parts":[{"type":"reasoning","text":"The fetch call has no backoff."},{"type":"tool","callID":"oc-1","tool":"grep","state":{"status":"completed","input":{"pattern":"fetch"},"output":"src/fetch.rs:12"}},{"type":"text","text":"Wrapping the call in a retry loop."},{"type":"step-start"}]}"#;

/// Cline UI-message document: a JSON array, tool events as JSON-encoded
/// strings with no native call ids.
pub const CLINE_SESSION: &str = r#"[
  {"ts": 1741960800000, "type": "say", "say": "user_feedback", "text": "Clean up the imports"},
  {"ts": 1741960802000, "type": "say", "say": "api_req_started", "text": "{\"request\":\"...\"}"},
  {"ts": 1741960805000, "type": "say", "say": "reasoning", "text": "Three modules import unused symbols."},
  {"ts": 1741960807000, "type": "say", "say": "tool", "text": "{\"tool\":\"readFile\",\"path\":\"src/lib.rs\"}"},
  {"ts": 1741960809000, "type": "say", "say": "command", "text": "cargo fmt"},
  {"ts": 1741960812000, "type": "say", "say": "command_output", "text": ""},
  {"ts": 1741960815000, "type": "say", "say": "completion_result", "text": "Imports are tidy now."}
]"#;

/// Ten claude-shaped lines, one of them malformed mid-file.
pub const CLAUDE_SESSION_WITH_NOISE: &str = r#"{"type":"user","uuid":"n-01","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:00Z","message":{"role":"user","content":"line one"}}
{"type":"assistant","uuid":"n-02","parentUuid":"n-01","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:01Z","message":{"role":"assistant","content":[{"type":"text","text":"reply one"}]}}
{"type":"user","uuid":"n-03","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:02Z","message":{"role":"user","content":"line two"}}
{"type":"assistant","uuid":"n-04","parentUuid":"n-03","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:03Z","message":{"role":"assistant","content":[{"type":"text","text":"reply two"}]}}
{"type":"user","uuid":"n-05","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:04Z","message":{"role":"user","content":"line three"}}
{"type":"assistant","uuid":"n-06","parentUuid":"n-05","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:05Z","message":{"role":"assistant","content":[{"type":"text","text":"reply three"}]}}
{"type":"user","uuid":"n-07",TRUNCATED-BY-CRASH
{"type":"user","uuid":"n-08","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:07Z","message":{"role":"user","content":"line four"}}
{"type":"assistant","uuid":"n-09","parentUuid":"n-08","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:08Z","message":{"role":"assistant","content":[{"type":"text","text":"reply four"}]}}
{"type":"user","uuid":"n-10","sessionId":"cc-noise","timestamp":"2025-03-14T09:00:09Z","message":{"role":"user","content":"line five"}}"#;

/// Structured lines that belong to no supported format.
pub const UNKNOWN_FORMAT: &str = r#"{"level":"info","msg":"server started","time":"2025-03-14T09:00:00Z"}
{"level":"warn","msg":"slow request","time":"2025-03-14T09:00:02Z"}"#;
