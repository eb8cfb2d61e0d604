use logweave_types::{ParsedMessage, SourceFormat};
use serde_json::Value;

/// One decoder per source format family.
///
/// Decoders are stateless and shareable; all per-parse state (occurrence
/// counters, pending invocations) lives in a `ToolLinker` constructed inside
/// each `decode` call, so concurrent parses never interfere.
pub trait RecordDecoder: Send + Sync {
    /// The format family this decoder understands.
    fn format(&self) -> SourceFormat;

    /// Cheap, side-effect-free detection. Inspects only a small prefix of
    /// the input for format-discriminating fields; conservative by design.
    fn can_decode(&self, sample: &str) -> bool;

    /// Decode an entire in-memory transcript.
    ///
    /// Never fails for individual bad records: a line that does not parse,
    /// lacks a usable timestamp, or is flagged as an internal marker is
    /// dropped and counted. Fatal conditions (empty input, zero parseable
    /// records) are the caller's to raise from the returned counters.
    fn decode(&self, input: &str) -> DecodedTranscript;
}

/// Everything a decoder extracted from one transcript, before aggregation.
#[derive(Debug, Clone)]
pub struct DecodedTranscript {
    pub format: SourceFormat,

    /// Taken from the first record that supplies one; later conflicting
    /// values are ignored.
    pub session_id: Option<String>,

    pub messages: Vec<ParsedMessage>,

    /// Candidate records seen (non-empty lines, or array elements for
    /// document-shaped sources).
    pub records_total: usize,

    /// Records that parsed as structured data, whether or not they yielded
    /// messages. Zero here means the input was garbage end to end.
    pub records_parsed: usize,

    /// Records that contributed at least one message, or merged sidecar
    /// data (e.g. token usage) into one.
    pub records_consumed: usize,

    /// Provider-level session sidecar (cwd, model, tool version) when the
    /// source supplied one. Opaque downstream.
    pub metadata: Option<Value>,
}

impl DecodedTranscript {
    pub fn new(format: SourceFormat) -> Self {
        DecodedTranscript {
            format,
            session_id: None,
            messages: Vec::new(),
            records_total: 0,
            records_parsed: 0,
            records_consumed: 0,
            metadata: None,
        }
    }

    /// Record a session id unless one is already known.
    pub fn observe_session_id(&mut self, id: &str) {
        if self.session_id.is_none() && !id.is_empty() {
            self.session_id = Some(id.to_string());
        }
    }

    /// Merge one key into the provider-level metadata object, first writer
    /// wins.
    pub fn observe_metadata(&mut self, key: &str, value: Value) {
        if !matches!(self.metadata, Some(Value::Object(_))) {
            self.metadata = Some(Value::Object(serde_json::Map::new()));
        }
        if let Some(Value::Object(map)) = &mut self.metadata {
            map.entry(key.to_string()).or_insert(value);
        }
    }
}
