use serde::Deserialize;

/// One UI event from the message-log document (a JSON array, not JSONL).
/// `type` is "say" or "ask"; the `say`/`ask` fields discriminate further.
#[derive(Debug, Deserialize)]
pub(crate) struct ClineRecord {
    /// Epoch milliseconds.
    pub ts: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub say: Option<String>,
    #[serde(default)]
    pub ask: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}
