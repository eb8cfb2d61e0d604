use serde::Deserialize;
use serde_json::Value;

/// One thread event per line, the message nested under `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct AmpRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "threadID", alias = "thread_id")]
    pub thread_id: Option<String>,
    pub message: AmpMessage,
}

/// Roles are `user`, `assistant`, or `toolResult` — outcomes are a message
/// role here, not a content part.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AmpMessage {
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub content: Value,
    #[serde(default, rename = "toolUseID", alias = "toolUseId")]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub is_error: bool,
}
