use serde::Deserialize;
use serde_json::Value;

/// One JSON document per session, messages embedded as an array.
///
/// Elements stay untyped here and are parsed individually, so one corrupt
/// element drops alone instead of killing the document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiSession {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub project_hash: Option<String>,
    pub messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub(crate) enum GeminiMessage {
    User(UserMessage),
    Gemini(AssistantMessage),
    Info(InfoMessage),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserMessage {
    pub id: String,
    pub timestamp: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssistantMessage {
    pub id: String,
    pub timestamp: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub thoughts: Vec<Thought>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub tokens: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thought {
    pub subject: String,
    pub description: String,
}

/// Side-channel representation: one entry carries the invocation and,
/// once finished, its result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub result: Vec<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result_display: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfoMessage {
    pub id: String,
    pub timestamp: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenUsage {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    #[serde(default)]
    pub cached: u64,
    #[serde(default)]
    pub thoughts: u64,
    #[serde(default)]
    pub tool: u64,
    #[serde(default)]
    pub total: u64,
}
