use serde::Deserialize;
use serde_json::Value;

/// One message object per line. Parts stay untyped at the record level so
/// unrecognized part shapes survive as opaque blocks.
#[derive(Debug, Deserialize)]
pub(crate) struct OpenCodeMessage {
    pub id: String,
    #[serde(default, rename = "sessionID", alias = "sessionId")]
    pub session_id: Option<String>,
    pub role: String,
    pub time: TimeInfo,
    #[serde(default)]
    pub parts: Vec<Value>,
    #[serde(default, rename = "modelID")]
    pub model_id: Option<String>,
    #[serde(default, rename = "providerID")]
    pub provider_id: Option<String>,
}

/// Epoch milliseconds.
#[derive(Debug, Deserialize)]
pub(crate) struct TimeInfo {
    pub created: i64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub(crate) enum OpenCodePart {
    Text {
        text: String,
    },
    Reasoning {
        #[serde(default)]
        text: Option<String>,
    },
    Tool(ToolPart),
    #[serde(other)]
    Unknown,
}

/// Side-channel shape: one part carries the call and, once it has run, the
/// result in `state`.
#[derive(Debug, Deserialize)]
pub(crate) struct ToolPart {
    #[serde(default, rename = "callID", alias = "callId")]
    pub call_id: Option<String>,
    pub tool: String,
    #[serde(default)]
    pub state: Option<ToolState>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolState {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}
