// Trait-based architecture (public API)
pub mod traits;

// Shared stateless services
pub mod content;
pub mod linker;
pub mod splitter;

// Declarative marker tables
pub(crate) mod patterns;

// Decoder implementations, one per source format family
pub mod amp;
pub mod claude;
pub mod cline;
pub mod codex;
pub mod gemini;
pub mod opencode;

// Format router
pub mod registry;

// Traits
pub use traits::{DecodedTranscript, RecordDecoder};

// Services
pub use content::BlockClassifier;
pub use linker::{OutcomeLink, OutcomeRef, ToolLinker};
pub use splitter::{ProvisionalMessage, split_message};

// Decoders
pub use amp::AmpDecoder;
pub use claude::ClaudeCodeDecoder;
pub use cline::ClineDecoder;
pub use codex::CodexDecoder;
pub use gemini::GeminiDecoder;
pub use opencode::OpenCodeDecoder;

// Registry
pub use registry::DecoderRegistry;
