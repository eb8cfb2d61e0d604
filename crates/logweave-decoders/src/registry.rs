use logweave_types::SourceFormat;

use crate::traits::RecordDecoder;

/// Explicitly constructed decoder registry.
///
/// Built once by the caller and passed wherever routing is needed; there is
/// no module-level singleton, so concurrent parses over different registries
/// (or one shared registry) need no locking.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn RecordDecoder>>,
}

impl DecoderRegistry {
    pub fn new(decoders: Vec<Box<dyn RecordDecoder>>) -> Self {
        DecoderRegistry { decoders }
    }

    /// All built-in decoders, line-shaped formats probed first.
    pub fn with_defaults() -> Self {
        DecoderRegistry::new(vec![
            Box::new(crate::claude::ClaudeCodeDecoder),
            Box::new(crate::codex::CodexDecoder),
            Box::new(crate::amp::AmpDecoder),
            Box::new(crate::opencode::OpenCodeDecoder),
            Box::new(crate::gemini::GeminiDecoder),
            Box::new(crate::cline::ClineDecoder),
        ])
    }

    /// Pick the first decoder whose cheap probe accepts the sample.
    pub fn detect(&self, sample: &str) -> Option<&dyn RecordDecoder> {
        self.decoders
            .iter()
            .map(|decoder| decoder.as_ref())
            .find(|decoder| decoder.can_decode(sample))
    }

    /// Look up a decoder by its format family.
    pub fn decoder_for(&self, format: SourceFormat) -> Option<&dyn RecordDecoder> {
        self.decoders
            .iter()
            .map(|decoder| decoder.as_ref())
            .find(|decoder| decoder.format() == format)
    }

    pub fn formats(&self) -> Vec<SourceFormat> {
        self.decoders.iter().map(|d| d.format()).collect()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        DecoderRegistry::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_formats() {
        let registry = DecoderRegistry::with_defaults();
        let formats = registry.formats();
        assert_eq!(formats.len(), 6);
        for format in [
            SourceFormat::ClaudeCode,
            SourceFormat::Codex,
            SourceFormat::Gemini,
            SourceFormat::Amp,
            SourceFormat::OpenCode,
            SourceFormat::Cline,
        ] {
            assert!(registry.decoder_for(format).is_some());
        }
    }

    #[test]
    fn detect_returns_none_for_unknown_input() {
        let registry = DecoderRegistry::with_defaults();
        assert!(registry.detect("plain prose, not a transcript").is_none());
    }
}
