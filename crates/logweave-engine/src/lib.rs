pub mod assembler;

pub use assembler::assemble;

use logweave_decoders::{DecoderRegistry, RecordDecoder};
use logweave_types::{ParseError, ParsedSession, Result};

/// Parse one transcript with a known decoder.
///
/// The only fatal outcomes are the two below; everything else is absorbed
/// into the session (dropped-record counters, orphan flags, opaque blocks):
/// - [`ParseError::EmptyInput`] when the input is empty or whitespace-only,
///   raised before any decoding work.
/// - [`ParseError::NoUsableRecords`] when not a single record parsed as
///   structured data.
///
/// A session with zero messages but at least one structurally parseable
/// record is a valid result meaning "nothing extractable".
pub fn parse_session(decoder: &dyn RecordDecoder, input: &str) -> Result<ParsedSession> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let transcript = decoder.decode(input);
    if transcript.records_parsed == 0 {
        return Err(ParseError::NoUsableRecords);
    }
    Ok(assemble(transcript))
}

/// Detect the source format from the input itself, then parse.
///
/// Inputs no registered decoder recognizes are indistinguishable from
/// garbage and map to [`ParseError::NoUsableRecords`].
pub fn parse_auto(registry: &DecoderRegistry, input: &str) -> Result<ParsedSession> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let Some(decoder) = registry.detect(input) else {
        return Err(ParseError::NoUsableRecords);
    };
    parse_session(decoder, input)
}
