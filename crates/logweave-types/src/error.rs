use std::fmt;

/// Result type for logweave parse operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Fatal parse failures. Everything else (unparseable lines, unmatched tool
/// outcomes, unknown content shapes) is absorbed into the output as counters,
/// flags, or opaque blocks rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or whitespace-only; raised before any decoding.
    EmptyInput,

    /// Every candidate record failed structural parsing. Distinct from
    /// EmptyInput so callers can tell "nothing to parse" from "garbage
    /// input".
    NoUsableRecords,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyInput => {
                write!(f, "empty input: the transcript contains no data")
            }
            ParseError::NoUsableRecords => {
                write!(
                    f,
                    "no usable records: no line parsed as a structured record"
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}
