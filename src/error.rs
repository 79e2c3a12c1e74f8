//! Error types shared across the engine.
//!
//! Every operation boundary returns one of the named error kinds; none of
//! them carries partial state. The session keeps the most recent failure as
//! a [`Diagnostic`] so that callers can retrieve the message and markup
//! after the fact.

/// Failure raised at an operation boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Gs1Error {
    /// Tokenization failure: malformed bracket, unknown AI, bad separator
    /// placement, bad symbology identifier. `markup` is the input with the
    /// offending span delimited by `|`, or empty when no span applies.
    #[error("{message}")]
    Parse { message: String, markup: String },
    /// An AI value fails its type/length/check-digit/date rule. Carries a
    /// markup rendering of the offending input.
    #[error("{message}")]
    Lint { message: String, markup: String },
    /// A mandatory or mutually-exclusive AI relationship is violated.
    #[error("{0}")]
    Association(String),
    /// No primary identifier AI, malformed stem, or invalid key-qualifier
    /// sequence in a Digital Link URI.
    #[error("{0}")]
    DigitalLink(String),
    /// An out-of-range or locked configuration value.
    #[error("{0}")]
    Config(String),
}

impl Gs1Error {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Gs1Error::Parse { message: message.into(), markup: String::new() }
    }

    /// Parse failure pinpointing the byte range `start..end` of `input`.
    pub(crate) fn parse_at(message: impl Into<String>, input: &str, start: usize, end: usize) -> Self {
        Gs1Error::Parse { message: message.into(), markup: markup_span(input, start, end) }
    }

    /// Markup string for errors that pinpoint a span of the input.
    pub fn markup(&self) -> Option<&str> {
        match self {
            Gs1Error::Lint { markup, .. } | Gs1Error::Parse { markup, .. } if !markup.is_empty() => {
                Some(markup)
            }
            _ => None,
        }
    }
}

/// Message plus optional markup retained by the session after a failure.
///
/// The markup is the original input with the offending byte range delimited
/// by `|` sentinels, e.g. `(10)ABC|%|123`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub markup: String,
}

impl Diagnostic {
    pub fn from_error(err: &Gs1Error) -> Self {
        Diagnostic {
            message: err.to_string(),
            markup: err.markup().unwrap_or("").to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.message.clear();
        self.markup.clear();
    }
}

/// Render `input` with the byte range `start..end` delimited by `|`.
pub(crate) fn markup_span(input: &str, start: usize, end: usize) -> String {
    let start = start.min(input.len());
    let end = end.clamp(start, input.len());
    format!("{}|{}|{}", &input[..start], &input[start..end], &input[end..])
}
