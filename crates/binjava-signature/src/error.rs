use thiserror::Error;

pub type Result<T> = std::result::Result<T, MalformedSignature>;

/// A grammar violation in a signature, descriptor, or canonical type text.
///
/// Fatal for the type being parsed; nothing is retried or repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed signature `{text}` at offset {position}: {reason}")]
pub struct MalformedSignature {
    /// The complete input that failed to parse.
    pub text: String,
    /// Byte offset into `text` where parsing stopped.
    pub position: usize,
    pub reason: &'static str,
}

impl MalformedSignature {
    pub(crate) fn new(text: &str, position: usize, reason: &'static str) -> Self {
        Self {
            text: text.to_string(),
            position,
            reason,
        }
    }

    /// The unparsed remainder of the input, starting at the failure position.
    pub fn remainder(&self) -> &str {
        self.text.get(self.position..).unwrap_or("")
    }
}
