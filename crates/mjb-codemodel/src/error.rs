//! Error types for mjb-codemodel.

/// Errors raised while reading code-model input.
#[derive(Debug, thiserror::Error)]
pub enum CodeModelError {
    /// A textual type spelling could not be parsed.
    #[error("unable to parse type \"{text}\": {reason}")]
    TypeParse { text: String, reason: String },
}
