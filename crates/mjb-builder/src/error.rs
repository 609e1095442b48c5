use std::path::PathBuf;

/// Errors that abort a build.
///
/// Everything else the builder runs into (unknown types, rejected members,
/// unresolved bases) is recorded in the reject log or reported as a warning.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("Unable to translate return type \"{type_name}\" of added function \"{signature}\": {reason}")]
    AddedFunctionReturnType {
        signature: String,
        type_name: String,
        reason: String,
    },

    #[error(
        "Unable to translate type \"{type_name}\" of argument {index} of added function \"{signature}\": {reason}"
    )]
    AddedFunctionArgumentType {
        signature: String,
        index: usize,
        type_name: String,
        reason: String,
    },

    #[error("Failed to write reject log {path}: {source}")]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a type reference could not be turned into a meta type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TranslateError(pub String);

impl TranslateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
