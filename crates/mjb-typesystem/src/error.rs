//! Error types for mjb-typesystem.

/// Errors raised while building a [`crate::TypeDatabase`].
#[derive(Debug, thiserror::Error)]
pub enum TypesystemError {
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("entry \"{name}\" references unknown type \"{reference}\"")]
    UnknownReference { name: String, reference: String },

    #[error("duplicate {kind} entry \"{name}\"")]
    Duplicate { kind: &'static str, name: String },

    #[error("modification in \"{context}\" needs exactly one of signature or signature_regex")]
    MissingSignature { context: String },

    #[error("unsupported ruleset format: {0}")]
    UnsupportedFormat(String),

    #[error("ruleset JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ruleset TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
