//! Error types for the protocol layer.

/// Errors raised while parsing a client line.
///
/// None of these are fatal: the server counts the line as a bad message
/// and drops it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A required field was absent or empty.
    #[error("missing token {index} ({name})")]
    MissingToken { index: usize, name: &'static str },

    /// The command field did not name a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A field was present but could not be interpreted.
    #[error("invalid {name}: {value:?}")]
    InvalidArgument { name: &'static str, value: String },
}
