use thiserror::Error;

/// Error type for binding, client and tooling operations
#[derive(Debug, Error)]
pub enum Error {
    /// Generic error with a message
    #[error("{0}")]
    Generic(String),

    /// Error when parsing user supplied data (amounts, keys, addresses)
    #[error("Failed to parse data: {0}")]
    Parse(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// ABI could not be parsed, or a method/event is missing from it
    #[error("ABI error: {0}")]
    Abi(String),

    /// Error reported by the node or the RPC transport
    #[error("Chain error: {0}")]
    Chain(String),

    /// Error reported by the contract call machinery
    #[error("Contract error: {0}")]
    Contract(String),

    /// Transaction was mined but its execution failed
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// A log could not be decoded into the expected event
    #[error("Failed to decode log: {0}")]
    Decode(String),

    /// The simulated chain backend could not be started
    #[error("Simulated backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Binding generation failed
    #[error("Code generation error: {0}")]
    Codegen(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error with its source
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new generic error
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new ABI error
    pub fn abi<S: Into<String>>(msg: S) -> Self {
        Error::Abi(msg.into())
    }

    /// Create a new chain error
    pub fn chain<S: Into<String>>(msg: S) -> Self {
        Error::Chain(msg.into())
    }

    /// Create a new contract error
    pub fn contract<S: Into<String>>(msg: S) -> Self {
        Error::Contract(msg.into())
    }

    /// Create a new revert error
    pub fn reverted<S: Into<String>>(msg: S) -> Self {
        Error::Reverted(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a new backend-unavailable error
    pub fn backend_unavailable<S: Into<String>>(msg: S) -> Self {
        Error::BackendUnavailable(msg.into())
    }

    /// Create a new code generation error
    pub fn codegen<S: Into<String>>(msg: S) -> Self {
        Error::Codegen(msg.into())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Generic(s.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(format!("JSON parsing error: {}", err))
    }
}

/// Result type used across the contract crates
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_source_text() {
        let err = Error::reverted("status 0 for 0xabc");
        assert_eq!(err.to_string(), "Transaction reverted: status 0 for 0xabc");

        let err: Error = "boom".into();
        assert!(matches!(err, Error::Generic(ref m) if m == "boom"));

        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
