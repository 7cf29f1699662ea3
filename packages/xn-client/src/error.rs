//! Error types for the client.

use std::fmt;
use xn_types::SchemaError;

/// Client error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Missing or malformed local file (PEM, ABI, reservations).
    File(String),
    /// Schema, value or codec failure.
    Schema(SchemaError),
    /// Key loading or signing error.
    Signing(String),
    /// Read-only contract query failed.
    Query(String),
    /// Broadcast rejected or transaction failed on chain.
    Transaction(String),
    /// Transaction did not reach a final state in time.
    Timeout(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::File(msg) => write!(f, "file error: {msg}"),
            Error::Schema(err) => write!(f, "schema error: {err}"),
            Error::Signing(msg) => write!(f, "signing error: {msg}"),
            Error::Query(msg) => write!(f, "query error: {msg}"),
            Error::Transaction(msg) => write!(f, "transaction error: {msg}"),
            Error::Timeout(msg) => write!(f, "timeout: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}
