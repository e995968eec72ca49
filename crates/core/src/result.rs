//! Core results and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
///
/// These describe malformed host input. Authorization violations in well-formed input are
/// reported as [`crate::diagnostics::Diagnostic`]s, never as errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A transaction was submitted with a different number of authorizers than `prepare`
    /// declares.
    #[error("authorizer count mismatch: prepare declares {expected}, transaction carries {actual}")]
    AuthorizerCountMismatch {
        /// Number of authorizer parameters declared by `prepare`.
        expected: usize,
        /// Number of authorizers attached at submission.
        actual: usize,
    },

    /// Failed to read file at the specified path.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// The path to the file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode hex string.
    #[error("hex decode failed: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Address string is not valid hex.
    #[error("invalid address hex: {0}")]
    InvalidAddressHex(String),

    /// Address decodes to more bytes than an account address holds.
    #[error("invalid address length: expected at most 8 bytes, got {0}")]
    InvalidAddressLength(usize),

    /// Declaration id is empty or has an empty path segment.
    #[error("invalid declaration id '{0}'")]
    InvalidDeclId(String),

    /// Batch document could not be parsed.
    #[error("batch parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Qualifier keyword is not one of `all`, `account`, `self`, `auth`.
    #[error("unknown access qualifier '{0}'")]
    UnknownQualifier(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
