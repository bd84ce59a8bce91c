//! Error types for the content platform client.
//!
//! # Design
//! The remote contract collapses every failure into "no result". Here the
//! categories stay distinct: `NotFound` gets its own variant because callers
//! often care whether an author exists, all other non-2xx responses land in
//! `Http` with the raw status and body, and transport problems keep their
//! own `TransportError`. [`ApiError::kind`] groups them into the four
//! families callers usually branch on. `service::Compat` flattens all of it
//! back to `None`.

use thiserror::Error;

/// Failure to complete the HTTP round-trip at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    /// DNS failure, refused connection, TLS failure.
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Errors returned by `HycomClient` parse methods and `ContentService`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 404, e.g. for an unknown author.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The body was not JSON or did not match the expected envelope.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The QR payload was not valid base64 after prefix stripping.
    #[error("qr code decoding failed: {0}")]
    QrDecode(String),

    /// Rejected before any request was built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse failure category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Status,
    Decode,
    InvalidArgument,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::NotFound | ApiError::Http { .. } => ErrorKind::Status,
            ApiError::Deserialization(_) | ApiError::QrDecode(_) => ErrorKind::Decode,
            ApiError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
