//! Error types for the RFB protocol core.

use std::io;
use thiserror::Error;

/// Result type for RFB operations.
pub type Result<T> = std::result::Result<T, RfbError>;

/// Errors that can occur while driving an RFB session.
#[derive(Debug, Error)]
pub enum RfbError {
    /// The stream ended in the middle of a message.
    #[error("unexpected end of stream")]
    UnexpectedEnd,

    /// Malformed version literal, or the client selected a security type
    /// the server did not offer.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// Unknown message type, or an unknown value where the protocol
    /// requires a closed set.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// VNC authentication response did not match.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Indexed (non-true-color) pixel format requested.
    #[error("unsupported pixel format")]
    UnsupportedPixelFormat,

    /// A length exceeds what its protocol field can represent.
    #[error("length exceeds protocol limit")]
    Overflow,

    /// Underlying transport error.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for RfbError {
    fn from(err: io::Error) -> Self {
        // Exact-length reads are the norm on this wire; a short read is a
        // protocol condition, not a transport fault.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            RfbError::UnexpectedEnd
        } else {
            RfbError::Io(err)
        }
    }
}
