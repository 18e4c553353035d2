//! Error types for the miIO client

use thiserror::Error;

/// Errors that can occur during miIO communication
#[derive(Debug, Error)]
pub enum MiioError {
    /// Socket-level failure (bind, resolve, send, receive)
    #[error("Network error: {0}")]
    Network(String),

    /// No reply arrived before the socket read timeout
    #[error("Timed out waiting for a reply from {0}")]
    Timeout(String),

    /// Token is not 32 hexadecimal characters
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Malformed packet (bad magic, truncated, checksum mismatch)
    #[error("Packet error: {0}")]
    Packet(String),

    /// Payload could not be decrypted
    #[error("Decryption failed: {0}")]
    Crypto(String),

    /// Decrypted payload is not the JSON we expect
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error object returned by the device
    #[error("Device error {code}: {message}")]
    Device { code: i64, message: String },
}

impl MiioError {
    pub(crate) fn network(context: &str, err: std::io::Error) -> Self {
        Self::Network(format!("{}: {}", context, err))
    }
}
