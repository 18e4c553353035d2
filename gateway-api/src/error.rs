use miio_client::MiioError;
use thiserror::Error;

/// High-level API errors for gateway operations
///
/// Every variant is a flavor of device communication failure. Callers that
/// only care whether the device answered can treat them all alike; the
/// variants exist so logs say *why* a call failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// The socket could not be created, the host could not be resolved or a
    /// datagram could not be sent or received.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device did not answer before the socket timeout
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The token does not match the device or is malformed
    ///
    /// A wrong token usually shows up as a checksum or decryption failure.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Response parsing error
    ///
    /// The device answered, but the reply does not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error object returned by the device
    #[error("Device error {code}: {message}")]
    DeviceError { code: i64, message: String },

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The session was closed before the call
    #[error("Session is closed")]
    SessionClosed,
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<MiioError> for ApiError {
    fn from(error: MiioError) -> Self {
        match error {
            MiioError::Network(msg) => ApiError::NetworkError(msg),
            MiioError::Timeout(target) => ApiError::Timeout(target),
            MiioError::InvalidToken(msg) => ApiError::AuthError(msg),
            MiioError::Packet(msg) | MiioError::Crypto(msg) => ApiError::AuthError(msg),
            MiioError::Parse(msg) => ApiError::ParseError(msg),
            MiioError::Device { code, message } => ApiError::DeviceError { code, message },
        }
    }
}

impl From<crate::operation::ValidationError> for ApiError {
    fn from(validation_error: crate::operation::ValidationError) -> Self {
        ApiError::InvalidParameter(validation_error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miio_error_conversion() {
        let api_error: ApiError = MiioError::Network("unreachable".to_string()).into();
        assert!(matches!(api_error, ApiError::NetworkError(_)));

        let api_error: ApiError = MiioError::Timeout("10.0.0.2:54321".to_string()).into();
        assert!(matches!(api_error, ApiError::Timeout(_)));

        let api_error: ApiError = MiioError::Packet("checksum mismatch".to_string()).into();
        assert!(matches!(api_error, ApiError::AuthError(_)));

        let api_error: ApiError = MiioError::Parse("invalid JSON".to_string()).into();
        assert!(matches!(api_error, ApiError::ParseError(_)));

        let api_error: ApiError = MiioError::Device {
            code: -5001,
            message: "command error".to_string(),
        }
        .into();
        assert_eq!(
            api_error,
            ApiError::DeviceError {
                code: -5001,
                message: "command error".to_string()
            }
        );
    }

    #[test]
    fn test_error_display() {
        let network_err = ApiError::NetworkError("connection refused".to_string());
        assert_eq!(format!("{}", network_err), "Network error: connection refused");

        let device_err = ApiError::DeviceError {
            code: -1,
            message: "busy".to_string(),
        };
        assert_eq!(format!("{}", device_err), "Device error -1: busy");

        assert_eq!(format!("{}", ApiError::SessionClosed), "Session is closed");
    }
}
