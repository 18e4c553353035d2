//! Operation framework for gateway remote-procedure calls
//!
//! Each vendor method (`play_fm`, `set_fm_volume`, ...) is a zero-sized
//! operation type with a typed request and response. The client turns the
//! request into JSON `params`, sends it, and hands the `result` value back to
//! the operation for parsing.

use serde_json::Value;

use crate::error::ApiError;

/// Base trait for all gateway operations
pub trait GatewayOperation {
    /// The request type for this operation
    type Request;

    /// The response type for this operation
    type Response;

    /// The miIO method name
    const METHOD: &'static str;

    /// Build the `params` value from the request data, validating it first
    fn build_params(request: &Self::Request) -> Result<Value, ValidationError>;

    /// Parse the `result` value of the reply into the typed response
    fn parse_response(result: Value) -> Result<Self::Response, ApiError>;
}

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        let err = ValidationError::range_error("volume", 0, 100, 150);
        assert_eq!(
            err.to_string(),
            "Parameter 'volume' value '150' is out of range (0..=100)"
        );

        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::InvalidParameter(msg) if msg.contains("volume")));
    }
}
