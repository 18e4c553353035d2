//! FM radio operations: `play_fm`, `set_fm_volume`, `get_prop_fm`

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::operation::{GatewayOperation, ValidationError};
use crate::ApiError;

/// Highest volume the radio accepts, in device units
pub const MAX_VOLUME: u8 = 100;

/// Acknowledgement returned by write commands, typically `["ok"]`
#[derive(Debug, Clone, PartialEq)]
pub struct Ack(pub Value);

impl Ack {
    /// True when the device answered with the literal `ok`
    pub fn is_ok(&self) -> bool {
        match &self.0 {
            Value::String(s) => s == "ok",
            Value::Array(items) => items.first().and_then(Value::as_str) == Some("ok"),
            _ => false,
        }
    }
}

// ============================================================================
// play_fm
// ============================================================================

/// Argument of the `play_fm` method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmCommand {
    On,
    Off,
    Next,
}

impl FmCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FmCommand::On => "on",
            FmCommand::Off => "off",
            FmCommand::Next => "next",
        }
    }
}

/// play_fm operation
pub struct PlayFmOperation;

/// Request for play_fm operation
#[derive(Debug, Clone)]
pub struct PlayFmRequest {
    pub command: FmCommand,
}

impl GatewayOperation for PlayFmOperation {
    type Request = PlayFmRequest;
    type Response = Ack;

    const METHOD: &'static str = "play_fm";

    fn build_params(request: &Self::Request) -> Result<Value, ValidationError> {
        Ok(json!([request.command.as_str()]))
    }

    fn parse_response(result: Value) -> Result<Self::Response, ApiError> {
        Ok(Ack(result))
    }
}

// ============================================================================
// set_fm_volume
// ============================================================================

/// set_fm_volume operation
pub struct SetFmVolumeOperation;

/// Request for set_fm_volume operation
#[derive(Debug, Clone)]
pub struct SetFmVolumeRequest {
    /// Volume in device units (0-100)
    pub volume: u8,
}

impl GatewayOperation for SetFmVolumeOperation {
    type Request = SetFmVolumeRequest;
    type Response = Ack;

    const METHOD: &'static str = "set_fm_volume";

    fn build_params(request: &Self::Request) -> Result<Value, ValidationError> {
        if request.volume > MAX_VOLUME {
            return Err(ValidationError::range_error(
                "volume",
                0,
                MAX_VOLUME,
                request.volume,
            ));
        }
        Ok(json!([request.volume]))
    }

    fn parse_response(result: Value) -> Result<Self::Response, ApiError> {
        Ok(Ack(result))
    }
}

// ============================================================================
// get_prop_fm
// ============================================================================

/// get_prop_fm operation
pub struct GetPropFmOperation;

/// Request for get_prop_fm operation (the device expects an empty string)
#[derive(Debug, Clone, Default)]
pub struct GetPropFmRequest;

/// Radio status as reported by `get_prop_fm`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FmProperties {
    /// Volume in device units (0-100)
    #[serde(default)]
    pub current_volume: Option<i64>,
    /// Playback status, `"run"` or `"pause"` on known firmware
    #[serde(default)]
    pub current_status: Option<String>,
    /// Frequency/program of the current station
    #[serde(default)]
    pub current_program: Option<i64>,
    /// Any further fields the firmware reports
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GatewayOperation for GetPropFmOperation {
    type Request = GetPropFmRequest;
    type Response = FmProperties;

    const METHOD: &'static str = "get_prop_fm";

    fn build_params(_request: &Self::Request) -> Result<Value, ValidationError> {
        Ok(json!(""))
    }

    fn parse_response(result: Value) -> Result<Self::Response, ApiError> {
        if !result.is_object() {
            return Err(ApiError::ParseError(format!(
                "get_prop_fm returned {} instead of an object",
                result
            )));
        }
        serde_json::from_value(result)
            .map_err(|e| ApiError::ParseError(format!("Invalid get_prop_fm reply: {}", e)))
    }
}
