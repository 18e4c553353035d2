//! miIO.info operation: static device identity

use serde::Deserialize;
use serde_json::{json, Value};

use crate::operation::{GatewayOperation, ValidationError};
use crate::ApiError;

/// miIO.info operation
pub struct GetInfoOperation;

/// Request for miIO.info operation
#[derive(Debug, Clone, Default)]
pub struct GetInfoRequest;

/// Identity fields reported by `miIO.info`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub model: String,
    #[serde(rename = "fw_ver", default)]
    pub firmware_version: String,
    #[serde(rename = "hw_ver", default)]
    pub hardware_version: String,
    #[serde(rename = "mac", default)]
    pub mac_address: String,
}

impl GatewayOperation for GetInfoOperation {
    type Request = GetInfoRequest;
    type Response = DeviceInfo;

    const METHOD: &'static str = "miIO.info";

    fn build_params(_request: &Self::Request) -> Result<Value, ValidationError> {
        Ok(json!([]))
    }

    fn parse_response(result: Value) -> Result<Self::Response, ApiError> {
        serde_json::from_value(result)
            .map_err(|e| ApiError::ParseError(format!("Invalid miIO.info reply: {}", e)))
    }
}
