//! Device session capability
//!
//! `DeviceSession` is the seam between typed operations and whatever speaks
//! to the device. The shipped adapter is [`MiioSession`], backed by the miIO
//! UDP client; tests plug in scripted sessions instead.

use std::time::Duration;

use miio_client::MiioClient;
use serde_json::Value;

use crate::operation::GatewayOperation;
use crate::operations::{DeviceInfo, GetInfoOperation, GetInfoRequest};
use crate::Result;

/// An open logical connection to one device
pub trait DeviceSession: Send {
    /// Send a raw remote-procedure call and return its `result` value
    fn send(&mut self, method: &str, params: Value) -> Result<Value>;

    /// Fetch the static identity of the device
    fn info(&mut self) -> Result<DeviceInfo> {
        let params = GetInfoOperation::build_params(&GetInfoRequest)?;
        let result = self.send(GetInfoOperation::METHOD, params)?;
        GetInfoOperation::parse_response(result)
    }

    /// Release any held resources
    fn close(&mut self) {}
}

/// Opens device sessions for a host/token pair
pub trait SessionConnector: Send + Sync {
    fn open(&self, host: &str, token: &str) -> Result<Box<dyn DeviceSession>>;
}

/// `DeviceSession` adapter over the miIO UDP client
#[derive(Debug)]
pub struct MiioSession {
    client: Option<MiioClient>,
}

impl MiioSession {
    pub fn open(host: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = MiioClient::with_timeout(host, token, timeout)?;
        Ok(Self {
            client: Some(client),
        })
    }
}

impl DeviceSession for MiioSession {
    fn send(&mut self, method: &str, params: Value) -> Result<Value> {
        let client = self.client.as_mut().ok_or(crate::ApiError::SessionClosed)?;
        Ok(client.send(method, params)?)
    }

    fn close(&mut self) {
        if let Some(client) = self.client.take() {
            tracing::debug!("Closing miIO session with {}", client.addr());
        }
    }
}

/// Connector producing [`MiioSession`]s
#[derive(Debug, Clone)]
pub struct MiioConnector {
    timeout: Duration,
}

impl MiioConnector {
    pub fn new() -> Self {
        Self {
            timeout: miio_client::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for MiioConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConnector for MiioConnector {
    fn open(&self, host: &str, token: &str) -> Result<Box<dyn DeviceSession>> {
        Ok(Box::new(MiioSession::open(host, token, self.timeout)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    #[test]
    fn test_miio_connector_rejects_bad_token() {
        let connector = MiioConnector::new();
        let result = connector.open("127.0.0.1", "not-a-token");
        assert!(matches!(result, Err(ApiError::AuthError(_))));
    }

    #[test]
    fn test_closed_miio_session_fails() {
        let mut session =
            MiioSession::open("127.0.0.1", "00112233445566778899aabbccddeeff", Duration::from_millis(50))
                .unwrap();
        session.close();
        session.close();

        let result = session.send("get_prop_fm", Value::String(String::new()));
        assert_eq!(result, Err(ApiError::SessionClosed));
    }
}
