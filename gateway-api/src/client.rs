use crate::operation::GatewayOperation;
use crate::operations::{
    Ack, DeviceInfo, FmCommand, FmProperties, GetPropFmOperation, GetPropFmRequest,
    PlayFmOperation, PlayFmRequest, SetFmVolumeOperation, SetFmVolumeRequest,
};
use crate::session::DeviceSession;
use crate::Result;

/// A client for executing gateway operations over a device session
///
/// This client bridges the stateless operation definitions and the session
/// that actually talks to the gateway.
///
/// # Example
/// ```rust,no_run
/// use gateway_api::{GatewayClient, MiioConnector, SessionConnector};
/// use gateway_api::operations::FmCommand;
///
/// let session = MiioConnector::new().open("192.168.1.20", "00112233445566778899aabbccddeeff")?;
/// let mut client = GatewayClient::new(session);
/// client.play_fm(FmCommand::On)?;
/// let status = client.get_prop_fm()?;
/// println!("volume {:?}", status.current_volume);
/// # Ok::<(), gateway_api::ApiError>(())
/// ```
pub struct GatewayClient {
    session: Box<dyn DeviceSession>,
}

impl GatewayClient {
    pub fn new(session: Box<dyn DeviceSession>) -> Self {
        Self { session }
    }

    /// Execute a gateway operation
    ///
    /// Builds the `params` for the request, sends the call through the session
    /// and parses the reply.
    pub fn execute<Op: GatewayOperation>(&mut self, request: &Op::Request) -> Result<Op::Response> {
        let params = Op::build_params(request)?;
        let result = self.session.send(Op::METHOD, params)?;
        tracing::debug!("Response from gateway to {}: {}", Op::METHOD, result);
        Op::parse_response(result)
    }

    /// Fetch the static device identity
    pub fn info(&mut self) -> Result<DeviceInfo> {
        self.session.info()
    }

    /// Send `play_fm` with the given command
    pub fn play_fm(&mut self, command: FmCommand) -> Result<Ack> {
        self.execute::<PlayFmOperation>(&PlayFmRequest { command })
    }

    /// Send `set_fm_volume` with a volume in device units
    pub fn set_fm_volume(&mut self, volume: u8) -> Result<Ack> {
        self.execute::<SetFmVolumeOperation>(&SetFmVolumeRequest { volume })
    }

    /// Query the radio status
    pub fn get_prop_fm(&mut self) -> Result<FmProperties> {
        self.execute::<GetPropFmOperation>(&GetPropFmRequest)
    }

    /// Close the underlying session
    pub fn close(&mut self) {
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSession;
    use crate::ApiError;
    use serde_json::json;

    #[test]
    fn test_execute_sends_method_and_params() {
        let session = ScriptedSession::new();
        let mut client = GatewayClient::new(Box::new(session.clone()));

        client.play_fm(FmCommand::Next).unwrap();
        client.set_fm_volume(30).unwrap();

        assert_eq!(
            session.calls(),
            vec![
                ("play_fm".to_string(), json!(["next"])),
                ("set_fm_volume".to_string(), json!([30])),
            ]
        );
    }

    #[test]
    fn test_validation_happens_before_sending() {
        let session = ScriptedSession::new();
        let mut client = GatewayClient::new(Box::new(session.clone()));

        let result = client.set_fm_volume(150);
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));
        assert!(session.calls().is_empty());
    }

    #[test]
    fn test_get_prop_fm_uses_scripted_reply() {
        let session = ScriptedSession::new();
        session.respond_with("get_prop_fm", json!({"current_volume": 12, "current_status": "pause"}));
        let mut client = GatewayClient::new(Box::new(session.clone()));

        let props = client.get_prop_fm().unwrap();
        assert_eq!(props.current_volume, Some(12));
        assert_eq!(props.current_status.as_deref(), Some("pause"));
    }

    #[test]
    fn test_session_failure_propagates() {
        let session = ScriptedSession::new();
        session.fail_with(ApiError::Timeout("gateway".to_string()));
        let mut client = GatewayClient::new(Box::new(session.clone()));

        assert_eq!(
            client.play_fm(FmCommand::On),
            Err(ApiError::Timeout("gateway".to_string()))
        );
        assert_eq!(session.calls().len(), 1);
    }

    #[test]
    fn test_info_goes_through_session() {
        let session = ScriptedSession::new();
        let mut client = GatewayClient::new(Box::new(session.clone()));

        let info = client.info().unwrap();
        assert_eq!(info.model, "lumi.gateway.v3");
        assert_eq!(session.calls()[0].0, "miIO.info");
    }
}
