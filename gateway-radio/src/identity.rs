//! Static device identity

use gateway_api::operations::DeviceInfo;
use serde::Serialize;

/// Immutable snapshot of the gateway's identity, fetched once at session open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    model: String,
    firmware_version: String,
    hardware_version: String,
    mac_address: String,
}

impl DeviceIdentity {
    pub fn new(
        model: impl Into<String>,
        firmware_version: impl Into<String>,
        hardware_version: impl Into<String>,
        mac_address: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            firmware_version: firmware_version.into(),
            hardware_version: hardware_version.into(),
            mac_address: mac_address.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn firmware_version(&self) -> &str {
        &self.firmware_version
    }

    pub fn hardware_version(&self) -> &str {
        &self.hardware_version
    }

    pub fn mac_address(&self) -> &str {
        &self.mac_address
    }

    /// Stable identifier of the radio entity: `{model}-{mac}-fm`
    pub fn unique_id(&self) -> String {
        format!("{}-{}-fm", self.model, self.mac_address)
    }
}

impl From<DeviceInfo> for DeviceIdentity {
    fn from(info: DeviceInfo) -> Self {
        Self {
            model: info.model,
            firmware_version: info.firmware_version,
            hardware_version: info.hardware_version,
            mac_address: info.mac_address,
        }
    }
}
