//! Vendor operations understood by the gateway

pub mod fm;
pub mod info;

pub use fm::{
    Ack, FmCommand, FmProperties, GetPropFmOperation, GetPropFmRequest, PlayFmOperation,
    PlayFmRequest, SetFmVolumeOperation, SetFmVolumeRequest, MAX_VOLUME,
};
pub use info::{DeviceInfo, GetInfoOperation, GetInfoRequest};
