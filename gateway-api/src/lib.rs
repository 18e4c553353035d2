//! High-level API for the Xiaomi gateway FM radio
//!
//! This crate provides typed operations for the vendor methods the gateway's
//! radio module understands, and a client that executes them over a
//! [`DeviceSession`]. It uses the private `miio-client` crate for the
//! low-level UDP protocol.
//!
//! ```rust,no_run
//! use gateway_api::{GatewayClient, MiioConnector, SessionConnector};
//!
//! let session = MiioConnector::new().open("192.168.1.20", "00112233445566778899aabbccddeeff")?;
//! let mut client = GatewayClient::new(session);
//!
//! let info = client.info()?;
//! println!("{} (fw {})", info.model, info.firmware_version);
//!
//! client.set_fm_volume(25)?;
//! # Ok::<(), gateway_api::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod operations;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::GatewayClient;
pub use error::{ApiError, Result};
pub use operation::{GatewayOperation, ValidationError};
pub use session::{DeviceSession, MiioConnector, MiioSession, SessionConnector};
