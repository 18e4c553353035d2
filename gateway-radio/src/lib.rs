//! Xiaomi gateway FM radio as a media-player entity
//!
//! The crate wires three pieces together:
//!
//! - [`RadioSession`]: the open connection to one gateway, with the device
//!   identity fetched when it was opened
//! - [`RadioPlayer`]: the entity controller; maps media-player actions to
//!   vendor calls and tracks power, volume, mute and availability
//! - [`GatewayRadio`]: setup and teardown for a configured radio, including
//!   the background [`Poller`]
//!
//! Every player action returns an [`ActionOutcome`] rather than an error.
//! A failed call marks the player unavailable; the next successful call or
//! poll marks it available again.
//!
//! ```rust,no_run
//! use gateway_radio::{GatewayRadio, RadioConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RadioConfig::new("192.168.1.20", "00112233445566778899aabbccddeeff")
//!         .with_name("Kitchen Radio");
//!     let radio = GatewayRadio::setup(config).await?;
//!     radio.start_polling();
//!
//!     let outcome = radio.player().volume_up().await;
//!     if !outcome.is_success() {
//!         eprintln!("{:?}", outcome.error);
//!     }
//!
//!     radio.unload().await;
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
mod identity;
pub mod logging;
mod outcome;
mod player;
mod poller;
mod radio;
mod session;
mod state;
pub mod volume;

pub use config::{ConfigError, RadioConfig};
pub use error::RadioError;
pub use identity::DeviceIdentity;
pub use outcome::{Action, ActionOutcome};
pub use player::{Feature, RadioPlayer, ICON, SUPPORTED_FEATURES, UNMUTE_VOLUME};
pub use poller::{Poller, PollerHandle};
pub use radio::GatewayRadio;
pub use session::RadioSession;
pub use state::{Availability, PlaybackState, PowerState};

pub use gateway_api::{ApiError, MiioConnector, SessionConnector};
