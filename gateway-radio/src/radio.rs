//! Setup and teardown of one configured radio

use std::sync::Arc;

use gateway_api::{MiioConnector, SessionConnector};
use parking_lot::Mutex;

use crate::config::RadioConfig;
use crate::error::RadioError;
use crate::player::RadioPlayer;
use crate::poller::{Poller, PollerHandle};
use crate::session::RadioSession;

/// A configured gateway radio: the open session plus its player entity
///
/// # Example
///
/// ```rust,no_run
/// use gateway_radio::{GatewayRadio, RadioConfig};
///
/// # async fn run() -> Result<(), gateway_radio::RadioError> {
/// let config = RadioConfig::new("192.168.1.20", "00112233445566778899aabbccddeeff");
/// let radio = GatewayRadio::setup(config).await?;
///
/// let player = radio.player();
/// player.turn_on().await;
/// player.set_volume_level(0.3).await;
///
/// radio.unload().await;
/// # Ok(())
/// # }
/// ```
pub struct GatewayRadio {
    config: RadioConfig,
    session: Arc<RadioSession>,
    player: Arc<RadioPlayer>,
    poller: Mutex<Option<PollerHandle>>,
}

impl GatewayRadio {
    /// Connect over miIO and register the player
    pub async fn setup(config: RadioConfig) -> Result<Self, RadioError> {
        Self::setup_with_connector(config, Arc::new(MiioConnector::new())).await
    }

    /// Connect through a custom connector
    ///
    /// Fails without registering anything when the configuration is invalid
    /// or the device cannot be reached.
    pub async fn setup_with_connector(
        config: RadioConfig,
        connector: Arc<dyn SessionConnector>,
    ) -> Result<Self, RadioError> {
        config.validate()?;

        let host = config.host.trim().to_string();
        let token = config.token.trim().to_string();

        let session = match RadioSession::open_async(connector, host.clone(), token).await {
            Ok(session) => session,
            Err(source) => {
                tracing::error!("Unable to connect to Xiaomi Gateway Radio at {}: {}", host, source);
                return Err(RadioError::Connection { host, source });
            }
        };

        let identity = session.identity();
        tracing::info!(
            "Connected to Xiaomi Gateway Radio {} (fw: {}, hw: {})",
            identity.model(),
            identity.firmware_version(),
            identity.hardware_version()
        );

        let session = Arc::new(session);
        let player = Arc::new(RadioPlayer::from_config(Arc::clone(&session), &config));

        Ok(Self {
            config,
            session,
            player,
            poller: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn player(&self) -> Arc<RadioPlayer> {
        Arc::clone(&self.player)
    }

    pub fn session(&self) -> &RadioSession {
        &self.session
    }

    /// Start the background poller at the configured interval
    ///
    /// Returns `false` if polling was already running.
    pub fn start_polling(&self) -> bool {
        let mut poller = self.poller.lock();
        if poller.is_some() {
            return false;
        }

        *poller = Some(Poller::spawn(self.player(), self.config.poll_interval()));
        true
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().is_some()
    }

    /// Receiver for state published by the poller, if it is running
    pub fn subscribe(&self) -> Option<tokio::sync::watch::Receiver<crate::PlaybackState>> {
        self.poller.lock().as_ref().map(PollerHandle::subscribe)
    }

    /// Stop polling and close the session
    pub async fn unload(self) {
        let poller = self.poller.lock().take();
        if let Some(poller) = poller {
            poller.stop().await;
        }

        self.session.close_async().await;
        tracing::debug!("Unloaded Xiaomi Gateway Radio at {}", self.session.host());
    }
}

impl std::fmt::Debug for GatewayRadio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRadio")
            .field("session", &self.session)
            .field("polling", &self.is_polling())
            .finish()
    }
}
