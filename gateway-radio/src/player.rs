//! Entity controller for the gateway radio
//!
//! Translates media-player actions into vendor calls and keeps the locally
//! cached [`PlaybackState`] in sync with the device.

use std::sync::Arc;

use gateway_api::operations::{
    FmCommand, FmProperties, GetPropFmOperation, GetPropFmRequest, PlayFmOperation,
    PlayFmRequest, SetFmVolumeOperation, SetFmVolumeRequest,
};
use gateway_api::{ApiError, GatewayOperation};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};

use crate::config::{RadioConfig, DEFAULT_VOLUME_STEP};
use crate::identity::DeviceIdentity;
use crate::outcome::{Action, ActionOutcome};
use crate::session::RadioSession;
use crate::state::{Availability, PlaybackState, PowerState};
use crate::volume;

/// Volume sent by `mute(false)`, in device units
pub const UNMUTE_VOLUME: u8 = 10;

/// Icon shown by hosts for the radio entity
pub const ICON: &str = "mdi:radio";

/// Media-player features the radio supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    VolumeStep,
    TurnOn,
    TurnOff,
    VolumeMute,
    VolumeSet,
    NextTrack,
}

pub const SUPPORTED_FEATURES: &[Feature] = &[
    Feature::VolumeStep,
    Feature::TurnOn,
    Feature::TurnOff,
    Feature::VolumeMute,
    Feature::VolumeSet,
    Feature::NextTrack,
];

/// The radio as a media-player entity
///
/// Every action issues exactly one device call. On success the local state
/// is updated and the player is marked available; on failure it is marked
/// unavailable, the error is logged, and the outcome carries the error.
/// Actions never return `Err`.
pub struct RadioPlayer {
    name: String,
    volume_step: u8,
    session: Arc<RadioSession>,
    state: RwLock<PlaybackState>,
}

impl RadioPlayer {
    pub fn new(session: Arc<RadioSession>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume_step: DEFAULT_VOLUME_STEP,
            session,
            state: RwLock::new(PlaybackState::default()),
        }
    }

    /// Build a player using the name and volume step of `config`
    pub fn from_config(session: Arc<RadioSession>, config: &RadioConfig) -> Self {
        Self {
            volume_step: config.volume_step,
            ..Self::new(session, config.display_name())
        }
    }

    // ========================================================================
    // Readable state
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> String {
        self.session.identity().unique_id()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        self.session.identity()
    }

    pub fn icon(&self) -> &'static str {
        ICON
    }

    pub fn supported_features(&self) -> &'static [Feature] {
        SUPPORTED_FEATURES
    }

    /// Volume step preference from the configuration
    pub fn volume_step(&self) -> u8 {
        self.volume_step
    }

    /// Snapshot of the cached playback state
    pub fn state(&self) -> PlaybackState {
        *self.state.read()
    }

    pub fn power(&self) -> PowerState {
        self.state.read().power
    }

    pub fn volume_level(&self) -> f64 {
        self.state.read().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.read().muted
    }

    pub fn is_available(&self) -> bool {
        self.state.read().is_available()
    }

    /// Descriptive attributes exposed next to the state
    pub fn extra_state_attributes(&self) -> Map<String, Value> {
        let identity = self.identity();
        let mut attributes = Map::new();
        attributes.insert("model".to_string(), json!(identity.model()));
        attributes.insert("firmware_version".to_string(), json!(identity.firmware_version()));
        attributes.insert("hardware_version".to_string(), json!(identity.hardware_version()));
        attributes.insert("muted".to_string(), json!(self.is_muted()));
        attributes
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub async fn turn_on(&self) -> ActionOutcome {
        self.play_fm(Action::TurnOn, FmCommand::On, Some(PowerState::On)).await
    }

    pub async fn turn_off(&self) -> ActionOutcome {
        self.play_fm(Action::TurnOff, FmCommand::Off, Some(PowerState::Off)).await
    }

    pub async fn media_next_track(&self) -> ActionOutcome {
        self.play_fm(Action::NextTrack, FmCommand::Next, None).await
    }

    pub async fn volume_up(&self) -> ActionOutcome {
        let target = volume::step_units(self.state().volume_units(), 1);
        self.set_fm_volume(Action::VolumeUp, target).await
    }

    pub async fn volume_down(&self) -> ActionOutcome {
        let target = volume::step_units(self.state().volume_units(), -1);
        self.set_fm_volume(Action::VolumeDown, target).await
    }

    /// Set the volume from a fraction; out-of-range input is clamped
    pub async fn set_volume_level(&self, level: f64) -> ActionOutcome {
        let target = volume::level_to_units(level);
        self.set_fm_volume(Action::SetVolume(level), target).await
    }

    /// Mute sends volume 0; unmute sends [`UNMUTE_VOLUME`]
    pub async fn mute_volume(&self, mute: bool) -> ActionOutcome {
        let target = if mute { 0 } else { UNMUTE_VOLUME };
        let action = Action::Mute(mute);
        let result = self
            .try_command::<SetFmVolumeOperation>(action, SetFmVolumeRequest { volume: target })
            .await
            .map(|_| ());

        self.finish(action, result, |state| state.muted = mute)
    }

    /// Poll the radio status and map it onto the cached state
    pub async fn update(&self) -> ActionOutcome {
        let action = Action::Refresh;
        match self.try_command::<GetPropFmOperation>(action, GetPropFmRequest).await {
            Ok(properties) => {
                tracing::debug!("Got new state from Xiaomi Gateway Radio: {:?}", properties);
                self.finish(action, Ok(()), |state| apply_properties(state, &properties))
            }
            Err(error) => self.finish(action, Err(error), |_| {}),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn play_fm(
        &self,
        action: Action,
        command: FmCommand,
        power: Option<PowerState>,
    ) -> ActionOutcome {
        let result = self
            .try_command::<PlayFmOperation>(action, PlayFmRequest { command })
            .await
            .map(|_| ());

        self.finish(action, result, |state| {
            if let Some(power) = power {
                state.power = power;
            }
        })
    }

    async fn set_fm_volume(&self, action: Action, volume: u8) -> ActionOutcome {
        let result = self
            .try_command::<SetFmVolumeOperation>(action, SetFmVolumeRequest { volume })
            .await
            .map(|_| ());

        self.finish(action, result, |_| {})
    }

    /// Run one device call, logging failures with the action's message
    async fn try_command<Op>(&self, action: Action, request: Op::Request) -> Result<Op::Response, ApiError>
    where
        Op: GatewayOperation + 'static,
        Op::Request: Send + 'static,
        Op::Response: Send + 'static,
    {
        let result = self.session.call::<Op>(request).await;
        if let Err(error) = &result {
            tracing::error!("{}: {}", action.failure_message(), error);
        }
        result
    }

    /// Apply `update` on success, or mark unavailable on failure
    fn finish<F>(&self, action: Action, result: Result<(), ApiError>, update: F) -> ActionOutcome
    where
        F: FnOnce(&mut PlaybackState),
    {
        let mut state = self.state.write();
        let error = match result {
            Ok(()) => {
                update(&mut state);
                state.availability = Availability::Available;
                None
            }
            Err(error) => {
                state.availability = Availability::Unavailable;
                Some(error)
            }
        };

        ActionOutcome {
            action,
            error,
            state: *state,
        }
    }
}

/// Map a `get_prop_fm` reply onto the cached state
fn apply_properties(state: &mut PlaybackState, properties: &FmProperties) {
    if let Some(units) = properties.current_volume {
        state.volume = volume::units_to_level(units);
        state.muted = units == 0;
    }

    let status = properties.current_status.as_deref();
    state.power = match status.and_then(PowerState::from_fm_status) {
        Some(power) => power,
        None => {
            tracing::warn!("Unexpected state from gateway: {:?}", status);
            PowerState::Unknown
        }
    };
}

impl std::fmt::Debug for RadioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioPlayer")
            .field("name", &self.name)
            .field("unique_id", &self.unique_id())
            .field("state", &self.state())
            .finish()
    }
}
