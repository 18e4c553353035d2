//! Results of player actions

use gateway_api::ApiError;

use crate::state::PlaybackState;

/// A user-facing action (or the periodic refresh) on the radio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    TurnOn,
    TurnOff,
    VolumeUp,
    VolumeDown,
    SetVolume(f64),
    Mute(bool),
    NextTrack,
    Refresh,
}

impl Action {
    /// Message logged when the device call for this action fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::TurnOn => "Turning the Gateway on failed",
            Action::TurnOff => "Turning the Gateway off failed",
            Action::VolumeUp => "Increasing volume failed",
            Action::VolumeDown => "Decreasing volume failed",
            Action::SetVolume(_) => "Setting volume failed",
            Action::Mute(_) => "Muting volume failed",
            Action::NextTrack => "Next track failed",
            Action::Refresh => "Error while fetching state from Xiaomi Gateway Radio",
        }
    }
}

/// What happened when an action ran
///
/// Actions never return an error to the caller; a failed device call is
/// reported here and reflected as `Unavailable` in `state`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: Action,
    /// The device communication failure, if the call failed
    pub error: Option<ApiError>,
    /// Playback state after the action was applied
    pub state: PlaybackState,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result` for callers that want to surface failures
    pub fn into_result(self) -> Result<PlaybackState, ApiError> {
        match self.error {
            None => Ok(self.state),
            Some(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Availability;

    #[test]
    fn test_into_result() {
        let ok = ActionOutcome {
            action: Action::TurnOn,
            error: None,
            state: PlaybackState::default(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.into_result(), Ok(PlaybackState::default()));

        let failed = ActionOutcome {
            action: Action::Refresh,
            error: Some(ApiError::SessionClosed),
            state: PlaybackState {
                availability: Availability::Unavailable,
                ..PlaybackState::default()
            },
        };
        assert!(!failed.is_success());
        assert_eq!(failed.into_result(), Err(ApiError::SessionClosed));
    }
}
