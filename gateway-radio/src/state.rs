//! Playback state of the radio as last seen by the player

use serde::{Deserialize, Serialize};

/// Power state of the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    /// Not yet known, or the gateway reported a status we do not recognize
    Unknown,
}

impl PowerState {
    /// Map a `current_status` value from `get_prop_fm`
    ///
    /// Returns `None` for anything other than `"run"` and `"pause"`.
    pub fn from_fm_status(status: &str) -> Option<Self> {
        match status {
            "run" => Some(PowerState::On),
            "pause" => Some(PowerState::Off),
            _ => None,
        }
    }
}

impl Default for PowerState {
    fn default() -> Self {
        PowerState::Unknown
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerState::On => f.write_str("on"),
            PowerState::Off => f.write_str("off"),
            PowerState::Unknown => f.write_str("unknown"),
        }
    }
}

/// Whether the most recent device interaction succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Available
    }
}

/// Locally cached view of the radio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub power: PowerState,
    /// Volume as a fraction in [0.0, 1.0]
    pub volume: f64,
    pub muted: bool,
    pub availability: Availability,
}

impl PlaybackState {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Cached volume in device units (0-100)
    pub fn volume_units(&self) -> u8 {
        crate::volume::level_to_units(self.volume)
    }
}

impl Default for PlaybackState {
    /// Power unknown, optimistically available, volume 0, not muted
    fn default() -> Self {
        Self {
            power: PowerState::Unknown,
            volume: 0.0,
            muted: false,
            availability: Availability::Available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fm_status() {
        assert_eq!(PowerState::from_fm_status("run"), Some(PowerState::On));
        assert_eq!(PowerState::from_fm_status("pause"), Some(PowerState::Off));
        assert_eq!(PowerState::from_fm_status("standby"), None);
        assert_eq!(PowerState::from_fm_status("RUN"), None);
    }

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::default();
        assert_eq!(state.power, PowerState::Unknown);
        assert!(state.is_available());
        assert_eq!(state.volume, 0.0);
        assert!(!state.muted);
    }

    #[test]
    fn test_volume_units() {
        let state = PlaybackState {
            volume: 0.55,
            ..PlaybackState::default()
        };
        assert_eq!(state.volume_units(), 55);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(PlaybackState::default()).unwrap();
        assert_eq!(json["power"], "unknown");
        assert_eq!(json["availability"], "available");
    }
}
