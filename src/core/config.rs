/// Animation tuning: timer periods, tween durations and random ranges.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid range for {field}: {min} > {max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
}

/// Timing and range knobs for the animation engine.
///
/// Every field has a default, so a RON file only needs the values it
/// overrides. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Period of the storytelling gesture cycle.
    pub gesture_interval: f32,
    pub lip_sync_period: f32,
    pub lip_sync_tween: f32,
    /// Bounds for the random mouth y-scale while speaking.
    pub lip_sync_range: (f32, f32),
    /// Bounds for the random wait before each blink.
    pub blink_delay: (f32, f32),
    pub blink_close: f32,
    pub blink_hold: f32,
    pub blink_open: f32,
    /// Eye y-scale at the bottom of a blink.
    pub blink_squash: f32,
    pub rest_tween: f32,
    pub listen_tween: f32,
    pub idle_tilt_angle: f32,
    /// Time to tilt from one side to the other.
    pub idle_tilt_period: f32,
    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            gesture_interval: 2.5,
            lip_sync_period: 0.15,
            lip_sync_tween: 0.1,
            lip_sync_range: (0.5, 1.5),
            blink_delay: (2.0, 6.0),
            blink_close: 0.05,
            blink_hold: 0.05,
            blink_open: 0.1,
            blink_squash: 0.1,
            rest_tween: 0.5,
            listen_tween: 0.5,
            idle_tilt_angle: 0.03,
            idle_tilt_period: 2.0,
            seed: None,
        }
    }
}

impl AvatarConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(ron_str: &str) -> Result<Self, ConfigError> {
        let config: AvatarConfig = ron::from_str(ron_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the schedulers can't run with: non-finite numbers,
    /// reversed ranges, periods that are not positive and negative tweens.
    ///
    /// The blink delay lower bound counts as a period, since a zero wait
    /// would re-fire the blink at the same instant forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("lip_sync_range", self.lip_sync_range),
            ("blink_delay", self.blink_delay),
        ];
        let periods = [
            ("gesture_interval", self.gesture_interval),
            ("lip_sync_period", self.lip_sync_period),
            ("idle_tilt_period", self.idle_tilt_period),
            ("blink_delay", self.blink_delay.0),
        ];
        let durations = [
            ("lip_sync_tween", self.lip_sync_tween),
            ("blink_close", self.blink_close),
            ("blink_hold", self.blink_hold),
            ("blink_open", self.blink_open),
            ("rest_tween", self.rest_tween),
            ("listen_tween", self.listen_tween),
        ];
        let others = [
            ("blink_squash", self.blink_squash),
            ("idle_tilt_angle", self.idle_tilt_angle),
        ];

        let bounds = ranges
            .iter()
            .flat_map(|&(field, (min, max))| [(field, min), (field, max)]);
        for (field, value) in bounds
            .chain(periods)
            .chain(durations)
            .chain(others)
        {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        for (field, (min, max)) in ranges {
            if min > max {
                return Err(ConfigError::InvalidRange { field, min, max });
            }
        }
        for (field, value) in periods {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in durations {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}
