// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player configuration.
//!
//! Stored as RON next to the scene being previewed:
//! - Timeline settings (frame rate, where the scene starts)
//! - Playback settings (speed, looping, frame budget)
//! - An optional scrub script replayed frame by frame

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "player.ron";

/// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this config
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The config could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer player
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// One scripted playback action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// Play forward from the current time
    Play,
    /// Pause at the current time
    Pause,
    /// Play backward from the current time
    Reverse,
    /// Stop and rewind
    Stop,
    /// Toggle between playing and paused
    Toggle,
    /// Drop the loop range
    ClearLoop,
    /// Jump to a time in seconds
    Seek(f32),
    /// Let this many frames pass before the next step
    Wait(u32),
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Format version
    pub version: u32,
    /// Host timeline frame rate
    pub frame_rate: f32,
    /// Playback speed multiplier
    pub speed: f32,
    /// Wrap around at the end of the scene
    pub looping: bool,
    /// Restrict playback to `(start, end)`, wrapping at both ends
    pub loop_range: Option<(f32, f32)>,
    /// Where the scene starts on the host timeline
    pub clip_start: f32,
    /// Number of frames to run
    pub frames: u32,
    /// Log property values every this many frames (0 disables)
    pub log_every: u32,
    /// Scrub script; empty means plain playback
    pub script: Vec<ScriptStep>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            frame_rate: 30.0,
            speed: 1.0,
            looping: false,
            loop_range: None,
            clip_start: 0.0,
            frames: 150,
            log_every: 10,
            script: vec![
                ScriptStep::Play,
                ScriptStep::Wait(60),
                ScriptStep::Seek(0.5),
                ScriptStep::Wait(30),
                ScriptStep::Reverse,
                ScriptStep::Wait(15),
                ScriptStep::Play,
            ],
        }
    }
}

impl PlayerConfig {
    /// Length of one frame in seconds
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "speed must be non-negative, got {}",
                self.speed
            )));
        }
        if let Some((start, end)) = self.loop_range {
            if !(start.is_finite() && end.is_finite() && start < end) {
                return Err(ConfigError::Invalid(format!(
                    "loop_range must be an increasing pair, got ({start}, {end})"
                )));
            }
        }
        Ok(())
    }

    /// Parse a config from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: PlayerConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load a config file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save the config
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert!(config.validate().is_ok());
        assert!((config.frame_duration() - 1.0 / 30.0).abs() < 1e-7);
    }

    #[test]
    fn test_serialization() {
        let mut config = PlayerConfig::default();
        config.looping = true;
        config.loop_range = Some((0.5, 2.0));
        config.script = vec![ScriptStep::Seek(1.5), ScriptStep::Toggle, ScriptStep::ClearLoop];

        let ron_str = config.to_ron().unwrap();
        let loaded = PlayerConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = PlayerConfig::from_ron("(frame_rate: 60.0)").unwrap();
        assert_eq!(loaded.frame_rate, 60.0);
        assert_eq!(loaded.frames, PlayerConfig::default().frames);
    }

    #[test]
    fn test_rejects_newer_version() {
        let result = PlayerConfig::from_ron("(version: 99)");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            PlayerConfig::from_ron("(frame_rate: 0.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlayerConfig::from_ron("(speed: -1.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlayerConfig::from_ron("(loop_range: Some((2.0, 1.0)))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlayerConfig::from_ron("not ron"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("motion_gfx_{}_{}", std::process::id(), CONFIG_FILE_NAME));
        let config = PlayerConfig { frames: 12, ..Default::default() };

        config.save(&path).unwrap();
        let loaded = PlayerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.frames, 12);
    }
}
