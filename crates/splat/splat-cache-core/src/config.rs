//! Startup configuration for the splat cache.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors rejected at startup. A cache is never constructed from an invalid config.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,
    #[error("{field} must be {expected}, got {value}")]
    InvalidDuration {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("{field}: invalid bounds (need finite min <= max, scale > 0)")]
    InvalidRange { field: &'static str },
    #[error("config json parse error: {0}")]
    Parse(String),
}

/// Spawn-time randomization of splat visuals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Number of sprite variants available to the renderer. Zero means none are configured.
    pub variant_count: u32,
    pub random_rotation: bool,
    /// Degrees.
    pub min_rotation: f32,
    pub max_rotation: f32,
    pub random_scale: bool,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Fixed seed for reproducible appearance; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            variant_count: 0,
            random_rotation: true,
            min_rotation: 0.0,
            max_rotation: 360.0,
            random_scale: true,
            min_scale: 0.8,
            max_scale: 1.2,
            seed: None,
        }
    }
}

/// Cache sizing and timing. All durations are seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub appear_duration: f32,
    pub fade_out_duration: f32,
    pub wave_delay: f32,
    pub appearance: AppearanceConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 150,
            appear_duration: 0.5,
            fade_out_duration: 0.3,
            wave_delay: 0.1,
            appearance: AppearanceConfig::default(),
        }
    }
}

/// A config that passed [`CacheConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedConfig(CacheConfig);

impl ValidatedConfig {
    #[inline]
    pub fn get(&self) -> &CacheConfig {
        &self.0
    }

    pub fn into_inner(self) -> CacheConfig {
        self.0
    }
}

impl std::ops::Deref for ValidatedConfig {
    type Target = CacheConfig;

    fn deref(&self) -> &CacheConfig {
        &self.0
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration {
            field,
            expected: ">= 0",
            value,
        })
    }
}

fn ordered_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field })
    }
}

impl CacheConfig {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        non_negative("appear_duration", self.appear_duration)?;
        non_negative("wave_delay", self.wave_delay)?;
        if !(self.fade_out_duration.is_finite() && self.fade_out_duration > 0.0) {
            return Err(ConfigError::InvalidDuration {
                field: "fade_out_duration",
                expected: "> 0",
                value: self.fade_out_duration,
            });
        }
        let a = &self.appearance;
        ordered_range("appearance.rotation", a.min_rotation, a.max_rotation)?;
        ordered_range("appearance.scale", a.min_scale, a.max_scale)?;
        // Zero or negative scale would collapse or mirror the sprite.
        if a.min_scale <= 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "appearance.scale",
            });
        }
        Ok(ValidatedConfig(self))
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<ValidatedConfig, ConfigError> {
        let cfg: CacheConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()
    }
}
