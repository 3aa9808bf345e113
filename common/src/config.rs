use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ClimateMode;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("minTemp {min} must be below maxTemp {max}")]
    InvertedRange { min: f32, max: f32 },
    #[error("{name} {value} is outside [{min}, {max}]")]
    DefaultOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("tolerance must be a finite, non-negative number (got {0})")]
    InvalidTolerance(f32),
    #[error("cycleDelay must be greater than zero")]
    ZeroCycleDelay,
    #[error("keepAlive ({keep_alive_ms} ms) must exceed cycleDelay ({cycle_delay_ms} ms)")]
    KeepAliveTooShort {
        keep_alive_ms: u64,
        cycle_delay_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub has_heating: bool,
    pub has_cooling: bool,
    pub has_setpoint: bool,
    pub tolerance: f32,
    pub min_temp: f32,
    pub max_temp: f32,
    pub default_heat_setpoint: f32,
    pub default_cool_setpoint: f32,
    pub keep_alive_ms: u64,
    pub cycle_delay_ms: u64,
    pub boost_duration_ms: u64,
    pub temp_valid_ms: u64,
    pub swap_delay_ms: u64,
    pub startup_grace_ms: u64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            has_heating: true,
            has_cooling: true,
            has_setpoint: true,
            tolerance: 0.5,
            min_temp: 5.0,
            max_temp: 30.0,
            default_heat_setpoint: 18.0,
            default_cool_setpoint: 24.0,
            keep_alive_ms: 120_000,
            cycle_delay_ms: 30_000,
            boost_duration_ms: 3_600_000,
            temp_valid_ms: 3_600_000,
            swap_delay_ms: 300_000,
            startup_grace_ms: 10_000,
        }
    }
}

impl ClimateConfig {
    pub fn default_mode(&self) -> ClimateMode {
        match (self.has_heating, self.has_cooling) {
            (true, true) => ClimateMode::Auto,
            (false, true) => ClimateMode::Cool,
            // Heat-only, and the manual fallback used for boost.
            _ => ClimateMode::Heat,
        }
    }

    pub fn auto_setpoint(&self) -> bool {
        self.has_heating && self.has_cooling
    }

    pub fn in_range(&self, value: f32) -> bool {
        value.is_finite() && (self.min_temp..=self.max_temp).contains(&value)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_temp.is_nan() || self.max_temp.is_nan() || self.min_temp >= self.max_temp {
            return Err(ConfigError::InvertedRange {
                min: self.min_temp,
                max: self.max_temp,
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        for (name, value) in [
            ("defaultHeatSetpoint", self.default_heat_setpoint),
            ("defaultCoolSetpoint", self.default_cool_setpoint),
        ] {
            if !self.in_range(value) {
                return Err(ConfigError::DefaultOutOfRange {
                    name,
                    value,
                    min: self.min_temp,
                    max: self.max_temp,
                });
            }
        }
        if self.cycle_delay_ms == 0 {
            return Err(ConfigError::ZeroCycleDelay);
        }
        if self.keep_alive_ms <= self.cycle_delay_ms {
            return Err(ConfigError::KeepAliveTooShort {
                keep_alive_ms: self.keep_alive_ms,
                cycle_delay_ms: self.cycle_delay_ms,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: "climate-1".to_string(),
            name: "Climate".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub topic: Option<String>,
    pub advertise: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub client_id: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            topic: Some("climate/zone1".to_string()),
            advertise: true,
            mqtt_host: "127.0.0.1".to_string(),
            mqtt_port: 1883,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
            client_id: "climate-controller-rust".to_string(),
        }
    }
}

impl TransportConfig {
    pub fn advertised_topic(&self) -> Option<&str> {
        if !self.advertise {
            return None;
        }
        self.topic
            .as_deref()
            .map(|topic| topic.trim_end_matches('/'))
            .filter(|topic| !topic.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub device: DeviceConfig,
    pub climate: ClimateConfig,
    pub transport: TransportConfig,
}
