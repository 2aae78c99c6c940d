use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use parkassist_core::{ClassifierConfig, Distance};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "PARKASSIST";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub sampler: SamplerSettings,
    pub dial: DialSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    pub warn_distance_cm: f32,
    pub stop_distance_cm: f32,
    pub max_offset_cm: f32,
    pub parked_led_ontime_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerSettings {
    pub interval_ms: u64,
    pub watchdog_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialSettings {
    pub adc_resolution_bits: u8,
    pub initial_raw: u16,
}

/// Scripted vehicle used in place of real hardware.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub start_distance_cm: f32,
    pub park_distance_cm: f32,
    pub approach_speed_cm_s: f32,
    pub dwell_s: f32,
    /// Drop the echo every N pings; 0 disables.
    pub no_echo_every: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            start_distance_cm: 400.0,
            park_distance_cm: 30.0,
            approach_speed_cm_s: 40.0,
            dwell_s: 75.0,
            no_echo_every: 0,
        }
    }
}

impl Settings {
    /// Validate the classifier section. Done once at startup so the sampler
    /// never sees inverted thresholds.
    pub fn classifier_config(&self) -> Result<ClassifierConfig, parkassist_core::ConfigError> {
        let c = &self.classifier;
        ClassifierConfig::new(
            Distance::from_cm(c.warn_distance_cm),
            Distance::from_cm(c.stop_distance_cm),
            Distance::from_cm(c.max_offset_cm),
            Duration::from_millis(c.parked_led_ontime_ms),
        )
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sampler.interval_ms)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.sampler.watchdog_timeout_ms)
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
fn settings_from_str(toml: &str) -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}
