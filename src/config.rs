// Config - simulation configuration management
//
// Loads and saves TOML configuration: simulation timing, environment
// profiles and weather, and the sensor roster. Missing files fall back to
// defaults which are written back to disk for the user to edit.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::{
    EnvironmentManager, EnvironmentProfile, PhysicallyBasedSky, ProfileComponent,
};
use crate::sensor::{PostProcessKind, SensorDistributionType};

/// Default configuration file name
pub const CONFIG_FILE: &str = "camsim.toml";

/// Errors from configuration handling
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading or writing the file
    Io(std::io::Error),
    /// TOML parse error
    Parse(toml::de::Error),
    /// TOML serialization error
    Serialize(toml::ser::Error),
    /// Configuration parsed but fails validation
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "parse error: {}", err),
            ConfigError::Serialize(err) => write!(f, "serialize error: {}", err),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Serialize(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err)
    }
}

/// Simulation timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Simulation ticks per second
    pub tick_rate: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self { tick_rate: 60 }
    }
}

/// Environment settings: profile roster and initial weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// Name of the profile active at startup
    pub active_profile: String,
    /// Initial time of day in hours
    pub time_of_day: f32,
    /// Initial rain intensity in `0.0..=1.0`
    pub rain: f32,
    /// Initial fog intensity in `0.0..=1.0`
    pub fog: f32,
    /// Available environment profiles
    pub profiles: Vec<EnvironmentProfile>,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            active_profile: "default".to_string(),
            time_of_day: 12.0,
            rain: 0.0,
            fog: 0.0,
            profiles: vec![EnvironmentProfile::new("default")
                .with_component(ProfileComponent::Sky(PhysicallyBasedSky::default()))],
        }
    }
}

impl EnvironmentSettings {
    /// Build the runtime environment manager from these settings
    pub fn to_manager(&self) -> Result<EnvironmentManager, ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one environment profile is required".to_string(),
            ));
        }

        let mut manager = EnvironmentManager::with_profiles(self.profiles.clone());
        manager
            .set_active_profile(&self.active_profile)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        manager.set_time_of_day(self.time_of_day);
        manager.set_rain(self.rain);
        manager.set_fog(self.fog);
        Ok(manager)
    }
}

/// One configured sensor instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEntry {
    /// Registered sensor kind name
    pub kind: String,
    /// Unique instance name
    pub name: String,
    /// Sensor resolution width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Sensor resolution height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Capture frequency in Hz
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub field_of_view: f32,
    /// Data distribution type
    #[serde(default)]
    pub distribution: SensorDistributionType,
    /// Display to drive directly; negative for normal offscreen operation
    #[serde(default = "default_display_index")]
    pub display_index: i32,
    /// Post-processing override; sensor kind defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocessing: Option<Vec<PostProcessKind>>,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_frequency() -> u32 {
    15
}

fn default_fov() -> f32 {
    60.0
}

fn default_display_index() -> i32 {
    -1
}

impl Default for SensorEntry {
    fn default() -> Self {
        Self {
            kind: "color-camera".to_string(),
            name: "camera".to_string(),
            width: default_width(),
            height: default_height(),
            frequency: default_frequency(),
            field_of_view: default_fov(),
            distribution: SensorDistributionType::default(),
            display_index: default_display_index(),
            postprocessing: None,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation timing
    pub simulation: SimulationSettings,
    /// Environment profiles and weather
    pub environment: EnvironmentSettings,
    /// Configured sensors
    pub sensors: Vec<SensorEntry>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            environment: EnvironmentSettings::default(),
            sensors: vec![SensorEntry::default()],
        }
    }
}

impl SimConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default file, falling back to defaults
    ///
    /// When no usable file exists the defaults are written back so the
    /// user has a file to edit next time.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(_) => {
                let config = Self::default();
                let _ = config.save();
                config
            }
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    /// Save configuration to a path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be non-zero".to_string()));
        }
        if self.environment.profiles.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one environment profile is required".to_string(),
            ));
        }
        if !self
            .environment
            .profiles
            .iter()
            .any(|p| p.name == self.environment.active_profile)
        {
            return Err(ConfigError::Invalid(format!(
                "active profile '{}' is not defined",
                self.environment.active_profile
            )));
        }

        for sensor in &self.sensors {
            if sensor.name.is_empty() {
                return Err(ConfigError::Invalid("sensor name must not be empty".to_string()));
            }
            if sensor.width == 0 || sensor.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "sensor '{}' has a zero dimension",
                    sensor.name
                )));
            }
            if sensor.frequency == 0 {
                return Err(ConfigError::Invalid(format!(
                    "sensor '{}' has zero frequency",
                    sensor.name
                )));
            }
        }

        let mut names: Vec<&str> = self.sensors.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.sensors.len() {
            return Err(ConfigError::Invalid("sensor names must be unique".to_string()));
        }

        Ok(())
    }
}
