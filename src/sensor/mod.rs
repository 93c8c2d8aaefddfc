// Sensor - simulated sensor framework
//
// Defines the sensor trait every simulated device implements, the context
// handed to sensors each tick, and the shared sensor vocabulary (modes,
// distribution, errors).

pub mod camera;
pub mod capture;
pub mod hub;
pub mod postprocess;
pub mod registry;
pub mod warmup;

pub use camera::ColorCamera;
pub use capture::CaptureError;
pub use hub::{ConsumerKind, FrameHub, ImageFrame};
pub use postprocess::PostProcessKind;
pub use registry::{DataKind, SensorDescriptor, SensorRegistry};
pub use warmup::SkyWarmup;

use serde::{Deserialize, Serialize};

use crate::display::DisplayHost;
use crate::environment::EnvironmentManager;
use crate::render::{FrameBuffer, SceneRenderer};

/// Where a sensor's data is distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorDistributionType {
    /// Only the main simulation view receives frames
    MainOnly,
    /// Both main view and connected clients receive frames
    MainOrClient,
    /// Only connected clients receive frames
    ClientOnly,
}

impl Default for SensorDistributionType {
    fn default() -> Self {
        SensorDistributionType::ClientOnly
    }
}

/// How a sensor presents its output, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorMode {
    /// Render offscreen and publish frames through the hub
    Normal,
    /// Drive a physical display directly, skipping the offscreen path
    DirectDisplay(usize),
}

impl SensorMode {
    /// Derive the mode from a configured display index
    ///
    /// Negative values select normal offscreen operation; zero and above
    /// request direct output on that display.
    pub fn from_display_index(display_index: i32) -> Self {
        if display_index < 0 {
            SensorMode::Normal
        } else {
            SensorMode::DirectDisplay(display_index as usize)
        }
    }
}

/// Errors from sensor construction and operation
#[derive(Debug)]
pub enum SensorError {
    /// No registered sensor kind matches the configured name
    UnknownKind(String),
    /// Sensor configuration is structurally valid but unusable
    InvalidConfig(String),
    /// Writing captured output failed
    Capture(CaptureError),
}

impl std::fmt::Display for SensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorError::UnknownKind(kind) => write!(f, "unknown sensor kind: {}", kind),
            SensorError::InvalidConfig(msg) => write!(f, "invalid sensor config: {}", msg),
            SensorError::Capture(err) => write!(f, "capture failed: {}", err),
        }
    }
}

impl std::error::Error for SensorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SensorError::Capture(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CaptureError> for SensorError {
    fn from(err: CaptureError) -> Self {
        SensorError::Capture(err)
    }
}

/// Simulation services a sensor borrows for one call
///
/// Built fresh by the simulation each tick, so sensors never hold
/// references into the simulation between calls.
pub struct SensorContext<'a> {
    /// Environment state and active profile
    pub environment: &'a EnvironmentManager,
    /// Shared scene renderer
    pub renderer: &'a mut SceneRenderer,
    /// Connected displays
    pub displays: &'a mut dyn DisplayHost,
    /// Frame distribution hub
    pub hub: &'a mut FrameHub,
    /// Current simulation tick
    pub tick: u64,
    /// Simulation time in seconds
    pub time: f64,
    /// Simulation ticks per second
    pub tick_rate: u32,
}

/// A simulated sensor
///
/// Sensors are constructed from configuration, initialized once against a
/// context, then updated every tick. `initialize` decides the operating
/// mode; `update` does per-tick work.
pub trait Sensor {
    /// Instance name from configuration
    fn name(&self) -> &str;

    /// Static descriptor for this sensor kind
    fn descriptor(&self) -> &'static SensorDescriptor;

    /// Where this sensor's data is distributed
    fn distribution(&self) -> SensorDistributionType;

    /// One-time setup against the simulation
    fn initialize(&mut self, ctx: &mut SensorContext) -> Result<(), SensorError>;

    /// Per-tick update
    fn update(&mut self, ctx: &mut SensorContext);

    /// Most recent rendered frame, if the sensor renders offscreen
    fn frame(&self) -> Option<&FrameBuffer>;

    /// Whether visualization of this sensor's output is enabled
    fn visualize(&self) -> bool;

    /// Enable or disable visualization
    fn set_visualize(&mut self, on: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_default_is_client_only() {
        assert_eq!(
            SensorDistributionType::default(),
            SensorDistributionType::ClientOnly
        );
    }

    #[test]
    fn test_mode_from_negative_index_is_normal() {
        assert_eq!(SensorMode::from_display_index(-1), SensorMode::Normal);
        assert_eq!(SensorMode::from_display_index(-7), SensorMode::Normal);
    }

    #[test]
    fn test_mode_from_non_negative_index_is_direct() {
        assert_eq!(
            SensorMode::from_display_index(0),
            SensorMode::DirectDisplay(0)
        );
        assert_eq!(
            SensorMode::from_display_index(3),
            SensorMode::DirectDisplay(3)
        );
    }

    #[test]
    fn test_distribution_serde_kebab_case() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrap {
            d: SensorDistributionType,
        }
        let text = toml::to_string(&Wrap {
            d: SensorDistributionType::MainOrClient,
        })
        .unwrap();
        assert!(text.contains("main-or-client"));
        let parsed: Wrap = toml::from_str("d = \"client-only\"").unwrap();
        assert_eq!(parsed.d, SensorDistributionType::ClientOnly);
    }
}
