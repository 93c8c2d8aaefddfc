// Camera Sensor Simulation Library
// Core library for the sensor simulation implementation

// Public modules
pub mod camera;
pub mod config;
pub mod display;
pub mod environment;
pub mod render;
pub mod sensor;
pub mod sim;

// Re-export main types for convenience
pub use camera::CameraRig;
pub use config::{ConfigError, SensorEntry, SimConfig};
pub use display::{
    DisplayActivation, DisplayHost, DisplayInfo, SimulatedDisplays, WindowConfig,
};
pub use environment::{
    EnvironmentManager, EnvironmentProfile, EnvironmentProvider, PhysicallyBasedSky,
};
pub use render::{FrameBuffer, SceneRenderer};
pub use sensor::{
    ColorCamera, FrameHub, ImageFrame, Sensor, SensorDistributionType, SensorError, SensorMode,
    SensorRegistry, SkyWarmup,
};
pub use sim::{Simulation, SimulationError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let _rig = CameraRig::new(640, 480, 60.0);
        let _renderer = SceneRenderer::new();
        let _hub = FrameHub::new();
        let _registry = SensorRegistry::with_builtin();
        let _displays = SimulatedDisplays::none();
        let _config = SimConfig::default();
        let _camera = ColorCamera::new("cam");
    }
}
