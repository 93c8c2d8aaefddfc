// Sim - simulation host
//
// Owns the environment, renderer, displays, frame hub and sensor roster,
// and drives them tick by tick. Hosts (headless runner, windowed viewer)
// wrap this and decide pacing and presentation.

use crate::config::{ConfigError, SimConfig};
use crate::display::DisplayHost;
use crate::environment::{EnvironmentError, EnvironmentManager};
use crate::render::SceneRenderer;
use crate::sensor::{
    ConsumerKind, FrameCallback, FrameHub, Sensor, SensorContext, SensorError, SensorRegistry,
};

/// Errors from building or running a simulation
#[derive(Debug)]
pub enum SimulationError {
    /// Configuration failed to load or validate
    Config(ConfigError),
    /// A sensor failed to build or initialize
    Sensor(SensorError),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "config error: {}", err),
            SimulationError::Sensor(err) => write!(f, "sensor error: {}", err),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            SimulationError::Sensor(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl From<SensorError> for SimulationError {
    fn from(err: SensorError) -> Self {
        SimulationError::Sensor(err)
    }
}

/// Tick-driven sensor simulation
///
/// # Example
/// ```
/// use camsim::config::SimConfig;
/// use camsim::display::SimulatedDisplays;
/// use camsim::sensor::SensorRegistry;
/// use camsim::sim::Simulation;
///
/// let config = SimConfig::default();
/// let registry = SensorRegistry::with_builtin();
/// let mut sim = Simulation::from_config(
///     &config,
///     &registry,
///     Box::new(SimulatedDisplays::single(1920, 1080, 60)),
/// )
/// .unwrap();
///
/// sim.initialize().unwrap();
/// sim.run_for(60);
/// assert_eq!(sim.current_tick(), 60);
/// ```
pub struct Simulation {
    environment: EnvironmentManager,
    renderer: SceneRenderer,
    displays: Box<dyn DisplayHost>,
    hub: FrameHub,
    sensors: Vec<Box<dyn Sensor>>,
    tick_rate: u32,
    tick: u64,
    initialized: bool,
}

impl Simulation {
    /// Build a simulation from configuration
    ///
    /// Validates the config, builds the environment manager and constructs
    /// every configured sensor through the registry. Sensors are not
    /// initialized yet; call [`Simulation::initialize`] once the display
    /// host reflects the real display list.
    pub fn from_config(
        config: &SimConfig,
        registry: &SensorRegistry,
        displays: Box<dyn DisplayHost>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let environment = config.environment.to_manager()?;

        let mut sensors = Vec::with_capacity(config.sensors.len());
        for entry in &config.sensors {
            sensors.push(registry.build(entry)?);
        }

        Ok(Self {
            environment,
            renderer: SceneRenderer::new(),
            displays,
            hub: FrameHub::new(),
            sensors,
            tick_rate: config.simulation.tick_rate,
            tick: 0,
            initialized: false,
        })
    }

    /// Initialize all sensors against the current display list
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        if self.initialized {
            return Ok(());
        }

        let Self {
            environment,
            renderer,
            displays,
            hub,
            sensors,
            tick_rate,
            tick,
            ..
        } = self;

        for sensor in sensors.iter_mut() {
            let mut ctx = SensorContext {
                environment: &*environment,
                renderer: &mut *renderer,
                displays: displays.as_mut(),
                hub: &mut *hub,
                tick: *tick,
                time: *tick as f64 / *tick_rate as f64,
                tick_rate: *tick_rate,
            };
            sensor.initialize(&mut ctx)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Advance the simulation by one tick, updating every sensor
    pub fn step(&mut self) {
        self.tick += 1;

        let Self {
            environment,
            renderer,
            displays,
            hub,
            sensors,
            tick_rate,
            tick,
            ..
        } = self;
        let time = *tick as f64 / *tick_rate as f64;

        for sensor in sensors.iter_mut() {
            let mut ctx = SensorContext {
                environment: &*environment,
                renderer: &mut *renderer,
                displays: displays.as_mut(),
                hub: &mut *hub,
                tick: *tick,
                time,
                tick_rate: *tick_rate,
            };
            sensor.update(&mut ctx);
        }
    }

    /// Advance the simulation by `ticks` ticks
    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Attach a frame consumer to the hub
    pub fn subscribe(&mut self, kind: ConsumerKind, callback: FrameCallback) {
        self.hub.subscribe(kind, callback);
    }

    /// Render the scene through an external presentation rig
    ///
    /// Used by the window host to drive a display-bound camera: the rig
    /// renders with the simulation's renderer and environment, so its
    /// output converges together with sensor renders.
    pub fn render_through(&mut self, rig: &mut crate::camera::CameraRig) {
        rig.render(&mut self.renderer, &self.environment);
    }

    /// Switch the active environment profile
    ///
    /// Sky lighting accumulated for the previous profile is discarded.
    pub fn set_active_profile(&mut self, name: &str) -> Result<(), EnvironmentError> {
        self.environment.set_active_profile(name)?;
        self.renderer.reset_sky();
        Ok(())
    }

    /// Current simulation tick
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Current simulation time in seconds
    pub fn current_time(&self) -> f64 {
        self.tick as f64 / self.tick_rate as f64
    }

    /// Simulation ticks per second
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// The environment manager
    pub fn environment(&self) -> &EnvironmentManager {
        &self.environment
    }

    /// Mutable access to the environment manager
    pub fn environment_mut(&mut self) -> &mut EnvironmentManager {
        &mut self.environment
    }

    /// The scene renderer
    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }

    /// The display host
    pub fn displays(&self) -> &dyn DisplayHost {
        self.displays.as_ref()
    }

    /// The frame hub
    pub fn hub(&self) -> &FrameHub {
        &self.hub
    }

    /// All sensors in configuration order
    pub fn sensors(&self) -> &[Box<dyn Sensor>] {
        &self.sensors
    }

    /// Look up a sensor by name
    pub fn sensor(&self, name: &str) -> Option<&dyn Sensor> {
        self.sensors
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// First sensor with visualization enabled, if any
    pub fn visualized_sensor(&self) -> Option<&dyn Sensor> {
        self.sensors
            .iter()
            .find(|s| s.visualize())
            .map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensorEntry;
    use crate::display::SimulatedDisplays;
    use crate::environment::EnvironmentProvider;

    fn sim_with_sensors(entries: Vec<SensorEntry>) -> Simulation {
        let config = SimConfig {
            sensors: entries,
            ..SimConfig::default()
        };
        let registry = SensorRegistry::with_builtin();
        Simulation::from_config(
            &config,
            &registry,
            Box::new(SimulatedDisplays::single(1920, 1080, 60)),
        )
        .unwrap()
    }

    fn small_entry(name: &str) -> SensorEntry {
        SensorEntry {
            name: name.to_string(),
            width: 16,
            height: 16,
            ..SensorEntry::default()
        }
    }

    #[test]
    fn test_from_config_builds_sensors() {
        let sim = sim_with_sensors(vec![small_entry("front"), small_entry("rear")]);
        assert_eq!(sim.sensors().len(), 2);
        assert!(sim.sensor("front").is_some());
        assert!(sim.sensor("rear").is_some());
        assert!(sim.sensor("side").is_none());
    }

    #[test]
    fn test_unknown_sensor_kind_fails_construction() {
        let mut entry = small_entry("front");
        entry.kind = "radar".to_string();
        let config = SimConfig {
            sensors: vec![entry],
            ..SimConfig::default()
        };
        let registry = SensorRegistry::with_builtin();
        let result = Simulation::from_config(
            &config,
            &registry,
            Box::new(SimulatedDisplays::none()),
        );
        assert!(matches!(
            result,
            Err(SimulationError::Sensor(SensorError::UnknownKind(_)))
        ));
    }

    #[test]
    fn test_step_advances_time() {
        let mut sim = sim_with_sensors(vec![small_entry("front")]);
        sim.initialize().unwrap();
        sim.run_for(30);
        assert_eq!(sim.current_tick(), 30);
        assert!((sim.current_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut sim = sim_with_sensors(vec![small_entry("front")]);
        sim.initialize().unwrap();
        sim.initialize().unwrap();
        sim.run_for(10);
        assert_eq!(sim.current_tick(), 10);
    }

    #[test]
    fn test_profile_switch_resets_sky() {
        let mut sim = sim_with_sensors(vec![small_entry("front")]);
        sim.initialize().unwrap();
        sim.run_for(30);
        assert!(sim.renderer().sky_bounces_accumulated() > 0);

        sim.set_active_profile("default").unwrap();
        assert_eq!(sim.renderer().sky_bounces_accumulated(), 0);
    }

    #[test]
    fn test_profile_switch_to_unknown_fails() {
        let mut sim = sim_with_sensors(vec![small_entry("front")]);
        assert!(sim.set_active_profile("storm").is_err());
    }

    #[test]
    fn test_visualized_sensor_appears_after_routing() {
        let mut direct = small_entry("hud");
        direct.display_index = 0;
        let mut sim = sim_with_sensors(vec![small_entry("front"), direct]);

        assert!(sim.visualized_sensor().is_none());
        sim.initialize().unwrap();
        let visualized = sim.visualized_sensor().unwrap();
        assert_eq!(visualized.name(), "hud");
    }

    #[test]
    fn test_environment_starts_from_config() {
        let sim = sim_with_sensors(vec![small_entry("front")]);
        assert_eq!(sim.environment().active_profile().name, "default");
        assert_eq!(sim.tick_rate(), 60);
    }
}
