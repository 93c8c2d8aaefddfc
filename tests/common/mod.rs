// Common test utilities for simulation integration tests
//
// This module provides shared functionality for building configured
// simulations and standalone sensor harnesses across the test suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use camsim::config::{SensorEntry, SimConfig};
use camsim::display::SimulatedDisplays;
use camsim::environment::{
    EnvironmentManager, EnvironmentProfile, PhysicallyBasedSky, ProfileComponent,
};
use camsim::render::SceneRenderer;
use camsim::sensor::{ConsumerKind, FrameHub, ImageFrame, SensorContext, SensorRegistry};
use camsim::sim::Simulation;

/// Tick rate used by every test simulation
pub const TEST_TICK_RATE: u32 = 60;

/// A small color camera entry so tests render quickly
pub fn camera_entry(name: &str) -> SensorEntry {
    SensorEntry {
        name: name.to_string(),
        width: 16,
        height: 16,
        ..SensorEntry::default()
    }
}

/// A profile with a physically based sky of the given bounce count
pub fn sky_profile(name: &str, bounces: u32) -> EnvironmentProfile {
    EnvironmentProfile::new(name).with_component(ProfileComponent::Sky(
        PhysicallyBasedSky::with_bounces(bounces),
    ))
}

/// A profile with no sky component
pub fn bare_profile(name: &str) -> EnvironmentProfile {
    EnvironmentProfile::new(name)
}

/// A full configuration from profiles and sensor entries
pub fn config_with(
    profiles: Vec<EnvironmentProfile>,
    active: &str,
    sensors: Vec<SensorEntry>,
) -> SimConfig {
    let mut config = SimConfig::default();
    config.environment.profiles = profiles;
    config.environment.active_profile = active.to_string();
    config.sensors = sensors;
    config
}

/// Build a simulation from a config against the given display list
pub fn build_sim(config: &SimConfig, displays: SimulatedDisplays) -> Simulation {
    let registry = SensorRegistry::with_builtin();
    Simulation::from_config(config, &registry, Box::new(displays))
        .expect("simulation should build from test config")
}

/// Standalone harness for driving a sensor without a full simulation
pub struct SensorHarness {
    pub env: EnvironmentManager,
    pub renderer: SceneRenderer,
    pub displays: SimulatedDisplays,
    pub hub: FrameHub,
    pub tick_rate: u32,
}

impl SensorHarness {
    /// Create a harness around one active profile and a display list
    pub fn new(profile: EnvironmentProfile, displays: SimulatedDisplays) -> Self {
        Self {
            env: EnvironmentManager::new(profile),
            renderer: SceneRenderer::new(),
            displays,
            hub: FrameHub::new(),
            tick_rate: TEST_TICK_RATE,
        }
    }

    /// Borrow a sensor context for one call at the given tick
    pub fn context(&mut self, tick: u64) -> SensorContext<'_> {
        SensorContext {
            environment: &self.env,
            renderer: &mut self.renderer,
            displays: &mut self.displays,
            hub: &mut self.hub,
            tick,
            time: tick as f64 / self.tick_rate as f64,
            tick_rate: self.tick_rate,
        }
    }
}

/// Records every frame a hub consumer receives
#[derive(Clone)]
pub struct FrameRecorder {
    frames: Arc<Mutex<Vec<ImageFrame>>>,
}

impl FrameRecorder {
    /// Attach a recording consumer of the given kind to a simulation
    pub fn attach(sim: &mut Simulation, kind: ConsumerKind) -> Self {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        sim.subscribe(
            kind,
            Arc::new(move |frame: &ImageFrame| {
                sink.lock().unwrap().push(frame.clone());
            }),
        );
        Self { frames }
    }

    /// Number of frames received
    pub fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    /// Sensor names of received frames, in delivery order
    pub fn sensor_names(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.sensor.clone())
            .collect()
    }

    /// Copy of all received frames
    pub fn frames(&self) -> Vec<ImageFrame> {
        self.frames.lock().unwrap().clone()
    }
}
