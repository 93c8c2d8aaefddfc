// Camera sensor - color camera producing image frames
//
// Renders the scene on a configurable cadence and publishes frames through
// the hub. Two extra behaviors come with it: a sky warm-up phase that
// forces renders until sky lighting converges, and a direct display mode
// that hands the camera output to a physical display instead of the
// offscreen pipeline.

use crate::camera::CameraRig;
use crate::config::SensorEntry;
use crate::display::{DisplayActivation, DIRECT_DISPLAY_REFRESH_HZ};
use crate::environment::EnvironmentProvider;
use crate::render::FrameBuffer;
use crate::sensor::postprocess::{self, PostProcessKind};
use crate::sensor::registry::{self, SensorDescriptor};
use crate::sensor::warmup::SkyWarmup;
use crate::sensor::{
    ImageFrame, Sensor, SensorContext, SensorDistributionType, SensorError, SensorMode,
};

/// Default sensor resolution width
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default sensor resolution height
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Default capture frequency in Hz
pub const DEFAULT_FREQUENCY: u32 = 15;
/// Default vertical field of view in degrees
pub const DEFAULT_FOV_DEG: f32 = 60.0;

/// Color camera sensor
///
/// The operating mode is fixed at construction from the configured display
/// index: a negative index selects the normal offscreen pipeline, a
/// non-negative index selects direct display output. In direct display
/// mode the normal initialization and per-tick update are skipped for the
/// whole session.
pub struct ColorCamera {
    name: String,
    distribution: SensorDistributionType,
    mode: SensorMode,
    rig: CameraRig,
    warmup: SkyWarmup,
    effects: Vec<PostProcessKind>,
    frequency: u32,
    cadence: u64,
    ticks_since_capture: u64,
    frame_id: u64,
    forced_renders: u32,
    visualize: bool,
    initialized: bool,
}

impl ColorCamera {
    /// Create a camera with default parameters
    ///
    /// The offscreen render target is allocated immediately; direct
    /// display routing releases it during initialization.
    pub fn new(name: impl Into<String>) -> Self {
        let mut rig = CameraRig::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_FOV_DEG);
        rig.allocate_target();

        Self {
            name: name.into(),
            distribution: SensorDistributionType::default(),
            mode: SensorMode::Normal,
            rig,
            warmup: SkyWarmup::new(0),
            effects: registry::COLOR_CAMERA.default_postprocessing.to_vec(),
            frequency: DEFAULT_FREQUENCY,
            cadence: 1,
            ticks_since_capture: 0,
            frame_id: 0,
            forced_renders: 0,
            visualize: false,
            initialized: false,
        }
    }

    /// Set the sensor resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        let mut rig = CameraRig::new(width, height, self.rig.fov_deg());
        rig.allocate_target();
        self.rig = rig;
        self
    }

    /// Set the capture frequency in Hz
    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the vertical field of view in degrees
    pub fn with_field_of_view(mut self, fov_deg: f32) -> Self {
        let mut rig = CameraRig::new(self.rig.width(), self.rig.height(), fov_deg);
        rig.allocate_target();
        self.rig = rig;
        self
    }

    /// Set the distribution type
    pub fn with_distribution(mut self, distribution: SensorDistributionType) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set the configured display index, fixing the operating mode
    pub fn with_display_index(mut self, display_index: i32) -> Self {
        self.mode = SensorMode::from_display_index(display_index);
        self
    }

    /// Replace the default post-processing chain
    pub fn with_postprocessing(mut self, effects: Vec<PostProcessKind>) -> Self {
        self.effects = effects;
        self
    }

    /// Build a camera from a configuration entry
    pub fn from_entry(entry: &SensorEntry) -> Self {
        let mut camera = Self::new(&entry.name)
            .with_resolution(entry.width, entry.height)
            .with_frequency(entry.frequency)
            .with_field_of_view(entry.field_of_view)
            .with_distribution(entry.distribution)
            .with_display_index(entry.display_index);
        if let Some(effects) = &entry.postprocessing {
            camera = camera.with_postprocessing(effects.clone());
        }
        camera
    }

    /// Operating mode fixed at construction
    pub fn mode(&self) -> SensorMode {
        self.mode
    }

    /// The camera rig
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// The warm-up gate
    pub fn warmup(&self) -> &SkyWarmup {
        &self.warmup
    }

    /// Renders forced by the warm-up gate
    pub fn forced_renders(&self) -> u32 {
        self.forced_renders
    }

    /// Ticks between captures at the current tick rate
    pub fn cadence(&self) -> u64 {
        self.cadence
    }

    /// Frames published so far
    pub fn frames_published(&self) -> u64 {
        self.frame_id
    }

    /// Route camera output directly to a display
    ///
    /// With an in-range index the offscreen target is released, the rig is
    /// bound to the display, and the display is activated at its native
    /// resolution and a fixed 60 Hz. An out-of-range index is skipped with
    /// a warning and changes nothing.
    fn route_to_display(&mut self, index: usize, ctx: &mut SensorContext) {
        let displays = ctx.displays.displays();
        if index >= displays.len() {
            log::warn!(
                "sensor {}: display {} not connected ({} available), output disabled",
                self.name,
                index,
                displays.len()
            );
            return;
        }

        let info = displays[index].clone();
        self.rig.release_target();
        self.rig.bind_display(index);
        ctx.displays.activate(DisplayActivation {
            index,
            width: info.system_width,
            height: info.system_height,
            refresh_hz: DIRECT_DISPLAY_REFRESH_HZ,
        });
        self.visualize = true;

        log::info!(
            "sensor {}: bound to display {} at {}x{} @ {} Hz",
            self.name,
            index,
            info.system_width,
            info.system_height,
            DIRECT_DISPLAY_REFRESH_HZ
        );
    }

    /// Render, post-process and publish one frame
    fn capture_and_publish(&mut self, ctx: &mut SensorContext) {
        self.rig.render(ctx.renderer, ctx.environment);
        self.frame_id += 1;

        if let Some(target) = self.rig.target_mut() {
            postprocess::apply_effects(&self.effects, target, ctx.environment, self.frame_id);
        }
        if let Some(target) = self.rig.target() {
            let frame = ImageFrame::from_buffer(&self.name, self.frame_id, ctx.time, target);
            ctx.hub.publish(&frame, self.distribution);
        }
    }

    /// Out-of-band render that is never published
    fn force_render(&mut self, ctx: &mut SensorContext) {
        self.rig.render(ctx.renderer, ctx.environment);
        self.forced_renders += 1;
    }
}

impl Sensor for ColorCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &'static SensorDescriptor {
        &registry::COLOR_CAMERA
    }

    fn distribution(&self) -> SensorDistributionType {
        self.distribution
    }

    fn initialize(&mut self, ctx: &mut SensorContext) -> Result<(), SensorError> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        match self.mode {
            SensorMode::DirectDisplay(index) => {
                self.route_to_display(index, ctx);
                Ok(())
            }
            SensorMode::Normal => {
                if !self.rig.has_target() {
                    self.rig.allocate_target();
                }
                self.cadence = (ctx.tick_rate as u64 / self.frequency.max(1) as u64).max(1);
                self.warmup = SkyWarmup::from_profile(ctx.environment.active_profile());
                Ok(())
            }
        }
    }

    fn update(&mut self, ctx: &mut SensorContext) {
        if let SensorMode::DirectDisplay(_) = self.mode {
            return;
        }
        if !self.initialized {
            return;
        }

        self.ticks_since_capture += 1;
        if self.ticks_since_capture >= self.cadence {
            self.ticks_since_capture = 0;
            self.capture_and_publish(ctx);
        }

        if self.warmup.poll() {
            self.force_render(ctx);
        }
    }

    fn frame(&self) -> Option<&FrameBuffer> {
        self.rig.target()
    }

    fn visualize(&self) -> bool {
        self.visualize
    }

    fn set_visualize(&mut self, on: bool) {
        self.visualize = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayHost, SimulatedDisplays};
    use crate::environment::{
        EnvironmentManager, EnvironmentProfile, PhysicallyBasedSky, ProfileComponent,
    };
    use crate::render::SceneRenderer;
    use crate::sensor::FrameHub;

    struct Harness {
        env: EnvironmentManager,
        renderer: SceneRenderer,
        displays: SimulatedDisplays,
        hub: FrameHub,
        tick_rate: u32,
    }

    impl Harness {
        fn new(bounces: Option<u32>, displays: SimulatedDisplays) -> Self {
            let mut profile = EnvironmentProfile::new("test");
            if let Some(bounces) = bounces {
                profile = profile.with_component(ProfileComponent::Sky(
                    PhysicallyBasedSky::with_bounces(bounces),
                ));
            }
            Self {
                env: EnvironmentManager::new(profile),
                renderer: SceneRenderer::new(),
                displays,
                hub: FrameHub::new(),
                tick_rate: 60,
            }
        }

        fn context(&mut self, tick: u64) -> SensorContext<'_> {
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

    fn small_camera(name: &str) -> ColorCamera {
        ColorCamera::new(name).with_resolution(16, 16)
    }

    #[test]
    fn test_defaults_match_descriptor() {
        let camera = ColorCamera::new("cam");
        assert_eq!(camera.distribution(), SensorDistributionType::ClientOnly);
        assert_eq!(camera.mode(), SensorMode::Normal);
        assert_eq!(
            camera.effects,
            vec![PostProcessKind::Rain, PostProcessKind::SunFlare]
        );
        assert!(camera.rig().has_target());
    }

    #[test]
    fn test_normal_init_sets_cadence_and_warmup() {
        let mut harness = Harness::new(Some(4), SimulatedDisplays::none());
        let mut camera = small_camera("cam").with_frequency(15);

        camera.initialize(&mut harness.context(0)).unwrap();
        assert_eq!(camera.cadence(), 4);
        assert_eq!(camera.warmup().required_frames(), 4);
        assert!(camera.rig().has_target());
    }

    #[test]
    fn test_warmup_forces_bounces_plus_one_renders() {
        let mut harness = Harness::new(Some(3), SimulatedDisplays::none());
        let mut camera = small_camera("cam");

        camera.initialize(&mut harness.context(0)).unwrap();
        for tick in 1..=20 {
            let mut ctx = harness.context(tick);
            camera.update(&mut ctx);
        }
        assert_eq!(camera.forced_renders(), 4);
        assert!(camera.warmup().is_complete());
    }

    #[test]
    fn test_no_sky_forces_single_render() {
        let mut harness = Harness::new(None, SimulatedDisplays::none());
        let mut camera = small_camera("cam");

        camera.initialize(&mut harness.context(0)).unwrap();
        for tick in 1..=10 {
            let mut ctx = harness.context(tick);
            camera.update(&mut ctx);
        }
        assert_eq!(camera.forced_renders(), 1);
    }

    #[test]
    fn test_forced_renders_never_publish() {
        let mut harness = Harness::new(Some(5), SimulatedDisplays::none());
        // Cadence of 60 ticks, so the first published frame is far away
        let mut camera = small_camera("cam").with_frequency(1);

        camera.initialize(&mut harness.context(0)).unwrap();
        for tick in 1..=10 {
            let mut ctx = harness.context(tick);
            camera.update(&mut ctx);
        }
        assert_eq!(camera.forced_renders(), 6);
        assert_eq!(harness.hub.published(), 0);
    }

    #[test]
    fn test_capture_cadence_publishes() {
        let mut harness = Harness::new(None, SimulatedDisplays::none());
        // 60 / 15 = every 4 ticks
        let mut camera = small_camera("cam").with_frequency(15);

        camera.initialize(&mut harness.context(0)).unwrap();
        for tick in 1..=12 {
            let mut ctx = harness.context(tick);
            camera.update(&mut ctx);
        }
        assert_eq!(camera.frames_published(), 3);
    }

    #[test]
    fn test_direct_display_in_range_routes() {
        let mut harness = Harness::new(Some(4), SimulatedDisplays::single(2560, 1440, 144));
        let mut camera = small_camera("cam").with_display_index(0);

        camera.initialize(&mut harness.context(0)).unwrap();

        assert_eq!(camera.rig().releases(), 1);
        assert!(!camera.rig().has_target());
        assert_eq!(camera.rig().bound_display(), Some(0));
        assert!(camera.visualize());

        let activations = harness.displays.activations();
        assert_eq!(activations.len(), 1);
        assert_eq!(activations[0].index, 0);
        assert_eq!(activations[0].width, 2560);
        assert_eq!(activations[0].height, 1440);
        assert_eq!(activations[0].refresh_hz, DIRECT_DISPLAY_REFRESH_HZ);
    }

    #[test]
    fn test_direct_display_out_of_range_changes_nothing() {
        let mut harness = Harness::new(Some(4), SimulatedDisplays::single(1920, 1080, 60));
        let mut camera = small_camera("cam").with_display_index(1);

        camera.initialize(&mut harness.context(0)).unwrap();

        assert_eq!(camera.rig().releases(), 0);
        assert!(camera.rig().has_target());
        assert!(camera.rig().bound_display().is_none());
        assert!(!camera.visualize());
        assert!(harness.displays.activations().is_empty());
    }

    #[test]
    fn test_index_equal_to_count_is_out_of_range() {
        let mut harness = Harness::new(None, SimulatedDisplays::single(1920, 1080, 60));
        let mut camera = small_camera("cam").with_display_index(1);

        camera.initialize(&mut harness.context(0)).unwrap();
        assert!(harness.displays.activations().is_empty());
    }

    #[test]
    fn test_direct_display_bypasses_update() {
        let mut harness = Harness::new(Some(4), SimulatedDisplays::single(1920, 1080, 60));
        let mut camera = small_camera("cam").with_display_index(0);

        camera.initialize(&mut harness.context(0)).unwrap();
        for tick in 1..=30 {
            let mut ctx = harness.context(tick);
            camera.update(&mut ctx);
        }

        assert_eq!(camera.forced_renders(), 0);
        assert_eq!(camera.frames_published(), 0);
        assert_eq!(harness.hub.published(), 0);
        assert_eq!(harness.renderer.renders_completed(), 0);
    }

    #[test]
    fn test_negative_index_never_routes() {
        let mut harness = Harness::new(None, SimulatedDisplays::single(1920, 1080, 60));
        let mut camera = small_camera("cam").with_display_index(-1);

        camera.initialize(&mut harness.context(0)).unwrap();
        assert_eq!(camera.mode(), SensorMode::Normal);
        assert!(harness.displays.activations().is_empty());
        assert_eq!(camera.rig().releases(), 0);
    }

    #[test]
    fn test_published_frame_carries_sensor_name() {
        use crate::sensor::ConsumerKind;
        use std::sync::{Arc, Mutex};

        let mut harness = Harness::new(None, SimulatedDisplays::none());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        harness.hub.subscribe(
            ConsumerKind::Client,
            Arc::new(move |frame| {
                sink.lock().unwrap().push(frame.sensor.clone());
            }),
        );

        let mut camera = small_camera("front-cam").with_frequency(60);
        camera.initialize(&mut harness.context(0)).unwrap();
        let mut ctx = harness.context(1);
        camera.update(&mut ctx);

        assert_eq!(seen.lock().unwrap().as_slice(), &["front-cam".to_string()]);
    }
}
