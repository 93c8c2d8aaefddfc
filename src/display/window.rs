// Window - windowed presentation of sensor output
//
// Presents the visualized sensor's frames using winit and pixels. When a
// sensor routed itself to a display during initialization, the window goes
// fullscreen borderless on that monitor at its native resolution and the
// host drives the rendering, since the sensor's offscreen pipeline is
// disabled in that mode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use super::{DisplayInfo, SimulatedDisplays};
use crate::camera::CameraRig;
use crate::config::SimConfig;
use crate::render::FrameBuffer;
use crate::sensor::camera::DEFAULT_FOV_DEG;
use crate::sensor::SensorRegistry;
use crate::sim::Simulation;

/// Window configuration
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// View width when no sensor dictates a size
    pub view_width: u32,
    /// View height when no sensor dictates a size
    pub view_height: u32,
    /// Target presentation rate in Hz
    pub target_fps: u32,
    /// Whether to enable VSync
    pub vsync: bool,
}

impl WindowConfig {
    /// Create a new window configuration with default values
    ///
    /// Default: 1280x720 view, 60 FPS, VSync enabled
    pub fn new() -> Self {
        Self {
            view_width: 1280,
            view_height: 720,
            target_fps: 60,
            vsync: true,
        }
    }

    /// Set the fallback view size
    pub fn with_view_size(mut self, width: u32, height: u32) -> Self {
        self.view_width = width.max(1);
        self.view_height = height.max(1);
        self
    }

    /// Set the target presentation rate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    /// Set VSync enabled or disabled
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Get the frame duration for the target FPS
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.target_fps as u64)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Windowed simulation host
///
/// The simulation is built inside `resumed` so that sensor initialization
/// sees the real monitor list.
pub struct WindowHost {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    config: WindowConfig,
    sim_config: SimConfig,
    sim: Option<Simulation>,
    present_rig: Option<CameraRig>,
    source_sensor: Option<String>,
    ticks_per_frame: u64,
    last_frame_time: Instant,
}

impl WindowHost {
    /// Create a new window host (simulation starts when the event loop does)
    pub fn new(config: WindowConfig, sim_config: SimConfig) -> Self {
        Self {
            window: None,
            pixels: None,
            config,
            sim_config,
            sim: None,
            present_rig: None,
            source_sensor: None,
            ticks_per_frame: 1,
            last_frame_time: Instant::now(),
        }
    }

    /// The running simulation, once the event loop has started
    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    /// Advance the simulation and render the presented frame
    fn advance_and_render(&mut self) -> Result<(), pixels::Error> {
        if let Some(sim) = self.sim.as_mut() {
            for _ in 0..self.ticks_per_frame {
                sim.step();
            }
            if let Some(rig) = self.present_rig.as_mut() {
                sim.render_through(rig);
            }
        }

        let source: Option<&FrameBuffer> = match (&self.present_rig, &self.sim) {
            (Some(rig), _) => rig.target(),
            (None, Some(sim)) => self
                .source_sensor
                .as_deref()
                .and_then(|name| sim.sensor(name))
                .and_then(|sensor| sensor.frame()),
            _ => None,
        };

        if let Some(pixels) = &mut self.pixels {
            let frame = pixels.frame_mut();
            if let Some(source) = source {
                if source.as_slice().len() == frame.len() {
                    frame.copy_from_slice(source.as_slice());
                }
            }
            pixels.render()?;
        }

        Ok(())
    }

    /// Check if enough time has passed for the next frame
    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();
        let frame_duration = self.config.frame_duration();

        if elapsed >= frame_duration {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }
}

impl ApplicationHandler for WindowHost {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitors: Vec<_> = event_loop.available_monitors().collect();
        let displays: Vec<DisplayInfo> = monitors
            .iter()
            .map(|monitor| DisplayInfo {
                system_width: monitor.size().width,
                system_height: monitor.size().height,
                refresh_millihertz: monitor.refresh_rate_millihertz(),
                name: monitor.name(),
            })
            .collect();

        let registry = SensorRegistry::with_builtin();
        let mut sim = Simulation::from_config(
            &self.sim_config,
            &registry,
            Box::new(SimulatedDisplays::new(displays)),
        )
        .expect("Failed to build simulation");
        sim.initialize().expect("Failed to initialize sensors");

        self.ticks_per_frame = (sim.tick_rate() as u64 / self.config.target_fps as u64).max(1);

        let activation = sim.displays().activations().first().cloned();
        let mut window_attributes = Window::default_attributes().with_resizable(false);
        let buffer_width;
        let buffer_height;

        if let Some(activation) = &activation {
            // A sensor claimed a display: go fullscreen on it at native size
            let mut rig = CameraRig::new(activation.width, activation.height, DEFAULT_FOV_DEG);
            rig.allocate_target();
            self.present_rig = Some(rig);
            buffer_width = activation.width;
            buffer_height = activation.height;

            let monitor = monitors.get(activation.index).cloned();
            window_attributes = window_attributes
                .with_title("camsim - direct display")
                .with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else {
            // Present the visualized sensor, or the first one with frames
            let presented = sim
                .visualized_sensor()
                .or_else(|| sim.sensors().first().map(|s| s.as_ref()));
            let (name, size) = match presented {
                Some(sensor) => (
                    Some(sensor.name().to_string()),
                    sensor.frame().map(|f| (f.width(), f.height())),
                ),
                None => (None, None),
            };
            self.source_sensor = name.clone();
            let (width, height) =
                size.unwrap_or((self.config.view_width, self.config.view_height));
            buffer_width = width;
            buffer_height = height;

            window_attributes = window_attributes
                .with_title(match &name {
                    Some(name) => format!("camsim - {}", name),
                    None => "camsim".to_string(),
                })
                .with_inner_size(LogicalSize::new(
                    self.config.view_width,
                    self.config.view_height,
                ));
        }

        let window = event_loop
            .create_window(window_attributes)
            .expect("Failed to create window");

        let window = Arc::new(window);
        let window_size = window.inner_size();

        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());

        let pixels = Pixels::new(buffer_width, buffer_height, surface_texture)
            .expect("Failed to create pixel buffer");

        self.window = Some(window);
        self.pixels = Some(pixels);
        self.sim = Some(sim);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                println!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    if let Err(err) = self.advance_and_render() {
                        eprintln!("Render error: {}", err);
                        event_loop.exit();
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Create and run the simulation window
///
/// # Arguments
/// * `config` - Window configuration
/// * `sim_config` - Simulation configuration
///
/// # Returns
/// Result indicating success or error
pub fn run_window(
    config: WindowConfig,
    sim_config: SimConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    if config.vsync {
        event_loop.set_control_flow(ControlFlow::Wait);
    } else {
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    let mut host = WindowHost::new(config, sim_config);

    println!("Starting simulation window...");
    println!("  View size: {}x{}", config.view_width, config.view_height);
    println!("  Target FPS: {}", config.target_fps);
    println!("  VSync: {}", config.vsync);

    event_loop.run_app(&mut host)?;

    Ok(())
}
