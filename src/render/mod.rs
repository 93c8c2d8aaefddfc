// Render - procedural scene renderer
//
// Draws a deterministic horizon scene (sky, sun, ground) into a frame
// buffer. Sky lighting converges over successive renders through the
// scattering accumulator, matching how a progressive sky model behaves.

pub mod framebuffer;
pub mod sky;

pub use framebuffer::FrameBuffer;
pub use sky::SkyAccumulator;

use crate::environment::EnvironmentManager;
use crate::environment::EnvironmentProvider;

/// Zenith color of a fully converged sky
const ZENITH_RGB: [f32; 3] = [70.0, 120.0, 210.0];
/// Horizon color of a fully converged sky
const HORIZON_RGB: [f32; 3] = [170.0, 200.0, 235.0];
/// Ground base color before albedo scaling
const GROUND_RGB: [f32; 3] = [96.0, 88.0, 72.0];
/// Fog color blended in near the horizon
const FOG_RGB: [f32; 3] = [190.0, 190.0, 195.0];

/// Scene renderer
///
/// Stateful across renders: the sky accumulator carries scattering energy
/// from one render to the next until the active sky's bounce count is
/// reached.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    sky: SkyAccumulator,
    renders_completed: u64,
}

impl SceneRenderer {
    /// Create a renderer with no accumulated sky lighting
    pub fn new() -> Self {
        Self::default()
    }

    /// Total renders completed since creation
    pub fn renders_completed(&self) -> u64 {
        self.renders_completed
    }

    /// Sky bounces accumulated so far
    pub fn sky_bounces_accumulated(&self) -> u32 {
        self.sky.accumulated()
    }

    /// Whether sky lighting has converged for the active profile
    pub fn sky_converged(&self, env: &EnvironmentManager) -> bool {
        let target = env
            .active_profile()
            .sky()
            .map(|s| s.number_of_bounces)
            .unwrap_or(0);
        self.sky.is_converged(target)
    }

    /// Discard accumulated sky lighting
    pub fn reset_sky(&mut self) {
        self.sky.reset();
    }

    /// Render the scene into `frame`
    ///
    /// Advances sky accumulation by one bounce, then draws the horizon
    /// scene with the current (possibly still converging) sky gain.
    pub fn render(&mut self, env: &EnvironmentManager, fov_deg: f32, frame: &mut FrameBuffer) {
        let profile = env.active_profile();
        let sky_settings = profile.sky();
        let target_bounces = sky_settings.map(|s| s.number_of_bounces).unwrap_or(0);

        self.sky.advance(target_bounces);
        let gain = self.sky.gain(target_bounces);

        let sun = env.sun_position();
        // Daylight factor from sun elevation, floored so night scenes stay visible
        let daylight = (sun.elevation_deg / 90.0).clamp(0.05, 1.0);
        let albedo = sky_settings.map(|s| s.ground_albedo).unwrap_or(0.25);
        let exposure = sky_settings
            .map(|s| 2.0_f32.powf(s.exposure_compensation))
            .unwrap_or(1.0);
        let fog = env.fog().max(profile.fog().map(|f| f.density * 0.1).unwrap_or(0.0));

        let height = frame.height();
        let horizon = height / 2;

        for y in 0..height {
            let rgb = if y < horizon {
                // Sky: zenith at the top blending to horizon color
                let t = y as f32 / horizon.max(1) as f32;
                let mut rgb = lerp_rgb(ZENITH_RGB, HORIZON_RGB, t);
                for c in rgb.iter_mut() {
                    *c *= gain * daylight * exposure;
                }
                // Fog washes out the sky close to the horizon
                lerp_rgb(rgb, FOG_RGB, fog * t)
            } else {
                // Ground: albedo-scaled base fading with distance from the camera
                let t = (y - horizon) as f32 / (height - horizon).max(1) as f32;
                let mut rgb = GROUND_RGB;
                for c in rgb.iter_mut() {
                    *c *= albedo * 4.0 * daylight * (0.6 + 0.4 * t);
                }
                lerp_rgb(rgb, FOG_RGB, fog * (1.0 - t))
            };

            let packed = [
                rgb[0].clamp(0.0, 255.0) as u8,
                rgb[1].clamp(0.0, 255.0) as u8,
                rgb[2].clamp(0.0, 255.0) as u8,
                0xFF,
            ];
            let row = frame.row_mut(y);
            for chunk in row.chunks_exact_mut(framebuffer::BYTES_PER_PIXEL) {
                chunk.copy_from_slice(&packed);
            }
        }

        if sun.elevation_deg > 0.0 {
            self.draw_sun(frame, sun.azimuth_deg, sun.elevation_deg, fov_deg, gain);
        }

        self.renders_completed += 1;
    }

    /// Draw the sun disc projected into the view
    fn draw_sun(
        &self,
        frame: &mut FrameBuffer,
        azimuth_deg: f32,
        elevation_deg: f32,
        fov_deg: f32,
        gain: f32,
    ) {
        let width = frame.width();
        let height = frame.height();
        let horizon = height / 2;

        // Azimuth maps across the view, elevation lifts the disc above the horizon
        let sun_x = ((azimuth_deg % 360.0) / 360.0 * width as f32) as i64;
        let sun_y = horizon as i64 - (elevation_deg / 90.0 * horizon as f32) as i64;
        // Narrower fields of view magnify the disc
        let radius = (width as f32 * 1.5 / fov_deg.max(1.0)) as i64 + 1;

        let brightness = (220.0 + 35.0 * gain) as u8;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let x = sun_x + dx;
                let y = sun_y + dy;
                if x >= 0 && (x as u32) < width && y >= 0 && (y as u32) < height {
                    frame.set_pixel(x as u32, y as u32, [255, brightness, 160, 0xFF]);
                }
            }
        }
    }
}

fn lerp_rgb(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
