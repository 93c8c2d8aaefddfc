// Postprocess - camera image effects
//
// Effects run in configured order after the scene render and before the
// frame is published. All randomness comes from a seeded generator so a
// given frame id always produces the same image.

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentManager;
use crate::render::FrameBuffer;

/// Camera post-processing effect kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostProcessKind {
    /// Rain streaks on the lens, scaled by rain intensity
    Rain,
    /// Radial flare around the sun when it is in view
    SunFlare,
}

/// Linear congruential generator for effect placement
///
/// Small and deterministic; image effects only need decorrelated
/// positions, not statistical quality.
struct EffectRng {
    state: u64,
}

impl EffectRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 16
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        (self.next() % bound.max(1) as u64) as u32
    }
}

/// Apply a list of effects to a rendered frame
///
/// Effects run in slice order. `seed` should vary per frame (the frame id
/// works) so animated effects like rain move between frames.
pub fn apply_effects(
    effects: &[PostProcessKind],
    frame: &mut FrameBuffer,
    env: &EnvironmentManager,
    seed: u64,
) {
    for effect in effects {
        match effect {
            PostProcessKind::Rain => apply_rain(frame, env.rain(), seed),
            PostProcessKind::SunFlare => apply_sun_flare(frame, env),
        }
    }
}

fn apply_rain(frame: &mut FrameBuffer, intensity: f32, seed: u64) {
    if intensity <= 0.0 {
        return;
    }

    let width = frame.width();
    let height = frame.height();
    let mut rng = EffectRng::new(seed);

    // Streak count scales with intensity and image area
    let area = (width as u64 * height as u64) as f32;
    let streaks = (area / 600.0 * intensity) as u32;

    for _ in 0..streaks {
        let x = rng.next_below(width);
        let y = rng.next_below(height);
        let length = 4 + rng.next_below(8);

        for step in 0..length {
            let sy = y + step;
            if sy >= height {
                break;
            }
            // Streaks drift slightly as they fall
            let sx = (x + step / 3).min(width - 1);
            frame.blend_pixel(sx, sy, [205, 215, 230], 0.35 * intensity);
        }
    }
}

fn apply_sun_flare(frame: &mut FrameBuffer, env: &EnvironmentManager) {
    let sun = env.sun_position();
    if sun.elevation_deg <= 0.0 {
        return;
    }

    let width = frame.width();
    let height = frame.height();
    let horizon = height / 2;

    let sun_x = ((sun.azimuth_deg % 360.0) / 360.0 * width as f32) as i64;
    let sun_y = horizon as i64 - (sun.elevation_deg / 90.0 * horizon as f32) as i64;
    let reach = (width.min(height) / 3) as i64;

    for y in 0..height {
        for x in 0..width {
            let dx = x as i64 - sun_x;
            let dy = y as i64 - sun_y;
            let distance_sq = dx * dx + dy * dy;
            if distance_sq >= reach * reach {
                continue;
            }
            let falloff = 1.0 - (distance_sq as f32).sqrt() / reach as f32;
            frame.blend_pixel(x, y, [255, 240, 200], falloff * falloff * 0.5);
        }
    }
}
