// Environment - scene lighting profiles and weather state
//
// Owns the set of environment profiles, tracks which one is active, and
// exposes the weather state that post-processing and rendering read.

pub mod profile;
pub mod sky;

pub use profile::{ColorAdjustments, EnvironmentProfile, FogSettings, ProfileComponent};
pub use sky::PhysicallyBasedSky;

/// Read access to the active environment profile
///
/// Components that need lighting data take this trait instead of the
/// concrete manager, so tests can substitute a fixed profile.
pub trait EnvironmentProvider {
    /// The currently active profile
    fn active_profile(&self) -> &EnvironmentProfile;
}

/// Sun direction derived from time of day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Elevation above the horizon in degrees, negative at night
    pub elevation_deg: f32,
    /// Compass azimuth in degrees, 0 at north increasing clockwise
    pub azimuth_deg: f32,
}

/// Errors from environment state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Requested profile name does not exist
    UnknownProfile(String),
}

impl std::fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentError::UnknownProfile(name) => {
                write!(f, "unknown environment profile: {}", name)
            }
        }
    }
}

impl std::error::Error for EnvironmentError {}

/// Environment manager
///
/// Holds every loaded profile plus the mutable weather state. Exactly one
/// profile is active at a time; the manager always holds at least one
/// profile so `active_profile` can return a reference unconditionally.
#[derive(Debug, Clone)]
pub struct EnvironmentManager {
    profiles: Vec<EnvironmentProfile>,
    active: usize,
    time_of_day: f32,
    rain: f32,
    fog: f32,
}

impl EnvironmentManager {
    /// Create a manager with a single active profile
    pub fn new(profile: EnvironmentProfile) -> Self {
        Self {
            profiles: vec![profile],
            active: 0,
            time_of_day: 12.0,
            rain: 0.0,
            fog: 0.0,
        }
    }

    /// Create a manager from a non-empty profile list
    ///
    /// The first profile starts active.
    ///
    /// # Panics
    /// Panics if `profiles` is empty
    pub fn with_profiles(profiles: Vec<EnvironmentProfile>) -> Self {
        assert!(
            !profiles.is_empty(),
            "environment manager requires at least one profile"
        );
        Self {
            profiles,
            active: 0,
            time_of_day: 12.0,
            rain: 0.0,
            fog: 0.0,
        }
    }

    /// Set time of day in hours, wrapped into `0.0..24.0`
    pub fn set_time_of_day(&mut self, hours: f32) {
        self.time_of_day = hours.rem_euclid(24.0);
    }

    /// Time of day in hours
    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    /// Set rain intensity, clamped to `0.0..=1.0`
    pub fn set_rain(&mut self, intensity: f32) {
        self.rain = intensity.clamp(0.0, 1.0);
    }

    /// Rain intensity in `0.0..=1.0`
    pub fn rain(&self) -> f32 {
        self.rain
    }

    /// Set fog intensity, clamped to `0.0..=1.0`
    pub fn set_fog(&mut self, intensity: f32) {
        self.fog = intensity.clamp(0.0, 1.0);
    }

    /// Fog intensity in `0.0..=1.0`
    pub fn fog(&self) -> f32 {
        self.fog
    }

    /// All loaded profiles
    pub fn profiles(&self) -> &[EnvironmentProfile] {
        &self.profiles
    }

    /// Switch the active profile by name
    pub fn set_active_profile(&mut self, name: &str) -> Result<(), EnvironmentError> {
        match self.profiles.iter().position(|p| p.name == name) {
            Some(index) => {
                self.active = index;
                Ok(())
            }
            None => Err(EnvironmentError::UnknownProfile(name.to_string())),
        }
    }

    /// Sun position for the current time of day
    ///
    /// Simple solar arc: the sun rises at 6:00, peaks at noon and sets at
    /// 18:00. Accurate ephemeris is out of scope; the arc only has to move
    /// light believably across a day cycle.
    pub fn sun_position(&self) -> SunPosition {
        let day_fraction = self.time_of_day / 24.0;
        let angle = (day_fraction - 0.25) * std::f32::consts::TAU;
        SunPosition {
            elevation_deg: angle.sin() * 90.0,
            azimuth_deg: (day_fraction * 360.0 + 180.0) % 360.0,
        }
    }
}

impl EnvironmentProvider for EnvironmentManager {
    fn active_profile(&self) -> &EnvironmentProfile {
        &self.profiles[self.active]
    }
}
