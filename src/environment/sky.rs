// Sky - physically based sky settings
//
// Atmosphere parameters for the multiple-scattering sky model. The bounce
// count drives how many renders a camera needs before its first frame sees
// fully converged sky lighting.

use serde::{Deserialize, Serialize};

/// Default number of light bounces the sky model accumulates
pub const DEFAULT_SKY_BOUNCES: u32 = 8;

/// Physically based sky component
///
/// The renderer accumulates one scattering bounce per render. A camera that
/// starts capturing before `number_of_bounces` renders have completed sees a
/// sky that is still converging, so cameras force that many extra renders
/// during initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicallyBasedSky {
    /// Number of scattering bounces to accumulate
    #[serde(default = "default_bounces")]
    pub number_of_bounces: u32,
    /// Average ground reflectance in `0.0..=1.0`
    #[serde(default = "default_ground_albedo")]
    pub ground_albedo: f32,
    /// Aerosol (haze) density multiplier
    #[serde(default = "default_aerosol_density")]
    pub aerosol_density: f32,
    /// Exposure compensation applied on top of scene exposure, in EV
    #[serde(default)]
    pub exposure_compensation: f32,
}

fn default_bounces() -> u32 {
    DEFAULT_SKY_BOUNCES
}

fn default_ground_albedo() -> f32 {
    0.25
}

fn default_aerosol_density() -> f32 {
    0.5
}

impl Default for PhysicallyBasedSky {
    fn default() -> Self {
        Self {
            number_of_bounces: DEFAULT_SKY_BOUNCES,
            ground_albedo: 0.25,
            aerosol_density: 0.5,
            exposure_compensation: 0.0,
        }
    }
}

impl PhysicallyBasedSky {
    /// Create sky settings with an explicit bounce count
    pub fn with_bounces(number_of_bounces: u32) -> Self {
        Self {
            number_of_bounces,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sky() {
        let sky = PhysicallyBasedSky::default();
        assert_eq!(sky.number_of_bounces, DEFAULT_SKY_BOUNCES);
        assert_eq!(sky.ground_albedo, 0.25);
        assert_eq!(sky.aerosol_density, 0.5);
        assert_eq!(sky.exposure_compensation, 0.0);
    }

    #[test]
    fn test_with_bounces() {
        let sky = PhysicallyBasedSky::with_bounces(3);
        assert_eq!(sky.number_of_bounces, 3);
        assert_eq!(sky.ground_albedo, 0.25);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let sky: PhysicallyBasedSky = toml::from_str("number_of_bounces = 2").unwrap();
        assert_eq!(sky.number_of_bounces, 2);
        assert_eq!(sky.ground_albedo, 0.25);
        assert_eq!(sky.aerosol_density, 0.5);
    }
}
