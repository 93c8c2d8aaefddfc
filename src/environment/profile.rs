// Profile - environment profiles and their components
//
// A profile is an ordered list of components (sky, fog, color grading).
// Lookups return the first component of the requested kind, so component
// order in a profile is significant.

use serde::{Deserialize, Serialize};

use super::sky::PhysicallyBasedSky;

/// Exponential fog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSettings {
    /// Fog density multiplier
    #[serde(default = "default_fog_density")]
    pub density: f32,
    /// Distance in meters at which fog reaches full strength
    #[serde(default = "default_fog_distance")]
    pub max_distance: f32,
}

fn default_fog_density() -> f32 {
    1.0
}

fn default_fog_distance() -> f32 {
    800.0
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            density: 1.0,
            max_distance: 800.0,
        }
    }
}

/// Color grading adjustments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAdjustments {
    /// Post-exposure in EV
    #[serde(default)]
    pub post_exposure: f32,
    /// Saturation adjustment in `-100.0..=100.0`
    #[serde(default)]
    pub saturation: f32,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            post_exposure: 0.0,
            saturation: 0.0,
        }
    }
}

/// One component of an environment profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProfileComponent {
    /// Physically based sky
    Sky(PhysicallyBasedSky),
    /// Exponential fog
    Fog(FogSettings),
    /// Color grading
    Color(ColorAdjustments),
}

/// Environment profile holding a set of lighting components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    /// Profile name, referenced from the simulation config
    pub name: String,
    /// Components in lookup order
    #[serde(default)]
    pub components: Vec<ProfileComponent>,
}

impl EnvironmentProfile {
    /// Create an empty profile
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// Add a component, returning the profile for chaining
    pub fn with_component(mut self, component: ProfileComponent) -> Self {
        self.components.push(component);
        self
    }

    /// First sky component in the profile, if any
    pub fn sky(&self) -> Option<&PhysicallyBasedSky> {
        self.components.iter().find_map(|c| match c {
            ProfileComponent::Sky(sky) => Some(sky),
            _ => None,
        })
    }

    /// First fog component in the profile, if any
    pub fn fog(&self) -> Option<&FogSettings> {
        self.components.iter().find_map(|c| match c {
            ProfileComponent::Fog(fog) => Some(fog),
            _ => None,
        })
    }

    /// First color grading component in the profile, if any
    pub fn color(&self) -> Option<&ColorAdjustments> {
        self.components.iter().find_map(|c| match c {
            ProfileComponent::Color(color) => Some(color),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_has_no_sky() {
        let profile = EnvironmentProfile::new("empty");
        assert!(profile.sky().is_none());
        assert!(profile.fog().is_none());
    }

    #[test]
    fn test_sky_lookup_returns_first_match() {
        let profile = EnvironmentProfile::new("day")
            .with_component(ProfileComponent::Fog(FogSettings::default()))
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::with_bounces(3)))
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::with_bounces(9)));

        let sky = profile.sky().unwrap();
        assert_eq!(sky.number_of_bounces, 3);
    }

    #[test]
    fn test_component_order_preserved() {
        let profile = EnvironmentProfile::new("ordered")
            .with_component(ProfileComponent::Color(ColorAdjustments::default()))
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::default()));

        assert!(matches!(
            profile.components[0],
            ProfileComponent::Color(_)
        ));
        assert!(matches!(profile.components[1], ProfileComponent::Sky(_)));
    }

    #[test]
    fn test_profile_toml_round_trip() {
        let profile = EnvironmentProfile::new("day")
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::with_bounces(4)))
            .with_component(ProfileComponent::Fog(FogSettings {
                density: 0.5,
                max_distance: 400.0,
            }));

        let text = toml::to_string(&profile).unwrap();
        let parsed: EnvironmentProfile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, profile);
    }
}
