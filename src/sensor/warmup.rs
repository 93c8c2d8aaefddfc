// Warmup - sky convergence gate for camera initialization
//
// A freshly created camera would capture frames lit by a sky that is still
// accumulating scattering bounces. The warm-up gate forces one extra render
// per outstanding bounce so the first published frame is fully converged.

use crate::environment::EnvironmentProfile;

/// Sky warm-up gate
///
/// Tracks how many warm-up renders have happened against how many the
/// active sky requires. The gate demands exactly `required_frames + 1`
/// renders: one per scattering bounce plus a final settled frame. With no
/// sky in the profile the requirement is zero, leaving a single forced
/// render.
///
/// # Example
/// ```
/// use camsim::sensor::SkyWarmup;
///
/// let mut warmup = SkyWarmup::new(2);
/// let mut forced = 0;
/// while warmup.poll() {
///     forced += 1;
/// }
/// assert_eq!(forced, 3);
/// assert!(warmup.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyWarmup {
    rendered_frames: u32,
    required_frames: u32,
}

impl SkyWarmup {
    /// Create a gate requiring `required_frames` bounces of warm-up
    pub fn new(required_frames: u32) -> Self {
        Self {
            rendered_frames: 0,
            required_frames,
        }
    }

    /// Create a gate sized for a profile's sky
    ///
    /// Reads the bounce count from the profile's first sky component. A
    /// profile without a sky needs no convergence, so the requirement is
    /// zero and the gate forces exactly one render.
    pub fn from_profile(profile: &EnvironmentProfile) -> Self {
        let required = profile.sky().map(|sky| sky.number_of_bounces).unwrap_or(0);
        Self::new(required)
    }

    /// Ask the gate whether another warm-up render is needed
    ///
    /// Returns `true` and advances the counter while renders are still
    /// owed. Once the gate has returned `false` it stays inert: further
    /// polls never render and never move the counter.
    pub fn poll(&mut self) -> bool {
        if self.rendered_frames > self.required_frames {
            return false;
        }
        self.rendered_frames += 1;
        true
    }

    /// Whether warm-up has finished
    pub fn is_complete(&self) -> bool {
        self.rendered_frames > self.required_frames
    }

    /// Warm-up renders performed so far
    pub fn rendered_frames(&self) -> u32 {
        self.rendered_frames
    }

    /// Renders required by the sky's bounce count
    pub fn required_frames(&self) -> u32 {
        self.required_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{PhysicallyBasedSky, ProfileComponent};

    #[test]
    fn test_gate_forces_bounces_plus_one_renders() {
        let mut warmup = SkyWarmup::new(5);
        let mut forced = 0;
        while warmup.poll() {
            forced += 1;
        }
        assert_eq!(forced, 6);
    }

    #[test]
    fn test_zero_requirement_forces_exactly_one_render() {
        let mut warmup = SkyWarmup::new(0);
        assert!(warmup.poll());
        assert!(!warmup.poll());
    }

    #[test]
    fn test_completed_gate_stays_inert() {
        let mut warmup = SkyWarmup::new(1);
        while warmup.poll() {}
        let settled = warmup.rendered_frames();
        for _ in 0..100 {
            assert!(!warmup.poll());
        }
        assert_eq!(warmup.rendered_frames(), settled);
    }

    #[test]
    fn test_is_complete_tracks_poll() {
        let mut warmup = SkyWarmup::new(2);
        assert!(!warmup.is_complete());
        assert!(warmup.poll());
        assert!(!warmup.is_complete());
        assert!(warmup.poll());
        assert!(!warmup.is_complete());
        assert!(warmup.poll());
        assert!(warmup.is_complete());
    }

    #[test]
    fn test_from_profile_reads_sky_bounces() {
        let profile = EnvironmentProfile::new("day")
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::with_bounces(7)));
        let warmup = SkyWarmup::from_profile(&profile);
        assert_eq!(warmup.required_frames(), 7);
    }

    #[test]
    fn test_from_profile_without_sky_requires_zero() {
        let profile = EnvironmentProfile::new("bare");
        let warmup = SkyWarmup::from_profile(&profile);
        assert_eq!(warmup.required_frames(), 0);
    }

    #[test]
    fn test_from_profile_uses_first_sky_component() {
        let profile = EnvironmentProfile::new("double")
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::with_bounces(3)))
            .with_component(ProfileComponent::Sky(PhysicallyBasedSky::with_bounces(9)));
        let warmup = SkyWarmup::from_profile(&profile);
        assert_eq!(warmup.required_frames(), 3);
    }
}
