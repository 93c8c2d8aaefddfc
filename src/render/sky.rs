// Sky accumulation - converging multiple-scattering sky lighting
//
// Each render accumulates one more scattering bounce until the active
// profile's bounce count is reached. Until then the sky contribution is
// attenuated, which is why cameras warm the renderer up before capturing.

/// Per-bounce energy falloff of the scattering series
const BOUNCE_FALLOFF: f32 = 0.5;

/// Accumulated sky scattering state
#[derive(Debug, Clone, Default)]
pub struct SkyAccumulator {
    accumulated: u32,
}

impl SkyAccumulator {
    /// Create an accumulator with no bounces accumulated
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounces accumulated so far
    pub fn accumulated(&self) -> u32 {
        self.accumulated
    }

    /// Accumulate one bounce toward `target`, saturating once reached
    pub fn advance(&mut self, target: u32) {
        if self.accumulated < target {
            self.accumulated += 1;
        }
    }

    /// Whether the accumulator has converged against `target`
    pub fn is_converged(&self, target: u32) -> bool {
        self.accumulated >= target
    }

    /// Discard accumulated bounces
    ///
    /// Called when the active profile changes, since the scattering series
    /// is only valid for the sky it was accumulated under.
    pub fn reset(&mut self) {
        self.accumulated = 0;
    }

    /// Current sky intensity as a fraction of the converged intensity
    ///
    /// Partial sums of a geometric scattering series: reaches exactly 1.0
    /// once `target` bounces are accumulated, and stays there.
    pub fn gain(&self, target: u32) -> f32 {
        if target == 0 {
            return 1.0;
        }
        let done = self.accumulated.min(target);
        series_sum(done) / series_sum(target)
    }
}

fn series_sum(bounces: u32) -> f32 {
    // 1 + r + r^2 + ... + r^bounces
    (1.0 - BOUNCE_FALLOFF.powi(bounces as i32 + 1)) / (1.0 - BOUNCE_FALLOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_is_one_with_no_sky_bounces() {
        let acc = SkyAccumulator::new();
        assert_eq!(acc.gain(0), 1.0);
    }

    #[test]
    fn test_gain_converges_to_one() {
        let mut acc = SkyAccumulator::new();
        for _ in 0..4 {
            acc.advance(4);
        }
        assert!(acc.is_converged(4));
        assert!((acc.gain(4) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_gain_monotonic_while_converging() {
        let mut acc = SkyAccumulator::new();
        let mut previous = acc.gain(8);
        for _ in 0..8 {
            acc.advance(8);
            let gain = acc.gain(8);
            assert!(gain > previous);
            previous = gain;
        }
    }

    #[test]
    fn test_advance_saturates_at_target() {
        let mut acc = SkyAccumulator::new();
        for _ in 0..10 {
            acc.advance(3);
        }
        assert_eq!(acc.accumulated(), 3);
        assert!((acc.gain(3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_discards_accumulation() {
        let mut acc = SkyAccumulator::new();
        acc.advance(5);
        acc.advance(5);
        acc.reset();
        assert_eq!(acc.accumulated(), 0);
        assert!(acc.gain(5) < 1.0);
    }
}
