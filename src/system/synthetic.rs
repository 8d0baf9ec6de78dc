//! Synthetic distance generator
//!
//! A deterministic triangle wave standing in for the ultrasonic sensor when it
//! reports no echo, so the radar view keeps moving on the bench without
//! hardware attached.

use crate::config::SyntheticConfig;

/// Triangle wave between `lower_cm` and `upper_cm`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticRange {
    config: SyntheticConfig,
    value: f32,
    rising: bool,
}

impl SyntheticRange {
    /// Starts at the lower bound, rising
    pub const fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            value: config.lower_cm,
            rising: true,
        }
    }

    /// Advances one step and returns the new value
    ///
    /// Direction flips once a bound is reached, so the value never leaves the
    /// band and consecutive values are never more than one step apart.
    pub fn next_value(&mut self) -> f32 {
        let SyntheticConfig {
            lower_cm,
            upper_cm,
            step_cm,
        } = self.config;

        if self.rising {
            self.value = (self.value + step_cm).min(upper_cm);
            if self.value >= upper_cm {
                self.rising = false;
            }
        } else {
            self.value = (self.value - step_cm).max(lower_cm);
            if self.value <= lower_cm {
                self.rising = true;
            }
        }
        self.value
    }

    /// Last produced value
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }
}

impl Default for SyntheticRange {
    fn default() -> Self {
        Self::new(SyntheticConfig::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_to_upper_bound_then_falls() {
        let mut wave = SyntheticRange::default();
        let rising: Vec<f32> = (0..14).map(|_| wave.next_value()).collect();

        assert_eq!(rising.first(), Some(&15.0));
        assert_eq!(rising.last(), Some(&80.0));
        assert!(!wave.is_rising());
        assert_eq!(wave.next_value(), 75.0);
    }

    #[test]
    fn stays_in_band_with_single_steps() {
        let mut wave = SyntheticRange::default();
        let mut previous = wave.value();
        let mut saw_lower_turn = false;

        for _ in 0..200 {
            let value = wave.next_value();
            assert!((10.0..=80.0).contains(&value), "{value} out of band");
            assert_eq!((value - previous).abs(), 5.0);
            if value == 10.0 {
                saw_lower_turn = true;
                assert!(wave.is_rising());
            }
            previous = value;
        }
        assert!(saw_lower_turn);
    }

    #[test]
    fn step_not_dividing_band_still_hits_bounds() {
        let mut wave = SyntheticRange::new(SyntheticConfig {
            lower_cm: 10.0,
            upper_cm: 80.0,
            step_cm: 30.0,
        });

        assert_eq!(wave.next_value(), 40.0);
        assert_eq!(wave.next_value(), 70.0);
        assert_eq!(wave.next_value(), 80.0);
        assert_eq!(wave.next_value(), 50.0);
    }
}
