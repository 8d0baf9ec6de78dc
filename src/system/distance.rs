//! Ultrasonic distance estimation
//!
//! Turns raw HC-SR04 echo pulses into a trustworthy distance.
//!
//! # Sensor Operation
//! - Trigger: low for 2µs, high for 10µs, low again
//! - Echo: high pulse whose width is the round trip time of the burst
//! - Distance = width × speed of sound / 2
//!
//! # Signal Processing
//! - Rate limit: at most one physical measurement per 60ms, calls inside the
//!   window get the cached value. Also keeps consecutive bursts from hearing
//!   each other's echoes.
//! - Trigger gate: a burst that timed out still holds off the next one for
//!   the same interval, so a faulted sensor is not fired every poll tick.
//! - Envelope: readings are clamped into 2..400cm, modelling the blind spot
//!   and range limit of the sensor.
//! - Spikes: a reading more than 100cm away from the previous one is averaged
//!   with it.
//!
//! # Error Handling
//! - No echo within 30ms is a normal outcome (nothing in range), reported as
//!   `None`, never as an error.
//! - UI facing callers use [`DistanceEstimator::sample_with_fallback`], which
//!   substitutes a synthetic triangle wave so the radar view never stalls.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::{SensorConfig, SyntheticConfig};
use crate::system::hardware::PulseTimer;
use crate::system::synthetic::SyntheticRange;

/// Number of cycles averaged by the diagnostic dump
const DIAGNOSTIC_SAMPLES: u8 = 3;

/// Unclamped distance for an echo width, `None` for a missing echo
fn raw_distance(pulse_us: u32, config: &SensorConfig) -> Option<f32> {
    if pulse_us == 0 {
        return None;
    }
    Some(pulse_us as f32 * config.speed_of_sound_cm_per_us / 2.0)
}

/// Converts an echo width into a distance clamped into the sensor envelope
///
/// A width of 0 means the echo never arrived and yields `None`, which is not
/// the same as an object at the minimum distance.
pub fn convert(pulse_us: u32, config: &SensorConfig) -> Option<f32> {
    raw_distance(pulse_us, config).map(|cm| cm.clamp(config.min_range_cm, config.max_range_cm))
}

/// A distance handed to UI facing callers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Accepted sensor reading
    Measured(f32),
    /// Generated because the sensor reported no echo
    Synthetic(f32),
}

impl Reading {
    pub fn cm(&self) -> f32 {
        match *self {
            Reading::Measured(cm) | Reading::Synthetic(cm) => cm,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Reading::Synthetic(_))
    }
}

/// Snapshot for the sensor diagnostic page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub uptime_ms: u64,
    pub single_pulse_us: u32,
    pub single_cm: Option<f32>,
    pub averaged_cm: Option<f32>,
    pub averaged_samples: u8,
    pub last_cm: Option<f32>,
    pub last_sample_ms: u64,
    pub synthetic_cm: f32,
    pub synthetic_rising: bool,
}

struct Cm(Option<f32>);

impl fmt::Display for Cm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(cm) => write!(f, "{cm:.1} cm"),
            None => f.write_str("no echo"),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HC-SR04 diagnostic")?;
        writeln!(f, "uptime: {} ms", self.uptime_ms)?;
        writeln!(
            f,
            "single pulse: {} us -> {}",
            self.single_pulse_us,
            Cm(self.single_cm)
        )?;
        writeln!(
            f,
            "average of {}: {}",
            self.averaged_samples,
            Cm(self.averaged_cm)
        )?;
        writeln!(
            f,
            "last accepted: {} at {} ms",
            Cm(self.last_cm),
            self.last_sample_ms
        )?;
        writeln!(
            f,
            "synthetic: {:.1} cm ({})",
            self.synthetic_cm,
            if self.synthetic_rising { "rising" } else { "falling" }
        )
    }
}

/// HC-SR04 driver with debouncing, spike smoothing and a synthetic fallback
///
/// Owns the trigger pin, the echo timer and a delay provider. Time is passed
/// in by the caller so the rate limit stays deterministic.
pub struct DistanceEstimator<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    config: SensorConfig,
    last_distance_cm: Option<f32>,
    last_sample_ms: u64,
    last_trigger_ms: u64,
    synthetic: SyntheticRange,
}

impl<T, E, D> DistanceEstimator<T, E, D>
where
    T: OutputPin,
    E: PulseTimer,
    D: DelayNs,
{
    pub fn new(
        trigger: T,
        echo: E,
        delay: D,
        config: SensorConfig,
        synthetic: SyntheticConfig,
    ) -> Self {
        Self {
            trigger,
            echo,
            delay,
            config,
            last_distance_cm: None,
            last_sample_ms: 0,
            last_trigger_ms: 0,
            synthetic: SyntheticRange::new(synthetic),
        }
    }

    /// Last accepted reading
    pub fn last_distance(&self) -> Option<f32> {
        self.last_distance_cm
    }

    /// Clock value of the last accepted reading (ms)
    pub fn last_sample_ms(&self) -> u64 {
        self.last_sample_ms
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Rate limited, clamped and smoothed measurement
    ///
    /// Inside the sample interval the cached reading is returned and no burst
    /// is fired. A missing echo returns `None` and leaves the cache alone;
    /// until the interval has passed since that burst, calls keep returning
    /// `None` without firing again.
    pub async fn sample(&mut self, now_ms: u64) -> Option<f32> {
        let interval_ms = self.config.min_sample_interval_ms;
        if now_ms.saturating_sub(self.last_sample_ms) < interval_ms {
            return self.last_distance_cm;
        }
        if now_ms.saturating_sub(self.last_trigger_ms) < interval_ms {
            return None;
        }

        self.last_trigger_ms = now_ms;
        let pulse_us = self.ping().await;
        let Some(measured) = convert(pulse_us, &self.config) else {
            debug!("no echo within {} us", self.config.echo_timeout_us);
            return None;
        };

        let accepted = self.smooth(measured);
        self.last_distance_cm = Some(accepted);
        self.last_sample_ms = now_ms;
        debug!("distance {} cm (raw {} cm)", accepted, measured);
        Some(accepted)
    }

    /// Like [`sample`](Self::sample), but a missing echo is replaced by the
    /// next synthetic value, so the result is always a plausible distance
    pub async fn sample_with_fallback(&mut self, now_ms: u64) -> Reading {
        match self.sample(now_ms).await {
            Some(cm) => Reading::Measured(cm),
            None => Reading::Synthetic(self.next_synthetic()),
        }
    }

    /// Next value of the synthetic triangle wave, independent of the sensor
    pub fn next_synthetic(&mut self) -> f32 {
        self.synthetic.next_value()
    }

    /// Mean of `count` back to back measurements
    ///
    /// Ignores the rate limit and the cache; readings outside the envelope are
    /// dropped instead of clamped. Too slow for the polling loop, meant for
    /// one-shot diagnostics.
    pub async fn sample_averaged(&mut self, count: u8) -> Option<f32> {
        let mut sum = 0.0;
        let mut hits: u16 = 0;

        for cycle in 0..count {
            if cycle > 0 {
                self.delay.delay_ms(self.config.averaging_gap_ms).await;
            }
            let pulse_us = self.ping().await;
            match raw_distance(pulse_us, &self.config) {
                Some(cm) if self.config.in_range(cm) => {
                    sum += cm;
                    hits += 1;
                }
                _ => {}
            }
        }

        if hits == 0 {
            return None;
        }
        Some(sum / f32::from(hits))
    }

    /// Collects everything the diagnostic page shows
    pub async fn diagnose(&mut self, now_ms: u64) -> Diagnostics {
        let single_pulse_us = self.ping().await;
        self.delay.delay_ms(self.config.averaging_gap_ms).await;
        let averaged_cm = self.sample_averaged(DIAGNOSTIC_SAMPLES).await;

        Diagnostics {
            uptime_ms: now_ms,
            single_pulse_us,
            single_cm: convert(single_pulse_us, &self.config),
            averaged_cm,
            averaged_samples: DIAGNOSTIC_SAMPLES,
            last_cm: self.last_distance_cm,
            last_sample_ms: self.last_sample_ms,
            synthetic_cm: self.synthetic.value(),
            synthetic_rising: self.synthetic.is_rising(),
        }
    }

    /// Large jumps are averaged with the previous reading rather than
    /// rejected. This may have been meant as outlier rejection; it is kept
    /// as a one step low-pass.
    fn smooth(&self, measured: f32) -> f32 {
        match self.last_distance_cm {
            Some(previous)
                if previous > 0.0 && libm::fabsf(measured - previous) > self.config.max_jump_cm =>
            {
                (previous + measured) / 2.0
            }
            _ => measured,
        }
    }

    /// One trigger/echo cycle, returns the echo width (0 on timeout)
    async fn ping(&mut self) -> u32 {
        if self.fire_trigger().await.is_err() {
            warn!("trigger pin write failed");
            return 0;
        }
        self.echo.high_pulse_us(self.config.echo_timeout_us).await
    }

    async fn fire_trigger(&mut self) -> Result<(), T::Error> {
        self.trigger.set_low()?;
        self.delay.delay_us(self.config.trigger_settle_us).await;
        self.trigger.set_high()?;
        self.delay.delay_us(self.config.trigger_pulse_us).await;
        self.trigger.set_low()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fakes::{pulse_for, CountingTrigger, RecordingDelay, ScriptedEcho};
    use embassy_futures::block_on;

    type Estimator = DistanceEstimator<CountingTrigger, ScriptedEcho, RecordingDelay>;

    fn estimator() -> (Estimator, CountingTrigger, ScriptedEcho) {
        let trigger = CountingTrigger::default();
        let echo = ScriptedEcho::default();
        let estimator = DistanceEstimator::new(
            trigger.clone(),
            echo.clone(),
            RecordingDelay::default(),
            SensorConfig::DEFAULT,
            SyntheticConfig::DEFAULT,
        );
        (estimator, trigger, echo)
    }

    fn assert_close(actual: Option<f32>, expected: f32) {
        let actual = actual.expect("expected a reading");
        assert!(
            (actual - expected).abs() < 0.05,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn conversion_is_clamped_into_envelope() {
        let config = SensorConfig::DEFAULT;
        for width in [1, 50, 116, 1_000, 5_000, 23_000, 30_000, u32::MAX] {
            let cm = convert(width, &config).unwrap();
            assert!((2.0..=400.0).contains(&cm), "{width} us gave {cm} cm");
        }
        assert_eq!(convert(1, &config), Some(2.0));
        assert_eq!(convert(40_000, &config), Some(400.0));
    }

    #[test]
    fn missing_echo_is_not_zero_distance() {
        assert_eq!(convert(0, &SensorConfig::DEFAULT), None);
    }

    #[test]
    fn calls_inside_interval_reuse_cached_reading() {
        let (mut estimator, trigger, echo) = estimator();
        echo.push_cm(42.0);
        echo.push_cm(300.0);

        let first = block_on(estimator.sample(1_000));
        let second = block_on(estimator.sample(1_059));

        assert_close(first, 42.0);
        assert_eq!(first, second);
        assert_eq!(trigger.pulses(), 1);
    }

    #[test]
    fn samples_again_once_interval_elapsed() {
        let (mut estimator, trigger, echo) = estimator();
        echo.push_cm(42.0);
        echo.push_cm(60.0);

        block_on(estimator.sample(1_000));
        let later = block_on(estimator.sample(1_060));

        assert_close(later, 60.0);
        assert_eq!(trigger.pulses(), 2);
        assert_eq!(estimator.last_sample_ms(), 1_060);
    }

    #[test]
    fn large_jump_is_averaged_with_previous() {
        let (mut estimator, _, echo) = estimator();
        echo.push_cm(50.0);
        echo.push_cm(200.0);

        block_on(estimator.sample(100));
        let smoothed = block_on(estimator.sample(200));

        assert_close(smoothed, 125.0);
        assert_close(estimator.last_distance(), 125.0);
    }

    #[test]
    fn small_change_is_taken_as_is() {
        let (mut estimator, _, echo) = estimator();
        echo.push_cm(50.0);
        echo.push_cm(140.0);

        block_on(estimator.sample(100));
        assert_close(block_on(estimator.sample(200)), 140.0);
    }

    #[test]
    fn timeout_leaves_state_untouched() {
        let (mut estimator, _, echo) = estimator();
        echo.push_cm(75.0);
        block_on(estimator.sample(100));

        // queue drained: the next ping times out
        assert_eq!(block_on(estimator.sample(200)), None);
        assert_close(estimator.last_distance(), 75.0);
        assert_eq!(estimator.last_sample_ms(), 100);
    }

    #[test]
    fn timed_out_burst_holds_off_next_trigger() {
        let (mut estimator, trigger, echo) = estimator();

        assert_eq!(block_on(estimator.sample(1_000)), None);
        assert_eq!(block_on(estimator.sample(1_010)), None);
        assert_eq!(block_on(estimator.sample(1_020)), None);
        assert_eq!(trigger.pulses(), 1);

        echo.push_cm(45.0);
        assert_close(block_on(estimator.sample(1_060)), 45.0);
        assert_eq!(trigger.pulses(), 2);
        assert_eq!(estimator.last_sample_ms(), 1_060);
    }

    #[test]
    fn boot_window_returns_unknown_without_trigger() {
        let (mut estimator, trigger, echo) = estimator();
        echo.push_cm(75.0);

        assert_eq!(block_on(estimator.sample(10)), None);
        assert_eq!(trigger.pulses(), 0);
    }

    #[test]
    fn fallback_masks_timeouts() {
        let (mut estimator, _, echo) = estimator();

        let first = block_on(estimator.sample_with_fallback(100));
        let second = block_on(estimator.sample_with_fallback(200));
        assert_eq!(first, Reading::Synthetic(15.0));
        assert_eq!(second, Reading::Synthetic(20.0));

        echo.push_cm(33.0);
        let real = block_on(estimator.sample_with_fallback(300));
        assert!(!real.is_synthetic());
        assert!((real.cm() - 33.0).abs() < 0.05);
    }

    #[test]
    fn averaged_sample_is_mean_of_hits() {
        let (mut estimator, trigger, echo) = estimator();
        echo.push_cm(20.0);
        echo.push_cm(22.0);
        echo.push_cm(24.0);

        assert_close(block_on(estimator.sample_averaged(3)), 22.0);
        assert_eq!(trigger.pulses(), 3);
        // diagnostic cycles never touch the cache
        assert_eq!(estimator.last_distance(), None);
    }

    #[test]
    fn averaged_sample_without_hits_is_unknown() {
        let (mut estimator, _, _) = estimator();
        assert_eq!(block_on(estimator.sample_averaged(3)), None);
    }

    #[test]
    fn averaged_sample_drops_out_of_envelope_readings() {
        let (mut estimator, _, echo) = estimator();
        echo.push_cm(30.0);
        echo.push(pulse_for(900.0));
        echo.push(0);

        assert_close(block_on(estimator.sample_averaged(3)), 30.0);
    }

    #[test]
    fn diagnostics_render_as_text() {
        let (mut estimator, _, echo) = estimator();
        echo.push_cm(50.0);
        echo.push_cm(50.0);

        let report = block_on(estimator.diagnose(5_000));
        let text = report.to_string();

        assert_eq!(report.uptime_ms, 5_000);
        assert!(text.contains("HC-SR04 diagnostic"));
        assert!(text.contains("single pulse"));
        assert!(text.contains("average of 3: 50.0 cm"));
        assert!(text.contains("last accepted: no echo"));
    }
}
