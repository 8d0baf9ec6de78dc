//! Radar
//!
//! The distance sensor mounted on the pan servo. Both share one mutex in the
//! firmware, since a reading only means something together with the angle it
//! was taken at.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::system::distance::DistanceEstimator;
use crate::system::hardware::{AngleServo, PulseTimer};
use crate::system::pan::{PanActuator, SweepMode};
use crate::system::report::RadarReport;

pub struct Radar<T, E, D, S> {
    ranger: DistanceEstimator<T, E, D>,
    pan: PanActuator<S>,
}

impl<T, E, D, S> Radar<T, E, D, S>
where
    T: OutputPin,
    E: PulseTimer,
    D: DelayNs,
    S: AngleServo,
{
    pub fn new(ranger: DistanceEstimator<T, E, D>, pan: PanActuator<S>) -> Self {
        Self { ranger, pan }
    }

    pub fn ranger(&mut self) -> &mut DistanceEstimator<T, E, D> {
        &mut self.ranger
    }

    pub fn pan(&mut self) -> &mut PanActuator<S> {
        &mut self.pan
    }

    /// Periodic work: one sweep step, plus a sample when a radar sweep moved
    pub async fn tick(&mut self, now_ms: u64) {
        let stepped = self.pan.advance(now_ms);
        if stepped && self.pan.sweep_mode() == Some(SweepMode::RangingSync) {
            self.ranger.sample(now_ms).await;
        }
    }

    /// Current angle with a distance that is always plausible
    pub async fn report(&mut self, now_ms: u64) -> RadarReport {
        let reading = self.ranger.sample_with_fallback(now_ms).await;
        RadarReport::new(self.pan.angle(), reading, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SensorConfig, SweepConfig, SyntheticConfig};
    use crate::system::fakes::{
        CountingTrigger, RecordingDelay, RecordingServo, ScriptedEcho,
    };
    use crate::system::report::ReadingStatus;
    use embassy_futures::block_on;

    type TestRadar = Radar<CountingTrigger, ScriptedEcho, RecordingDelay, RecordingServo>;

    fn radar() -> (TestRadar, CountingTrigger, ScriptedEcho) {
        let trigger = CountingTrigger::default();
        let echo = ScriptedEcho::default();
        let ranger = DistanceEstimator::new(
            trigger.clone(),
            echo.clone(),
            RecordingDelay::default(),
            SensorConfig::DEFAULT,
            SyntheticConfig::DEFAULT,
        );
        let pan = PanActuator::new(RecordingServo::default(), SweepConfig::DEFAULT);
        (Radar::new(ranger, pan), trigger, echo)
    }

    #[test]
    fn idle_tick_does_not_sample() {
        let (mut radar, trigger, _) = radar();
        block_on(radar.tick(1_000));
        assert_eq!(trigger.pulses(), 0);
        assert_eq!(radar.pan().angle(), 90);
    }

    #[test]
    fn plain_sweep_moves_without_sampling() {
        let (mut radar, trigger, _) = radar();
        radar.pan().start_sweep();
        block_on(radar.tick(100));
        assert_eq!(radar.pan().angle(), 92);
        assert_eq!(trigger.pulses(), 0);
    }

    #[test]
    fn ranging_sweep_samples_on_every_step() {
        let (mut radar, trigger, echo) = radar();
        echo.push_cm(40.0);
        echo.push_cm(45.0);
        radar.pan().start_sweep_mode(SweepMode::RangingSync);

        block_on(radar.tick(100));
        block_on(radar.tick(110));
        block_on(radar.tick(160));

        assert_eq!(trigger.pulses(), 2);
        assert_eq!(radar.pan().angle(), 94);
        let last = radar.ranger().last_distance().unwrap();
        assert!((last - 45.0).abs() < 0.05);
    }

    #[test]
    fn report_falls_back_to_synthetic() {
        let (mut radar, _, _) = radar();
        let report = block_on(radar.report(500));

        assert_eq!(report.angle, 90);
        assert_eq!(report.distance, 15.0);
        assert_eq!(report.status, ReadingStatus::Simulated);
        assert_eq!(report.timestamp, 500);
    }

    #[test]
    fn report_uses_measured_distance() {
        let (mut radar, _, echo) = radar();
        echo.push_cm(63.0);
        radar.pan().set_angle(120);

        let report = block_on(radar.report(500));
        assert_eq!(report.angle, 120);
        assert_eq!(report.distance, 63.0);
        assert_eq!(report.status, ReadingStatus::Ok);
    }
}
