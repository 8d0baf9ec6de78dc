//! Pan Actuator
//!
//! Positions the servo carrying the ultrasonic sensor, either directly or as a
//! continuous sweep over the full 0-180° range.
//!
//! # Sweep
//! [`PanActuator::advance`] performs at most one step per call and never
//! blocks; the polling task calls it every tick. A step is taken once the
//! interval of the current sweep mode has elapsed. The ranging mode steps at
//! the sensor's sample rate so every angle gets its own reading.

use crate::config::SweepConfig;
use crate::system::hardware::AngleServo;

/// Upper end of the servo travel (°)
pub const MAX_ANGLE: u8 = 180;

/// How the sweep is paced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SweepMode {
    /// Plain visual sweep
    Plain,
    /// Radar sweep, one step per distance sample
    RangingSync,
}

pub struct PanActuator<S> {
    servo: S,
    config: SweepConfig,
    angle: u8,
    rising: bool,
    sweep: Option<SweepMode>,
    last_step_ms: u64,
}

impl<S: AngleServo> PanActuator<S> {
    /// Takes the servo and moves it to the center position
    pub fn new(mut servo: S, config: SweepConfig) -> Self {
        servo.write_degrees(config.center_deg);
        Self {
            servo,
            config,
            angle: config.center_deg,
            rising: true,
            sweep: None,
            last_step_ms: 0,
        }
    }

    /// Current servo angle (°)
    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// Active sweep mode, `None` while stationary
    pub fn sweep_mode(&self) -> Option<SweepMode> {
        self.sweep
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_some()
    }

    /// Moves straight to `degrees`, clamped into 0..=180, and ends any sweep
    pub fn set_angle(&mut self, degrees: i32) {
        self.sweep = None;
        let clamped = degrees.clamp(0, i32::from(MAX_ANGLE)) as u8;
        match clamped {
            0 => self.rising = true,
            MAX_ANGLE => self.rising = false,
            _ => {}
        }
        self.write(clamped);
        info!("pan angle {}", clamped);
    }

    pub fn start_sweep(&mut self) {
        self.start_sweep_mode(SweepMode::Plain);
    }

    /// Starts sweeping from the current angle
    pub fn start_sweep_mode(&mut self, mode: SweepMode) {
        info!("pan sweep started ({})", mode);
        self.sweep = Some(mode);
    }

    /// Ends the sweep, leaving the servo where it is
    pub fn stop_sweep(&mut self) {
        if self.sweep.take().is_some() {
            info!("pan sweep stopped at {}", self.angle);
        }
    }

    /// Ends the sweep and returns to the center position
    pub fn recenter(&mut self) {
        self.sweep = None;
        self.write(self.config.center_deg);
    }

    /// One sweep step if sweeping and the step interval has elapsed
    ///
    /// Returns whether the servo moved.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let Some(mode) = self.sweep else {
            return false;
        };
        let interval = match mode {
            SweepMode::Plain => self.config.plain_interval_ms,
            SweepMode::RangingSync => self.config.ranging_interval_ms,
        };
        if now_ms.saturating_sub(self.last_step_ms) < interval {
            return false;
        }
        self.last_step_ms = now_ms;

        let step = self.config.step_deg;
        let next = if self.rising {
            let next = self.angle.saturating_add(step).min(MAX_ANGLE);
            if next == MAX_ANGLE {
                self.rising = false;
            }
            next
        } else {
            let next = self.angle.saturating_sub(step);
            if next == 0 {
                self.rising = true;
            }
            next
        };
        self.write(next);
        true
    }

    fn write(&mut self, degrees: u8) {
        self.angle = degrees;
        self.servo.write_degrees(degrees);
    }
}
