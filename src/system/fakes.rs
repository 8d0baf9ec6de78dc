//! Test doubles for the hardware seams
//!
//! Every fake is a cheap clone over shared cells, so a test keeps one handle
//! for inspection and moves the other into the component under test.

use core::convert::Infallible;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::config::SensorConfig;
use crate::system::hardware::{AngleServo, Clock, PulseTimer};

/// Echo width that converts back to `cm` with the default speed of sound
pub fn pulse_for(cm: f32) -> u32 {
    (cm * 2.0 / SensorConfig::DEFAULT.speed_of_sound_cm_per_us).round() as u32
}

/// Trigger pin that counts rising edges
#[derive(Clone, Default)]
pub struct CountingTrigger {
    pulses: Rc<Cell<u32>>,
}

impl CountingTrigger {
    pub fn pulses(&self) -> u32 {
        self.pulses.get()
    }
}

impl embedded_hal::digital::ErrorType for CountingTrigger {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for CountingTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pulses.set(self.pulses.get() + 1);
        Ok(())
    }
}

/// Echo line replaying queued pulse widths, 0 (timeout) once drained
#[derive(Clone, Default)]
pub struct ScriptedEcho {
    widths: Rc<RefCell<VecDeque<u32>>>,
}

impl ScriptedEcho {
    pub fn push(&self, width_us: u32) {
        self.widths.borrow_mut().push_back(width_us);
    }

    pub fn push_cm(&self, cm: f32) {
        self.push(pulse_for(cm));
    }
}

impl PulseTimer for ScriptedEcho {
    async fn high_pulse_us(&mut self, _timeout_us: u32) -> u32 {
        self.widths.borrow_mut().pop_front().unwrap_or(0)
    }
}

/// Delay that records requested milliseconds and returns at once
///
/// With `yielding` set every millisecond delay yields to the executor once,
/// which lets a competing future in a `select` make progress.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    ms: Rc<RefCell<Vec<u32>>>,
    yielding: bool,
}

impl RecordingDelay {
    pub fn yielding() -> Self {
        Self {
            yielding: true,
            ..Self::default()
        }
    }

    pub fn recorded_ms(&self) -> Vec<u32> {
        self.ms.borrow().clone()
    }
}

impl embedded_hal_async::delay::DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_us(&mut self, _us: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.ms.borrow_mut().push(ms);
        if self.yielding {
            embassy_futures::yield_now().await;
        }
    }
}

/// Servo remembering every position written
#[derive(Clone, Default)]
pub struct RecordingServo {
    positions: Rc<RefCell<Vec<u8>>>,
}

impl RecordingServo {
    pub fn positions(&self) -> Vec<u8> {
        self.positions.borrow().clone()
    }

    pub fn last(&self) -> Option<u8> {
        self.positions.borrow().last().copied()
    }
}

impl AngleServo for RecordingServo {
    fn write_degrees(&mut self, degrees: u8) {
        self.positions.borrow_mut().push(degrees);
    }
}

/// Error of a [`FakePwm`] set to fail
#[derive(Debug, Clone, Copy)]
pub struct PwmFault;

impl embedded_hal::pwm::Error for PwmFault {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

/// PWM channel with an 8 bit range, remembering its duty
#[derive(Clone, Default)]
pub struct FakePwm {
    duty: Rc<Cell<u16>>,
    failing: Rc<Cell<bool>>,
}

impl FakePwm {
    pub fn duty(&self) -> u16 {
        self.duty.get()
    }

    pub fn fail(&self) {
        self.failing.set(true);
    }
}

impl embedded_hal::pwm::ErrorType for FakePwm {
    type Error = PwmFault;
}

impl embedded_hal::pwm::SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if self.failing.get() {
            return Err(PwmFault);
        }
        self.duty.set(duty);
        Ok(())
    }
}

/// Clock the test moves by hand
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
