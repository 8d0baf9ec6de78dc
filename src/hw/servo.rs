//! Pan Servo Driver
//!
//! Hobby servo on a PIO state machine generating the PWM, since the hardware
//! slices are taken by the motors. The horn position follows the pulse width:
//! 500µs is 0°, 2400µs is 180°, repeated every 20ms.

use core::time::Duration;

use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::pwm::PioPwm;
use radar_rover::system::hardware::AngleServo;

const DEFAULT_MIN_PULSE_WIDTH: u64 = 500; // 0°
const DEFAULT_MAX_PULSE_WIDTH: u64 = 2400; // 180°
const DEFAULT_MAX_DEGREE_ROTATION: u64 = 180;
const REFRESH_INTERVAL: u64 = 20000; // The period of each cycle

pub struct ServoBuilder<'d, T: Instance, const SM: usize> {
    pwm: PioPwm<'d, T, SM>,
    period: Duration,
    min_pulse_width: Duration,
    max_pulse_width: Duration,
    max_degree_rotation: u64,
}

impl<'d, T: Instance, const SM: usize> ServoBuilder<'d, T, SM> {
    pub fn new(pwm: PioPwm<'d, T, SM>) -> Self {
        Self {
            pwm,
            period: Duration::from_micros(REFRESH_INTERVAL),
            min_pulse_width: Duration::from_micros(DEFAULT_MIN_PULSE_WIDTH),
            max_pulse_width: Duration::from_micros(DEFAULT_MAX_PULSE_WIDTH),
            max_degree_rotation: DEFAULT_MAX_DEGREE_ROTATION,
        }
    }

    pub fn build(mut self) -> Servo<'d, T, SM> {
        self.pwm.set_period(self.period);
        self.pwm.start();
        Servo {
            pwm: self.pwm,
            min_pulse_width: self.min_pulse_width,
            max_pulse_width: self.max_pulse_width,
            max_degree_rotation: self.max_degree_rotation,
        }
    }
}

pub struct Servo<'d, T: Instance, const SM: usize> {
    pwm: PioPwm<'d, T, SM>,
    min_pulse_width: Duration,
    max_pulse_width: Duration,
    max_degree_rotation: u64,
}

impl<'d, T: Instance, const SM: usize> Servo<'d, T, SM> {
    /// Pulse width for `degree`, linear between the calibrated end points
    fn pulse_width(&self, degree: u64) -> Duration {
        let degree = degree.min(self.max_degree_rotation);
        let span_ns = self.max_pulse_width.as_nanos() as u64 - self.min_pulse_width.as_nanos() as u64;
        let ns = self.min_pulse_width.as_nanos() as u64 + degree * span_ns / self.max_degree_rotation;
        Duration::from_nanos(ns).min(self.max_pulse_width)
    }
}

impl<'d, T: Instance, const SM: usize> AngleServo for Servo<'d, T, SM> {
    fn write_degrees(&mut self, degrees: u8) {
        let duration = self.pulse_width(u64::from(degrees));
        self.pwm.write(duration);
    }
}
