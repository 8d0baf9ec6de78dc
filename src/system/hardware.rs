//! Platform seams
//!
//! The few things the robot logic needs from the board that embedded-hal does
//! not already describe. The firmware implements them over embassy-rp and
//! embassy-time; tests implement them with fakes.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;
}

/// Echo pulse width measurement
#[allow(async_fn_in_trait)]
pub trait PulseTimer {
    /// Waits for the next high pulse and returns its width in microseconds.
    ///
    /// Returns 0 when no complete pulse is seen within `timeout_us`.
    async fn high_pulse_us(&mut self, timeout_us: u32) -> u32;
}

/// Positional servo
pub trait AngleServo {
    /// Moves the horn to `degrees`, already clamped by the caller
    fn write_degrees(&mut self, degrees: u8);
}
