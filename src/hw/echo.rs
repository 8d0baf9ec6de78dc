//! HC-SR04 echo timing and the system clock on embassy-time

use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Instant};
use radar_rover::system::hardware::{Clock, PulseTimer};

/// Measures the echo pulse on a GPIO input
pub struct EchoTimer {
    echo: Input<'static>,
}

impl EchoTimer {
    pub fn new(echo: Input<'static>) -> Self {
        Self { echo }
    }
}

impl PulseTimer for EchoTimer {
    async fn high_pulse_us(&mut self, timeout_us: u32) -> u32 {
        let echo = &mut self.echo;
        let pulse = async {
            // A pulse already in progress would be measured short
            echo.wait_for_low().await;
            echo.wait_for_high().await;
            let start = Instant::now();
            echo.wait_for_low().await;
            start.elapsed().as_micros()
        };

        match with_timeout(Duration::from_micros(u64::from(timeout_us)), pulse).await {
            Ok(width_us) => u32::try_from(width_us).unwrap_or(u32::MAX),
            Err(_) => 0,
        }
    }
}

/// Milliseconds since boot from the embassy time driver
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
