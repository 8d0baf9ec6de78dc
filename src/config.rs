//! Compile-time configuration
//!
//! Calibration constants and network settings. Every component takes its
//! config struct by value at construction, so a different robot only needs a
//! different set of constants here.
//!
//! # Groups
//! - [`SensorConfig`]: HC-SR04 trigger timing, envelope and filtering
//! - [`SyntheticConfig`]: fallback distance generator band
//! - [`DriveConfig`] / [`SquarePathConfig`]: motor duties and timed square path
//! - [`SweepConfig`]: pan servo sweep
//! - [`NetworkConfig`]: access point and HTTP server

/// Period of the radar polling loop (ms)
pub const TICK_MS: u64 = 10;

/// HC-SR04 ranging parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    /// Minimum time between two physical measurements (ms)
    pub min_sample_interval_ms: u64,
    /// Sensor blind spot, shorter readings are clamped up to this (cm)
    pub min_range_cm: f32,
    /// Sensor range limit, longer readings are clamped down to this (cm)
    pub max_range_cm: f32,
    /// Largest accepted change between two consecutive readings (cm)
    pub max_jump_cm: f32,
    /// Bound on the wait for the echo pulse (µs)
    pub echo_timeout_us: u32,
    /// Low time before the trigger pulse (µs)
    pub trigger_settle_us: u32,
    /// Trigger pulse width (µs)
    pub trigger_pulse_us: u32,
    /// Speed of sound (cm/µs), roughly 20°C air
    pub speed_of_sound_cm_per_us: f32,
    /// Pause between the cycles of an averaged measurement (ms)
    pub averaging_gap_ms: u32,
}

impl SensorConfig {
    pub const DEFAULT: Self = Self {
        min_sample_interval_ms: 60,
        min_range_cm: 2.0,
        max_range_cm: 400.0,
        max_jump_cm: 100.0,
        // 400cm and back takes ~23ms, leave some slack
        echo_timeout_us: 30_000,
        trigger_settle_us: 2,
        trigger_pulse_us: 10,
        speed_of_sound_cm_per_us: 0.0343,
        averaging_gap_ms: 30,
    };

    /// Whether `cm` lies inside the valid sensor envelope
    pub fn in_range(&self, cm: f32) -> bool {
        cm >= self.min_range_cm && cm <= self.max_range_cm
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Band and step of the synthetic distance triangle wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    pub lower_cm: f32,
    pub upper_cm: f32,
    pub step_cm: f32,
}

impl SyntheticConfig {
    pub const DEFAULT: Self = Self {
        lower_cm: 10.0,
        upper_cm: 80.0,
        step_cm: 5.0,
    };
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Timing estimates for the square path
///
/// These are calibration values for one particular chassis and battery
/// charge, not exact kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquarePathConfig {
    /// Travel time per centimeter of side length (ms), ~20 cm/s
    pub ms_per_cm: u32,
    /// Time for a 90° turn in place (ms)
    pub turn_ms: u32,
    /// Pause after every stop (ms)
    pub settle_ms: u32,
    /// Shortest accepted side length (cm)
    pub min_side_cm: u16,
    /// Longest accepted side length (cm)
    pub max_side_cm: u16,
}

impl SquarePathConfig {
    pub const DEFAULT: Self = Self {
        ms_per_cm: 50,
        turn_ms: 650,
        settle_ms: 200,
        min_side_cm: 10,
        max_side_cm: 100,
    };

    /// Clamps a requested side length into the accepted range
    pub fn clamp_side(&self, side_cm: i32) -> u16 {
        side_cm.clamp(i32::from(self.min_side_cm), i32::from(self.max_side_cm)) as u16
    }
}

impl Default for SquarePathConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Motor duty levels, out of 255
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveConfig {
    /// Duty for straight forward/backward motion
    pub cruise_duty: u8,
    /// Duty for turning in place
    pub turn_duty: u8,
    pub square: SquarePathConfig,
}

impl DriveConfig {
    pub const DEFAULT: Self = Self {
        cruise_duty: 255,
        turn_duty: 155,
        square: SquarePathConfig::DEFAULT,
    };
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Pan servo sweep parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Angle change per sweep step (°)
    pub step_deg: u8,
    /// Minimum time between steps of a plain sweep (ms)
    pub plain_interval_ms: u64,
    /// Minimum time between steps of a ranging sweep (ms), matches the
    /// sensor's sample interval so every step gets a fresh reading
    pub ranging_interval_ms: u64,
    /// Rest position (°)
    pub center_deg: u8,
}

impl SweepConfig {
    pub const DEFAULT: Self = Self {
        step_deg: 2,
        plain_interval_ms: 15,
        ranging_interval_ms: 60,
        center_deg: 90,
    };
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Access point and HTTP server settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub ssid: &'static str,
    pub passphrase: &'static str,
    pub channel: u8,
    /// Static address of the robot; link-local so clients can self-assign
    /// without a DHCP server
    pub address: [u8; 4],
    pub prefix_len: u8,
    pub http_port: u16,
}

impl NetworkConfig {
    pub const DEFAULT: Self = Self {
        ssid: "Pico-Robot",
        passphrase: "12345678",
        channel: 5,
        address: [169, 254, 1, 1],
        prefix_len: 16,
        http_port: 80,
    };
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
