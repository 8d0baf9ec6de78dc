//! Drive Controller
//!
//! Drives two DC motors through an H-bridge fed by four PWM channels, two per
//! motor. A motor turns one way when its A input gets duty and the other way
//! when its B input does; both at zero lets it coast.
//!
//! # Commands
//! Commands arrive through a [`DriveQueue`], a single-slot signal where the
//! latest command wins. A running square path is raced against the queue, so
//! any new command cancels it (motors stopped) and then takes over, except a
//! second square path, which ends with the robot stopped.
//!
//! # Interlock
//! A square path requested while the robot is moving stops the robot instead
//! of starting. This is a flag check, not a lock.

use core::fmt;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;

use crate::config::DriveConfig;

/// Single-slot command queue between the HTTP handlers and the drive task
pub type DriveQueue<M> = Signal<M, DriveCommand>;

/// Commands accepted by the drive task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveCommand {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
    /// Drive a square with the given side length (cm)
    Square(u16),
}

impl DriveCommand {
    /// Maps the single letter codes of the web UI
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'F' => Some(Self::Forward),
            'G' => Some(Self::Backward),
            'L' => Some(Self::TurnLeft),
            'R' => Some(Self::TurnRight),
            'S' => Some(Self::Stop),
            _ => None,
        }
    }
}

/// PWM channel position on the H-bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    RightA,
    RightB,
    LeftA,
    LeftB,
}

impl Channel {
    const ORDER: [Channel; 4] = [
        Channel::RightA,
        Channel::RightB,
        Channel::LeftA,
        Channel::LeftB,
    ];
}

/// Drive failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveError {
    /// Writing the duty of a PWM channel failed
    Pwm(Channel),
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::Pwm(channel) => write!(f, "PWM write failed on {channel:?}"),
        }
    }
}

/// Result of a square path request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareOutcome {
    /// All four sides driven
    Completed,
    /// The robot was already moving and has been stopped instead
    Interlocked,
}

/// Four channel PWM motor control
///
/// Channel order is `[right_a, right_b, left_a, left_b]`, duties out of 255.
pub struct DriveController<P> {
    channels: [P; 4],
    config: DriveConfig,
    duty: [u8; 4],
    is_moving: bool,
}

impl<P: SetDutyCycle> DriveController<P> {
    pub fn new(right_a: P, right_b: P, left_a: P, left_b: P, config: DriveConfig) -> Self {
        Self {
            channels: [right_a, right_b, left_a, left_b],
            config,
            duty: [0; 4],
            is_moving: false,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Duty last written to each channel
    pub fn duty(&self) -> [u8; 4] {
        self.duty
    }

    pub fn forward(&mut self) -> Result<(), DriveError> {
        let c = self.config.cruise_duty;
        self.apply([0, c, 0, c], true)
    }

    pub fn backward(&mut self) -> Result<(), DriveError> {
        let c = self.config.cruise_duty;
        self.apply([c, 0, c, 0], true)
    }

    /// Turn in place, left motor backward and right motor forward
    pub fn turn_left(&mut self) -> Result<(), DriveError> {
        let t = self.config.turn_duty;
        self.apply([0, t, t, 0], true)
    }

    /// Turn in place, left motor forward and right motor backward
    pub fn turn_right(&mut self) -> Result<(), DriveError> {
        let t = self.config.turn_duty;
        self.apply([t, 0, 0, t], true)
    }

    pub fn stop(&mut self) -> Result<(), DriveError> {
        self.apply([0; 4], false)
    }

    /// Drives a square of `side_cm` using the configured timing estimates
    ///
    /// Each side is forward, stop, settle, right turn, stop, settle.
    pub async fn run_square_path<D: DelayNs>(
        &mut self,
        side_cm: u16,
        delay: &mut D,
    ) -> Result<SquareOutcome, DriveError> {
        if self.is_moving {
            info!("square path requested while moving, stopping instead");
            self.stop()?;
            return Ok(SquareOutcome::Interlocked);
        }

        let timing = self.config.square;
        let travel_ms = u32::from(side_cm) * timing.ms_per_cm;
        info!("square path {} cm, {} ms per side", side_cm, travel_ms);

        for _ in 0..4 {
            self.forward()?;
            delay.delay_ms(travel_ms).await;
            self.stop()?;
            delay.delay_ms(timing.settle_ms).await;
            self.turn_right()?;
            delay.delay_ms(timing.turn_ms).await;
            self.stop()?;
            delay.delay_ms(timing.settle_ms).await;
        }
        Ok(SquareOutcome::Completed)
    }

    /// Executes one queued command
    ///
    /// Returns the command that cancelled a square path, if one did; the
    /// caller runs it next. Another square path arriving mid-run only stops
    /// the robot, the same as the interlock.
    pub async fn execute<M: RawMutex, D: DelayNs>(
        &mut self,
        command: DriveCommand,
        queue: &DriveQueue<M>,
        delay: &mut D,
    ) -> Result<Option<DriveCommand>, DriveError> {
        match command {
            DriveCommand::Forward => self.forward()?,
            DriveCommand::Backward => self.backward()?,
            DriveCommand::TurnLeft => self.turn_left()?,
            DriveCommand::TurnRight => self.turn_right()?,
            DriveCommand::Stop => self.stop()?,
            DriveCommand::Square(side_cm) => {
                let raced = select(self.run_square_path(side_cm, delay), queue.wait()).await;
                match raced {
                    Either::First(outcome) => {
                        let outcome = outcome?;
                        debug!("square path ended: {}", outcome);
                    }
                    Either::Second(DriveCommand::Square(_)) => {
                        info!("square path requested while moving, stopping instead");
                        self.stop()?;
                    }
                    Either::Second(next) => {
                        info!("square path cancelled by {}", next);
                        self.stop()?;
                        return Ok(Some(next));
                    }
                }
            }
        }
        Ok(None)
    }

    fn apply(&mut self, duty: [u8; 4], moving: bool) -> Result<(), DriveError> {
        self.is_moving = moving;
        for ((pwm, value), channel) in self.channels.iter_mut().zip(duty).zip(Channel::ORDER) {
            pwm.set_duty_cycle_fraction(u16::from(value), u16::from(u8::MAX))
                .map_err(|_| DriveError::Pwm(channel))?;
        }
        self.duty = duty;
        Ok(())
    }
}
