//! Firmware tasks and the concrete types they share
//!
//! The library components are generic over their hardware; these aliases pin
//! them to the embassy-rp implementations wired up in `main`.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::PIO1;
use embassy_rp::pwm::PwmOutput;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use radar_rover::system::api::Api;
use radar_rover::system::drive::{DriveController, DriveQueue};
use radar_rover::system::radar::Radar;

use crate::hw::echo::{EchoTimer, SystemClock};
use crate::hw::servo::Servo;

pub mod drive;
pub mod http_server;
pub mod poll;
pub mod wifi;

pub type RobotMutex = CriticalSectionRawMutex;
pub type PanServo = Servo<'static, PIO1, 0>;
pub type RobotRadar = Radar<Output<'static>, EchoTimer, Delay, PanServo>;
pub type SharedRadar = Mutex<RobotMutex, RobotRadar>;
pub type RobotDrive = DriveController<PwmOutput<'static>>;
pub type RobotDriveQueue = DriveQueue<RobotMutex>;
pub type RobotApi =
    Api<'static, RobotMutex, Output<'static>, EchoTimer, Delay, PanServo, SystemClock>;
