//! Robot firmware entry point
//!
//! Builds the robot from its parts, hands them to the tasks and brings up the
//! WiFi access point serving the control UI.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::{error, info, unwrap};
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::block::ImageDef;
use embassy_rp::clocks::RoscRng;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::pwm::{PioPwm, PioPwmProgram};
use embassy_rp::pwm::{self, Pwm};
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Delay;
use rand::RngCore;
use radar_rover::config::{
    DriveConfig, NetworkConfig, SensorConfig, SweepConfig, SyntheticConfig,
};
use radar_rover::system::api::Api;
use radar_rover::system::assets::AssetStore;
use radar_rover::system::distance::DistanceEstimator;
use radar_rover::system::drive::DriveController;
use radar_rover::system::pan::PanActuator;
use radar_rover::system::radar::Radar;
use radar_rover::web::WEB_UI;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::hw::echo::{EchoTimer, SystemClock};
use crate::hw::resources::{
    AssignedResources, DistanceSensorResources, Irqs, MotorDriverResources, PanServoResources,
    WifiResources,
};
use crate::hw::servo::ServoBuilder;
use crate::task::http_server::{http_worker, HTTP_WORKER_COUNT};
use crate::task::{RobotApi, RobotDrive, RobotDriveQueue, SharedRadar};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Board support
mod hw;
/// Task implementations
mod task;

/// Motor PWM frequency, low enough for cheap brushed motors
const MOTOR_PWM_FREQ_HZ: u32 = 2_000;

static RADAR: StaticCell<SharedRadar> = StaticCell::new();
static DRIVE_QUEUE: RobotDriveQueue = Signal::new();
static API: StaticCell<RobotApi> = StaticCell::new();

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);
    let network = NetworkConfig::DEFAULT;

    let radar: &'static SharedRadar = RADAR.init(Mutex::new(Radar::new(
        distance_estimator(r.distance_sensor),
        PanActuator::new(pan_servo(r.pan_servo), SweepConfig::DEFAULT),
    )));

    let drive = drive_controller(r.motor_driver);
    unwrap!(spawner.spawn(task::drive::drive(drive, &DRIVE_QUEUE)));
    unwrap!(spawner.spawn(task::poll::poll(radar)));

    let assets = match AssetStore::mount(&WEB_UI) {
        Ok(store) => Some(store),
        Err(e) => {
            error!("web UI unavailable: {}", e);
            None
        }
    };
    let api: &'static RobotApi = API.init(Api::new(
        radar,
        &DRIVE_QUEUE,
        assets,
        DriveConfig::DEFAULT.square,
        SystemClock,
    ));

    let stack = start_wifi(&spawner, r.wifi, &network).await;
    for worker_id in 0..HTTP_WORKER_COUNT {
        unwrap!(spawner.spawn(http_worker(stack, api, network.http_port, worker_id)));
    }
    let [a, b, c, d] = network.address;
    info!("robot ready at http://{}.{}.{}.{}/", a, b, c, d);
}

fn distance_estimator(
    r: DistanceSensorResources,
) -> DistanceEstimator<Output<'static>, EchoTimer, Delay> {
    let trigger = Output::new(r.trigger_pin, Level::Low);
    let echo = EchoTimer::new(Input::new(r.echo_pin, Pull::Down));
    DistanceEstimator::new(
        trigger,
        echo,
        Delay,
        SensorConfig::DEFAULT,
        SyntheticConfig::DEFAULT,
    )
}

fn pan_servo(r: PanServoResources) -> task::PanServo {
    let Pio {
        mut common, sm0, ..
    } = Pio::new(r.pio, Irqs);
    let prg = PioPwmProgram::new(&mut common);
    let pwm_pio = PioPwm::new(&mut common, sm0, r.pin, &prg);
    ServoBuilder::new(pwm_pio).build()
}

fn drive_controller(r: MotorDriverResources) -> RobotDrive {
    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz
    let divider = ((clock_freq_hz / MOTOR_PWM_FREQ_HZ) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (MOTOR_PWM_FREQ_HZ * divider as u32)) as u16 - 1;

    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    let right = Pwm::new_output_ab(
        r.right_slice,
        r.right_a_pin,
        r.right_b_pin,
        pwm_config.clone(),
    );
    let left = Pwm::new_output_ab(r.left_slice, r.left_a_pin, r.left_b_pin, pwm_config);
    let (right_a, right_b) = right.split();
    let (left_a, left_b) = left.split();

    DriveController::new(
        unwrap!(right_a),
        unwrap!(right_b),
        unwrap!(left_a),
        unwrap!(left_b),
        DriveConfig::DEFAULT,
    )
}

async fn start_wifi(
    spawner: &Spawner,
    r: WifiResources,
    network: &NetworkConfig,
) -> embassy_net::Stack<'static> {
    // Fetched from the embassy repository, see README
    let firmware = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let power = Output::new(r.power_pin, Level::Low);
    let cs = Output::new(r.cs_pin, Level::High);
    let mut pio = Pio::new(r.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        r.dio_pin,
        r.clk_pin,
        r.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, power, spi, firmware).await;
    unwrap!(spawner.spawn(task::wifi::cyw43_task(runner)));

    task::wifi::start_access_point(&mut control, clm, network).await;

    let seed = RoscRng.next_u64();
    static RESOURCES: StaticCell<StackResources<{ HTTP_WORKER_COUNT + 1 }>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        task::wifi::net_config(network),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    unwrap!(spawner.spawn(task::wifi::net_task(runner)));
    stack
}
