//! Hardware Resource Management
//!
//! Allocates the pins and peripherals of the Pico 2 W to the robot's
//! components. Each group is moved into the one place that owns it, so no two
//! components can drive the same pin.
//!
//! # Resource Groups
//! - Distance Sensor: HC-SR04 trigger and echo pins
//! - Pan Servo: signal pin, driven by a PIO state machine
//! - Motor Driver: two PWM slices, two H-bridge inputs per motor
//! - WiFi: CYW43 power, SPI pins, PIO and DMA channel
//!
//! # PIO Blocks
//! PIO0 runs the CYW43 SPI bus, so the servo PWM lives on PIO1.

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, PIO0, PIO1};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;

assign_resources! {
    /// HC-SR04 ultrasonic distance sensor pins
    distance_sensor: DistanceSensorResources {
        trigger_pin: PIN_15,
        echo_pin: PIN_14,
    },
    /// Servo panning the distance sensor
    pan_servo: PanServoResources {
        pin: PIN_5,
        pio: PIO1,
    },
    /// H-bridge inputs, one PWM slice per motor
    motor_driver: MotorDriverResources {
        right_slice: PWM_SLICE1,
        right_a_pin: PIN_18,
        right_b_pin: PIN_19,
        left_slice: PWM_SLICE2,
        left_a_pin: PIN_20,
        left_b_pin: PIN_21,
    },
    /// CYW43 WiFi chip on the Pico 2 W
    wifi: WifiResources {
        power_pin: PIN_23,
        cs_pin: PIN_25,
        dio_pin: PIN_24,
        clk_pin: PIN_29,
        pio: PIO0,
        dma: DMA_CH0,
    },
}

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    PIO1_IRQ_0 => PioInterruptHandler<PIO1>;
});
