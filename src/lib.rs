//! Radar rover core
//!
//! Hardware independent logic for a small WiFi controlled robot: ultrasonic
//! distance estimation with debouncing and a synthetic fallback, the pan servo
//! sweep, the four channel PWM drive and the HTTP request router that ties
//! them together.
//!
//! The firmware binary (`src/main.rs`, `rp` feature) wires these components to
//! embassy-rp peripherals. Everything in this library runs on the host as well,
//! which is where its tests live.

#![cfg_attr(not(test), no_std)]

// Must stay first so the logging macros are visible in every module below.
pub(crate) mod fmt;

pub mod config;
pub mod system;
pub mod web;
