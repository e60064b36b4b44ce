//! Hardware-independent core library for aqnode
//!
//! This crate contains all platform-agnostic logic for the aqnode air-quality
//! sensor node: the rolling reading history, graph and readings rendering,
//! US AQI conversion, sensor trait definitions and drivers, node
//! configuration and the telemetry payload.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod aqi;
pub mod config;
pub mod framebuffer;
pub mod history;
pub mod monitor;
pub mod sensors;
pub mod shared_i2c;
pub mod telemetry;
pub mod ui;
