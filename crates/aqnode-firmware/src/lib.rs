//! ESP32-S3 firmware modules for the aqnode sensor node
//!
//! Everything here needs the ESP32 peripherals: bus and UART bring-up, the
//! SSD1306 panel, WiFi and the HTTP upload. Measurement handling, screens and
//! telemetry encoding live in `aqnode_core`.

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod config;
pub mod display;
pub mod network;
