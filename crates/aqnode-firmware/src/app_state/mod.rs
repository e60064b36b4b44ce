//! Firmware application state: hardware handles and the error type shared by
//! the firmware modules.

mod hardware;

pub use hardware::*;

use core::fmt::{self, Write as _};

use heapless::String;
use thiserror_no_std::Error;

/// Capacity of the detail text carried by [`AppError`]
pub const ERROR_DETAIL_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("WiFi error: {0}")]
    Wifi(String<ERROR_DETAIL_LEN>),
    #[error("Display error: {0}")]
    Display(String<ERROR_DETAIL_LEN>),
    #[error("Upload failed: {0}")]
    Upload(String<ERROR_DETAIL_LEN>),
    #[error("Configuration error: {0}")]
    Config(String<ERROR_DETAIL_LEN>),
}

/// Render `args` into an error detail, truncated at the first piece that does
/// not fit.
pub fn detail(args: fmt::Arguments<'_>) -> String<ERROR_DETAIL_LEN> {
    let mut text = String::new();
    let _ = text.write_fmt(args);
    text
}
