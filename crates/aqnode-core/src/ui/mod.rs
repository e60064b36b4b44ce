//! Screens for the node's monochrome display
//!
//! - [`graph`] draws the scrolling history of one quantity
//! - [`readings`] lists the current value of every enabled quantity
//!
//! Both draw onto a [`Surface`]: any `embedded-graphics` draw target with
//! `BinaryColor` pixels that can push a finished frame to the panel.

pub mod graph;
pub mod readings;

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

pub use graph::{GraphColumn, GraphRenderer};
pub use readings::ReadingsScreen;

/// Width of the Wemos D1 mini OLED shield the node ships with
pub const DISPLAY_WIDTH_PX: u32 = 64;

/// Height of the Wemos D1 mini OLED shield the node ships with
pub const DISPLAY_HEIGHT_PX: u32 = 48;

/// Line height of [`TEXT_STYLE`] in pixels
pub const LINE_HEIGHT_PX: i32 = 10;

/// Text style for every label on the display
pub const TEXT_STYLE: MonoTextStyle<'static, BinaryColor> =
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

/// Maximum characters in one line of display text
pub const MAX_LINE_LENGTH: usize = 16;

/// Monochrome draw target that can present a completed frame
///
/// Drawing may be buffered; nothing is guaranteed to be visible until
/// [`Surface::present`] returns.
pub trait Surface: DrawTarget<Color = BinaryColor> {
    /// Push the completed frame to the panel.
    fn present(&mut self) -> Result<(), Self::Error>;
}
