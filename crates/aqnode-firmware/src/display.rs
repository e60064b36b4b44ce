//! SSD1306 64x48 OLED as a [`Surface`]
//!
//! Screens draw into a [`FrameBuffer`]; [`Surface::present`] copies the dirty
//! region into the driver's buffer and pushes it over I2C.

use aqnode_core::framebuffer::FrameBuffer;
use aqnode_core::ui::Surface;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{error, info};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::app_state::{AppError, DisplayI2c, detail};

type Panel = Ssd1306<
    I2CInterface<DisplayI2c>,
    DisplaySize64x48,
    BufferedGraphicsMode<DisplaySize64x48>,
>;

pub struct Oled {
    frame: FrameBuffer,
    panel: Panel,
}

impl Oled {
    /// Initialise the panel and clear it.
    pub fn new(i2c: DisplayI2c) -> Result<Self, AppError> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize64x48, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        panel.init().map_err(|e| {
            error!("SSD1306 init failed: {:?}", e);
            AppError::Display(detail(format_args!("init: {:?}", e)))
        })?;

        let size = panel.size();
        info!("SSD1306 ready ({}x{})", size.width, size.height);

        let mut oled = Self {
            frame: FrameBuffer::new(size),
            panel,
        };
        oled.clear(BinaryColor::Off)?;
        oled.present()?;
        Ok(oled)
    }
}

impl OriginDimensions for Oled {
    fn size(&self) -> Size {
        self.frame.size()
    }
}

impl DrawTarget for Oled {
    type Color = BinaryColor;
    type Error = AppError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let Ok(()) = self.frame.draw_iter(pixels);
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let Ok(()) = self.frame.fill_solid(area, color);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let Ok(()) = self.frame.clear(color);
        Ok(())
    }
}

impl Surface for Oled {
    fn present(&mut self) -> Result<(), Self::Error> {
        self.frame
            .flush(&mut self.panel)
            .map_err(|e| AppError::Display(detail(format_args!("draw: {:?}", e))))?;

        self.panel.flush().map_err(|e| {
            error!("SSD1306 flush failed: {:?}", e);
            AppError::Display(detail(format_args!("flush: {:?}", e)))
        })
    }
}
