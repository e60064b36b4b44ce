//! Simulated OLED panel.
//!
//! Screens draw into a [`FrameBuffer`] exactly as on the device. Presenting
//! copies the dirty region into a `SimulatorDisplay` and then either writes
//! the frame as a PNG or shows it in an SDL window (`window` feature).

use std::io;
use std::path::PathBuf;

use aqnode_core::framebuffer::FrameBuffer;
use aqnode_core::ui::Surface;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::{
    BinaryColorTheme, OutputSettings, OutputSettingsBuilder, SimulatorDisplay,
};
#[cfg(feature = "window")]
use embedded_graphics_simulator::{SimulatorEvent, Window};
use log::debug;

/// Pixel scale of saved frames and the window
const SCALE: u32 = 4;

pub enum Output {
    /// Numbered PNG files in a directory
    Png { dir: PathBuf },
    #[cfg(feature = "window")]
    Window(Window),
}

pub struct SimulatorSurface {
    frame: FrameBuffer,
    display: SimulatorDisplay<BinaryColor>,
    settings: OutputSettings,
    output: Output,
    frames_presented: usize,
    closed: bool,
}

impl SimulatorSurface {
    /// Surface writing PNG frames into `dir`, which must exist.
    pub fn png(size: Size, dir: PathBuf) -> Self {
        Self::new(size, Output::Png { dir })
    }

    #[cfg(feature = "window")]
    pub fn window(size: Size) -> Self {
        let window = Window::new("aqnode", &output_settings());
        Self::new(size, Output::Window(window))
    }

    fn new(size: Size, output: Output) -> Self {
        Self {
            frame: FrameBuffer::new(size),
            display: SimulatorDisplay::new(size),
            settings: output_settings(),
            output,
            frames_presented: 0,
            closed: false,
        }
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// Whether the window was closed by the user
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

fn output_settings() -> OutputSettings {
    OutputSettingsBuilder::new()
        .theme(BinaryColorTheme::OledBlue)
        .scale(SCALE)
        .build()
}

impl OriginDimensions for SimulatorSurface {
    fn size(&self) -> Size {
        self.frame.size()
    }
}

impl DrawTarget for SimulatorSurface {
    type Color = BinaryColor;
    type Error = io::Error;

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

impl Surface for SimulatorSurface {
    fn present(&mut self) -> Result<(), Self::Error> {
        let Ok(()) = self.frame.flush(&mut self.display);
        self.frames_presented += 1;

        match &mut self.output {
            Output::Png { dir } => {
                let path = dir.join(format!("frame-{:05}.png", self.frames_presented));
                self.display
                    .to_rgb_output_image(&self.settings)
                    .save_png(&path)
                    .map_err(io::Error::other)?;
                debug!("Wrote {}", path.display());
            }
            #[cfg(feature = "window")]
            Output::Window(window) => {
                window.update(&self.display);
                if window.events().any(|event| matches!(event, SimulatorEvent::Quit)) {
                    self.closed = true;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn presents_numbered_png_frames() {
        let dir = std::env::temp_dir().join(format!("aqnode-sim-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut surface = SimulatorSurface::png(Size::new(64, 48), dir.clone());
        Line::new(Point::new(0, 0), Point::new(63, 47))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut surface)
            .unwrap();
        surface.present().unwrap();
        surface.present().unwrap();

        assert_eq!(surface.frames_presented(), 2);
        assert!(dir.join("frame-00001.png").is_file());
        assert!(dir.join("frame-00002.png").is_file());
        assert!(!surface.is_closed());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = std::env::temp_dir().join("aqnode-sim-does-not-exist/nested");
        let mut surface = SimulatorSurface::png(Size::new(8, 8), dir);
        assert!(surface.present().is_err());
    }
}
