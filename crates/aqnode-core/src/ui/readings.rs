//! Current-readings screen
//!
//! One text line per fitted sensor quantity, e.g.
//!
//! ```text
//! AQI 99
//! CO2 612
//! T 21.4C
//! RH 45%
//! ```
//!
//! A quantity without a reading yet shows `--`. When PM is reported as AQI
//! and the panel has a spare line, the EPA category is added below.

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::{String, Vec};

use crate::aqi::{AqiCategory, pm_to_aqi_us};
use crate::config::{NodeConfig, PmUnit, SensorSelection, TemperatureUnit, Tenths};
use crate::sensors::{Measurements, Quantity};

use super::{LINE_HEIGHT_PX, MAX_LINE_LENGTH, Surface, TEXT_STYLE};

/// Most lines any configuration produces: four quantities plus a category
pub const MAX_LINES: usize = 5;

pub type TextLine = String<MAX_LINE_LENGTH>;

const MISSING: &str = "--";

#[derive(Debug, Clone, Copy)]
pub struct ReadingsScreen {
    sensors: SensorSelection,
    pm_unit: PmUnit,
    temperature_unit: TemperatureUnit,
}

impl ReadingsScreen {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            sensors: config.sensors,
            pm_unit: config.pm_unit,
            temperature_unit: config.temperature_unit,
        }
    }

    /// Text lines for `measurements`, at most `max_lines` of them.
    pub fn lines(&self, measurements: &Measurements, max_lines: usize) -> Vec<TextLine, MAX_LINES> {
        let mut lines = Vec::new();

        for quantity in Quantity::ALL {
            if !self.sensors.enabled(quantity) {
                continue;
            }
            if lines.len() >= max_lines {
                break;
            }
            let _ = lines.push(self.line(quantity, measurements));
        }

        if self.pm_unit == PmUnit::UsAqi
            && lines.len() < max_lines
            && let Some(pm) = measurements.pm2_5_ugm3.filter(|_| self.sensors.pm)
        {
            let category = AqiCategory::from_index(pm_to_aqi_us(pm as f32));
            let mut line = TextLine::new();
            let _ = line.push_str(category.label());
            let _ = lines.push(line);
        }

        lines
    }

    fn line(&self, quantity: Quantity, measurements: &Measurements) -> TextLine {
        let mut line = TextLine::new();
        let value = measurements.get(quantity);

        // A line that overflows is truncated at the last whole piece written
        let _ = match (quantity, value) {
            (Quantity::Pm25, Some(pm)) => match self.pm_unit {
                PmUnit::Concentration => write!(line, "PM {}", pm),
                PmUnit::UsAqi => write!(line, "AQI {}", pm_to_aqi_us(pm as f32)),
            },
            (Quantity::Pm25, None) => match self.pm_unit {
                PmUnit::Concentration => write!(line, "PM {}", MISSING),
                PmUnit::UsAqi => write!(line, "AQI {}", MISSING),
            },
            (Quantity::Co2, Some(ppm)) => write!(line, "CO2 {}", ppm),
            (Quantity::Temperature, Some(milli)) => write!(
                line,
                "T {}{}",
                Tenths(self.temperature_unit.tenths(milli)),
                self.temperature_unit.suffix()
            ),
            (Quantity::Humidity, Some(milli)) => write!(line, "RH {}%", milli / 1000),
            (quantity, None) => write!(line, "{} {}", quantity.label(), MISSING),
        };

        line
    }

    /// Clear `surface`, draw every line that fits, then present.
    pub fn draw<S: Surface>(&self, measurements: &Measurements, surface: &mut S) -> Result<(), S::Error> {
        surface.clear(BinaryColor::Off)?;

        let height = surface.bounding_box().size.height as i32;
        let max_lines = (height / LINE_HEIGHT_PX).max(0) as usize;

        for (i, line) in self.lines(measurements, max_lines).iter().enumerate() {
            let origin = Point::new(0, i as i32 * LINE_HEIGHT_PX);
            Text::with_baseline(line, origin, TEXT_STYLE, Baseline::Top).draw(surface)?;
        }

        surface.present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

    fn texts(lines: &[TextLine]) -> alloc::vec::Vec<&str> {
        lines.iter().map(|l| l.as_str()).collect()
    }

    fn measurements() -> Measurements {
        Measurements {
            pm2_5_ugm3: Some(35),
            co2_ppm: Some(612),
            temperature_milli_celsius: Some(21_480),
            humidity_milli_percent: Some(45_900),
        }
    }

    #[test]
    fn concentration_and_celsius() {
        let screen = ReadingsScreen::new(&NodeConfig::default());
        let lines = screen.lines(&measurements(), 4);
        assert_eq!(texts(&lines), ["PM 35", "CO2 612", "T 21.4C", "RH 45%"]);
    }

    #[test]
    fn aqi_and_fahrenheit() {
        let config = NodeConfig {
            pm_unit: PmUnit::UsAqi,
            temperature_unit: TemperatureUnit::Fahrenheit,
            ..Default::default()
        };
        let screen = ReadingsScreen::new(&config);
        let lines = screen.lines(&measurements(), 5);
        // 35 ug/m3 is AQI 99
        assert_eq!(
            texts(&lines),
            ["AQI 99", "CO2 612", "T 70.6F", "RH 45%", "Moderate"]
        );
    }

    #[test]
    fn category_needs_a_spare_line() {
        let config = NodeConfig {
            pm_unit: PmUnit::UsAqi,
            ..Default::default()
        };
        let screen = ReadingsScreen::new(&config);
        assert_eq!(screen.lines(&measurements(), 4).len(), 4);
    }

    #[test]
    fn missing_readings_show_dashes() {
        let screen = ReadingsScreen::new(&NodeConfig::default());
        let lines = screen.lines(&Measurements::default(), 4);
        assert_eq!(texts(&lines), ["PM --", "CO2 --", "T --", "RH --"]);
    }

    #[test]
    fn disabled_sensors_are_skipped() {
        let mut config = NodeConfig::default();
        config.sensors.climate = false;
        let screen = ReadingsScreen::new(&config);
        let lines = screen.lines(&measurements(), 4);
        assert_eq!(texts(&lines), ["PM 35", "CO2 612"]);
    }

    #[test]
    fn draws_text_on_surface() {
        let mut fb = FrameBuffer::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
        let screen = ReadingsScreen::new(&NodeConfig::default());
        screen.draw(&measurements(), &mut fb).unwrap();

        // Four lines of 10 px text reach row 39; nothing below
        let lit_rows = (0..DISPLAY_HEIGHT_PX as i32).filter(|&y| {
            (0..DISPLAY_WIDTH_PX as i32)
                .any(|x| fb.pixel(Point::new(x, y)) == Some(BinaryColor::On))
        });
        let last = lit_rows.max().unwrap();
        assert!(last >= 30 && last < 40, "last lit row {}", last);
    }
}
