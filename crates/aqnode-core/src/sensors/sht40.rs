//! Sensirion SHT40 temperature and humidity sensor

use embassy_time::Delay;
use embedded_hal_async::i2c::I2c;
use log::error;
use sht4x::{Precision, Sht4xAsync};

use super::{Measurements, Sensor, SensorError, SensorReadings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sht40Readings {
    pub temperature_milli_celsius: i32,
    pub humidity_milli_percent: i32,
}

impl SensorReadings for Sht40Readings {
    fn apply(self, into: &mut Measurements) {
        into.temperature_milli_celsius = Some(self.temperature_milli_celsius);
        into.humidity_milli_percent = Some(self.humidity_milli_percent);
    }
}

pub struct Sht40Sensor<I> {
    sensor: Sht4xAsync<I, Delay>,
}

impl<I: I2c> Sht40Sensor<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Sht4xAsync::new(i2c),
        }
    }
}

impl<I: I2c> Sensor for Sht40Sensor<I> {
    type Readings = Sht40Readings;

    async fn read(&mut self) -> Result<Sht40Readings, SensorError> {
        let measurement = self
            .sensor
            .measure(Precision::High, &mut Delay)
            .await
            .map_err(|e| {
                error!("SHT40 measurement failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: "SHT40",
                    operation: "measure temperature/humidity",
                    details: "I2C communication error or sensor not responding",
                }
            })?;

        // The driver reports fixed-point values; keep milli-unit resolution
        let temperature = measurement.temperature_celsius().to_num::<f32>();
        let humidity = measurement.humidity_percent().to_num::<f32>();

        Ok(Sht40Readings {
            temperature_milli_celsius: (temperature * 1000.0) as i32,
            humidity_milli_percent: (humidity * 1000.0) as i32,
        })
    }
}
