//! Sensirion SCD41 CO2 sensor
//!
//! Measured in single-shot mode so the sensor idles between sampling cycles.
//! Automatic self-calibration is switched on the first time the sensor is
//! read.

use embassy_time::{Delay, Timer};
use embedded_hal_async::i2c::I2c;
use log::{error, info};
use scd41_embedded::r#async::Scd41Async;

use super::{Measurements, Sensor, SensorError, SensorReadings};

const SENSOR_NAME: &str = "SCD41";

/// A single-shot conversion takes 5 s
const SINGLE_SHOT_DURATION_MS: u64 = 5000;

const DATA_READY_POLL_MS: u64 = 1000;
const DATA_READY_MAX_POLLS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scd41Readings {
    pub co2_ppm: i32,
}

impl SensorReadings for Scd41Readings {
    fn apply(self, into: &mut Measurements) {
        into.co2_ppm = Some(self.co2_ppm);
    }
}

pub struct Scd41Sensor<I> {
    sensor: Scd41Async<I, Delay>,
    configured: bool,
}

impl<I: I2c> Scd41Sensor<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Scd41Async::new(i2c, Delay),
            configured: false,
        }
    }

    async fn configure(&mut self) -> Result<(), SensorError> {
        self.sensor
            .set_automatic_self_calibration(true)
            .await
            .map_err(|e| {
                error!("SCD41 set_automatic_self_calibration failed: {:?}", e);
                SensorError::InitializationFailed {
                    sensor: SENSOR_NAME,
                    details: "failed to enable automatic self-calibration",
                }
            })?;

        info!("SCD41: automatic self-calibration enabled");
        self.configured = true;
        Ok(())
    }

    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        self.sensor.data_ready().await.map_err(|e| {
            error!("SCD41 data_ready check failed: {:?}", e);
            SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "check data ready status",
                details: "I2C communication error",
            }
        })
    }

    async fn wait_for_data(&mut self) -> Result<(), SensorError> {
        for _ in 0..DATA_READY_MAX_POLLS {
            if self.data_ready().await? {
                return Ok(());
            }
            Timer::after_millis(DATA_READY_POLL_MS).await;
        }

        error!("SCD41 data not ready after {} polls", DATA_READY_MAX_POLLS);
        Err(SensorError::Timeout {
            sensor: SENSOR_NAME,
            operation: "wait for data ready status",
        })
    }
}

impl<I: I2c> Sensor for Scd41Sensor<I> {
    type Readings = Scd41Readings;

    async fn read(&mut self) -> Result<Scd41Readings, SensorError> {
        if !self.configured {
            self.configure().await?;
        }

        self.sensor.measure_single_shot().await.map_err(|e| {
            error!("SCD41 single shot measurement failed: {:?}", e);
            SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "start single shot measurement",
                details: "I2C communication error",
            }
        })?;

        Timer::after_millis(SINGLE_SHOT_DURATION_MS).await;
        self.wait_for_data().await?;

        let measurement = self.sensor.measurement().await.map_err(|e| {
            error!("SCD41 measurement read failed: {:?}", e);
            SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "read CO2 measurement",
                details: "I2C communication error or invalid data",
            }
        })?;

        Ok(Scd41Readings {
            co2_ppm: measurement.co2_ppm as i32,
        })
    }
}
