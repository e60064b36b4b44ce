//! Sensor trait and drivers
//!
//! Every driver produces a typed readings struct. Readings are merged into a
//! [`Measurements`] snapshot, which is what the rest of the node works with:
//! a quantity whose sensor is absent or failed is simply `None`.

pub mod pms5003;
#[cfg(feature = "sensor-scd41")]
pub mod scd41;
#[cfg(feature = "sensor-sht40")]
pub mod sht40;

use thiserror_no_std::Error;

pub use pms5003::{Pms5003Frame, Pms5003Readings, Pms5003Sensor};
#[cfg(feature = "sensor-scd41")]
pub use scd41::{Scd41Readings, Scd41Sensor};
#[cfg(feature = "sensor-sht40")]
pub use sht40::{Sht40Readings, Sht40Sensor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("{sensor} initialization failed: {details}")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },

    #[error("{sensor} read failed during {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },

    #[error("{sensor} timed out during {operation}")]
    Timeout {
        sensor: &'static str,
        operation: &'static str,
    },

    #[error("{sensor} sent an invalid frame: {details}")]
    InvalidFrame {
        sensor: &'static str,
        details: &'static str,
    },

    #[error("{sensor} checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch {
        sensor: &'static str,
        expected: u16,
        actual: u16,
    },
}

/// The quantities the node measures, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Pm25,
    Co2,
    Temperature,
    Humidity,
}

impl Quantity {
    /// Every quantity, in the order screens are cycled
    pub const ALL: [Quantity; 4] = [
        Quantity::Pm25,
        Quantity::Co2,
        Quantity::Temperature,
        Quantity::Humidity,
    ];

    /// Position of this quantity in [`Quantity::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used as a graph header
    pub const fn label(self) -> &'static str {
        match self {
            Quantity::Pm25 => "PM",
            Quantity::Co2 => "CO2",
            Quantity::Temperature => "T",
            Quantity::Humidity => "RH",
        }
    }
}

/// Latest value of every quantity, `None` when not (yet) measured
///
/// Temperature and humidity keep the SHT40's milli-unit resolution; the
/// screens and payload scale them down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measurements {
    pub pm2_5_ugm3: Option<i32>,
    pub co2_ppm: Option<i32>,
    pub temperature_milli_celsius: Option<i32>,
    pub humidity_milli_percent: Option<i32>,
}

impl Measurements {
    /// Raw value of `quantity`: µg/m³, ppm, m°C or m%RH
    pub fn get(&self, quantity: Quantity) -> Option<i32> {
        match quantity {
            Quantity::Pm25 => self.pm2_5_ugm3,
            Quantity::Co2 => self.co2_ppm,
            Quantity::Temperature => self.temperature_milli_celsius,
            Quantity::Humidity => self.humidity_milli_percent,
        }
    }

    /// Overwrite every field `other` has a value for.
    pub fn merge(&mut self, other: Measurements) {
        for quantity in Quantity::ALL {
            if let Some(value) = other.get(quantity) {
                self.set(quantity, value);
            }
        }
    }

    pub fn set(&mut self, quantity: Quantity, value: i32) {
        let slot = match quantity {
            Quantity::Pm25 => &mut self.pm2_5_ugm3,
            Quantity::Co2 => &mut self.co2_ppm,
            Quantity::Temperature => &mut self.temperature_milli_celsius,
            Quantity::Humidity => &mut self.humidity_milli_percent,
        };
        *slot = Some(value);
    }
}

/// Typed readings from one sensor
pub trait SensorReadings {
    /// Write these readings into the matching fields of `into`.
    fn apply(self, into: &mut Measurements);
}

/// A partial snapshot is itself a valid reading (used by synthetic sensors)
impl SensorReadings for Measurements {
    fn apply(self, into: &mut Measurements) {
        into.merge(self);
    }
}

/// A sensor that produces typed readings
pub trait Sensor {
    type Readings: SensorReadings;

    /// Take one measurement.
    fn read(&mut self) -> impl Future<Output = Result<Self::Readings, SensorError>>;

    /// Take one measurement and merge it into `into`.
    ///
    /// On error `into` is left untouched.
    fn read_into(
        &mut self,
        into: &mut Measurements,
    ) -> impl Future<Output = Result<(), SensorError>> {
        async move {
            let readings = self.read().await?;
            readings.apply(into);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedReadings(i32);

    impl SensorReadings for FixedReadings {
        fn apply(self, into: &mut Measurements) {
            into.co2_ppm = Some(self.0);
        }
    }

    struct FlakySensor {
        next: Result<i32, SensorError>,
    }

    impl Sensor for FlakySensor {
        type Readings = FixedReadings;

        async fn read(&mut self) -> Result<FixedReadings, SensorError> {
            self.next.map(FixedReadings)
        }
    }

    #[test]
    fn read_into_applies_readings() {
        let mut sensor = FlakySensor { next: Ok(612) };
        let mut measurements = Measurements::default();
        embassy_futures::block_on(sensor.read_into(&mut measurements)).unwrap();
        assert_eq!(measurements.co2_ppm, Some(612));
        assert_eq!(measurements.pm2_5_ugm3, None);
    }

    #[test]
    fn failed_read_leaves_measurements_alone() {
        let error = SensorError::Timeout {
            sensor: "SCD41",
            operation: "wait for data ready status",
        };
        let mut sensor = FlakySensor { next: Err(error) };
        let mut measurements = Measurements {
            co2_ppm: Some(450),
            ..Default::default()
        };

        let result = embassy_futures::block_on(sensor.read_into(&mut measurements));
        assert_eq!(result, Err(error));
        assert_eq!(measurements.co2_ppm, Some(450));
    }

    #[test]
    fn merge_keeps_fields_missing_from_update() {
        let mut current = Measurements {
            pm2_5_ugm3: Some(8),
            co2_ppm: Some(600),
            ..Default::default()
        };
        current.merge(Measurements {
            co2_ppm: Some(640),
            humidity_milli_percent: Some(45_000),
            ..Default::default()
        });

        assert_eq!(current.pm2_5_ugm3, Some(8));
        assert_eq!(current.co2_ppm, Some(640));
        assert_eq!(current.get(Quantity::Humidity), Some(45_000));
        assert_eq!(current.get(Quantity::Temperature), None);
    }
}
