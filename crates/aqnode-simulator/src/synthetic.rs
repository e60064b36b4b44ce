//! Synthetic sensors that vary smoothly over simulated time.

use aqnode_core::sensors::{Measurements, Quantity, Sensor, SensorError};

/// Which physical sensor a [`SyntheticSensor`] stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Particulate,
    Co2,
    Climate,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Particulate, Source::Co2, Source::Climate];

    pub fn name(self) -> &'static str {
        match self {
            Source::Particulate => "PMS5003",
            Source::Co2 => "SCD41",
            Source::Climate => "SHT40",
        }
    }

    /// Quantities this sensor measures
    pub fn quantities(self) -> &'static [Quantity] {
        match self {
            Source::Particulate => &[Quantity::Pm25],
            Source::Co2 => &[Quantity::Co2],
            Source::Climate => &[Quantity::Temperature, Quantity::Humidity],
        }
    }
}

/// Produces a new reading every call, advancing its clock by `step_secs`.
pub struct SyntheticSensor {
    source: Source,
    elapsed_secs: f64,
    step_secs: f64,
}

impl SyntheticSensor {
    pub fn new(source: Source, step_secs: f64) -> Self {
        Self {
            source,
            elapsed_secs: 0.0,
            step_secs,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    fn sample(&self) -> Measurements {
        let t = self.elapsed_secs;
        match self.source {
            Source::Particulate => {
                // 3-30 µg/m³ with an occasional cooking spike
                let spike = (t / 2700.0).sin().max(0.0).powi(8) * 60.0;
                let pm = 15.0 + 10.0 * (t / 1800.0).sin() + 3.0 * (t / 310.0).cos() + spike;
                Measurements {
                    pm2_5_ugm3: Some(pm.max(0.0) as i32),
                    ..Default::default()
                }
            }
            Source::Co2 => {
                // 400-1000 ppm over a slow occupancy cycle
                let co2 = 650.0 + 250.0 * (t / 3600.0).sin() + 40.0 * (t / 700.0).cos();
                Measurements {
                    co2_ppm: Some(co2 as i32),
                    ..Default::default()
                }
            }
            Source::Climate => {
                let temperature = 22.0 + 3.0 * (t / 5400.0).sin() + 0.5 * (t / 900.0).cos();
                let humidity = 48.0 + 10.0 * (t / 7200.0).sin() + 2.0 * (t / 500.0).cos();
                Measurements {
                    temperature_milli_celsius: Some((temperature * 1000.0) as i32),
                    humidity_milli_percent: Some((humidity * 1000.0) as i32),
                    ..Default::default()
                }
            }
        }
    }
}

impl Sensor for SyntheticSensor {
    type Readings = Measurements;

    async fn read(&mut self) -> Result<Measurements, SensorError> {
        self.elapsed_secs += self.step_secs;
        Ok(self.sample())
    }
}
