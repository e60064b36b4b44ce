//! Telemetry payload for the collector
//!
//! The payload is a flat JSON object with fixed keys, written by hand:
//!
//! ```text
//! {"wifi":-61,"pm02":12,"rco2":612,"atmp":21.4,"rhum":45}
//! ```
//!
//! Keys whose value is unknown are left out rather than sent as `null`.

use core::fmt::{self, Write};

use heapless::String;
use thiserror_no_std::Error;

use crate::aqi::pm_to_aqi_us;
use crate::config::{NodeConfig, PmUnit, Tenths};
use crate::sensors::Measurements;

/// Largest payload [`Telemetry::to_json`] produces
pub const PAYLOAD_MAX_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("telemetry payload does not fit in {0} bytes")]
    BufferTooSmall(usize),
}

/// One upload's worth of values, already converted to the configured units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Telemetry {
    /// Station RSSI in dBm
    pub wifi: Option<i32>,
    /// PM2.5 in µg/m³, or the US AQI when the node reports AQI
    pub pm02: Option<i32>,
    /// CO2 in ppm
    pub rco2: Option<i32>,
    /// Temperature in tenths of a degree of the configured unit
    pub atmp_tenths: Option<i32>,
    /// Relative humidity in whole percent
    pub rhum: Option<i32>,
}

impl Telemetry {
    pub fn new(measurements: &Measurements, config: &NodeConfig, wifi_rssi: Option<i32>) -> Self {
        let pm02 = measurements.pm2_5_ugm3.map(|pm| match config.pm_unit {
            PmUnit::Concentration => pm,
            PmUnit::UsAqi => pm_to_aqi_us(pm as f32),
        });

        Self {
            wifi: wifi_rssi,
            pm02,
            rco2: measurements.co2_ppm,
            atmp_tenths: measurements
                .temperature_milli_celsius
                .map(|t| config.temperature_unit.tenths(t)),
            rhum: measurements.humidity_milli_percent.map(|h| h / 1000),
        }
    }

    /// Whether there is anything besides the RSSI worth sending
    pub fn has_readings(&self) -> bool {
        self.pm02.is_some()
            || self.rco2.is_some()
            || self.atmp_tenths.is_some()
            || self.rhum.is_some()
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        let mut separator = "";
        let mut field = |out: &mut W, key: &str, value: &dyn fmt::Display| {
            let result = write!(out, "{}\"{}\":{}", separator, key, value);
            separator = ",";
            result
        };

        out.write_char('{')?;
        if let Some(wifi) = self.wifi {
            field(out, "wifi", &wifi)?;
        }
        if let Some(pm02) = self.pm02 {
            field(out, "pm02", &pm02)?;
        }
        if let Some(rco2) = self.rco2 {
            field(out, "rco2", &rco2)?;
        }
        if let Some(atmp) = self.atmp_tenths {
            field(out, "atmp", &Tenths(atmp))?;
        }
        if let Some(rhum) = self.rhum {
            field(out, "rhum", &rhum)?;
        }
        out.write_char('}')
    }

    pub fn to_json(&self) -> Result<String<PAYLOAD_MAX_LEN>, TelemetryError> {
        let mut json = String::new();
        self.write_json(&mut json)
            .map_err(|_| TelemetryError::BufferTooSmall(PAYLOAD_MAX_LEN))?;
        Ok(json)
    }
}
