//! Node configuration
//!
//! [`NodeConfig`] is built once at start-up (from a TOML file in the
//! simulator, from compile-time environment in the firmware), checked with
//! [`NodeConfig::validate`], and then passed by reference to whatever needs
//! it. Nothing mutates it afterwards.

use core::fmt;

use embassy_time::Duration;
use heapless::String;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::history::SeriesRange;
use crate::sensors::Quantity;

pub const SSID_MAX_LEN: usize = 32;
pub const PASSWORD_MAX_LEN: usize = 64;
pub const URL_MAX_LEN: usize = 128;

/// Placeholder in the collector URL replaced by the device id
pub const DEVICE_ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("graph range for {quantity} is empty: max {max} must exceed min {min}")]
    InvalidRange {
        quantity: &'static str,
        min: i32,
        max: i32,
    },

    #[error("screen dwell must be greater than zero")]
    ZeroDwell,

    #[error("WiFi SSID is empty")]
    EmptySsid,

    #[error("collector URL must start with http:// or https://")]
    InvalidCollectorUrl,

    #[error("{field} does not fit in {capacity} bytes")]
    TooLong {
        field: &'static str,
        capacity: usize,
    },
}

/// Which sensors are fitted to this node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSelection {
    /// PMS5003 particulate sensor
    pub pm: bool,
    /// SCD41 CO2 sensor
    pub co2: bool,
    /// SHT40 temperature and humidity sensor
    pub climate: bool,
}

impl Default for SensorSelection {
    fn default() -> Self {
        Self {
            pm: true,
            co2: true,
            climate: true,
        }
    }
}

impl SensorSelection {
    pub const fn enabled(&self, quantity: Quantity) -> bool {
        match quantity {
            Quantity::Pm25 => self.pm,
            Quantity::Co2 => self.co2,
            Quantity::Temperature | Quantity::Humidity => self.climate,
        }
    }
}

/// How particulate readings are shown and reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmUnit {
    /// Raw PM2.5 in µg/m³
    #[default]
    Concentration,
    /// US EPA AQI computed from PM2.5
    UsAqi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert milli-degrees Celsius to tenths of a degree in this unit,
    /// dropping any remainder below a tenth.
    pub const fn tenths(self, milli_celsius: i32) -> i32 {
        match self {
            TemperatureUnit::Celsius => milli_celsius / 100,
            TemperatureUnit::Fahrenheit => milli_celsius * 9 / 500 + 320,
        }
    }

    pub const fn suffix(self) -> char {
        match self {
            TemperatureUnit::Celsius => 'C',
            TemperatureUnit::Fahrenheit => 'F',
        }
    }
}

/// Fixed-point value in tenths, displayed with one decimal (`-0.5`, `21.4`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i32);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{}{}.{}", sign, magnitude / 10, magnitude % 10)
    }
}

/// Default PM graph for [`PmUnit::Concentration`], in µg/m³
pub const PM_CONCENTRATION_RANGE: SeriesRange = SeriesRange::new(0, 150, 35, 55);

/// Default PM graph for [`PmUnit::UsAqi`]: up to "Very Unhealthy"
pub const PM_AQI_RANGE: SeriesRange = SeriesRange::new(0, 300, 100, 150);

/// Graph range per quantity; `None` means the quantity gets no graph
///
/// PM ranges are in the configured [`PmUnit`], temperature in whole degrees
/// of the configured [`TemperatureUnit`], humidity in whole percent.
///
/// A PM range left at [`PM_CONCENTRATION_RANGE`] is read as "default" and
/// becomes [`PM_AQI_RANGE`] when PM is shown as AQI (see
/// [`NodeConfig::graph_range`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphRanges {
    pub pm2_5: Option<SeriesRange>,
    pub co2: Option<SeriesRange>,
    pub temperature: Option<SeriesRange>,
    pub humidity: Option<SeriesRange>,
}

impl Default for GraphRanges {
    fn default() -> Self {
        Self {
            pm2_5: Some(PM_CONCENTRATION_RANGE),
            co2: Some(SeriesRange::new(400, 2000, 1000, 1500)),
            temperature: None,
            humidity: None,
        }
    }
}

impl GraphRanges {
    pub const fn get(&self, quantity: Quantity) -> Option<SeriesRange> {
        match quantity {
            Quantity::Pm25 => self.pm2_5,
            Quantity::Co2 => self.co2,
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long each screen stays up before the next one is drawn
    pub screen_dwell_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            screen_dwell_ms: 3000,
        }
    }
}

impl TimingConfig {
    pub const fn screen_dwell(&self) -> Duration {
        Duration::from_millis(self.screen_dwell_ms)
    }
}

/// WiFi credentials and telemetry collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetConfig {
    pub ssid: String<SSID_MAX_LEN>,
    pub password: String<PASSWORD_MAX_LEN>,
    /// Collector URL; `{id}` is replaced by the device id
    pub collector_url: String<URL_MAX_LEN>,
}

impl InternetConfig {
    pub fn new(ssid: &str, password: &str, collector_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            ssid: bounded("ssid", ssid)?,
            password: bounded("password", password)?,
            collector_url: bounded("collector_url", collector_url)?,
        })
    }

    /// Collector URL for `device_id`.
    pub fn endpoint(&self, device_id: &str) -> Result<String<URL_MAX_LEN>, ConfigError> {
        let too_long = |_| ConfigError::TooLong {
            field: "endpoint",
            capacity: URL_MAX_LEN,
        };

        let mut url = String::new();
        for (i, part) in self.collector_url.split(DEVICE_ID_PLACEHOLDER).enumerate() {
            if i > 0 {
                url.push_str(device_id).map_err(too_long)?;
            }
            url.push_str(part).map_err(too_long)?;
        }
        Ok(url)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        let url = self.collector_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidCollectorUrl);
        }
        Ok(())
    }
}

fn bounded<const N: usize>(field: &'static str, value: &str) -> Result<String<N>, ConfigError> {
    String::try_from(value).map_err(|_| ConfigError::TooLong { field, capacity: N })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub sensors: SensorSelection,
    pub pm_unit: PmUnit,
    pub temperature_unit: TemperatureUnit,
    pub graphs: GraphRanges,
    pub timing: TimingConfig,
    /// Telemetry upload is disabled when absent
    pub internet: Option<InternetConfig>,
}

impl NodeConfig {
    /// Graph range for `quantity`, if its sensor is fitted and a range is set
    ///
    /// With [`PmUnit::UsAqi`] the default PM range is swapped for
    /// [`PM_AQI_RANGE`], since the series then holds index values.
    pub fn graph_range(&self, quantity: Quantity) -> Option<SeriesRange> {
        if !self.sensors.enabled(quantity) {
            return None;
        }

        match (quantity, self.graphs.get(quantity)) {
            (Quantity::Pm25, Some(PM_CONCENTRATION_RANGE)) if self.pm_unit == PmUnit::UsAqi => {
                Some(PM_AQI_RANGE)
            }
            (_, range) => range,
        }
    }

    /// Check the invariants the sampling loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for quantity in Quantity::ALL {
            if let Some(range) = self.graphs.get(quantity)
                && !range.is_valid()
            {
                return Err(ConfigError::InvalidRange {
                    quantity: quantity.label(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if self.timing.screen_dwell_ms == 0 {
            return Err(ConfigError::ZeroDwell);
        }

        if let Some(internet) = &self.internet {
            internet.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internet(url: &str) -> InternetConfig {
        InternetConfig::new("node-net", "hunter22", url).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let config = NodeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.timing.screen_dwell(), Duration::from_secs(3));
        assert!(config.internet.is_none());
    }

    #[test]
    fn default_graphs_cover_pm_and_co2() {
        let config = NodeConfig::default();
        assert_eq!(
            config.graph_range(Quantity::Pm25),
            Some(SeriesRange::new(0, 150, 35, 55))
        );
        assert!(config.graph_range(Quantity::Co2).is_some());
        assert!(config.graph_range(Quantity::Temperature).is_none());
        assert!(config.graph_range(Quantity::Humidity).is_none());
    }

    #[test]
    fn aqi_mode_widens_default_pm_graph() {
        let config = NodeConfig {
            pm_unit: PmUnit::UsAqi,
            ..Default::default()
        };
        assert_eq!(config.graph_range(Quantity::Pm25), Some(PM_AQI_RANGE));
        // AQI 200 from 150.4 ug/m3 is no longer pinned to the top of the graph
        assert!(PM_AQI_RANGE.clamp(200) < PM_AQI_RANGE.max);

        let mut custom = config.clone();
        custom.graphs.pm2_5 = Some(SeriesRange::new(0, 500, 100, 200));
        assert_eq!(
            custom.graph_range(Quantity::Pm25),
            Some(SeriesRange::new(0, 500, 100, 200))
        );
    }

    #[test]
    fn disabled_sensor_has_no_graph() {
        let mut config = NodeConfig::default();
        config.sensors.co2 = false;
        assert!(config.graph_range(Quantity::Co2).is_none());
        assert!(config.graph_range(Quantity::Pm25).is_some());
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut config = NodeConfig::default();
        config.graphs.humidity = Some(SeriesRange::new(50, 50, 60, 70));
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                quantity: "RH",
                min: 50,
                max: 50,
            })
        );
    }

    #[test]
    fn zero_dwell_is_rejected() {
        let mut config = NodeConfig::default();
        config.timing.screen_dwell_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDwell));
    }

    #[test]
    fn internet_settings_are_checked() {
        let mut config = NodeConfig::default();

        config.internet = Some(internet("ftp://collector.local/{id}"));
        assert_eq!(config.validate(), Err(ConfigError::InvalidCollectorUrl));

        config.internet = Some(InternetConfig::new("", "pw", "http://c.local").unwrap());
        assert_eq!(config.validate(), Err(ConfigError::EmptySsid));

        config.internet = Some(internet("https://collector.local/sensors/{id}/measures"));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn endpoint_substitutes_device_id() {
        let config = internet("http://collector.local/sensors/airgradient:{id}/measures");
        assert_eq!(
            config.endpoint("a1b2c3d4e5f6").unwrap().as_str(),
            "http://collector.local/sensors/airgradient:a1b2c3d4e5f6/measures"
        );

        let fixed = internet("http://collector.local/ingest");
        assert_eq!(fixed.endpoint("abc").unwrap().as_str(), "http://collector.local/ingest");
    }

    #[test]
    fn overlong_values_are_reported() {
        let long = "x".repeat(SSID_MAX_LEN + 1);
        assert_eq!(
            InternetConfig::new(&long, "pw", "http://c.local"),
            Err(ConfigError::TooLong {
                field: "ssid",
                capacity: SSID_MAX_LEN,
            })
        );

        let base = "http://c.local/{id}/{id}/{id}/";
        let config = internet(base);
        let id = "0123456789abcdef0123456789abcdef0123456789";
        assert!(matches!(
            config.endpoint(id),
            Err(ConfigError::TooLong { field: "endpoint", .. })
        ));
    }

    #[test]
    fn fahrenheit_tenths() {
        assert_eq!(TemperatureUnit::Celsius.tenths(21_480), 214);
        assert_eq!(TemperatureUnit::Fahrenheit.tenths(21_480), 706);
        assert_eq!(TemperatureUnit::Fahrenheit.tenths(0), 320);
        assert_eq!(TemperatureUnit::Fahrenheit.tenths(-40_000), -400);
    }

    #[test]
    fn tenths_display() {
        use alloc::string::ToString;

        assert_eq!(Tenths(214).to_string(), "21.4");
        assert_eq!(Tenths(-5).to_string(), "-0.5");
        assert_eq!(Tenths(-123).to_string(), "-12.3");
        assert_eq!(Tenths(0).to_string(), "0.0");
    }
}
