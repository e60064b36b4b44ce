//! Loading [`NodeConfig`] from a TOML file.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use aqnode_core::config::NodeConfig;
use log::warn;

/// Load and validate the configuration at `path`, or the defaults when no
/// path is given.
pub fn load(path: Option<&Path>) -> Result<NodeConfig> {
    let Some(path) = path else {
        warn!("No --config given; using the default node configuration");
        return Ok(NodeConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    parse(&raw).with_context(|| format!("invalid configuration in '{}'", path.display()))
}

pub fn parse(raw: &str) -> Result<NodeConfig> {
    let config: NodeConfig = toml::from_str(raw).context("TOML parse error")?;
    config.validate().map_err(|e| anyhow!("{}", e))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqnode_core::config::{PM_AQI_RANGE, PmUnit, TemperatureUnit};
    use aqnode_core::sensors::Quantity;
    use aqnode_core::history::SeriesRange;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), NodeConfig::default());
    }

    #[test]
    fn parses_full_file() {
        let config = parse(
            r#"
            pm_unit = "us_aqi"
            temperature_unit = "fahrenheit"

            [sensors]
            co2 = false

            [graphs.humidity]
            min = 0
            max = 100
            warn = 60
            alarm = 70

            [timing]
            screen_dwell_ms = 5000

            [internet]
            ssid = "node-net"
            password = "hunter22"
            collector_url = "http://collector.local/sensors/{id}/measures"
            "#,
        )
        .unwrap();

        assert_eq!(config.pm_unit, PmUnit::UsAqi);
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
        assert!(!config.sensors.co2);
        assert!(config.sensors.pm);
        assert_eq!(
            config.graphs.humidity,
            Some(SeriesRange::new(0, 100, 60, 70))
        );
        // Unlisted graphs keep their defaults
        assert_eq!(config.graphs.pm2_5, Some(SeriesRange::new(0, 150, 35, 55)));
        assert_eq!(config.graph_range(Quantity::Pm25), Some(PM_AQI_RANGE));
        assert_eq!(config.timing.screen_dwell_ms, 5000);

        let internet = config.internet.unwrap();
        assert_eq!(internet.ssid.as_str(), "node-net");
        assert_eq!(
            internet.endpoint("simulator").unwrap().as_str(),
            "http://collector.local/sensors/simulator/measures"
        );
    }

    #[test]
    fn invalid_range_fails_validation() {
        let err = parse(
            r#"
            [graphs.co2]
            min = 2000
            max = 400
            warn = 1000
            alarm = 1500
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("CO2"), "{}", err);
    }

    #[test]
    fn unknown_unit_is_a_parse_error() {
        let err = parse(r#"pm_unit = "ppm""#).unwrap_err();
        assert!(err.to_string().contains("TOML"), "{}", err);
    }
}
