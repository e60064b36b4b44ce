//! Node configuration baked in at build time
//!
//! `build.rs` exports the values from `.env`. Unset values keep the
//! [`NodeConfig`] defaults; an unset or empty SSID runs the node offline.

use aqnode_core::config::{InternetConfig, NodeConfig, PmUnit, TemperatureUnit};
use log::{info, warn};

use crate::app_state::{AppError, detail};

const WIFI_SSID: Option<&str> = option_env!("AQNODE_WIFI_SSID");
const WIFI_PASSWORD: Option<&str> = option_env!("AQNODE_WIFI_PASSWORD");
const COLLECTOR_URL: Option<&str> = option_env!("AQNODE_COLLECTOR_URL");
const PM_UNIT: Option<&str> = option_env!("AQNODE_PM_UNIT");
const TEMPERATURE_UNIT: Option<&str> = option_env!("AQNODE_TEMPERATURE_UNIT");

/// Collector used when only WiFi credentials are given
const DEFAULT_COLLECTOR_URL: &str = "http://hw.airgradient.com/sensors/airgradient:{id}/measures";

/// Build and validate the node configuration.
pub fn load() -> Result<NodeConfig, AppError> {
    let mut config = NodeConfig {
        pm_unit: parse_pm_unit(PM_UNIT)?,
        temperature_unit: parse_temperature_unit(TEMPERATURE_UNIT)?,
        ..NodeConfig::default()
    };

    config.internet = match WIFI_SSID {
        Some(ssid) if !ssid.is_empty() => {
            let url = COLLECTOR_URL.unwrap_or(DEFAULT_COLLECTOR_URL);
            let internet = InternetConfig::new(ssid, WIFI_PASSWORD.unwrap_or(""), url)
                .map_err(|e| AppError::Config(detail(format_args!("{}", e))))?;
            info!("Telemetry to {} via '{}'", url, ssid);
            Some(internet)
        }
        _ => {
            warn!("AQNODE_WIFI_SSID not set; running offline");
            None
        }
    };

    config
        .validate()
        .map_err(|e| AppError::Config(detail(format_args!("{}", e))))?;
    Ok(config)
}

fn parse_pm_unit(value: Option<&str>) -> Result<PmUnit, AppError> {
    match value {
        None | Some("") => Ok(PmUnit::default()),
        Some("concentration") => Ok(PmUnit::Concentration),
        Some("us_aqi") => Ok(PmUnit::UsAqi),
        Some(other) => Err(AppError::Config(detail(format_args!(
            "unknown PM unit '{}'",
            other
        )))),
    }
}

fn parse_temperature_unit(value: Option<&str>) -> Result<TemperatureUnit, AppError> {
    match value {
        None | Some("") => Ok(TemperatureUnit::default()),
        Some("celsius") => Ok(TemperatureUnit::Celsius),
        Some("fahrenheit") => Ok(TemperatureUnit::Fahrenheit),
        Some(other) => Err(AppError::Config(detail(format_args!(
            "unknown temperature unit '{}'",
            other
        )))),
    }
}
