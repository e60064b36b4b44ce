//! Desktop simulator for the aqnode air-quality sensor node.
//!
//! Runs the node's sampling loop against synthetic sensors and renders every
//! screen the device would show. By default frames are written as PNG files
//! (OLED theme) into `--output-dir`; with `--features window` they are shown
//! in an SDL2 window instead. Telemetry payloads are logged, not uploaded.
//!
//! ```text
//! RUST_LOG=info cargo run -p aqnode-simulator -- --config aqnode.example.toml --cycles 64
//! ```

mod config;
mod surface;
mod synthetic;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use aqnode_core::monitor::NodeMonitor;
use aqnode_core::sensors::{Measurements, Sensor};
use aqnode_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use embassy_futures::block_on;
use embedded_graphics::prelude::*;
use humantime::Duration as HumanDuration;
use log::{info, warn};
use structopt::StructOpt;

use surface::SimulatorSurface;
use synthetic::{Source, SyntheticSensor};

/// Simulated wall-clock time between two sampling cycles
const SIMULATED_CYCLE_SECS: f64 = 60.0;

/// RSSI reported in simulated telemetry
const SIMULATED_RSSI_DBM: i32 = -61;

#[derive(Debug, StructOpt)]
#[structopt(name = "aqnode-simulator")]
struct Options {
    /// Node configuration (TOML); defaults are used when omitted
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    config: Option<PathBuf>,

    /// Number of sampling cycles to run
    #[structopt(short = "n", long = "cycles", default_value = "64")]
    cycles: usize,

    /// Time each screen stays up, overriding the configured dwell
    /// (headless runs default to no delay)
    #[structopt(short = "p", long = "period")]
    period: Option<HumanDuration>,

    /// Directory PNG frames are written to
    #[structopt(short = "o", long = "output-dir", default_value = "frames", parse(from_os_str))]
    output_dir: PathBuf,

    /// Show frames in an SDL2 window instead of writing PNGs
    #[cfg(feature = "window")]
    #[structopt(short = "w", long = "window")]
    window: bool,
}

fn open_surface(options: &Options) -> Result<(SimulatorSurface, bool)> {
    let size = Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX);

    #[cfg(feature = "window")]
    if options.window {
        return Ok((SimulatorSurface::window(size), true));
    }

    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("cannot create '{}'", options.output_dir.display()))?;
    info!("Writing frames to {}", options.output_dir.display());
    Ok((SimulatorSurface::png(size, options.output_dir.clone()), false))
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Options::from_args();

    let config = config::load(options.config.as_deref())?;
    info!("Configuration: {:?}", config);

    let (mut surface, interactive) = open_surface(&options)?;
    let dwell: Duration = match options.period {
        Some(period) => period.into(),
        None if interactive => Duration::from_millis(config.timing.screen_dwell_ms),
        None => Duration::ZERO,
    };

    let endpoint = match &config.internet {
        Some(internet) => Some(
            internet
                .endpoint("simulator")
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
        None => None,
    };

    let mut sensors: Vec<SyntheticSensor> = Source::ALL
        .into_iter()
        .filter(|source| {
            source
                .quantities()
                .iter()
                .all(|&q| config.sensors.enabled(q))
        })
        .map(|source| SyntheticSensor::new(source, SIMULATED_CYCLE_SECS))
        .collect();

    let mut monitor = NodeMonitor::new(config, surface.size().width);
    info!(
        "Display {}x{}, graphs: {:?}",
        DISPLAY_WIDTH_PX,
        DISPLAY_HEIGHT_PX,
        monitor.graph_quantities().collect::<Vec<_>>()
    );

    let pause = |surface: &SimulatorSurface| {
        if !surface.is_closed() && !dwell.is_zero() {
            std::thread::sleep(dwell);
        }
    };

    'cycles: for cycle in 0..options.cycles {
        for sensor in sensors.iter_mut() {
            let source = sensor.source();
            let mut fresh = Measurements::default();
            match block_on(sensor.read_into(&mut fresh)) {
                Ok(()) => monitor.update(fresh),
                Err(e) => warn!("{} read failed: {}", source.name(), e),
            }

            for &quantity in source.quantities() {
                if monitor.draw_graph(quantity, &mut surface)? {
                    pause(&surface);
                }
                if surface.is_closed() {
                    break 'cycles;
                }
            }
        }

        monitor.draw_readings(&mut surface)?;
        pause(&surface);
        if surface.is_closed() {
            break;
        }

        let telemetry = monitor.telemetry(Some(SIMULATED_RSSI_DBM));
        match (&endpoint, telemetry.to_json()) {
            (Some(url), Ok(json)) => info!("cycle {}: POST {} {}", cycle, url, json),
            (None, Ok(json)) => info!("cycle {}: {}", cycle, json),
            (_, Err(e)) => warn!("cycle {}: {}", cycle, e),
        }
    }

    info!("Presented {} frames", surface.frames_presented());
    Ok(())
}
