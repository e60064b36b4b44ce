//! Sampling-cycle state
//!
//! [`NodeMonitor`] owns everything one sampling loop needs between cycles:
//! the configuration, the latest measurements and one [`HistorySeries`] per
//! graphed quantity. The firmware and the simulator drive it the same way:
//!
//! 1. read a sensor and pass its readings to [`NodeMonitor::update`]
//! 2. draw each of that sensor's graphs with [`NodeMonitor::draw_graph`]
//! 3. after all sensors, draw [`NodeMonitor::draw_readings`]
//! 4. upload [`NodeMonitor::telemetry`] when online

use log::{debug, warn};

use crate::aqi::pm_to_aqi_us;
use crate::config::{NodeConfig, PmUnit};
use crate::history::HistorySeries;
use crate::sensors::{Measurements, Quantity};
use crate::telemetry::Telemetry;
use crate::ui::{GraphRenderer, ReadingsScreen, Surface};

pub struct NodeMonitor {
    config: NodeConfig,
    measurements: Measurements,
    series: [Option<HistorySeries>; Quantity::ALL.len()],
    graph: GraphRenderer,
    readings: ReadingsScreen,
}

impl NodeMonitor {
    /// Set up a monitor for a display `display_width` pixels wide.
    ///
    /// Every fitted quantity with a graph range gets a series with one slot
    /// per pixel column. `config` is expected to have passed
    /// [`NodeConfig::validate`].
    pub fn new(config: NodeConfig, display_width: u32) -> Self {
        let series = Quantity::ALL.map(|quantity| {
            let range = config.graph_range(quantity)?;
            match HistorySeries::new(quantity.label(), display_width as usize, range) {
                Ok(series) => Some(series),
                Err(e) => {
                    warn!("No graph for {}: {}", quantity.label(), e);
                    None
                }
            }
        });

        Self {
            readings: ReadingsScreen::new(&config),
            graph: GraphRenderer::new(),
            measurements: Measurements::default(),
            series,
            config,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Latest value of every quantity
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn series(&self, quantity: Quantity) -> Option<&HistorySeries> {
        self.series[quantity.index()].as_ref()
    }

    /// Quantities that have a graph, in display order
    pub fn graph_quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        Quantity::ALL
            .into_iter()
            .filter(|quantity| self.series(*quantity).is_some())
    }

    /// Value stored in the graph for a raw reading, in the graph's units
    pub fn graph_value(&self, quantity: Quantity, raw: i32) -> i32 {
        match quantity {
            Quantity::Pm25 => match self.config.pm_unit {
                PmUnit::Concentration => raw,
                PmUnit::UsAqi => pm_to_aqi_us(raw as f32),
            },
            Quantity::Co2 => raw,
            Quantity::Temperature => self.config.temperature_unit.tenths(raw) / 10,
            Quantity::Humidity => raw / 1000,
        }
    }

    /// Record one raw reading into `quantity`'s series.
    ///
    /// Returns `false` when the quantity has no series.
    pub fn record(&mut self, quantity: Quantity, raw: i32) -> bool {
        let value = self.graph_value(quantity, raw);
        match self.series[quantity.index()].as_mut() {
            Some(series) => {
                series.record(value);
                debug!("{} <- {}", quantity.label(), value);
                true
            }
            None => false,
        }
    }

    /// Merge fresh readings and record each one into its series.
    ///
    /// Quantities `fresh` has no value for keep their previous reading and
    /// nothing is recorded for them.
    pub fn update(&mut self, fresh: Measurements) {
        for quantity in Quantity::ALL {
            if let Some(raw) = fresh.get(quantity) {
                self.record(quantity, raw);
            }
        }
        self.measurements.merge(fresh);
    }

    /// Draw `quantity`'s graph full-screen.
    ///
    /// Returns `Ok(false)` without touching `surface` when the quantity has
    /// no series.
    pub fn draw_graph<S: Surface>(&self, quantity: Quantity, surface: &mut S) -> Result<bool, S::Error> {
        match self.series(quantity) {
            Some(series) => self.graph.draw(series, surface).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn draw_readings<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        self.readings.draw(&self.measurements, surface)
    }

    /// Payload for the latest measurements
    pub fn telemetry(&self, wifi_rssi: Option<i32>) -> Telemetry {
        Telemetry::new(&self.measurements, &self.config, wifi_rssi)
    }
}
