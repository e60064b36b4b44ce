#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use aqnode_core::config::URL_MAX_LEN;
use aqnode_core::monitor::NodeMonitor;
use aqnode_core::sensors::pms5003::Pms5003Sensor;
#[cfg(feature = "sensor-scd41")]
use aqnode_core::sensors::scd41::Scd41Sensor;
#[cfg(feature = "sensor-sht40")]
use aqnode_core::sensors::sht40::Sht40Sensor;
use aqnode_core::sensors::{Measurements, Quantity, Sensor};
#[cfg(any(feature = "sensor-scd41", feature = "sensor-sht40"))]
use aqnode_firmware::app_state::SensorI2cDevice;
use aqnode_firmware::app_state::{
    create_display_i2c, create_particulate_uart, create_sensor_bus,
};
use aqnode_firmware::display::Oled;
use aqnode_firmware::network::{self, Network};
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use embedded_graphics::prelude::*;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use heapless::String;
use log::{error, info, warn};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(log::LevelFilter::Info);

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    let config = aqnode_firmware::config::load().unwrap_or_else(|e| panic!("{}", e));

    let display_i2c = create_display_i2c(peripherals.I2C1, peripherals.GPIO5, peripherals.GPIO6);
    let mut oled = Oled::new(display_i2c).expect("Failed to initialize display");

    let uart = create_particulate_uart(peripherals.UART1, peripherals.GPIO18, peripherals.GPIO17);
    let mut pms5003 = Pms5003Sensor::new(uart);

    let sensor_bus = create_sensor_bus(peripherals.I2C0, peripherals.GPIO12, peripherals.GPIO11);
    #[cfg(feature = "sensor-scd41")]
    let mut scd41 = Scd41Sensor::new(SensorI2cDevice::new(sensor_bus));
    #[cfg(feature = "sensor-sht40")]
    let mut sht40 = Sht40Sensor::new(SensorI2cDevice::new(sensor_bus));
    #[cfg(not(any(feature = "sensor-scd41", feature = "sensor-sht40")))]
    let _ = sensor_bus;

    let mut uplink: Option<(Network, String<URL_MAX_LEN>)> = None;
    if let Some(internet) = &config.internet {
        match network::start(&spawner, peripherals.WIFI, internet) {
            Ok(network) => match internet.endpoint(&network.device_id) {
                Ok(url) => uplink = Some((network, url)),
                Err(e) => error!("Telemetry disabled: {}", e),
            },
            Err(e) => error!("Telemetry disabled: {}", e),
        }
    }

    let sensors = config.sensors;
    let dwell = config.timing.screen_dwell();
    let mut monitor = NodeMonitor::new(config, oled.size().width);

    loop {
        if sensors.pm {
            show_sensor(&mut pms5003, "PMS5003", &[Quantity::Pm25], &mut monitor, &mut oled, dwell)
                .await;
        }
        #[cfg(feature = "sensor-scd41")]
        if sensors.co2 {
            show_sensor(&mut scd41, "SCD41", &[Quantity::Co2], &mut monitor, &mut oled, dwell)
                .await;
        }
        #[cfg(feature = "sensor-sht40")]
        if sensors.climate {
            show_sensor(
                &mut sht40,
                "SHT40",
                &[Quantity::Temperature, Quantity::Humidity],
                &mut monitor,
                &mut oled,
                dwell,
            )
            .await;
        }

        if let Err(e) = monitor.draw_readings(&mut oled) {
            error!("{}", e);
        }
        Timer::after(dwell).await;

        if let Some((network, url)) = &uplink {
            send_telemetry(network, url, &monitor).await;
        }
    }
}

/// Read one sensor, then show each of its graphs for `dwell`.
///
/// A failed read records nothing; the graphs still show the history.
async fn show_sensor<S: Sensor>(
    sensor: &mut S,
    name: &str,
    quantities: &[Quantity],
    monitor: &mut NodeMonitor,
    oled: &mut Oled,
    dwell: Duration,
) {
    let mut fresh = Measurements::default();
    match sensor.read_into(&mut fresh).await {
        Ok(()) => monitor.update(fresh),
        Err(e) => warn!("{} read failed: {}", name, e),
    }

    for &quantity in quantities {
        match monitor.draw_graph(quantity, oled) {
            Ok(true) => Timer::after(dwell).await,
            Ok(false) => {}
            Err(e) => error!("{}", e),
        }
    }
}

async fn send_telemetry(network: &Network, url: &str, monitor: &NodeMonitor) {
    let telemetry = monitor.telemetry(network::link_rssi());
    if !telemetry.has_readings() {
        return;
    }

    let json = match telemetry.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!("Telemetry not sent: {}", e);
            return;
        }
    };

    match network::upload(network.stack, url, &json).await {
        Ok(status) => info!("Telemetry sent (status {})", status),
        Err(e) => warn!("{}", e),
    }
}
