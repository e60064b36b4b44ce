//! Peripheral bring-up for the node
//!
//! Pin assignment:
//!
//! | Bus        | Pins              | Devices          |
//! |------------|-------------------|------------------|
//! | I2C0 async | SDA 12, SCL 11    | SCD41, SHT40     |
//! | I2C1       | SDA 5, SCL 6      | SSD1306 64x48    |
//! | UART1      | RX 18, TX 17      | PMS5003          |

use aqnode_core::shared_i2c::{SharedI2cBus, SharedI2cDevice};
use embassy_sync::mutex::Mutex;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::{GPIO5, GPIO6, GPIO11, GPIO12, GPIO17, GPIO18, I2C0, I2C1, UART1};
use esp_hal::time::Rate;
use esp_hal::uart::{Config as UartConfig, Uart};
use esp_hal::{Async, Blocking};
use log::info;
use static_cell::StaticCell;

/// PMS5003 serial speed, fixed by the sensor
const PMS5003_BAUD: u32 = 9600;

pub type SensorI2c = I2c<'static, Async>;
pub type SensorI2cDevice = SharedI2cDevice<'static, SensorI2c>;
pub type DisplayI2c = I2c<'static, Blocking>;
pub type ParticulateUart = Uart<'static, Async>;

/// Create the async I2C0 bus shared by the SCD41 and SHT40
///
/// Call once; hand each driver its own [`SharedI2cDevice`].
pub fn create_sensor_bus(
    i2c0: I2C0<'static>,
    sda: GPIO12<'static>,
    scl: GPIO11<'static>,
) -> &'static SharedI2cBus<SensorI2c> {
    static SENSOR_BUS: StaticCell<SharedI2cBus<SensorI2c>> = StaticCell::new();

    let i2c = I2c::new(i2c0, I2cConfig::default().with_frequency(Rate::from_khz(100)))
        .unwrap()
        .with_sda(sda)
        .with_scl(scl)
        .into_async();

    info!("Sensor I2C bus ready (100 kHz)");
    SENSOR_BUS.init(Mutex::new(i2c))
}

/// Create the blocking I2C1 bus that drives the OLED panel
pub fn create_display_i2c(
    i2c1: I2C1<'static>,
    sda: GPIO5<'static>,
    scl: GPIO6<'static>,
) -> DisplayI2c {
    I2c::new(i2c1, I2cConfig::default().with_frequency(Rate::from_khz(400)))
        .unwrap()
        .with_sda(sda)
        .with_scl(scl)
}

/// Create the UART the PMS5003 streams its frames on
pub fn create_particulate_uart(
    uart1: UART1<'static>,
    rx: GPIO18<'static>,
    tx: GPIO17<'static>,
) -> ParticulateUart {
    let uart = Uart::new(uart1, UartConfig::default().with_baudrate(PMS5003_BAUD))
        .unwrap()
        .with_rx(rx)
        .with_tx(tx)
        .into_async();

    info!("PMS5003 UART ready ({} baud)", PMS5003_BAUD);
    uart
}
