//! Plantower PMS5003 particulate sensor over UART
//!
//! In its default active mode the sensor streams a 32 byte frame roughly once
//! a second at 9600 baud:
//!
//! | Bytes  | Content                                   |
//! |--------|-------------------------------------------|
//! | 0..2   | start characters `0x42 0x4D`              |
//! | 2..4   | frame length, always 28                   |
//! | 4..30  | 13 big-endian data words                  |
//! | 30..32 | checksum: sum of bytes 0..30              |
//!
//! Data words 1-3 are PM1.0/PM2.5/PM10 under the factory calibration
//! (CF=1), words 4-6 the same under atmospheric conditions, words 7-12 the
//! particle counts per 0.1 L of air, and word 13 is reserved.

use embedded_io_async::{Read, ReadExactError};
use log::{debug, error, warn};

use super::{Measurements, Sensor, SensorError, SensorReadings};

const SENSOR_NAME: &str = "PMS5003";

/// Length of one frame on the wire
pub const FRAME_LEN: usize = 32;

const START_1: u8 = 0x42;
const START_2: u8 = 0x4D;

/// Value of the length field: 13 data words plus the checksum
const FRAME_DATA_LEN: u16 = 28;

/// Bytes skipped while hunting for a start sequence before giving up
const RESYNC_SCAN_LIMIT: usize = 2 * FRAME_LEN;

/// Decoded contents of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pms5003Frame {
    pub pm1_0_cf1: u16,
    pub pm2_5_cf1: u16,
    pub pm10_cf1: u16,
    /// PM1.0 in µg/m³, atmospheric environment
    pub pm1_0: u16,
    /// PM2.5 in µg/m³, atmospheric environment
    pub pm2_5: u16,
    /// PM10 in µg/m³, atmospheric environment
    pub pm10: u16,
    /// Particles beyond 0.3, 0.5, 1.0, 2.5, 5.0 and 10 µm per 0.1 L
    pub particle_counts: [u16; 6],
}

impl Pms5003Frame {
    /// Validate and decode a raw frame.
    pub fn parse(bytes: &[u8; FRAME_LEN]) -> Result<Self, SensorError> {
        if bytes[0] != START_1 || bytes[1] != START_2 {
            return Err(SensorError::InvalidFrame {
                sensor: SENSOR_NAME,
                details: "missing start characters",
            });
        }

        let word = |index: usize| u16::from_be_bytes([bytes[2 + 2 * index], bytes[3 + 2 * index]]);

        if word(0) != FRAME_DATA_LEN {
            return Err(SensorError::InvalidFrame {
                sensor: SENSOR_NAME,
                details: "unexpected frame length",
            });
        }

        let expected = word(14);
        let actual = checksum(&bytes[..FRAME_LEN - 2]);
        if expected != actual {
            return Err(SensorError::ChecksumMismatch {
                sensor: SENSOR_NAME,
                expected,
                actual,
            });
        }

        Ok(Self {
            pm1_0_cf1: word(1),
            pm2_5_cf1: word(2),
            pm10_cf1: word(3),
            pm1_0: word(4),
            pm2_5: word(5),
            pm10: word(6),
            particle_counts: [word(7), word(8), word(9), word(10), word(11), word(12)],
        })
    }
}

fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &byte| sum.wrapping_add(byte as u16))
}

/// PM2.5 reading taken from one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pms5003Readings {
    pub pm2_5_ugm3: i32,
}

impl SensorReadings for Pms5003Readings {
    fn apply(self, into: &mut Measurements) {
        into.pm2_5_ugm3 = Some(self.pm2_5_ugm3);
    }
}

/// PMS5003 on any async UART receiver
pub struct Pms5003Sensor<U> {
    uart: U,
}

impl<U: Read> Pms5003Sensor<U> {
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    async fn read_byte(&mut self) -> Result<u8, SensorError> {
        let mut byte = [0u8; 1];
        self.fill(&mut byte).await?;
        Ok(byte[0])
    }

    async fn fill(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        self.uart.read_exact(buf).await.map_err(|e| match e {
            ReadExactError::UnexpectedEof => SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "read frame",
                details: "UART closed mid-frame",
            },
            ReadExactError::Other(e) => {
                error!("PMS5003 UART read failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: SENSOR_NAME,
                    operation: "read frame",
                    details: "UART receive error",
                }
            }
        })
    }

    /// Consume bytes until the two start characters have been read.
    async fn sync(&mut self) -> Result<(), SensorError> {
        let mut skipped = 0;
        let mut previous = self.read_byte().await?;
        loop {
            let current = self.read_byte().await?;
            if previous == START_1 && current == START_2 {
                if skipped > 0 {
                    debug!("PMS5003: resynchronised after {} bytes", skipped);
                }
                return Ok(());
            }

            skipped += 1;
            if skipped > RESYNC_SCAN_LIMIT {
                warn!("PMS5003: no start sequence in {} bytes", skipped);
                return Err(SensorError::InvalidFrame {
                    sensor: SENSOR_NAME,
                    details: "no start sequence found",
                });
            }
            previous = current;
        }
    }

    /// Read the next complete, checksummed frame from the stream.
    pub async fn read_frame(&mut self) -> Result<Pms5003Frame, SensorError> {
        self.sync().await?;

        let mut frame = [0u8; FRAME_LEN];
        frame[0] = START_1;
        frame[1] = START_2;
        self.fill(&mut frame[2..]).await?;

        Pms5003Frame::parse(&frame)
    }
}

impl<U: Read> Sensor for Pms5003Sensor<U> {
    type Readings = Pms5003Readings;

    async fn read(&mut self) -> Result<Pms5003Readings, SensorError> {
        let frame = self.read_frame().await.inspect_err(|e| {
            error!("PMS5003 frame read failed: {}", e);
        })?;

        Ok(Pms5003Readings {
            pm2_5_ugm3: frame.pm2_5 as i32,
        })
    }
}
