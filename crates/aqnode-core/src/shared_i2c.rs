//! One async I2C bus, several drivers
//!
//! The SCD41 and SHT40 sit on the same bus. Each driver gets its own
//! [`SharedI2cDevice`] handle; a handle locks the bus for the duration of one
//! call and awaits the transfer while holding the lock, so transactions from
//! different drivers never interleave. A failed transfer is logged with the
//! device address before the error reaches the driver.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};
use log::warn;

/// Bus shared between [`SharedI2cDevice`] handles
pub type SharedI2cBus<T> = Mutex<CriticalSectionRawMutex, T>;

/// Handle to a [`SharedI2cBus`] that implements [`I2c`] itself
///
/// ```ignore
/// static I2C_BUS: StaticCell<SharedI2cBus<I2c<'static, Async>>> = StaticCell::new();
///
/// let bus = I2C_BUS.init(Mutex::new(i2c));
/// let scd41 = Scd41Sensor::new(SharedI2cDevice::new(bus));
/// let sht40 = Sht40Sensor::new(SharedI2cDevice::new(bus));
/// ```
pub struct SharedI2cDevice<'a, T> {
    bus: &'a SharedI2cBus<T>,
}

impl<'a, T> SharedI2cDevice<'a, T> {
    #[inline]
    pub const fn new(bus: &'a SharedI2cBus<T>) -> Self {
        Self { bus }
    }
}

impl<T> ErrorType for SharedI2cDevice<'_, T>
where
    T: ErrorType,
{
    type Error = T::Error;
}

impl<T> SharedI2cDevice<'_, T>
where
    T: I2c,
{
    /// Log a failed transfer with the device address; the error is passed
    /// through unchanged.
    fn logged(address: u8, operation: &str, result: Result<(), T::Error>) -> Result<(), T::Error> {
        result.inspect_err(|e| {
            warn!("I2C {} at {:#04x} failed: {:?}", operation, address, e);
        })
    }
}

impl<T> I2c for SharedI2cDevice<'_, T>
where
    T: I2c,
{
    async fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        let result = self.bus.lock().await.read(address, read).await;
        Self::logged(address, "read", result)
    }

    async fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        let result = self.bus.lock().await.write(address, write).await;
        Self::logged(address, "write", result)
    }

    async fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        let result = self.bus.lock().await.write_read(address, write, read).await;
        Self::logged(address, "write_read", result)
    }

    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.bus.lock().await.transaction(address, operations).await;
        Self::logged(address, "transaction", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, NoAcknowledgeSource};

    /// Records writes and answers reads with the target address; nothing
    /// answers at `absent`
    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
        absent: Option<u8>,
    }

    impl ErrorType for RecordingBus {
        type Error = ErrorKind;
    }

    impl I2c for RecordingBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.absent == Some(address) {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.fill(address),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn handles_share_one_bus() {
        let bus: SharedI2cBus<RecordingBus> = Mutex::new(RecordingBus::default());
        let mut co2 = SharedI2cDevice::new(&bus);
        let mut climate = SharedI2cDevice::new(&bus);

        block_on(async {
            co2.write(0x62, &[0x21, 0x9d]).await.unwrap();
            climate.write(0x44, &[0xfd]).await.unwrap();
        });

        let recorded = block_on(bus.lock());
        assert_eq!(recorded.writes.len(), 2);
        assert_eq!(recorded.writes[0], (0x62, alloc::vec![0x21, 0x9d]));
        assert_eq!(recorded.writes[1], (0x44, alloc::vec![0xfd]));
    }

    #[test]
    fn write_read_reaches_addressed_device() {
        let bus: SharedI2cBus<RecordingBus> = Mutex::new(RecordingBus::default());
        let mut device = SharedI2cDevice::new(&bus);

        let mut reply = [0u8; 3];
        block_on(device.write_read(0x44, &[0xfd], &mut reply)).unwrap();

        assert_eq!(reply, [0x44; 3]);
        assert_eq!(block_on(bus.lock()).writes, [(0x44, alloc::vec![0xfd])]);
    }

    #[test]
    fn bus_errors_reach_the_driver_unchanged() {
        let bus: SharedI2cBus<RecordingBus> = Mutex::new(RecordingBus {
            absent: Some(0x62),
            ..Default::default()
        });
        let mut co2 = SharedI2cDevice::new(&bus);
        let mut climate = SharedI2cDevice::new(&bus);

        let mut reply = [0u8; 2];
        assert_eq!(
            block_on(co2.write_read(0x62, &[0xec, 0x05], &mut reply)),
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert_eq!(reply, [0, 0]);

        // A failed transfer releases the bus for the next handle
        block_on(climate.write(0x44, &[0xfd])).unwrap();
        assert_eq!(block_on(bus.lock()).writes, [(0x44, alloc::vec![0xfd])]);
    }
}
