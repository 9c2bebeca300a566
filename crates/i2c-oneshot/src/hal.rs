//! `embedded-hal` adapter.
//!
//! Lets drivers written against [`embedded_hal::i2c::I2c`] run on top of
//! one-shot operations. Every `read` and `write` opens the bus, transfers
//! and closes it again, and must move the whole buffer.
//!
//! Multi-operation transactions (which includes `write_read`) require
//! repeated START conditions and are rejected with [`Error::Unsupported`].
//!
//! Zero-length reads and writes are rejected with
//! [`Error::InvalidArgument`] without opening the bus, so the common
//! "empty write to see who ACKs" device probe does not work through this
//! adapter. An empty operation list succeeds without touching the bus.

use std::path::{Path, PathBuf};

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use crate::client::{full, report, Client};
use crate::error::{Error, Op, Phase};
use crate::factory::BusFactory;

/// An `embedded-hal` I2C bus bound to one device node.
///
/// Holds no open handle; the node is opened and closed per operation.
pub struct OneShotI2c<F> {
    client: Client<F>,
    bus: PathBuf,
}

impl<F: BusFactory> OneShotI2c<F> {
    /// Bind `factory` to the device node `bus`.
    pub fn new(factory: F, bus: impl Into<PathBuf>) -> Self {
        Self { client: Client::new(factory), bus: bus.into() }
    }

    /// The device node every operation opens.
    pub fn bus(&self) -> &Path {
        &self.bus
    }

    /// The underlying one-shot client.
    pub fn client(&self) -> &Client<F> {
        &self.client
    }
}

#[cfg(target_os = "linux")]
impl OneShotI2c<crate::linux::LinuxFactory> {
    /// Bind the Linux `i2c-dev` backend to `bus`.
    pub fn linux(bus: impl Into<PathBuf>) -> Self {
        Self::new(crate::linux::LinuxFactory, bus)
    }
}

impl<F: BusFactory> ErrorType for OneShotI2c<F> {
    type Error = Error<F::Error>;
}

impl<F: BusFactory> I2c<SevenBitAddress> for OneShotI2c<F> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        match operations {
            [] => Ok(()),
            [Operation::Write(bytes)] => {
                let n = self.client.write(&self.bus, address, bytes)?;
                full(Op::Write, Phase::Write, bytes.len(), n).inspect_err(
                    |err| report(&self.bus, address, err, Op::Write),
                )
            }
            [Operation::Read(buf)] => {
                let n = self.client.read(&self.bus, address, buf)?;
                full(Op::Read, Phase::Read, buf.len(), n).inspect_err(
                    |err| report(&self.bus, address, err, Op::Read),
                )
            }
            _ => {
                let err = Error::Unsupported { op: Op::Transaction };
                report(&self.bus, address, &err, Op::Transaction);
                Err(err)
            }
        }
    }
}
