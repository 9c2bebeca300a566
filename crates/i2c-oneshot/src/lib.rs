//! Stateless one-shot transactions against I2C bus adapters.
//!
//! Every operation is self-contained: the bus device node is opened, bound
//! to the peripheral address, used for a single transfer (or a write phase
//! followed by a read phase), and closed again before the call returns. No
//! handle outlives the call, so there is nothing to share, cache or leak.
//!
//! ```no_run
//! # fn main() -> Result<(), i2c_oneshot::Error<std::io::Error>> {
//! use i2c_oneshot::Stop;
//!
//! let mut buf = [0u8; 6];
//! let n = i2c_oneshot::write_read("/dev/i2c-1", 0x68, &[0x00], &mut buf, Stop::Between)?;
//! assert_eq!(n, buf.len());
//! # Ok(())
//! # }
//! ```
//!
//! Callers that issue operations against the same bus from several threads
//! must serialize them: the address selected on a handle is per handle, but
//! the physical bus is shared and no coordination happens here.

mod address;
mod client;
mod error;
mod factory;
mod handle;
pub mod hal;
#[cfg(target_os = "linux")]
pub mod linux;

pub use address::Address;
pub use client::{bus_path, Client, Stop};
pub use error::{Error, ErrorKind, Op, Phase, TransferFailure};
pub use factory::{Bus, BusFactory};
pub use handle::BusHandle;

#[cfg(target_os = "linux")]
mod os {
    use std::io;
    use std::path::Path;

    use crate::linux::LinuxFactory;
    use crate::{Client, Error, Stop};

    const CLIENT: Client<LinuxFactory> = Client::new(LinuxFactory);

    /// Write `w` to the device at `addr` on `bus`.
    ///
    /// Returns the number of bytes the adapter accepted, which may be fewer
    /// than `w.len()`.
    pub fn write(
        bus: impl AsRef<Path>,
        addr: u8,
        w: &[u8],
    ) -> Result<usize, Error<io::Error>> {
        CLIENT.write(bus, addr, w)
    }

    /// Read up to `r.len()` bytes from the device at `addr` on `bus`.
    pub fn read(
        bus: impl AsRef<Path>,
        addr: u8,
        r: &mut [u8],
    ) -> Result<usize, Error<io::Error>> {
        CLIENT.read(bus, addr, r)
    }

    /// Write `w` then fill `r` from the device at `addr` on `bus`.
    ///
    /// Both phases must complete in full. [`Stop::RepeatedStart`] is
    /// rejected without touching the bus.
    pub fn write_read(
        bus: impl AsRef<Path>,
        addr: u8,
        w: &[u8],
        r: &mut [u8],
        stop: Stop,
    ) -> Result<usize, Error<io::Error>> {
        CLIENT.write_read(bus, addr, w, r, stop)
    }
}

#[cfg(target_os = "linux")]
pub use os::{read, write, write_read};
