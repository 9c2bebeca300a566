use std::fmt;
use std::path::Path;

use crate::address::Address;

/// Abstracts opening a bus device node.
///
/// Implementors define how a bus reference (e.g. `/dev/i2c-1`) becomes an
/// open [`Bus`]. The factory holds no per-bus state; each call to
/// [`open`](Self::open) yields an independent handle.
pub trait BusFactory {
    /// The open bus handle.
    type Bus: Bus<Error = Self::Error>;
    /// Error type shared by the factory and its buses.
    type Error: fmt::Debug + fmt::Display;

    /// Open the named node for reading and writing.
    fn open(&self, path: &Path) -> Result<Self::Bus, Self::Error>;
}

/// An open handle on one bus adapter.
///
/// Each `write`/`read` is one START, addressed transfer of up to the buffer
/// length, STOP. Short transfers are returned as-is.
pub trait Bus {
    /// Error type for addressing, transfer and close failures.
    type Error: fmt::Debug + fmt::Display;

    /// Bind subsequent transfers to `addr`, overriding any kernel driver
    /// that has already claimed it.
    fn set_target(&mut self, addr: Address) -> Result<(), Self::Error>;

    /// Write `bytes`, returning how many the adapter accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;

    /// Read into `buf`, returning how many bytes were filled.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Close the handle.
    fn close(self) -> Result<(), Self::Error>;
}
