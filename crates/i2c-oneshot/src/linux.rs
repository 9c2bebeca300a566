//! Linux `i2c-dev` backend.
//!
//! One bus adapter is exposed per `/dev/i2c-N` node. Plain `read(2)` and
//! `write(2)` on the node each run one START/transfer/STOP against the
//! address last selected with the `I2C_SLAVE*` ioctls. The kernel caps a
//! single transfer at 8192 bytes and rejects larger ones with `EINVAL`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, IntoRawFd};
use std::path::Path;

use crate::address::Address;
use crate::factory::{Bus, BusFactory};

/// Select the target address even if a kernel driver has claimed it.
const I2C_SLAVE_FORCE: u32 = 0x0706;

nix::ioctl_write_int_bad!(i2c_slave_force, I2C_SLAVE_FORCE);

/// Opens `/dev/i2c-N` nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinuxFactory;

/// An open `i2c-dev` node.
#[derive(Debug)]
pub struct LinuxBus {
    file: File,
}

impl BusFactory for LinuxFactory {
    type Bus = LinuxBus;
    type Error = io::Error;

    fn open(&self, path: &Path) -> io::Result<LinuxBus> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(LinuxBus { file })
    }
}

impl Bus for LinuxBus {
    type Error = io::Error;

    /// Uses `I2C_SLAVE_FORCE` rather than `I2C_SLAVE`, so devices already
    /// bound to an in-kernel driver stay reachable. Making sure that driver
    /// is not using the device at the same time is up to the caller.
    fn set_target(&mut self, addr: Address) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `self.file` and stays open for
        // the duration of the call; the request takes its argument by value.
        unsafe { i2c_slave_force(self.file.as_raw_fd(), addr.get().into()) }
            .map(drop)
            .map_err(io::Error::from)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.file.write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn close(self) -> io::Result<()> {
        // `File`'s own drop swallows close errors.
        nix::unistd::close(self.file.into_raw_fd()).map_err(io::Error::from)
    }
}
