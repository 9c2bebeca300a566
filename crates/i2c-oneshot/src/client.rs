use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::address::Address;
use crate::error::{Error, Op, Phase, TransferFailure};
use crate::factory::{Bus, BusFactory};
use crate::handle::BusHandle;

/// Conventional device node for bus index `n`.
pub fn bus_path(n: u32) -> PathBuf {
    PathBuf::from(format!("/dev/i2c-{n}"))
}

/// Whether a STOP condition separates the phases of a write-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stop {
    /// STOP between the write and the read: two transactions on one handle.
    Between,
    /// Repeated START with no STOP in between. Not supported.
    RepeatedStart,
}

/// `1` is [`Stop::Between`], `0` is [`Stop::RepeatedStart`]; any other
/// value is returned as the error.
impl TryFrom<u8> for Stop {
    type Error = u8;

    fn try_from(flag: u8) -> Result<Self, u8> {
        match flag {
            0 => Ok(Self::RepeatedStart),
            1 => Ok(Self::Between),
            other => Err(other),
        }
    }
}

/// Runs one-shot operations through a [`BusFactory`].
///
/// Each call opens the bus, selects the target, transfers, and closes the
/// bus again on every return path. The client keeps no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Client<F> {
    factory: F,
}

impl<F: BusFactory> Client<F> {
    pub const fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Write `w` to `addr`.
    ///
    /// Returns the number of bytes the adapter accepted, which may be less
    /// than `w.len()`. Zero accepted bytes is a failure.
    pub fn write(
        &self,
        bus: impl AsRef<Path>,
        addr: u8,
        w: &[u8],
    ) -> Result<usize, Error<F::Error>> {
        let bus = bus.as_ref();
        let op = Op::Write;
        self.run_write(bus, addr, w)
            .inspect_err(|err| report(bus, addr, err, op))
    }

    /// Read up to `r.len()` bytes from `addr`.
    ///
    /// Returns the number of bytes filled, which may be less than
    /// `r.len()`. Bytes past that count are left untouched.
    pub fn read(
        &self,
        bus: impl AsRef<Path>,
        addr: u8,
        r: &mut [u8],
    ) -> Result<usize, Error<F::Error>> {
        let bus = bus.as_ref();
        let op = Op::Read;
        self.run_read(bus, addr, r)
            .inspect_err(|err| report(bus, addr, err, op))
    }

    /// Write `w` to `addr`, then fill `r` from it, on a single open handle.
    ///
    /// Unlike [`write`](Self::write) and [`read`](Self::read), both phases
    /// must move their full length; anything less is
    /// [`Error::ShortTransfer`]. If the write phase comes up short the read
    /// phase is never attempted.
    ///
    /// [`Stop::RepeatedStart`] fails with [`Error::Unsupported`] before the
    /// bus is opened. It is never emulated with two STOP-separated
    /// transactions.
    pub fn write_read(
        &self,
        bus: impl AsRef<Path>,
        addr: u8,
        w: &[u8],
        r: &mut [u8],
        stop: Stop,
    ) -> Result<usize, Error<F::Error>> {
        let bus = bus.as_ref();
        let op = Op::WriteRead;
        self.run_write_read(bus, addr, w, r, stop)
            .inspect_err(|err| report(bus, addr, err, op))
    }

    fn run_write(
        &self,
        bus: &Path,
        addr: u8,
        w: &[u8],
    ) -> Result<usize, Error<F::Error>> {
        let op = Op::Write;
        non_empty(op, w, "empty write buffer")?;
        let addr = address(op, addr)?;

        let mut handle = self.open_targeted(bus, addr, op)?;
        let n = write_phase(&mut *handle, w, op)?;
        handle.release();
        Ok(n)
    }

    fn run_read(
        &self,
        bus: &Path,
        addr: u8,
        r: &mut [u8],
    ) -> Result<usize, Error<F::Error>> {
        let op = Op::Read;
        non_empty(op, r, "empty read buffer")?;
        let addr = address(op, addr)?;

        let mut handle = self.open_targeted(bus, addr, op)?;
        let n = read_phase(&mut *handle, r, op)?;
        handle.release();
        Ok(n)
    }

    fn run_write_read(
        &self,
        bus: &Path,
        addr: u8,
        w: &[u8],
        r: &mut [u8],
        stop: Stop,
    ) -> Result<usize, Error<F::Error>> {
        let op = Op::WriteRead;
        non_empty(op, w, "empty write buffer")?;
        non_empty(op, r, "empty read buffer")?;
        let addr = address(op, addr)?;
        if stop == Stop::RepeatedStart {
            return Err(Error::Unsupported { op });
        }

        let mut handle = self.open_targeted(bus, addr, op)?;

        let wrote = write_phase(&mut *handle, w, op)?;
        full(op, Phase::Write, w.len(), wrote)?;

        let read = read_phase(&mut *handle, r, op)?;
        full(op, Phase::Read, r.len(), read)?;

        handle.release();
        Ok(read)
    }

    /// Open the bus and bind it to `addr`. The handle is closed by `Drop`
    /// if addressing fails.
    fn open_targeted(
        &self,
        bus: &Path,
        addr: Address,
        op: Op,
    ) -> Result<BusHandle<F::Bus>, Error<F::Error>> {
        let mut handle = BusHandle::acquire(&self.factory, bus, op)?;
        debug!(%op, %addr, "selecting target");
        handle
            .set_target(addr)
            .map_err(|source| Error::Addressing { op, addr, source })?;
        Ok(handle)
    }
}

fn write_phase<B: Bus>(
    bus: &mut B,
    w: &[u8],
    op: Op,
) -> Result<usize, Error<B::Error>> {
    let phase = Phase::Write;
    let n = bus.write(w).map_err(|e| transfer(op, phase, e))?;
    debug!(%op, requested = w.len(), wrote = n, "write phase done");
    if n == 0 {
        return Err(nothing_moved(op, phase));
    }
    Ok(n)
}

fn read_phase<B: Bus>(
    bus: &mut B,
    r: &mut [u8],
    op: Op,
) -> Result<usize, Error<B::Error>> {
    let phase = Phase::Read;
    let n = bus.read(r).map_err(|e| transfer(op, phase, e))?;
    debug!(%op, requested = r.len(), read = n, "read phase done");
    if n == 0 {
        return Err(nothing_moved(op, phase));
    }
    debug_assert!(n <= r.len(), "bus reported more bytes than requested");
    Ok(n)
}

pub(crate) fn full<E>(
    op: Op,
    phase: Phase,
    requested: usize,
    moved: usize,
) -> Result<(), Error<E>> {
    if moved < requested {
        return Err(Error::ShortTransfer { op, phase, requested, moved });
    }
    Ok(())
}

fn non_empty<E>(
    op: Op,
    buf: &[u8],
    reason: &'static str,
) -> Result<(), Error<E>> {
    if buf.is_empty() {
        return Err(Error::InvalidArgument { op, reason });
    }
    Ok(())
}

fn address<E>(op: Op, addr: u8) -> Result<Address, Error<E>> {
    Address::new(addr).map_err(|_| Error::InvalidArgument {
        op,
        reason: "address exceeds 7 bits",
    })
}

fn transfer<E>(op: Op, phase: Phase, source: E) -> Error<E> {
    Error::Transfer { op, phase, cause: TransferFailure::Bus(source) }
}

fn nothing_moved<E>(op: Op, phase: Phase) -> Error<E> {
    Error::Transfer { op, phase, cause: TransferFailure::NothingMoved }
}

/// Emit the one-line diagnostic for a failed operation.
pub(crate) fn report<E: std::fmt::Display>(
    bus: &Path,
    addr: u8,
    err: &Error<E>,
    op: Op,
) {
    error!(
        %op,
        phase = %err.phase().map_or("none", Phase::as_str),
        kind = %err.kind(),
        bus = %bus.display(),
        addr = %format_args!("0x{addr:02X}"),
        "{err}"
    );
}
