use std::fmt;
use std::path::PathBuf;

use derive_more::Display;

use crate::address::Address;

/// The public operation an error or diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Op {
    #[display("write")]
    Write,
    #[display("read")]
    Read,
    #[display("write-read")]
    WriteRead,
    /// A multi-operation `embedded-hal` transaction.
    #[display("transaction")]
    Transaction,
}

/// Direction of a single transfer within an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Phase {
    #[display("write data to")]
    Write,
    #[display("read data from")]
    Read,
}

/// Why a transfer moved nothing.
#[derive(Debug, Display)]
pub enum TransferFailure<E> {
    /// The adapter reported success but moved zero bytes.
    #[display("no bytes transferred")]
    NothingMoved,
    /// The adapter rejected the transfer.
    #[display("{_0}")]
    Bus(E),
}

/// Errors that can occur during a one-shot operation.
///
/// `E` is the backend error (for the Linux backend, [`std::io::Error`]).
/// The `Display` output is the one-line diagnostic naming the operation and
/// the phase that failed.
///
/// Close failures have no variant here; they are logged and never change
/// the outcome of an operation.
#[derive(Debug, Display)]
pub enum Error<E> {
    /// Empty buffer, out-of-range address or unrecognized mode. Detected
    /// before the bus is opened.
    #[display("{op}: invalid parameters ({reason})")]
    InvalidArgument { op: Op, reason: &'static str },
    /// Repeated-start (no STOP) composite transactions are not implemented.
    #[display("{op}: repeated-start (no STOP) transactions are not supported")]
    Unsupported { op: Op },
    /// The bus device node could not be opened.
    #[display("{op}: failed to open I2C bus {}: {source}", path.display())]
    HandleAcquisition { op: Op, path: PathBuf, source: E },
    /// The address-selection directive was rejected.
    #[display("{op}: failed to reach device {addr}: {source}")]
    Addressing { op: Op, addr: Address, source: E },
    /// A read or write moved nothing.
    #[display("{op}: failed to {phase} I2C bus: {cause}")]
    Transfer { op: Op, phase: Phase, cause: TransferFailure<E> },
    /// A write-read phase moved fewer bytes than requested.
    #[display(
        "{op}: incomplete {} (requested {requested}, got {moved})",
        phase.as_str()
    )]
    ShortTransfer { op: Op, phase: Phase, requested: usize, moved: usize },
}

impl Phase {
    /// Short name of the phase, as used in diagnostic fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Write => "write",
            Phase::Read => "read",
        }
    }
}

/// Fieldless view of [`Error`] for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// See [`Error::InvalidArgument`].
    InvalidArgument,
    /// See [`Error::Unsupported`].
    Unsupported,
    /// See [`Error::HandleAcquisition`].
    HandleAcquisitionFailed,
    /// See [`Error::Addressing`].
    AddressingFailed,
    /// See [`Error::Transfer`].
    TransferFailed,
    /// See [`Error::ShortTransfer`].
    ShortTransfer,
}

impl<E> Error<E> {
    /// The kind of failure, without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::HandleAcquisition { .. } => {
                ErrorKind::HandleAcquisitionFailed
            }
            Self::Addressing { .. } => ErrorKind::AddressingFailed,
            Self::Transfer { .. } => ErrorKind::TransferFailed,
            Self::ShortTransfer { .. } => ErrorKind::ShortTransfer,
        }
    }

    /// The operation that failed.
    pub fn op(&self) -> Op {
        match self {
            Self::InvalidArgument { op, .. }
            | Self::Unsupported { op }
            | Self::HandleAcquisition { op, .. }
            | Self::Addressing { op, .. }
            | Self::Transfer { op, .. }
            | Self::ShortTransfer { op, .. } => *op,
        }
    }

    /// The transfer phase that failed, for transfer and short-transfer
    /// errors.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Transfer { phase, .. } | Self::ShortTransfer { phase, .. } => {
                Some(*phase)
            }
            _ => None,
        }
    }

    /// The backend error behind this failure, if any.
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            Self::HandleAcquisition { source, .. }
            | Self::Addressing { source, .. }
            | Self::Transfer { cause: TransferFailure::Bus(source), .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.bus_error().map(|e| e as _)
    }
}

impl<E: fmt::Debug> embedded_hal::i2c::Error for Error<E> {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        embedded_hal::i2c::ErrorKind::Other
    }
}
