use std::ops::{Deref, DerefMut};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Op};
use crate::factory::{Bus, BusFactory};

/// RAII handle owning an open bus for the duration of one operation.
///
/// The bus is closed exactly once: by [`release`](Self::release) on the
/// success path, or by `Drop` when an error unwinds the operation early.
/// A failed close is logged and otherwise ignored, so it never changes the
/// result of the transfer that preceded it.
pub struct BusHandle<B: Bus> {
    bus: Option<B>,
    op: Op,
}

impl<B: Bus> BusHandle<B> {
    /// Open `path` through `factory`.
    pub fn acquire<F>(
        factory: &F,
        path: &Path,
        op: Op,
    ) -> Result<Self, Error<F::Error>>
    where
        F: BusFactory<Bus = B>,
    {
        debug!(%op, bus = %path.display(), "opening bus");
        match factory.open(path) {
            Ok(bus) => Ok(Self { bus: Some(bus), op }),
            Err(source) => Err(Error::HandleAcquisition {
                op,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Close the bus now. A close failure is logged, not returned: the
    /// transfer it follows has already completed.
    pub fn release(mut self) {
        self.close();
    }

    fn close(&mut self) {
        let Some(bus) = self.bus.take() else {
            return;
        };
        let op = self.op;
        debug!(%op, "closing bus");
        if let Err(err) = bus.close() {
            warn!(%op, "{op}: failed to close I2C bus: {err}");
        }
    }
}

impl<B: Bus> Deref for BusHandle<B> {
    type Target = B;

    #[inline]
    fn deref(&self) -> &B {
        match &self.bus {
            Some(bus) => bus,
            // Only `close` takes the bus, and it runs from release/drop.
            None => unreachable!(),
        }
    }
}

impl<B: Bus> DerefMut for BusHandle<B> {
    #[inline]
    fn deref_mut(&mut self) -> &mut B {
        match &mut self.bus {
            Some(bus) => bus,
            None => unreachable!(),
        }
    }
}

impl<B: Bus> Drop for BusHandle<B> {
    fn drop(&mut self) {
        self.close();
    }
}
