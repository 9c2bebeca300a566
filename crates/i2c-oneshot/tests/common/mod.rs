#![allow(dead_code)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use i2c_oneshot::{Address, Bus, BusFactory};

// ---------------------------------------------------------------------------
// Recording fake bus
// ---------------------------------------------------------------------------

/// Every primitive the client invokes, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(PathBuf),
    SetTarget(u8),
    Write(Vec<u8>),
    Read(usize),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub &'static str);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub enum OnWrite {
    /// Accept everything and remember it for `OnRead::Loopback`.
    #[default]
    All,
    /// Accept at most this many bytes.
    Count(usize),
    Fail,
}

#[derive(Debug, Clone, Default)]
pub enum OnRead {
    /// Fill the buffer with `0xA5`.
    #[default]
    All,
    /// Copy these bytes (truncated to the buffer) and report their count.
    Data(Vec<u8>),
    /// Echo the bytes of the last accepted write.
    Loopback,
    Fail,
}

/// How the fake bus behaves for the next operation.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub fail_open: bool,
    pub fail_target: bool,
    pub fail_close: bool,
    pub on_write: OnWrite,
    pub on_read: OnRead,
}

#[derive(Clone, Default)]
pub struct MockFactory {
    pub trace: Arc<Mutex<Vec<Call>>>,
    pub script: Arc<Mutex<Script>>,
    pub opens: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    loopback: Arc<Mutex<Vec<u8>>>,
}

pub struct MockBus {
    factory: MockFactory,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Script) -> Self {
        let factory = Self::default();
        factory.set_script(script);
        factory
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn trace(&self) -> Vec<Call> {
        self.trace.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.trace.lock().unwrap().push(call);
    }

    fn script(&self) -> Script {
        self.script.lock().unwrap().clone()
    }
}

impl BusFactory for MockFactory {
    type Bus = MockBus;
    type Error = MockError;

    fn open(&self, path: &Path) -> Result<MockBus, MockError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Open(path.to_path_buf()));
        if self.script().fail_open {
            return Err(MockError("no such device"));
        }
        Ok(MockBus { factory: self.clone() })
    }
}

impl Bus for MockBus {
    type Error = MockError;

    fn set_target(&mut self, addr: Address) -> Result<(), MockError> {
        self.factory.record(Call::SetTarget(addr.get()));
        if self.factory.script().fail_target {
            return Err(MockError("device or resource busy"));
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, MockError> {
        self.factory.record(Call::Write(bytes.to_vec()));
        match self.factory.script().on_write {
            OnWrite::All => {
                *self.factory.loopback.lock().unwrap() = bytes.to_vec();
                Ok(bytes.len())
            }
            OnWrite::Count(n) => Ok(n.min(bytes.len())),
            OnWrite::Fail => Err(MockError("remote I/O error")),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
        self.factory.record(Call::Read(buf.len()));
        let data = match self.factory.script().on_read {
            OnRead::All => vec![0xA5; buf.len()],
            OnRead::Data(data) => data,
            OnRead::Loopback => self.factory.loopback.lock().unwrap().clone(),
            OnRead::Fail => return Err(MockError("remote I/O error")),
        };
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn close(self) -> Result<(), MockError> {
        self.factory.closes.fetch_add(1, Ordering::SeqCst);
        self.factory.record(Call::Close);
        if self.factory.script().fail_close {
            return Err(MockError("bad file descriptor"));
        }
        Ok(())
    }
}
