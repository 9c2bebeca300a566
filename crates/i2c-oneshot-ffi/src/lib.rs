//! C ABI over [`i2c_oneshot`].
//!
//! Each function returns a non-negative byte count on success and `-1` on
//! any failure. Null pointers and zero lengths are rejected before the bus
//! is opened. Diagnostics go to stderr through `tracing`; set `RUST_LOG` to
//! change what is shown (the default is `warn`).
//!
//! The declarations are in `include/i2c_oneshot.h`.

use std::ffi::{c_char, c_int, c_uint, CStr, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::slice;

use i2c_oneshot::{BusFactory, Client, Op, Stop};
use once_cell::sync::OnceCell;
use tracing::error;
use tracing_subscriber::EnvFilter;

const FAILURE: c_int = -1;

static DIAGNOSTICS: OnceCell<()> = OnceCell::new();

/// Route `tracing` events to stderr unless the host already installed a
/// subscriber.
fn init_diagnostics() {
    DIAGNOSTICS.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

fn invalid(op: Op) -> c_int {
    error!(%op, "{op}: invalid parameters");
    FAILURE
}

/// Lengths come in as `c_uint` and transfers never exceed them, and the
/// kernel caps one transfer at 8192 bytes, so a count always fits.
fn count(n: usize) -> c_int {
    debug_assert!(n <= c_int::MAX as usize, "byte count {n} overflows c_int");
    c_int::try_from(n).unwrap_or(c_int::MAX)
}

/// # Safety
///
/// `bus` must be null or a valid NUL-terminated string.
unsafe fn bus_path<'a>(bus: *const c_char) -> &'a Path {
    Path::new(OsStr::from_bytes(CStr::from_ptr(bus).to_bytes()))
}

/// # Safety
///
/// Non-null pointers must be valid for their stated lengths.
pub unsafe fn write_with<F: BusFactory>(
    client: &Client<F>,
    bus: *const c_char,
    addr: u8,
    w: *const u8,
    wlen: c_uint,
) -> c_int {
    if bus.is_null() || w.is_null() || wlen == 0 {
        return invalid(Op::Write);
    }
    let w = slice::from_raw_parts(w, wlen as usize);
    match client.write(bus_path(bus), addr, w) {
        Ok(n) => count(n),
        Err(_) => FAILURE,
    }
}

/// # Safety
///
/// Non-null pointers must be valid for their stated lengths.
pub unsafe fn read_with<F: BusFactory>(
    client: &Client<F>,
    bus: *const c_char,
    addr: u8,
    r: *mut u8,
    rlen: c_uint,
) -> c_int {
    if bus.is_null() || r.is_null() || rlen == 0 {
        return invalid(Op::Read);
    }
    let r = slice::from_raw_parts_mut(r, rlen as usize);
    match client.read(bus_path(bus), addr, r) {
        Ok(n) => count(n),
        Err(_) => FAILURE,
    }
}

/// # Safety
///
/// Non-null pointers must be valid for their stated lengths, and `w` and
/// `r` must not overlap.
#[allow(clippy::too_many_arguments)]
pub unsafe fn write_read_with<F: BusFactory>(
    client: &Client<F>,
    bus: *const c_char,
    addr: u8,
    w: *const u8,
    wlen: c_uint,
    r: *mut u8,
    rlen: c_uint,
    stop: u8,
) -> c_int {
    let op = Op::WriteRead;
    if bus.is_null() || w.is_null() || wlen == 0 || r.is_null() || rlen == 0
    {
        return invalid(op);
    }
    let Ok(stop) = Stop::try_from(stop) else {
        error!(%op, "{op}: unrecognized stop flag {stop}");
        return FAILURE;
    };
    let w = slice::from_raw_parts(w, wlen as usize);
    let r = slice::from_raw_parts_mut(r, rlen as usize);
    match client.write_read(bus_path(bus), addr, w, r, stop) {
        Ok(n) => count(n),
        Err(_) => FAILURE,
    }
}

#[cfg(target_os = "linux")]
mod exports {
    use std::ffi::{c_char, c_int, c_uint};

    use i2c_oneshot::linux::LinuxFactory;
    use i2c_oneshot::Client;

    use super::init_diagnostics;

    const CLIENT: Client<LinuxFactory> = Client::new(LinuxFactory);

    /// # Safety
    ///
    /// `bus` must be null or NUL-terminated; `w` must be null or point to
    /// `wlen` readable bytes.
    #[no_mangle]
    pub unsafe extern "C" fn i2c_oneshot_write(
        bus: *const c_char,
        addr: u8,
        w: *const u8,
        wlen: c_uint,
    ) -> c_int {
        init_diagnostics();
        super::write_with(&CLIENT, bus, addr, w, wlen)
    }

    /// # Safety
    ///
    /// `bus` must be null or NUL-terminated; `r` must be null or point to
    /// `rlen` writable bytes.
    #[no_mangle]
    pub unsafe extern "C" fn i2c_oneshot_read(
        bus: *const c_char,
        addr: u8,
        r: *mut u8,
        rlen: c_uint,
    ) -> c_int {
        init_diagnostics();
        super::read_with(&CLIENT, bus, addr, r, rlen)
    }

    /// # Safety
    ///
    /// As for [`i2c_oneshot_write`] and [`i2c_oneshot_read`]; `w` and `r`
    /// must not overlap.
    #[no_mangle]
    pub unsafe extern "C" fn i2c_oneshot_write_read(
        bus: *const c_char,
        addr: u8,
        w: *const u8,
        wlen: c_uint,
        r: *mut u8,
        rlen: c_uint,
        stop: u8,
    ) -> c_int {
        init_diagnostics();
        super::write_read_with(&CLIENT, bus, addr, w, wlen, r, rlen, stop)
    }
}

#[cfg(target_os = "linux")]
pub use exports::{i2c_oneshot_read, i2c_oneshot_write, i2c_oneshot_write_read};

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ffi::CString;
    use std::fmt;
    use std::ptr;

    use i2c_oneshot::{Address, Bus};

    use super::*;

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("refused")
        }
    }

    /// Counts opens; the buses it hands out echo writes and fill reads.
    #[derive(Default)]
    struct Counting {
        opens: Cell<usize>,
        fail: bool,
    }

    struct Echo;

    impl BusFactory for Counting {
        type Bus = Echo;
        type Error = Refused;

        fn open(&self, _: &Path) -> Result<Echo, Refused> {
            self.opens.set(self.opens.get() + 1);
            if self.fail {
                return Err(Refused);
            }
            Ok(Echo)
        }
    }

    impl Bus for Echo {
        type Error = Refused;

        fn set_target(&mut self, _: Address) -> Result<(), Refused> {
            Ok(())
        }

        fn write(&mut self, bytes: &[u8]) -> Result<usize, Refused> {
            Ok(bytes.len())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Refused> {
            buf.fill(0x5A);
            Ok(buf.len())
        }

        fn close(self) -> Result<(), Refused> {
            Ok(())
        }
    }

    fn bus() -> CString {
        CString::new("/dev/i2c-0").unwrap()
    }

    #[test]
    fn null_pointers_fail_without_opening() {
        let client = Client::new(Counting::default());
        let bus = bus();
        let w = [0u8; 2];
        let mut r = [0u8; 2];

        unsafe {
            assert_eq!(
                write_with(&client, ptr::null(), 0x50, w.as_ptr(), 2),
                -1
            );
            assert_eq!(
                write_with(&client, bus.as_ptr(), 0x50, ptr::null(), 2),
                -1
            );
            assert_eq!(
                read_with(&client, bus.as_ptr(), 0x50, ptr::null_mut(), 2),
                -1
            );
            assert_eq!(
                write_read_with(
                    &client,
                    bus.as_ptr(),
                    0x50,
                    w.as_ptr(),
                    2,
                    ptr::null_mut(),
                    2,
                    1
                ),
                -1
            );
            assert_eq!(
                read_with(&client, bus.as_ptr(), 0x50, r.as_mut_ptr(), 0),
                -1
            );
        }
        assert_eq!(client.factory().opens.get(), 0);
    }

    #[test]
    fn zero_length_fails_without_opening() {
        let client = Client::new(Counting::default());
        let bus = bus();
        let w = [0u8; 1];

        let rc =
            unsafe { write_with(&client, bus.as_ptr(), 0x50, w.as_ptr(), 0) };

        assert_eq!(rc, -1);
        assert_eq!(client.factory().opens.get(), 0);
    }

    #[test]
    fn stop_flags() {
        let client = Client::new(Counting::default());
        let bus = bus();
        let w = [0x00u8];
        let mut r = [0u8; 6];
        let call = |stop, r: &mut [u8; 6]| unsafe {
            write_read_with(
                &client,
                bus.as_ptr(),
                0x68,
                w.as_ptr(),
                1,
                r.as_mut_ptr(),
                6,
                stop,
            )
        };

        assert_eq!(call(0, &mut r), -1);
        assert_eq!(call(2, &mut r), -1);
        assert_eq!(client.factory().opens.get(), 0);

        assert_eq!(call(1, &mut r), 6);
        assert_eq!(r, [0x5A; 6]);
        assert_eq!(client.factory().opens.get(), 1);
    }

    #[test]
    fn success_returns_byte_count() {
        let client = Client::new(Counting::default());
        let bus = bus();
        let w = [0x00u8, 0x10];

        let rc =
            unsafe { write_with(&client, bus.as_ptr(), 0x50, w.as_ptr(), 2) };

        assert_eq!(rc, 2);
    }

    #[test]
    fn counts_pass_through() {
        assert_eq!(count(0), 0);
        assert_eq!(count(8192), 8192);
        assert_eq!(count(c_int::MAX as usize), c_int::MAX);
    }

    #[test]
    fn open_failure_is_sentinel() {
        let client = Client::new(Counting { fail: true, ..Counting::default() });
        let bus = bus();
        let mut r = [0u8; 4];

        let rc =
            unsafe { read_with(&client, bus.as_ptr(), 0x50, r.as_mut_ptr(), 4) };

        assert_eq!(rc, -1);
        assert_eq!(client.factory().opens.get(), 1);
    }
}
