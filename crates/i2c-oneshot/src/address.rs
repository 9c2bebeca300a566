use derive_more::Display;

/// A 7-bit I2C peripheral address.
///
/// Any value in `0x00..=0x7F` is accepted, including the ranges reserved by
/// the I2C specification; the kernel decides what to do with those. The
/// read/write direction bit is added by the adapter, never by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("0x{_0:02X}")]
pub struct Address(u8);

impl Address {
    /// Highest 7-bit address.
    pub const MAX: u8 = 0x7F;

    /// Returns the rejected value if it does not fit in 7 bits.
    pub const fn new(addr: u8) -> Result<Self, u8> {
        if addr <= Self::MAX {
            Ok(Self(addr))
        } else {
            Err(addr)
        }
    }

    /// The raw address value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// `0x00..=0x07` and `0x78..=0x7F` are reserved for special purposes.
    pub const fn is_reserved(self) -> bool {
        self.0 <= 0x07 || self.0 >= 0x78
    }
}

impl TryFrom<u8> for Address {
    type Error = u8;

    fn try_from(addr: u8) -> Result<Self, u8> {
        Self::new(addr)
    }
}

impl From<Address> for u8 {
    fn from(addr: Address) -> u8 {
        addr.0
    }
}
