use core::fmt::{self, Display};

/// Identifier authority component of a SID (6-byte big-endian value).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SidIdentifierAuthority {
    /// Raw big-endian bytes.
    pub value: [u8; 6],
}

impl SidIdentifierAuthority {
    /// `S-1-0`: null authority.
    pub const NULL_AUTHORITY: Self = Self::from_u8(0);
    /// `S-1-1`: world authority (`Everyone`).
    pub const WORLD_AUTHORITY: Self = Self::from_u8(1);
    /// `S-1-5`: NT authority, the issuer of user and group SIDs.
    pub const NT_AUTHORITY: Self = Self::from_u8(5);

    const fn from_u8(last: u8) -> Self {
        Self {
            value: [0, 0, 0, 0, 0, last],
        }
    }

    /// Numeric value of the authority.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        let [a, b, c, d, e, f] = self.value;
        u64::from_be_bytes([0, 0, a, b, c, d, e, f])
    }
}

impl Display for SidIdentifierAuthority {
    /// Decimal when the value fits in 32 bits, hexadecimal otherwise.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.as_u64();
        if value <= 0xFFFF_FFFF {
            write!(f, "{value}")
        } else {
            write!(f, "0x{value:X}")
        }
    }
}

impl From<[u8; 6]> for SidIdentifierAuthority {
    #[inline]
    fn from(value: [u8; 6]) -> Self {
        Self { value }
    }
}

impl From<SidIdentifierAuthority> for [u8; 6] {
    #[inline]
    fn from(value: SidIdentifierAuthority) -> Self {
        value.value
    }
}
