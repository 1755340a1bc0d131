//! Textual SID parsing shared by `upn-endpoint-identity`.
//!
//! Do not depend on this crate directly, use `upn-endpoint-identity` instead.
use core::fmt::{self, Display};
use core::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Minimum number of sub-authorities in a valid SID.
pub const MIN_SUBAUTHORITY_COUNT: u8 = 1;
/// Maximum number of sub-authorities in a valid SID.
pub const MAX_SUBAUTHORITY_COUNT: u8 = 15;

/// Largest identifier authority representable on 6 bytes.
const MAX_IDENTIFIER_AUTHORITY: u64 = 0xFFFF_FFFF_FFFF;

/// Components of a SID as read from its `S-R-A-S1-S2-...` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidComponents {
    /// The SID revision value, generally 1.
    pub revision: u8,
    /// The identifier authority, big-endian.
    pub identifier_authority: [u8; 6],
    /// The sub-authority values.
    pub sub_authority: ArrayVec<u32, 15>,
}

/// Error type returned when a SID string or buffer is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct InvalidSidFormat;

impl Display for InvalidSidFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid format for Sid")
    }
}

/// Parses an identifier authority, either decimal or `0x`-prefixed hexadecimal.
fn parse_identifier_authority(s: &str) -> Result<[u8; 6], InvalidSidFormat> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|_| InvalidSidFormat)?;
    if value > MAX_IDENTIFIER_AUTHORITY {
        return Err(InvalidSidFormat);
    }
    let [_, _, rest @ ..] = value.to_be_bytes();
    Ok(rest)
}

impl FromStr for SidComponents {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut s_cmp = s.split('-');
        if !s_cmp
            .next()
            .is_some_and(|head| head.eq_ignore_ascii_case("s"))
        {
            return Err(InvalidSidFormat);
        }
        let revision = s_cmp
            .next()
            .ok_or(InvalidSidFormat)?
            .parse::<u8>()
            .map_err(|_| InvalidSidFormat)?;

        let identifier_authority =
            parse_identifier_authority(s_cmp.next().ok_or(InvalidSidFormat)?)?;

        let mut sub_authority = ArrayVec::<u32, 15>::new();
        for item in s_cmp {
            let item = item.parse::<u32>().map_err(|_| InvalidSidFormat)?;
            sub_authority.try_push(item).map_err(|_| InvalidSidFormat)?;
        }
        if sub_authority.len() < usize::from(MIN_SUBAUTHORITY_COUNT) {
            return Err(InvalidSidFormat);
        }

        Ok(Self {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_administrators() {
        let parsed: Result<SidComponents, _> = "S-1-5-32-544".parse();
        assert_eq!(
            parsed.map(|c| (c.revision, c.identifier_authority, c.sub_authority.to_vec())),
            Ok((1, [0, 0, 0, 0, 0, 5], vec![32, 544]))
        );
    }

    #[test]
    fn accepts_hex_authority() {
        let parsed: Result<SidComponents, _> = "s-1-0x1000000000-7".parse();
        assert_eq!(
            parsed.map(|c| c.identifier_authority),
            Ok([0, 0x10, 0, 0, 0, 0])
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "X-1-5-32",
            "S-1",
            "S-1-5",
            "S-abc-5-1",
            "S-1-5-x",
            "S-1-281474976710656-1",
            "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15-16",
        ] {
            assert_eq!(
                input.parse::<SidComponents>(),
                Err(InvalidSidFormat),
                "input {input:?} should be rejected"
            );
        }
    }
}
