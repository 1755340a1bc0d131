use core::fmt::{self, Debug, Display};
use core::str::FromStr;

use arrayvec::ArrayVec;
use delegate::delegate;
use parsing::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT, SidComponents};

pub use parsing::InvalidSidFormat;

use crate::SidIdentifierAuthority;

/// Size of the fixed header: revision, count and 6-byte authority.
const SID_HEAD_SIZE: usize = 8;

/// Owned Windows **Security Identifier** (SID).
///
/// A SID is a revision, a 6-byte identifier authority and 1..=15 32-bit
/// sub-authorities. The binary form produced by [`SecurityIdentifier::to_bytes`]
/// matches the Windows in-memory `SID` layout, so it can be handed to Win32
/// APIs or compared against buffers they return.
///
/// # Examples
/// ```rust
/// # use upn_endpoint_identity::{SecurityIdentifier, SidIdentifierAuthority};
/// let sid = SecurityIdentifier::try_new(
///     SidIdentifierAuthority::NT_AUTHORITY,
///     [32u32, 544u32],
/// ).expect("valid SID");
/// assert_eq!(sid.to_string(), "S-1-5-32-544");
/// assert_eq!("S-1-5-32-544".parse::<SecurityIdentifier>().ok(), Some(sid));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecurityIdentifier {
    revision: u8,
    identifier_authority: SidIdentifierAuthority,
    sub_authority: ArrayVec<u32, 15>,
}

impl SecurityIdentifier {
    /// The only SID revision Windows knows about.
    pub const REVISION: u8 = 1;

    /// Creates a new `SecurityIdentifier` from parts.
    ///
    /// Returns `None` if `sub_authority` length is out of bounds (not in 1..=15).
    #[must_use]
    #[inline]
    pub fn try_new<I: Into<SidIdentifierAuthority>, S: AsRef<[u32]>>(
        identifier_authority: I,
        sub_authority: S,
    ) -> Option<Self> {
        let sub_authority = sub_authority.as_ref();
        if !sub_authority_size_guard(sub_authority.len()) {
            return None;
        }
        let sub_authority = ArrayVec::try_from(sub_authority).ok()?;
        Some(Self {
            revision: Self::REVISION,
            identifier_authority: identifier_authority.into(),
            sub_authority,
        })
    }

    /// Parses the Windows binary layout of a SID.
    ///
    /// # Errors
    /// [`InvalidSidFormat`] if the revision is not 1, the sub-authority count is
    /// out of range, or the buffer length does not match the count.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidSidFormat> {
        let (head, tail) = bytes
            .split_first_chunk::<SID_HEAD_SIZE>()
            .ok_or(InvalidSidFormat)?;
        let [revision, count, authority @ ..] = *head;
        if revision != Self::REVISION || !sub_authority_size_guard(usize::from(count)) {
            return Err(InvalidSidFormat);
        }
        if tail.len() != usize::from(count) * 4 {
            return Err(InvalidSidFormat);
        }
        let sub_authority = tail
            .chunks_exact(4)
            .map(|chunk| <[u8; 4]>::try_from(chunk).map(u32::from_le_bytes))
            .collect::<Result<ArrayVec<u32, 15>, _>>()
            .map_err(|_| InvalidSidFormat)?;
        Ok(Self {
            revision,
            identifier_authority: SidIdentifierAuthority::from(authority),
            sub_authority,
        })
    }

    /// Returns the Windows binary layout of this SID.
    #[must_use]
    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.binary_len());
        bytes.push(self.revision);
        bytes.push(self.sub_authority_count());
        bytes.extend_from_slice(&self.identifier_authority.value);
        for sub in &self.sub_authority {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }
        bytes
    }

    /// Length in bytes of the binary layout.
    #[must_use]
    #[inline]
    pub fn binary_len(&self) -> usize {
        SID_HEAD_SIZE + self.sub_authority.len() * 4
    }

    /// The SID revision, always [`SecurityIdentifier::REVISION`].
    #[must_use]
    #[inline]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// The identifier authority.
    #[must_use]
    #[inline]
    pub const fn identifier_authority(&self) -> SidIdentifierAuthority {
        self.identifier_authority
    }

    /// The sub-authorities, 1..=15 values.
    #[must_use]
    #[inline]
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authority
    }

    /// Number of sub-authorities.
    #[must_use]
    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the count is bounded by the ArrayVec capacity (15)"
    )]
    pub fn sub_authority_count(&self) -> u8 {
        self.sub_authority.len() as u8
    }

    /// The last sub-authority, the relative identifier (RID) of account SIDs.
    #[must_use]
    #[inline]
    pub fn rid(&self) -> Option<u32> {
        self.sub_authority.last().copied()
    }
}

const fn sub_authority_size_guard(size: usize) -> bool {
    MIN_SUBAUTHORITY_COUNT as usize <= size && size <= MAX_SUBAUTHORITY_COUNT as usize
}

impl Debug for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", stringify!(SecurityIdentifier))
    }
}

impl Display for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision, self.identifier_authority)?;
        for sub_auth in &self.sub_authority {
            write!(f, "-{sub_auth}")?;
        }
        Ok(())
    }
}

impl FromStr for SecurityIdentifier {
    type Err = InvalidSidFormat;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = SidComponents::from_str(s)?;
        if components.revision != Self::REVISION {
            return Err(InvalidSidFormat);
        }
        Self::try_new(components.identifier_authority, components.sub_authority)
            .ok_or(InvalidSidFormat)
    }
}

impl TryFrom<&[u8]> for SecurityIdentifier {
    type Error = InvalidSidFormat;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl AsRef<[u32]> for SecurityIdentifier {
    delegate! {
        to self.sub_authority {
            #[inline]
            fn as_ref(&self) -> &[u32];
        }
    }
}
