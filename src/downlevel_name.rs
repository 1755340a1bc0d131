//! Downlevel (`DOMAIN\user`) account names.
//!
//! - `DownlevelName` stores both parts as `String`.
//! - `Display` prints as `DOMAIN\user`.
//! - `FromStr` requires exactly one `\` and a non-empty user. The domain may
//!   be empty (`\alice`), as Windows reports for some local accounts.

use core::{
    fmt::{self, Display},
    str::FromStr,
};

use thiserror::Error;

/// Parsing errors for `DOMAIN\user`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownlevelNameError {
    /// Input did not contain a `\` separator.
    #[error("Missing '\\' separator")]
    MissingSeparator,

    /// Input contained more than one `\` separator.
    #[error("Too many '\\' separators")]
    TooManySeparators,

    /// Right part is empty.
    #[error("User is empty")]
    EmptyUser,
}

/// A `DOMAIN\user` account name, the form Windows reports for a logon identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DownlevelName {
    /// The domain part (before the `\`).
    pub domain: String,
    /// The user part (after the `\`).
    pub user: String,
}

impl DownlevelName {
    /// Non-validating constructor (domain, then user).
    #[inline]
    pub fn new<D: Into<String>, U: Into<String>>(domain: D, user: U) -> Self {
        Self {
            domain: domain.into(),
            user: user.into(),
        }
    }
}

impl Display for DownlevelName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.domain, self.user)
    }
}

impl FromStr for DownlevelName {
    type Err = DownlevelNameError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, user) = s
            .split_once('\\')
            .ok_or(DownlevelNameError::MissingSeparator)?;
        if user.contains('\\') {
            return Err(DownlevelNameError::TooManySeparators);
        }
        if user.is_empty() {
            return Err(DownlevelNameError::EmptyUser);
        }
        Ok(Self::new(domain, user))
    }
}
