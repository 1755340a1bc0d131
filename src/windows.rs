//! Win32 backends: process token handle, account lookups, Active Directory.

mod account_lookup;
mod directory;
mod error;
mod sid_type;
mod token;

pub use account_lookup::AccountLookup;
pub use directory::{WindowsDirectory, WindowsNameTranslator};
pub use sid_type::SidType;
pub use token::TokenError;

use token::WindowsIdentityHandle;

use crate::{ResolutionError, SecurityIdentifier, UpnIdentity};

impl UpnIdentity {
    /// Identity of the account running the current process.
    ///
    /// The process token is held until
    /// [`ensure_identity_claim`](UpnIdentity::ensure_identity_claim) turns its
    /// account name into the UPN claim. [`upn_sid`](UpnIdentity::upn_sid) answers
    /// from the token right away.
    ///
    /// # Errors
    /// [`TokenError`] when the token cannot be opened or read.
    ///
    /// ```no_run
    /// # use upn_endpoint_identity::UpnIdentity;
    /// let identity = UpnIdentity::for_current_process()?;
    /// identity.ensure_identity_claim()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn for_current_process() -> Result<Self, TokenError> {
        let handle = WindowsIdentityHandle::current_process()?;
        Ok(Self::from_identity_handle(Box::new(handle)))
    }
}

/// Looks up the account a SID names on the local machine.
///
/// # Errors
/// The Win32 lookup failure.
#[inline]
pub fn lookup_account_sid(sid: &SecurityIdentifier) -> Result<AccountLookup, ResolutionError> {
    account_lookup::lookup_sid(sid)
}

/// Looks up an account by UPN or downlevel name on the local machine.
///
/// # Errors
/// The Win32 lookup failure.
#[inline]
pub fn lookup_account_name(account_name: &str) -> Result<AccountLookup, ResolutionError> {
    account_lookup::lookup_name(account_name)
}
