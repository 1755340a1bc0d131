//! Host capabilities consumed by [`UpnIdentity`](crate::UpnIdentity).
//!
//! Domain-join detection, directory lookups and account translation are
//! supplied by the host. [`IdentityEnvironment::default`] picks the Win32
//! backends on Windows and the `Unsupported*` variants elsewhere; tests and
//! embedders inject their own through the `with_*` builders.

use core::fmt::{self, Debug};
use std::sync::Arc;

use cfg_if::cfg_if;

use crate::{DefaultFatalPolicy, FatalPolicy, ResolutionError, SecurityIdentifier};

/// Directory queries needed to turn a downlevel name into a UPN.
pub trait AccountDirectory: Send + Sync {
    /// Whether the host is joined to a domain.
    ///
    /// # Errors
    /// [`ResolutionError::Unsupported`] when the host cannot tell.
    fn is_joined_to_domain(&self) -> Result<bool, ResolutionError>;

    /// Fully-qualified UPN (`user@domain`) of a downlevel name (`DOMAIN\user`).
    ///
    /// # Errors
    /// Any directory failure, [`ResolutionError::Unsupported`] when the host
    /// has no directory.
    fn upn_from_downlevel_name(&self, downlevel_name: &str) -> Result<String, ResolutionError>;
}

/// Account name to security identifier translation.
pub trait NameTranslator: Send + Sync {
    /// Translates `account_name` (UPN or downlevel form) to its SID.
    ///
    /// # Errors
    /// Any translation failure.
    fn translate_to_sid(&self, account_name: &str) -> Result<SecurityIdentifier, ResolutionError>;
}

/// Privileged OS identity handed to an identity by trusted code only.
///
/// The handle is released when dropped.
pub(crate) trait IdentityHandle: Send {
    /// Display name in downlevel form (`DOMAIN\user`).
    fn display_name(&self) -> Result<String, ResolutionError>;

    /// SID of the identity, resolved when the handle was opened.
    fn user_sid(&self) -> Option<SecurityIdentifier>;
}

/// Directory of a host without domain support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedDirectory;

impl AccountDirectory for UnsupportedDirectory {
    #[inline]
    fn is_joined_to_domain(&self) -> Result<bool, ResolutionError> {
        Err(ResolutionError::unsupported("domain join detection"))
    }

    #[inline]
    fn upn_from_downlevel_name(&self, _downlevel_name: &str) -> Result<String, ResolutionError> {
        Err(ResolutionError::unsupported("directory name translation"))
    }
}

/// Translator of a host without account translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedTranslator;

impl NameTranslator for UnsupportedTranslator {
    #[inline]
    fn translate_to_sid(&self, _account_name: &str) -> Result<SecurityIdentifier, ResolutionError> {
        Err(ResolutionError::unsupported("account name translation"))
    }
}

cfg_if! {
    if #[cfg(windows)] {
        type PlatformDirectory = crate::windows::WindowsDirectory;
        type PlatformTranslator = crate::windows::WindowsNameTranslator;
    } else {
        type PlatformDirectory = UnsupportedDirectory;
        type PlatformTranslator = UnsupportedTranslator;
    }
}

/// Capabilities and policy used by an identity's lazy computations.
///
/// Cloning is cheap: every capability is shared.
///
/// ```rust
/// # use upn_endpoint_identity::{IdentityEnvironment, UnsupportedDirectory, ResolutionError};
/// let environment = IdentityEnvironment::default()
///     .with_directory(UnsupportedDirectory)
///     .with_fatal_policy(|error: &ResolutionError| matches!(error, ResolutionError::OutOfMemory));
/// # let _ = environment;
/// ```
#[derive(Clone)]
pub struct IdentityEnvironment {
    directory: Arc<dyn AccountDirectory>,
    translator: Arc<dyn NameTranslator>,
    fatal_policy: Arc<dyn FatalPolicy>,
}

impl IdentityEnvironment {
    /// Environment with explicit capabilities and the default fatal policy.
    #[inline]
    pub fn new(
        directory: impl AccountDirectory + 'static,
        translator: impl NameTranslator + 'static,
    ) -> Self {
        Self {
            directory: Arc::new(directory),
            translator: Arc::new(translator),
            fatal_policy: Arc::new(DefaultFatalPolicy),
        }
    }

    /// Environment where every host capability is unsupported.
    #[inline]
    #[must_use]
    pub fn unsupported() -> Self {
        Self::new(UnsupportedDirectory, UnsupportedTranslator)
    }

    /// Replaces the account directory.
    #[inline]
    #[must_use]
    pub fn with_directory(mut self, directory: impl AccountDirectory + 'static) -> Self {
        self.directory = Arc::new(directory);
        self
    }

    /// Replaces the name translator.
    #[inline]
    #[must_use]
    pub fn with_translator(mut self, translator: impl NameTranslator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    /// Replaces the fatal-error policy.
    #[inline]
    #[must_use]
    pub fn with_fatal_policy(mut self, policy: impl FatalPolicy + 'static) -> Self {
        self.fatal_policy = Arc::new(policy);
        self
    }

    pub(crate) fn directory(&self) -> &dyn AccountDirectory {
        self.directory.as_ref()
    }

    pub(crate) fn translator(&self) -> &dyn NameTranslator {
        self.translator.as_ref()
    }

    pub(crate) fn fatal_policy(&self) -> &dyn FatalPolicy {
        self.fatal_policy.as_ref()
    }
}

impl Default for IdentityEnvironment {
    /// Platform backends: Win32 on Windows, unsupported elsewhere.
    #[inline]
    fn default() -> Self {
        Self::new(PlatformDirectory::default(), PlatformTranslator::default())
    }
}

impl Debug for IdentityEnvironment {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(IdentityEnvironment))
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_unsupported_off_windows() {
        let environment = IdentityEnvironment::default();
        assert_eq!(
            environment.directory().is_joined_to_domain(),
            Err(ResolutionError::unsupported("domain join detection"))
        );
        assert!(matches!(
            environment.translator().translate_to_sid("alice@example.com"),
            Err(ResolutionError::Unsupported { .. })
        ));
        assert!(!environment.fatal_policy().is_fatal(&ResolutionError::NoneMapped));
    }
}
