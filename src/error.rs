use thiserror::Error;

use crate::ClaimType;

/// Failures reported by the identity collaborators: the privileged handle,
/// the account directory and the name translator.
///
/// Whether a failure aborts the calling operation is decided by a
/// [`FatalPolicy`](crate::FatalPolicy), not by the variant alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// The host cannot perform the operation (no domain-join detection,
    /// no directory, no account translation).
    #[error("{operation} is not supported on this platform")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
    /// The host ran out of memory.
    #[error("not enough memory to complete the operation")]
    OutOfMemory,
    /// Process or runtime state is no longer trustworthy.
    #[error("execution state corrupted: {0}")]
    CorruptedState(String),
    /// A collaborator dereferenced a missing value.
    #[error("null reference while resolving the account")]
    NullReference,
    /// The account name is not mapped to any security identifier.
    #[error("no mapping between account names and security IDs was done")]
    NoneMapped,
    /// The caller is not allowed to query the account.
    #[error("access denied while resolving the account")]
    AccessDenied,
    /// The domain does not exist or could not be contacted.
    #[error("the specified domain either does not exist or could not be contacted")]
    NoSuchDomain,
    /// The directory has no trust relationship with the target domain.
    #[error("the trust relationship with the domain failed")]
    TrustFailure,
    /// The account name is syntactically invalid for the collaborator.
    #[error("invalid account name `{0}`")]
    InvalidName(String),
    /// Any other OS error code.
    #[error("operating system error {0}")]
    Os(u32),
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl ResolutionError {
    /// `Unsupported` for the given operation.
    #[inline]
    #[must_use]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }
}

/// Errors surfaced by [`UpnIdentity`](crate::UpnIdentity).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IdentityError {
    /// A required argument was absent.
    #[error("argument `{0}` must not be null")]
    ArgumentNull(&'static str),
    /// The claim passed to the constructor is not a UPN claim.
    #[error("claim type `{actual}` is not recognized for this identity, expected `{expected}`")]
    UnrecognizedClaimType {
        /// Type of the rejected claim.
        actual: ClaimType,
        /// Type the identity requires.
        expected: ClaimType,
    },
    /// The identity still waits for [`ensure_identity_claim`](crate::UpnIdentity::ensure_identity_claim).
    #[error("identity claim has not been materialized")]
    ClaimNotMaterialized,
    /// A collaborator failed with an error the fatal policy refuses to absorb.
    #[error("fatal error while resolving the identity: {0}")]
    Fatal(#[source] ResolutionError),
}

/// Errors of [`write_contents_to`](crate::EndpointIdentity::write_contents_to).
#[derive(Debug, Error)]
pub enum WriteError<E> {
    /// The identity must be materialized before it is written.
    #[error("identity claim has not been materialized")]
    ClaimNotMaterialized,
    /// The sink failed; the error is passed through untouched.
    #[error(transparent)]
    Sink(E),
}

impl<E> WriteError<E> {
    /// The sink error, if that is what failed.
    #[inline]
    pub fn into_sink_error(self) -> Option<E> {
        match self {
            Self::Sink(err) => Some(err),
            Self::ClaimNotMaterialized => None,
        }
    }
}
