//! Fatal-versus-recoverable classification of collaborator failures.
//!
//! Lazy computations absorb recoverable failures (falling back or caching an
//! absent result) and re-raise fatal ones without touching state.

use crate::ResolutionError;

/// Decides whether a collaborator failure must abort the running operation.
pub trait FatalPolicy: Send + Sync {
    /// `true` when `error` must be propagated instead of absorbed.
    fn is_fatal(&self, error: &ResolutionError) -> bool;
}

/// Resource exhaustion and corrupted state are fatal, everything else is
/// recoverable (including [`ResolutionError::Unsupported`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFatalPolicy;

impl FatalPolicy for DefaultFatalPolicy {
    #[inline]
    fn is_fatal(&self, error: &ResolutionError) -> bool {
        matches!(
            error,
            ResolutionError::OutOfMemory | ResolutionError::CorruptedState(_)
        )
    }
}

impl<F> FatalPolicy for F
where
    F: Fn(&ResolutionError) -> bool + Send + Sync,
{
    #[inline]
    fn is_fatal(&self, error: &ResolutionError) -> bool {
        self(error)
    }
}

/// SID translation is stricter than the general policy: a null reference
/// always aborts it.
pub(crate) fn is_fatal_for_sid_resolution(
    policy: &dyn FatalPolicy,
    error: &ResolutionError,
) -> bool {
    policy.is_fatal(error) || matches!(error, ResolutionError::NullReference)
}
