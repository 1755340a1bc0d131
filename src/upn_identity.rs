//! UPN endpoint identity.
//!
//! The identity claim and the UPN SID are both computed at most once per
//! instance. Both computations run under the instance mutex with a
//! double-checked fast path, so concurrent callers never repeat an OS call
//! and never see a half-built value.

use core::fmt::{self, Display};
use core::mem;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::environment::IdentityHandle;
use crate::fatal::is_fatal_for_sid_resolution;
use crate::writer::{IDENTITY_EXTENSION_NAMESPACE, UPN_ELEMENT};
use crate::{
    Claim, ClaimType, ElementWriter, IdentityEnvironment, IdentityError, ResolutionError,
    SecurityIdentifier, WriteError,
};

/// Identity of a remote endpoint, verifiable by its claim.
pub trait EndpointIdentity {
    /// The identity claim, `None` until materialized.
    fn identity_claim(&self) -> Option<&Claim>;

    /// Makes sure [`identity_claim`](Self::identity_claim) is populated.
    ///
    /// # Errors
    /// Implementation-specific; see [`UpnIdentity::ensure_identity_claim`].
    fn ensure_identity_claim(&self) -> Result<(), IdentityError>;

    /// Writes the identity element into `writer`.
    ///
    /// # Errors
    /// [`WriteError::ClaimNotMaterialized`] before materialization, otherwise
    /// the sink error.
    fn write_contents_to<W: ElementWriter + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<(), WriteError<W::Error>>;
}

/// Ownership state of the privileged handle.
enum HandleState {
    /// Constructed from a string or claim, there never was a handle.
    Absent,
    /// Waiting for materialization.
    Pending(Box<dyn IdentityHandle>),
    /// Materialized, the handle was released.
    Consumed,
}

/// Endpoint identity expressed as a User Principal Name claim.
///
/// ```rust
/// # use upn_endpoint_identity::{EndpointIdentity, UpnIdentity, XmlElementWriter};
/// let identity = UpnIdentity::new("alice@example.com");
/// identity.ensure_identity_claim()?;
/// assert_eq!(identity.upn(), Some("alice@example.com"));
///
/// let mut writer = XmlElementWriter::new(Vec::new());
/// identity.write_contents_to(&mut writer).map_err(|_| "write failed")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct UpnIdentity {
    identity_claim: OnceLock<Claim>,
    /// Guards both the handle and the SID computation.
    pending_handle: Mutex<HandleState>,
    upn_sid: OnceLock<Option<SecurityIdentifier>>,
    environment: IdentityEnvironment,
}

impl UpnIdentity {
    /// Identity for a literal UPN.
    #[inline]
    pub fn new(upn_name: impl Into<String>) -> Self {
        Self::with_claim(Claim::create_upn_claim(upn_name))
    }

    /// Identity for a UPN that may be absent, e.g. read from an interop boundary.
    ///
    /// # Errors
    /// [`IdentityError::ArgumentNull`] when `upn_name` is `None`.
    #[inline]
    pub fn try_new<S: Into<String>>(upn_name: Option<S>) -> Result<Self, IdentityError> {
        upn_name
            .map(Self::new)
            .ok_or(IdentityError::ArgumentNull("upn_name"))
    }

    /// Identity for an explicit UPN claim.
    ///
    /// # Errors
    /// [`IdentityError::UnrecognizedClaimType`] when the claim is not a UPN claim.
    #[inline]
    pub fn from_claim(identity: Claim) -> Result<Self, IdentityError> {
        let actual = identity.claim_type();
        if actual != ClaimType::UPN {
            return Err(IdentityError::UnrecognizedClaimType {
                actual,
                expected: ClaimType::UPN,
            });
        }
        Ok(Self::with_claim(identity))
    }

    /// Identity for a claim that may be absent.
    ///
    /// # Errors
    /// [`IdentityError::ArgumentNull`] when `identity` is `None`, otherwise as
    /// [`UpnIdentity::from_claim`].
    #[inline]
    pub fn try_from_claim(identity: Option<Claim>) -> Result<Self, IdentityError> {
        identity
            .ok_or(IdentityError::ArgumentNull("identity"))
            .and_then(Self::from_claim)
    }

    fn with_claim(claim: Claim) -> Self {
        Self {
            identity_claim: OnceLock::from(claim),
            pending_handle: Mutex::new(HandleState::Absent),
            upn_sid: OnceLock::new(),
            environment: IdentityEnvironment::default(),
        }
    }

    /// Identity backed by a privileged OS handle.
    ///
    /// The handle's SID is authoritative and cached right away; the claim is
    /// built on the first [`ensure_identity_claim`](Self::ensure_identity_claim).
    #[cfg_attr(not(windows), allow(dead_code))]
    pub(crate) fn from_identity_handle(handle: Box<dyn IdentityHandle>) -> Self {
        let upn_sid = OnceLock::from(handle.user_sid());
        Self {
            identity_claim: OnceLock::new(),
            pending_handle: Mutex::new(HandleState::Pending(handle)),
            upn_sid,
            environment: IdentityEnvironment::default(),
        }
    }

    /// Replaces the capabilities used by later lazy computations.
    #[inline]
    #[must_use]
    pub fn with_environment(mut self, environment: IdentityEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// The UPN, `None` until materialized.
    #[inline]
    pub fn upn(&self) -> Option<&str> {
        self.identity_claim.get().map(Claim::resource)
    }

    /// Populates the identity claim from the pending handle, if any.
    ///
    /// The handle's downlevel name is upgraded to a directory UPN when the
    /// host is domain-joined; recoverable directory failures fall back to
    /// the downlevel name. When the handle cannot report its name at all the
    /// claim holds an empty UPN. The handle is released once the claim is
    /// stored. Identities built from a string or claim return immediately.
    ///
    /// # Errors
    /// [`IdentityError::Fatal`] when the fatal policy rejects a failure; the
    /// handle stays pending.
    pub fn ensure_identity_claim(&self) -> Result<(), IdentityError> {
        if self.identity_claim.get().is_some() {
            return Ok(());
        }
        let mut state = self.pending_handle.lock();
        let HandleState::Pending(handle) = &*state else {
            return Ok(());
        };
        let upn = self.upn_from_identity_handle(&**handle)?;
        tracing::trace!(upn = %upn, "identity claim materialized");
        self.identity_claim.get_or_init(|| Claim::create_upn_claim(upn));
        // Dropping the taken handle releases it, exactly once.
        drop(mem::replace(&mut *state, HandleState::Consumed));
        Ok(())
    }

    fn upn_from_identity_handle(&self, handle: &dyn IdentityHandle) -> Result<String, IdentityError> {
        let policy = self.environment.fatal_policy();
        let downlevel_name = match handle.display_name() {
            Ok(name) => name,
            Err(err) if policy.is_fatal(&err) => return Err(IdentityError::Fatal(err)),
            Err(err) => {
                // No name to upgrade, the directory is not consulted.
                tracing::warn!(error = %err, "identity handle has no account name");
                return Ok(String::new());
            }
        };

        match self.upn_from_directory(&downlevel_name) {
            Ok(Some(upn)) => Ok(upn),
            Ok(None) => Ok(downlevel_name),
            Err(err) if policy.is_fatal(&err) => Err(IdentityError::Fatal(err)),
            Err(err) => {
                // Directory cannot be queried for the qualified name, keep the downlevel one.
                tracing::debug!(
                    downlevel_name = %downlevel_name,
                    error = %err,
                    "falling back to the downlevel name"
                );
                Ok(downlevel_name)
            }
        }
    }

    fn upn_from_directory(&self, downlevel_name: &str) -> Result<Option<String>, ResolutionError> {
        let directory = self.environment.directory();
        if directory.is_joined_to_domain()? {
            directory.upn_from_downlevel_name(downlevel_name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Security identifier of the UPN, or `None` when it cannot be determined.
    ///
    /// Translation runs once; its outcome, including a recoverable failure,
    /// is cached for every later call. Identities built from a privileged
    /// handle return the handle's SID without translating.
    ///
    /// # Errors
    /// - [`IdentityError::Fatal`] when the translator fails with an error the
    ///   fatal policy rejects, or with [`ResolutionError::NullReference`].
    ///   Nothing is cached, a later call translates again.
    /// - [`IdentityError::ClaimNotMaterialized`] when there is no UPN to translate.
    pub fn upn_sid(&self) -> Result<Option<&SecurityIdentifier>, IdentityError> {
        if let Some(sid) = self.upn_sid.get() {
            return Ok(sid.as_ref());
        }
        let _guard = self.pending_handle.lock();
        if let Some(sid) = self.upn_sid.get() {
            return Ok(sid.as_ref());
        }
        let claim = self
            .identity_claim
            .get()
            .ok_or(IdentityError::ClaimNotMaterialized)?;
        debug_assert_eq!(
            claim.claim_type(),
            ClaimType::UPN,
            "UpnIdentity holds a non UPN claim"
        );
        let upn = claim.resource();
        let resolved = match self.environment.translator().translate_to_sid(upn) {
            Ok(sid) => Some(sid),
            Err(err) if is_fatal_for_sid_resolution(self.environment.fatal_policy(), &err) => {
                return Err(IdentityError::Fatal(err));
            }
            Err(err) => {
                tracing::warn!(upn = %upn, error = %err, "UPN to SID mapping failed");
                None
            }
        };
        tracing::trace!(upn = %upn, mapped = resolved.is_some(), "UPN SID resolved");
        Ok(self.upn_sid.get_or_init(|| resolved).as_ref())
    }

    /// Whether this identity and `other` name the same principal.
    ///
    /// Both identities are materialized first. UPNs compare case-insensitively.
    ///
    /// # Errors
    /// Materialization errors of either identity.
    #[inline]
    pub fn matches(&self, other: &Self) -> Result<bool, IdentityError> {
        self.ensure_identity_claim()?;
        other.ensure_identity_claim()?;
        Ok(self.identity_claim.get() == other.identity_claim.get())
    }
}

impl EndpointIdentity for UpnIdentity {
    #[inline]
    fn identity_claim(&self) -> Option<&Claim> {
        self.identity_claim.get()
    }

    #[inline]
    fn ensure_identity_claim(&self) -> Result<(), IdentityError> {
        Self::ensure_identity_claim(self)
    }

    #[inline]
    fn write_contents_to<W: ElementWriter + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<(), WriteError<W::Error>> {
        let upn = self.upn().ok_or(WriteError::ClaimNotMaterialized)?;
        writer
            .write_element_string(UPN_ELEMENT, IDENTITY_EXTENSION_NAMESPACE, upn)
            .map_err(WriteError::Sink)
    }
}

impl TryFrom<Claim> for UpnIdentity {
    type Error = IdentityError;

    #[inline]
    fn try_from(identity: Claim) -> Result<Self, Self::Error> {
        Self::from_claim(identity)
    }
}

impl Display for UpnIdentity {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upn() {
            Some(upn) => write!(f, "identity(upn: {upn})"),
            None => f.write_str("identity(<pending>)"),
        }
    }
}

impl fmt::Debug for UpnIdentity {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(UpnIdentity))
            .field("identity_claim", &self.identity_claim.get())
            .field("upn_sid", &self.upn_sid.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::{AccountDirectory, NameTranslator, XmlElementWriter};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Counters shared between a fake handle and the test.
    #[derive(Default)]
    struct HandleCounters {
        name_reads: AtomicUsize,
        releases: AtomicUsize,
    }

    struct FakeHandle {
        name: Result<String, ResolutionError>,
        sid: Option<SecurityIdentifier>,
        counters: Arc<HandleCounters>,
    }

    impl FakeHandle {
        fn boxed(name: &str, counters: &Arc<HandleCounters>) -> Box<dyn IdentityHandle> {
            Box::new(Self {
                name: Ok(name.to_owned()),
                sid: None,
                counters: Arc::clone(counters),
            })
        }
    }

    impl IdentityHandle for FakeHandle {
        fn display_name(&self) -> Result<String, ResolutionError> {
            self.counters.name_reads.fetch_add(1, Ordering::SeqCst);
            self.name.clone()
        }

        fn user_sid(&self) -> Option<SecurityIdentifier> {
            self.sid.clone()
        }
    }

    impl Drop for FakeHandle {
        fn drop(&mut self) {
            self.counters.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct JoinedDirectory(Result<String, ResolutionError>);

    impl AccountDirectory for JoinedDirectory {
        fn is_joined_to_domain(&self) -> Result<bool, ResolutionError> {
            Ok(true)
        }

        fn upn_from_downlevel_name(&self, _: &str) -> Result<String, ResolutionError> {
            self.0.clone()
        }
    }

    struct NotJoinedDirectory;

    impl AccountDirectory for NotJoinedDirectory {
        fn is_joined_to_domain(&self) -> Result<bool, ResolutionError> {
            Ok(false)
        }

        fn upn_from_downlevel_name(&self, _: &str) -> Result<String, ResolutionError> {
            Err(ResolutionError::Other("must not be called".into()))
        }
    }

    struct CountingTranslator {
        calls: Arc<AtomicUsize>,
        result: Result<SecurityIdentifier, ResolutionError>,
    }

    impl NameTranslator for CountingTranslator {
        fn translate_to_sid(&self, _: &str) -> Result<SecurityIdentifier, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn alice_sid() -> SecurityIdentifier {
        "S-1-5-21-1004336348-1177238915-682003330-512".parse().unwrap()
    }

    fn translating(
        result: Result<SecurityIdentifier, ResolutionError>,
    ) -> (IdentityEnvironment, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let environment = IdentityEnvironment::unsupported().with_translator(CountingTranslator {
            calls: Arc::clone(&calls),
            result,
        });
        (environment, calls)
    }

    #[test]
    fn rejects_absent_or_mistyped_input() {
        assert_eq!(
            UpnIdentity::try_new(None::<String>).unwrap_err(),
            IdentityError::ArgumentNull("upn_name")
        );
        assert_eq!(
            UpnIdentity::try_from_claim(None).unwrap_err(),
            IdentityError::ArgumentNull("identity")
        );
        let dns = Claim::new(ClaimType::DNS, "host.example.com", crate::Right::POSSESS_PROPERTY);
        assert_eq!(
            UpnIdentity::from_claim(dns).unwrap_err(),
            IdentityError::UnrecognizedClaimType {
                actual: ClaimType::DNS,
                expected: ClaimType::UPN,
            }
        );
        assert!(UpnIdentity::try_new(Some("alice@example.com")).is_ok());
        assert!(UpnIdentity::try_from(Claim::create_upn_claim("alice@example.com")).is_ok());
    }

    #[test]
    fn literal_identity_needs_no_materialization() {
        let identity = UpnIdentity::new("alice@example.com");
        assert_eq!(identity.upn(), Some("alice@example.com"));
        identity.ensure_identity_claim().unwrap();
        identity.ensure_identity_claim().unwrap();
        assert_eq!(identity.upn(), Some("alice@example.com"));
        assert_eq!(identity.to_string(), "identity(upn: alice@example.com)");
    }

    #[test]
    fn not_joined_host_keeps_downlevel_name_and_releases_once() {
        let counters = Arc::new(HandleCounters::default());
        let identity = Arc::new(
            UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters))
                .with_environment(IdentityEnvironment::unsupported().with_directory(NotJoinedDirectory)),
        );
        assert_eq!(identity.upn(), None);
        assert_eq!(identity.to_string(), "identity(<pending>)");

        let workers: Vec<_> = (0..10)
            .map(|_| {
                let identity = Arc::clone(&identity);
                thread::spawn(move || identity.ensure_identity_claim())
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        assert_eq!(identity.upn(), Some("CONTOSO\\alice"));
        assert_eq!(counters.name_reads.load(Ordering::SeqCst), 1);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
        drop(identity);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn joined_host_uses_directory_upn() {
        let counters = Arc::new(HandleCounters::default());
        let identity = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters))
            .with_environment(
                IdentityEnvironment::unsupported()
                    .with_directory(JoinedDirectory(Ok("alice@contoso.com".into()))),
            );
        identity.ensure_identity_claim().unwrap();
        assert_eq!(identity.upn(), Some("alice@contoso.com"));
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsupported_directory_falls_back_to_downlevel_name() {
        let counters = Arc::new(HandleCounters::default());
        let identity = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters))
            .with_environment(IdentityEnvironment::unsupported());
        identity.ensure_identity_claim().unwrap();
        assert_eq!(identity.upn(), Some("CONTOSO\\alice"));
    }

    #[test]
    fn fatal_directory_error_keeps_handle_pending() {
        let counters = Arc::new(HandleCounters::default());
        let identity = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters))
            .with_environment(
                IdentityEnvironment::unsupported()
                    .with_directory(JoinedDirectory(Err(ResolutionError::OutOfMemory))),
            );
        assert_eq!(
            identity.ensure_identity_claim().unwrap_err(),
            IdentityError::Fatal(ResolutionError::OutOfMemory)
        );
        assert_eq!(identity.upn(), None);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 0);

        let identity = identity.with_environment(IdentityEnvironment::unsupported());
        identity.ensure_identity_claim().unwrap();
        assert_eq!(identity.upn(), Some("CONTOSO\\alice"));
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn policy_can_make_unsupported_fatal() {
        let counters = Arc::new(HandleCounters::default());
        let identity = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters))
            .with_environment(IdentityEnvironment::unsupported().with_fatal_policy(
                |error: &ResolutionError| matches!(error, ResolutionError::Unsupported { .. }),
            ));
        assert!(matches!(
            identity.ensure_identity_claim(),
            Err(IdentityError::Fatal(ResolutionError::Unsupported { .. }))
        ));
        assert_eq!(counters.releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unreadable_display_name_materializes_an_empty_upn() {
        let counters = Arc::new(HandleCounters::default());
        let handle = Box::new(FakeHandle {
            name: Err(ResolutionError::AccessDenied),
            sid: None,
            counters: Arc::clone(&counters),
        });
        let identity = UpnIdentity::from_identity_handle(handle).with_environment(
            IdentityEnvironment::unsupported()
                .with_directory(JoinedDirectory(Err(ResolutionError::OutOfMemory))),
        );
        for _ in 0..3 {
            identity.ensure_identity_claim().unwrap();
        }
        assert_eq!(identity.upn(), Some(""));
        assert_eq!(counters.name_reads.load(Ordering::SeqCst), 1);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
        drop(identity);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fatal_display_name_failure_keeps_the_handle() {
        let counters = Arc::new(HandleCounters::default());
        let handle = Box::new(FakeHandle {
            name: Err(ResolutionError::OutOfMemory),
            sid: None,
            counters: Arc::clone(&counters),
        });
        let identity = UpnIdentity::from_identity_handle(handle)
            .with_environment(IdentityEnvironment::unsupported());
        assert_eq!(
            identity.ensure_identity_claim().unwrap_err(),
            IdentityError::Fatal(ResolutionError::OutOfMemory)
        );
        assert_eq!(identity.upn(), None);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 0);
        drop(identity);
        assert_eq!(counters.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handle_sid_is_authoritative() {
        let counters = Arc::new(HandleCounters::default());
        let handle = Box::new(FakeHandle {
            name: Ok("CONTOSO\\alice".into()),
            sid: Some(alice_sid()),
            counters: Arc::clone(&counters),
        });
        let (environment, calls) = translating(Err(ResolutionError::NoneMapped));
        let identity = UpnIdentity::from_identity_handle(handle).with_environment(environment);

        assert_eq!(identity.upn_sid().unwrap(), Some(&alice_sid()));
        identity.ensure_identity_claim().unwrap();
        assert_eq!(identity.upn_sid().unwrap(), Some(&alice_sid()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sid_is_translated_once_across_threads() {
        let (environment, calls) = translating(Ok(alice_sid()));
        let identity = Arc::new(UpnIdentity::new("alice@example.com").with_environment(environment));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let identity = Arc::clone(&identity);
                thread::spawn(move || identity.upn_sid().unwrap().cloned())
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), Some(alice_sid()));
        }
        assert_eq!(identity.upn_sid().unwrap(), Some(&alice_sid()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recoverable_translation_failure_caches_absence() {
        let (environment, calls) = translating(Err(ResolutionError::NoneMapped));
        let identity = UpnIdentity::new("alice@example.com").with_environment(environment);
        assert_eq!(identity.upn_sid().unwrap(), None);
        assert_eq!(identity.upn_sid().unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fatal_translation_failure_permits_retry() {
        for fatal in [ResolutionError::OutOfMemory, ResolutionError::NullReference] {
            let (environment, calls) = translating(Err(fatal.clone()));
            let identity = UpnIdentity::new("alice@example.com").with_environment(environment);
            assert_eq!(identity.upn_sid().unwrap_err(), IdentityError::Fatal(fatal.clone()));
            assert_eq!(identity.upn_sid().unwrap_err(), IdentityError::Fatal(fatal));
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }
    }

    #[test]
    fn handle_without_sid_never_translates() {
        let counters = Arc::new(HandleCounters::default());
        let (environment, calls) = translating(Ok(alice_sid()));
        let identity = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters))
            .with_environment(environment);
        // No eager SID on this handle, so the cache is already settled.
        assert_eq!(identity.upn_sid().unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn writes_upn_element() {
        let identity = UpnIdentity::new("a&b@x.com");
        let mut writer = XmlElementWriter::new(Vec::new());
        identity.write_contents_to(&mut writer).unwrap();
        assert_eq!(
            String::from_utf8(writer.into_inner()).unwrap(),
            format!("<Upn xmlns=\"{IDENTITY_EXTENSION_NAMESPACE}\">a&amp;b@x.com</Upn>")
        );
    }

    #[test]
    fn writing_before_materialization_is_refused() {
        let counters = Arc::new(HandleCounters::default());
        let identity = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\alice", &counters));
        let mut writer = XmlElementWriter::new(Vec::new());
        assert!(matches!(
            identity.write_contents_to(&mut writer),
            Err(WriteError::ClaimNotMaterialized)
        ));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn matches_compares_materialized_claims() {
        let counters = Arc::new(HandleCounters::default());
        let from_handle = UpnIdentity::from_identity_handle(FakeHandle::boxed("CONTOSO\\Alice", &counters))
            .with_environment(IdentityEnvironment::unsupported());
        assert!(from_handle.matches(&UpnIdentity::new("contoso\\alice")).unwrap());
        assert!(!from_handle.matches(&UpnIdentity::new("contoso\\bob")).unwrap());
        assert!(UpnIdentity::new("Alice@Example.com")
            .matches(&UpnIdentity::new("alice@example.com"))
            .unwrap());
    }
}
