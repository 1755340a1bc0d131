//! # UPN endpoint identity
//!
//! Verifies "who" a remote service endpoint claims to be through a
//! User Principal Name claim. The crate provides:
//! - [`UpnIdentity`]: the identity, built from a UPN string, a UPN [`Claim`],
//!   or (Windows) the current process token.
//! - [`SecurityIdentifier`]: an owned SID value with string and binary forms.
//! - [`IdentityEnvironment`]: the host capabilities an identity relies on,
//!   [`AccountDirectory`] and [`NameTranslator`], plus the [`FatalPolicy`]
//!   deciding which failures abort an operation.
//! - [`ElementWriter`] / [`XmlElementWriter`]: the serialization sink.
//!
//! ## Lazy computations
//! Two values are computed at most once per identity, whatever the number of
//! threads asking:
//! - the identity claim of a token-backed identity, by
//!   [`UpnIdentity::ensure_identity_claim`]. The token's `DOMAIN\user` name is
//!   upgraded to a directory UPN on domain-joined hosts, and the token is
//!   closed once the claim exists;
//! - the UPN SID, by [`UpnIdentity::upn_sid`]. A recoverable translation
//!   failure is cached as "no SID".
//!
//! Failures the [`FatalPolicy`] classifies as fatal abort either computation
//! without changing any state.
//!
//! ## Examples
//! ### Identity of a literal UPN
//! ```rust
//! use upn_endpoint_identity::{EndpointIdentity, IdentityEnvironment, UpnIdentity, XmlElementWriter};
//!
//! let identity = UpnIdentity::new("alice@example.com")
//!     .with_environment(IdentityEnvironment::unsupported());
//! identity.ensure_identity_claim()?;
//!
//! // No translator on this host: no SID, and no error either.
//! assert_eq!(identity.upn_sid()?, None);
//!
//! let mut writer = XmlElementWriter::new(Vec::new());
//! identity.write_contents_to(&mut writer).map_err(|_| "write failed")?;
//! assert_eq!(
//!     String::from_utf8(writer.into_inner())?,
//!     "<Upn xmlns=\"http://schemas.xmlsoap.org/ws/2006/02/addressingidentity\">alice@example.com</Upn>"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### (Windows) Identity of the current process
//! ```no_run
//! # #[cfg(windows)]
//! # {
//! use upn_endpoint_identity::UpnIdentity;
//! let identity = UpnIdentity::for_current_process().unwrap();
//! identity.ensure_identity_claim().unwrap();
//! println!("{identity}");
//! # }
//! ```
//!
//! ## Features
//! - `serde`: `Serialize`/`Deserialize` for [`SecurityIdentifier`] and [`DownlevelName`].
//! - `windows_result` (default): conversions from [`ResolutionError`] to
//!   `windows_result::HRESULT` and `windows_result::Error`.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

mod claim;
mod downlevel_name;
mod environment;
mod error;
mod fatal;
mod security_identifier;
mod sid_identifier_authority;
mod upn_identity;
mod writer;

#[cfg(feature = "serde")]
mod serde_impl;

#[cfg(windows)]
pub mod windows;

pub use claim::{Claim, ClaimType, Right};
pub use downlevel_name::{DownlevelName, DownlevelNameError};
pub use environment::{
    AccountDirectory, IdentityEnvironment, NameTranslator, UnsupportedDirectory,
    UnsupportedTranslator,
};
pub use error::{IdentityError, ResolutionError, WriteError};
pub use fatal::{DefaultFatalPolicy, FatalPolicy};
pub use security_identifier::{InvalidSidFormat, SecurityIdentifier};
pub use sid_identifier_authority::SidIdentifierAuthority;
pub use upn_identity::{EndpointIdentity, UpnIdentity};
pub use writer::{ElementWriter, IDENTITY_EXTENSION_NAMESPACE, UPN_ELEMENT, XmlElementWriter};
