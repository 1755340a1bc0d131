//! Minimal claim model: a typed assertion (`claim_type`, `resource`, `right`).

use core::fmt::{self, Display};

/// URI naming the kind of assertion a [`Claim`] makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimType(&'static str);

impl ClaimType {
    /// User principal name (`user@domain`).
    pub const UPN: Self = Self("http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn");
    /// Security identifier.
    pub const SID: Self = Self("http://schemas.xmlsoap.org/ws/2005/05/identity/claims/sid");
    /// Service principal name.
    pub const SPN: Self = Self("http://schemas.xmlsoap.org/ws/2005/05/identity/claims/spn");
    /// DNS name.
    pub const DNS: Self = Self("http://schemas.xmlsoap.org/ws/2005/05/identity/claims/dns");

    /// The type URI.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Display for ClaimType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Right the subject holds over the claim resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Right(&'static str);

impl Right {
    /// The claim identifies the subject.
    pub const IDENTITY: Self = Self("http://schemas.xmlsoap.org/ws/2005/05/identity/right/identity");
    /// The subject possesses the resource.
    pub const POSSESS_PROPERTY: Self =
        Self("http://schemas.xmlsoap.org/ws/2005/05/identity/right/possessproperty");

    /// The right URI.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

/// A typed assertion about an identity.
///
/// ```rust
/// # use upn_endpoint_identity::{Claim, ClaimType};
/// let claim = Claim::create_upn_claim("alice@example.com");
/// assert_eq!(claim.claim_type(), ClaimType::UPN);
/// assert_eq!(claim.resource(), "alice@example.com");
/// ```
#[derive(Debug, Clone, Eq)]
pub struct Claim {
    claim_type: ClaimType,
    resource: String,
    right: Right,
}

impl Claim {
    /// Builds a claim of any type.
    #[inline]
    pub fn new(claim_type: ClaimType, resource: impl Into<String>, right: Right) -> Self {
        Self {
            claim_type,
            resource: resource.into(),
            right,
        }
    }

    /// Builds a UPN claim with the `possessproperty` right.
    #[inline]
    pub fn create_upn_claim(upn: impl Into<String>) -> Self {
        Self::new(ClaimType::UPN, upn, Right::POSSESS_PROPERTY)
    }

    /// The claim type.
    #[inline]
    #[must_use]
    pub const fn claim_type(&self) -> ClaimType {
        self.claim_type
    }

    /// The claim resource.
    #[inline]
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The claim right.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> Right {
        self.right
    }
}

impl PartialEq for Claim {
    /// UPN resources are account names and compare ASCII case-insensitively.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if self.claim_type != other.claim_type || self.right != other.right {
            return false;
        }
        if self.claim_type == ClaimType::UPN {
            self.resource.eq_ignore_ascii_case(&other.resource)
        } else {
            self.resource == other.resource
        }
    }
}

impl Display for Claim {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.claim_type, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upn_comparison_ignores_case() {
        assert_eq!(
            Claim::create_upn_claim("Alice@Example.com"),
            Claim::create_upn_claim("alice@example.com")
        );
        assert_ne!(
            Claim::create_upn_claim("alice@example.com"),
            Claim::new(ClaimType::UPN, "alice@example.com", Right::IDENTITY)
        );
        assert_ne!(
            Claim::new(ClaimType::DNS, "Host", Right::POSSESS_PROPERTY),
            Claim::new(ClaimType::DNS, "host", Right::POSSESS_PROPERTY)
        );
    }
}
