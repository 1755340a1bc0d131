use core::num::NonZeroU32;

use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_BAD_NETPATH, ERROR_INVALID_ACCOUNT_NAME, ERROR_NO_SUCH_DOMAIN,
    ERROR_NO_SUCH_USER, ERROR_NONE_MAPPED, ERROR_NOT_ENOUGH_MEMORY, ERROR_NOT_SUPPORTED,
    ERROR_OUTOFMEMORY, ERROR_TRUSTED_DOMAIN_FAILURE, ERROR_TRUSTED_RELATIONSHIP_FAILURE,
};

use crate::ResolutionError;

impl From<NonZeroU32> for ResolutionError {
    #[inline]
    fn from(code: NonZeroU32) -> Self {
        match code.get() {
            ERROR_NOT_ENOUGH_MEMORY | ERROR_OUTOFMEMORY => Self::OutOfMemory,
            ERROR_NOT_SUPPORTED => Self::Unsupported {
                operation: "account resolution",
            },
            ERROR_NONE_MAPPED | ERROR_NO_SUCH_USER => Self::NoneMapped,
            ERROR_ACCESS_DENIED => Self::AccessDenied,
            ERROR_NO_SUCH_DOMAIN | ERROR_BAD_NETPATH => Self::NoSuchDomain,
            ERROR_TRUSTED_DOMAIN_FAILURE | ERROR_TRUSTED_RELATIONSHIP_FAILURE => Self::TrustFailure,
            ERROR_INVALID_ACCOUNT_NAME => Self::InvalidName(String::new()),
            other => Self::Os(other),
        }
    }
}

/// Reads the calling thread's last Win32 error.
pub(super) fn last_error() -> ResolutionError {
    // Safety: `GetLastError` only reads thread-local state.
    let code = unsafe { windows_sys::Win32::Foundation::GetLastError() };
    NonZeroU32::new(code).map_or_else(
        || ResolutionError::Other("Win32 call failed without an error code".into()),
        ResolutionError::from,
    )
}

#[cfg(feature = "windows_result")]
#[expect(clippy::cast_possible_wrap, reason = "HRESULT is the bit pattern of 0x80004005")]
const E_FAIL: i32 = 0x8000_4005_u32 as i32;

#[cfg(feature = "windows_result")]
impl From<ResolutionError> for windows_result::HRESULT {
    #[inline]
    fn from(value: ResolutionError) -> Self {
        let code = match value {
            ResolutionError::OutOfMemory => ERROR_OUTOFMEMORY,
            ResolutionError::Unsupported { .. } => ERROR_NOT_SUPPORTED,
            ResolutionError::NoneMapped => ERROR_NONE_MAPPED,
            ResolutionError::AccessDenied => ERROR_ACCESS_DENIED,
            ResolutionError::NoSuchDomain => ERROR_NO_SUCH_DOMAIN,
            ResolutionError::TrustFailure => ERROR_TRUSTED_RELATIONSHIP_FAILURE,
            ResolutionError::InvalidName(_) => ERROR_INVALID_ACCOUNT_NAME,
            ResolutionError::Os(code) => code,
            ResolutionError::CorruptedState(_)
            | ResolutionError::NullReference
            | ResolutionError::Other(_) => return Self(E_FAIL),
        };
        Self::from_win32(code)
    }
}

#[cfg(feature = "windows_result")]
impl From<ResolutionError> for windows_result::Error {
    #[inline]
    fn from(value: ResolutionError) -> Self {
        let hresult: windows_result::HRESULT = value.into();
        Self::from_hresult(hresult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_lookup_codes() {
        let map = |code: u32| NonZeroU32::new(code).map(ResolutionError::from);
        assert_eq!(map(ERROR_NONE_MAPPED), Some(ResolutionError::NoneMapped));
        assert_eq!(map(ERROR_OUTOFMEMORY), Some(ResolutionError::OutOfMemory));
        assert_eq!(map(ERROR_NO_SUCH_DOMAIN), Some(ResolutionError::NoSuchDomain));
        assert_eq!(map(31), Some(ResolutionError::Os(31)));
    }
}
