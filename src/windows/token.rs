use core::mem::MaybeUninit;
use core::ptr;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle, RawHandle};

use thiserror::Error;
use windows_sys::Win32::{
    Foundation::GetLastError,
    Security::{GetLengthSid, GetTokenInformation, TOKEN_QUERY, TOKEN_USER, TokenUser},
    System::Threading::{GetCurrentProcess, OpenProcessToken},
};

use super::account_lookup::lookup_sid;
use crate::environment::IdentityHandle;
use crate::{ResolutionError, SecurityIdentifier};

/// Errors that can occur when opening a Windows access token.
///
/// Each variant corresponds to a specific failure point.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token handle is null.
    #[error("token handle must not be null")]
    NullToken,

    /// `OpenProcessToken` failed.
    ///
    /// Contains the Win32 error code returned by `GetLastError`.
    #[error("OpenProcessToken failed (error {0})")]
    OpenTokenFailed(u32),

    /// `GetTokenInformation` did not fail as expected when called with a zero-size buffer,
    /// so the required size could not be determined.
    #[error("Failed to determine TokenUser buffer size")]
    GetTokenSizeFailed,

    /// `GetTokenInformation` failed when retrieving `TokenUser`.
    ///
    /// Contains the Win32 error code returned by `GetLastError`.
    #[error("GetTokenInformation failed (error {0})")]
    GetTokenInfoFailed(u32),

    /// The token user SID is not a valid SID.
    #[error("TokenUser holds a malformed SID")]
    InvalidUserSid,
}

/// An open access token and the SID of its user.
///
/// Closing the token is the handle release.
pub(crate) struct WindowsIdentityHandle {
    // Held for its lifetime; dropping it closes the token.
    _token: OwnedHandle,
    user_sid: SecurityIdentifier,
}

impl WindowsIdentityHandle {
    /// Wraps an access token opened with at least `TOKEN_QUERY`.
    pub(crate) fn from_token(token: OwnedHandle) -> Result<Self, TokenError> {
        if token.as_raw_handle().is_null() {
            return Err(TokenError::NullToken);
        }
        let user_sid = read_token_user(&token)?;
        Ok(Self {
            _token: token,
            user_sid,
        })
    }

    /// Opens the token of the current process.
    pub(crate) fn current_process() -> Result<Self, TokenError> {
        let mut raw_handle_mu: MaybeUninit<RawHandle> = MaybeUninit::uninit();

        // SAFETY: GetCurrentProcess is side-effect free and can be called unconditionally.
        let process_handle = unsafe { GetCurrentProcess() };
        // SAFETY: FFI call; pointers are valid. We check the return value immediately.
        let open_ok =
            unsafe { OpenProcessToken(process_handle, TOKEN_QUERY, raw_handle_mu.as_mut_ptr()) };

        if open_ok == 0 {
            // SAFETY: GetLastError can be called immediately after a failing FFI call.
            let err = unsafe { GetLastError() };
            return Err(TokenError::OpenTokenFailed(err));
        }

        // SAFETY: OpenProcessToken reported success; the handle is initialized.
        let raw_handle: RawHandle = unsafe { raw_handle_mu.assume_init() };
        // SAFETY: `raw_handle` is a valid owned handle obtained from the OS.
        Self::from_token(unsafe { OwnedHandle::from_raw_handle(raw_handle) })
    }
}

fn read_token_user(token: &OwnedHandle) -> Result<SecurityIdentifier, TokenError> {
    let mut size: u32 = 0;
    // SAFETY: Standard size-query pattern with null buffer and 0 length.
    let first_ok = unsafe {
        GetTokenInformation(
            token.as_raw_handle(),
            TokenUser,
            ptr::null_mut(),
            0,
            &raw mut size,
        )
    };
    if first_ok != 0 {
        return Err(TokenError::GetTokenSizeFailed);
    }

    // u64 words keep TOKEN_USER (a pointer-sized struct) aligned.
    let mut buffer = vec![0u64; (size as usize).div_ceil(8)];
    // SAFETY: Buffer holds at least `size` bytes.
    let second_ok = unsafe {
        GetTokenInformation(
            token.as_raw_handle(),
            TokenUser,
            buffer.as_mut_ptr().cast(),
            size,
            &raw mut size,
        )
    };
    if second_ok == 0 {
        // SAFETY: GetLastError can be called immediately after a failing FFI call.
        let err = unsafe { GetLastError() };
        return Err(TokenError::GetTokenInfoFailed(err));
    }

    let token_user = buffer.as_ptr().cast::<TOKEN_USER>();
    // SAFETY: the call succeeded, so the buffer starts with an initialized TOKEN_USER.
    let raw_sid = unsafe { (*token_user).User.Sid };
    if raw_sid.is_null() {
        return Err(TokenError::InvalidUserSid);
    }
    // SAFETY: `raw_sid` points to a valid SID inside `buffer`.
    let len = unsafe { GetLengthSid(raw_sid) } as usize;
    // SAFETY: the SID spans `len` bytes inside `buffer`, which outlives the slice.
    let bytes = unsafe { core::slice::from_raw_parts(raw_sid.cast::<u8>(), len) };
    SecurityIdentifier::from_bytes(bytes).map_err(|_| TokenError::InvalidUserSid)
}

impl IdentityHandle for WindowsIdentityHandle {
    fn display_name(&self) -> Result<String, ResolutionError> {
        lookup_sid(&self.user_sid).map(|account| account.name.to_string())
    }

    fn user_sid(&self) -> Option<SecurityIdentifier> {
        Some(self.user_sid.clone())
    }
}
