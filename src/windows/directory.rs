use core::ffi::c_void;
use core::num::NonZeroU32;
use core::ptr::{null, null_mut};

use smallvec::SmallVec;
use widestring::U16CString;
use windows_sys::Win32::Foundation::ERROR_INSUFFICIENT_BUFFER;
use windows_sys::Win32::NetworkManagement::NetManagement::{
    NETSETUP_JOIN_STATUS, NetApiBufferFree, NetGetJoinInformation, NetSetupDomainName,
};
use windows_sys::Win32::Security::Authentication::Identity::{
    NameSamCompatible, NameUserPrincipal, TranslateNameW,
};

use super::account_lookup::{grew, lookup_name};
use super::error::last_error;
use crate::{AccountDirectory, DownlevelName, NameTranslator, ResolutionError, SecurityIdentifier};

/// Active Directory backed [`AccountDirectory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsDirectory;

impl AccountDirectory for WindowsDirectory {
    fn is_joined_to_domain(&self) -> Result<bool, ResolutionError> {
        let mut name_buffer: *mut u16 = null_mut();
        let mut status: NETSETUP_JOIN_STATUS = 0;
        // Safety: both out-parameters are valid; a null server queries the local machine.
        let code = unsafe { NetGetJoinInformation(null(), &raw mut name_buffer, &raw mut status) };
        if !name_buffer.is_null() {
            // Safety: the buffer was allocated by NetGetJoinInformation and is freed once.
            unsafe { NetApiBufferFree(name_buffer.cast::<c_void>()) };
        }
        match NonZeroU32::new(code) {
            Some(code) => Err(code.into()),
            None => Ok(status == NetSetupDomainName),
        }
    }

    fn upn_from_downlevel_name(&self, downlevel_name: &str) -> Result<String, ResolutionError> {
        downlevel_name
            .parse::<DownlevelName>()
            .map_err(|_| ResolutionError::InvalidName(downlevel_name.to_owned()))?;
        let wide_name = U16CString::from_str(downlevel_name)
            .map_err(|_| ResolutionError::InvalidName(downlevel_name.to_owned()))?;

        let mut len = 256u32;
        loop {
            let capacity = len;
            let mut buffer = SmallVec::<[u16; 256]>::from_elem(0, capacity as usize);
            // Safety: `buffer` holds `len` units, `len` is updated in place.
            let ok = unsafe {
                TranslateNameW(
                    wide_name.as_ptr(),
                    NameSamCompatible,
                    NameUserPrincipal,
                    buffer.as_mut_ptr(),
                    &raw mut len,
                )
            };
            if ok == 0 {
                match last_error() {
                    ResolutionError::Os(ERROR_INSUFFICIENT_BUFFER) if grew(capacity, len) => continue,
                    err => return Err(err),
                }
            }
            // `len` counts the terminating NUL.
            buffer.truncate((len as usize).saturating_sub(1));
            return Ok(String::from_utf16_lossy(&buffer));
        }
    }
}

/// [`NameTranslator`] backed by `LookupAccountNameW`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsNameTranslator;

impl NameTranslator for WindowsNameTranslator {
    fn translate_to_sid(&self, account_name: &str) -> Result<SecurityIdentifier, ResolutionError> {
        lookup_name(account_name).map(|account| account.sid)
    }
}
