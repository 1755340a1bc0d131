//! `LookupAccountSidW` / `LookupAccountNameW` wrappers.
//!
//! Both APIs follow the same protocol: a first call with empty buffers reports
//! the sizes through `ERROR_INSUFFICIENT_BUFFER`, a second call fills them.

use core::ptr::{null, null_mut};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use smallvec::SmallVec;
use widestring::U16CString;
use windows_sys::Win32::Foundation::ERROR_INSUFFICIENT_BUFFER;
use windows_sys::Win32::Security::{LookupAccountNameW, LookupAccountSidW};

use super::error::last_error;
use super::SidType;
use crate::{DownlevelName, ResolutionError, SecurityIdentifier};

/// Result of an account lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLookup {
    /// Account SID.
    pub sid: SecurityIdentifier,
    /// Account name in `DOMAIN\user` form.
    pub name: DownlevelName,
    /// The raw `SID_NAME_USE` value.
    pub sid_type_raw: i32,
}

impl AccountLookup {
    /// Get the SID type as an enum.
    /// # Errors
    /// Return a [`TryFromPrimitiveError<SidType>`] error if the raw SID type value is unknown.
    #[inline]
    pub fn sid_type(&self) -> Result<SidType, TryFromPrimitiveError<SidType>> {
        SidType::try_from_primitive(self.sid_type_raw)
    }
}

/// SID bytes copied into a `u32`-aligned buffer, as Win32 expects a `PSID`.
struct SidBuffer(SmallVec<[u32; 17]>);

impl SidBuffer {
    fn new(sid: &SecurityIdentifier) -> Self {
        Self(
            sid.to_bytes()
                .chunks_exact(4)
                .filter_map(|chunk| chunk.try_into().ok().map(u32::from_ne_bytes))
                .collect(),
        )
    }

    fn as_psid(&mut self) -> *mut core::ffi::c_void {
        self.0.as_mut_ptr().cast()
    }
}

fn wide(s: &str) -> Result<U16CString, ResolutionError> {
    U16CString::from_str(s).map_err(|_| ResolutionError::InvalidName(s.to_owned()))
}

fn from_wide(buffer: &[u16]) -> String {
    OsString::from_wide(buffer).to_string_lossy().into_owned()
}

/// Whether a size reported after `ERROR_INSUFFICIENT_BUFFER` asks for more
/// than the buffer just offered. Retrying with the same size would spin.
pub(super) const fn grew(offered: u32, reported: u32) -> bool {
    reported > offered
}

/// Resolves `sid` to its account on the local machine.
pub(super) fn lookup_sid(sid: &SecurityIdentifier) -> Result<AccountLookup, ResolutionError> {
    let mut raw_sid = SidBuffer::new(sid);
    let mut name_len = 0u32;
    let mut domain_len = 0u32;
    let mut sid_type_raw = 0i32;

    // Safety: size query, null buffers with zero lengths are valid.
    let sized = unsafe {
        LookupAccountSidW(
            null(),
            raw_sid.as_psid(),
            null_mut(),
            &raw mut name_len,
            null_mut(),
            &raw mut domain_len,
            &raw mut sid_type_raw,
        )
    };
    if sized == 0 {
        let err = last_error();
        if err != ResolutionError::Os(ERROR_INSUFFICIENT_BUFFER) {
            return Err(err);
        }
    }

    loop {
        let (name_capacity, domain_capacity) = (name_len, domain_len);
        let mut name_buffer = SmallVec::<[u16; 256]>::from_elem(0, name_len as usize);
        let mut domain_buffer = SmallVec::<[u16; 256]>::from_elem(0, domain_len as usize);
        // Safety: the buffers hold `name_len` and `domain_len` units.
        let result = unsafe {
            LookupAccountSidW(
                null(),
                raw_sid.as_psid(),
                name_buffer.as_mut_ptr(),
                &raw mut name_len,
                domain_buffer.as_mut_ptr(),
                &raw mut domain_len,
                &raw mut sid_type_raw,
            )
        };
        if result == 0 {
            match last_error() {
                ResolutionError::Os(ERROR_INSUFFICIENT_BUFFER)
                    if grew(name_capacity, name_len) || grew(domain_capacity, domain_len) =>
                {
                    continue;
                }
                err => return Err(err),
            }
        }
        // On success the lengths exclude the terminating NUL.
        name_buffer.truncate(name_len as usize);
        domain_buffer.truncate(domain_len as usize);
        return Ok(AccountLookup {
            sid: sid.clone(),
            name: DownlevelName::new(from_wide(&domain_buffer), from_wide(&name_buffer)),
            sid_type_raw,
        });
    }
}

/// Resolves `account_name` (UPN or downlevel form) on the local machine.
pub(super) fn lookup_name(account_name: &str) -> Result<AccountLookup, ResolutionError> {
    let wide_name = wide(account_name)?;
    let mut sid_len = 0u32;
    let mut domain_len = 0u32;
    let mut sid_type_raw = 0i32;

    // Safety: size query, null buffers with zero lengths are valid.
    let sized = unsafe {
        LookupAccountNameW(
            null(),
            wide_name.as_ptr(),
            null_mut(),
            &raw mut sid_len,
            null_mut(),
            &raw mut domain_len,
            &raw mut sid_type_raw,
        )
    };
    if sized == 0 {
        let err = last_error();
        if err != ResolutionError::Os(ERROR_INSUFFICIENT_BUFFER) {
            return Err(err);
        }
    }

    loop {
        let (sid_capacity, domain_capacity) = (sid_len, domain_len);
        let mut sid_buffer = SmallVec::<[u32; 17]>::from_elem(0, (sid_len as usize).div_ceil(4));
        let mut domain_buffer = SmallVec::<[u16; 256]>::from_elem(0, domain_len as usize);
        // Safety: `sid_buffer` holds at least `sid_len` bytes, `domain_buffer` `domain_len` units.
        let result = unsafe {
            LookupAccountNameW(
                null(),
                wide_name.as_ptr(),
                sid_buffer.as_mut_ptr().cast(),
                &raw mut sid_len,
                domain_buffer.as_mut_ptr(),
                &raw mut domain_len,
                &raw mut sid_type_raw,
            )
        };
        if result == 0 {
            match last_error() {
                ResolutionError::Os(ERROR_INSUFFICIENT_BUFFER)
                    if grew(sid_capacity, sid_len) || grew(domain_capacity, domain_len) =>
                {
                    continue;
                }
                err => return Err(err),
            }
        }
        let bytes: SmallVec<[u8; 68]> = sid_buffer.iter().flat_map(|word| word.to_ne_bytes()).collect();
        let sid = bytes
            .get(..sid_len as usize)
            .and_then(|raw| SecurityIdentifier::from_bytes(raw).ok())
            .ok_or_else(|| ResolutionError::Other("LookupAccountNameW returned a malformed SID".into()))?;
        domain_buffer.truncate(domain_len as usize);
        let user = match account_name.split_once('\\') {
            Some((_, user)) => user,
            None => account_name.split_once('@').map_or(account_name, |(user, _)| user),
        };
        return Ok(AccountLookup {
            sid,
            name: DownlevelName::new(from_wide(&domain_buffer), user),
            sid_type_raw,
        });
    }
}
