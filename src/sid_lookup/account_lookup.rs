use super::{LookupError, MAX_FILL_ATTEMPTS, SidType, machine_name_to_wide};
use crate::{SecurityIdentifier, SidSizeInfo, Win32Error};
use core::ptr::{null, null_mut};
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use smallvec::SmallVec;
use std::ffi::{OsStr, OsString};
use std::os::windows::ffi::OsStringExt;
use widestring::{U16CStr, U16CString};
use windows_sys::Win32::Foundation::ERROR_INSUFFICIENT_BUFFER;
use windows_sys::Win32::Security::LookupAccountNameW;

/// `SECURITY_MAX_SID_SIZE`: a SID with 15 sub-authorities.
const MAX_SID_SIZE: usize = SidSizeInfo::MAX.size();

/// Result of a [name lookup](https://learn.microsoft.com/windows/win32/api/winbase/nf-winbase-lookupaccountnamew).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLookup {
    /// The SID of the account.
    pub sid: SecurityIdentifier,
    /// The domain where the account was found.
    pub domain: OsString,
    /// The raw SID type value.
    pub sid_type_raw: i32,
}

impl AccountLookup {
    /// Get the SID type as an enum.
    ///
    /// # Errors
    /// Return a [`TryFromPrimitiveError<SidType>`] error if the raw SID type value is unknown.
    #[inline]
    pub fn sid_type(&self) -> Result<SidType, TryFromPrimitiveError<SidType>> {
        SidType::try_from_primitive(self.sid_type_raw)
    }
}

/// Resolves an account name to its SID with `LookupAccountNameW`.
///
/// `account_name` accepts the forms understood by Windows: `DOMAIN\Name`,
/// a bare name, a UPN (`user@domain`) or a domain name alone.
/// `system_name` selects the machine doing the lookup, `None` for the local one.
///
/// # Errors
/// [`LookupError::NoneMapped`] when no account matches, or any other lookup failure.
///
/// # Examples
/// ```no_run
/// # #[cfg(windows)]
/// # {
/// use win_advapi_security::sid_lookup::lookup_account_name;
/// let lookup = lookup_account_name(None, "Everyone".as_ref()).unwrap();
/// assert_eq!(lookup.sid.to_string(), "S-1-1-0");
/// # }
/// ```
#[inline]
pub fn lookup_account_name(
    system_name: Option<&OsStr>,
    account_name: &OsStr,
) -> Result<AccountLookup, LookupError> {
    let system_name = machine_name_to_wide(system_name)?;
    let account_name =
        U16CString::from_os_str(account_name).map_err(|_| LookupError::InteriorNul)?;
    let system_ptr = system_name.as_deref().map_or(null(), U16CStr::as_ptr);

    let mut sid_len = 0u32;
    let mut domain_len = 0u32;
    let mut sid_type_raw = 0i32;
    // SAFETY: size query with null buffers; the strings outlive the call.
    let result = unsafe {
        LookupAccountNameW(
            system_ptr,
            account_name.as_ptr(),
            null_mut(),
            &raw mut sid_len,
            null_mut(),
            &raw mut domain_len,
            &raw mut sid_type_raw,
        )
    };
    if result == 0 {
        let error = Win32Error::last("LookupAccountNameW");
        if error.code() != ERROR_INSUFFICIENT_BUFFER {
            return Err(error.into());
        }
    }

    for _ in 0..MAX_FILL_ATTEMPTS {
        let mut sid_buffer = SmallVec::<[u8; MAX_SID_SIZE]>::from_elem(0, sid_len as usize);
        let mut domain_buffer = SmallVec::<[u16; 256]>::from_elem(0, domain_len as usize);
        // SAFETY: the buffers hold `sid_len` bytes and `domain_len` code units.
        let result = unsafe {
            LookupAccountNameW(
                system_ptr,
                account_name.as_ptr(),
                sid_buffer.as_mut_ptr().cast(),
                &raw mut sid_len,
                domain_buffer.as_mut_ptr(),
                &raw mut domain_len,
                &raw mut sid_type_raw,
            )
        };
        if result != 0 {
            domain_buffer.truncate(domain_len as usize);
            let size = sid_buffer
                .get(1)
                .copied()
                .and_then(SidSizeInfo::from_count)
                .map(SidSizeInfo::size)
                .ok_or(LookupError::InvalidSid)?;
            let sid_bytes = sid_buffer.get(..size).ok_or(LookupError::InvalidSid)?;
            let sid =
                SecurityIdentifier::from_bytes(sid_bytes).map_err(|_| LookupError::InvalidSid)?;
            return Ok(AccountLookup {
                sid,
                domain: OsString::from_wide(&domain_buffer),
                sid_type_raw,
            });
        }
        let error = Win32Error::last("LookupAccountNameW");
        if error.code() != ERROR_INSUFFICIENT_BUFFER {
            return Err(error.into());
        }
        log::trace!("LookupAccountNameW buffers grew to {sid_len}/{domain_len}");
    }
    Err(LookupError::Other(ERROR_INSUFFICIENT_BUFFER))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::well_known;

    #[test]
    fn resolves_well_known_groups() {
        let lookup = lookup_account_name(None, OsStr::new("SYSTEM")).unwrap();
        assert_eq!(lookup.sid, well_known::LOCAL_SYSTEM);
        assert_eq!(lookup.sid_type().unwrap(), SidType::WellKnownGroup);
    }

    #[test]
    fn unknown_account_is_none_mapped() {
        let error = lookup_account_name(None, OsStr::new("no-such-account-4f1c9d2e")).unwrap_err();
        assert_eq!(error, LookupError::NoneMapped);
    }

    #[test]
    fn interior_nul_is_rejected() {
        assert_eq!(
            lookup_account_name(None, OsStr::new("a\0b")),
            Err(LookupError::InteriorNul)
        );
    }
}
