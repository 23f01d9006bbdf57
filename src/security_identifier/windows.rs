use std::ffi::OsStr;

use widestring::U16CString;
use windows_sys::Win32::Foundation::ERROR_INVALID_SID;
use windows_sys::Win32::Security::Authorization::ConvertStringSidToSidW;

use super::SecurityIdentifier;
use crate::local_alloc::LocalBox;
use crate::sid_lookup::{LookupError, lookup_account_name};
use crate::{Sid, Win32Error};

impl SecurityIdentifier {
    /// Parses a SID with `ConvertStringSidToSidW`.
    ///
    /// Unlike [`FromStr`](core::str::FromStr) this also accepts the SDDL
    /// aliases of well-known SIDs, such as `BA` for `BUILTIN\Administrators`.
    ///
    /// # Errors
    /// The [`Win32Error`] of `ConvertStringSidToSidW`, `ERROR_INVALID_SID`
    /// for unparsable input.
    ///
    /// # Examples
    /// ```no_run
    /// # #[cfg(windows)]
    /// # {
    /// use win_advapi_security::{SecurityIdentifier, well_known};
    /// let admins = SecurityIdentifier::from_string_native("BA").unwrap();
    /// assert_eq!(admins, well_known::BUILTIN_ADMINISTRATORS);
    /// # }
    /// ```
    #[inline]
    pub fn from_string_native(s: &str) -> Result<Self, Win32Error> {
        let wide = U16CString::from_str(s)
            .map_err(|_| Win32Error::from_code("ConvertStringSidToSidW", ERROR_INVALID_SID))?;
        let mut raw_sid = core::ptr::null_mut();
        // SAFETY: `wide` is NUL-terminated and `raw_sid` a valid out-parameter.
        let ok = unsafe { ConvertStringSidToSidW(wide.as_ptr(), &raw mut raw_sid) };
        if ok == 0 {
            return Err(Win32Error::last("ConvertStringSidToSidW"));
        }
        // SAFETY: on success the SID is a `LocalAlloc`ed block we now own.
        let owned = unsafe { LocalBox::from_raw(raw_sid) }
            .ok_or_else(|| Win32Error::from_code("ConvertStringSidToSidW", 0))?;
        // SAFETY: the system allocation is a valid, aligned SID alive until `owned` drops.
        let sid = unsafe { Sid::from_raw(owned.as_ptr()) };
        Ok(sid.into())
    }

    /// Resolves an account name to its SID on the local machine.
    ///
    /// # Errors
    /// See [`lookup_account_name`].
    #[inline]
    pub fn from_account_name<S: AsRef<OsStr>>(account_name: S) -> Result<Self, LookupError> {
        lookup_account_name(None, account_name.as_ref()).map(|lookup| lookup.sid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::well_known;

    #[test]
    fn sddl_aliases() {
        assert_eq!(
            SecurityIdentifier::from_string_native("BA").unwrap(),
            well_known::BUILTIN_ADMINISTRATORS
        );
        assert_eq!(
            SecurityIdentifier::from_string_native("WD").unwrap(),
            well_known::WORLD
        );
    }

    #[test]
    fn invalid_string() {
        let error = SecurityIdentifier::from_string_native("not a sid").unwrap_err();
        assert_eq!(error.code(), ERROR_INVALID_SID);
        assert_eq!(error.function(), "ConvertStringSidToSidW");
    }

    #[test]
    fn from_account_name_everyone() {
        let sid = SecurityIdentifier::from_account_name("Everyone");
        // The group name is localized, only English systems resolve it.
        if let Ok(sid) = sid {
            assert_eq!(sid, well_known::WORLD);
        }
    }
}
