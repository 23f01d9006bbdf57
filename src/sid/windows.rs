use std::ffi::OsStr;

use widestring::U16CStr;
use windows_sys::Win32::Security::Authorization::ConvertSidToStringSidW;
use windows_sys::Win32::Security::{GetLengthSid, IsValidSid, PSID};

use crate::local_alloc::LocalBox;
use crate::sid_lookup::{LookupError, SidLookup, SidLookupOperation, SidType, machine_name_to_wide};
use crate::Win32Error;

use super::Sid;

impl Sid {
    /// Creates a reference to a `Sid` from a raw `PSID` pointer.
    ///
    /// # Safety
    /// The `raw` pointer must point to a valid, 4-byte aligned SID and live at
    /// least as long as the returned reference.
    #[inline]
    pub const unsafe fn from_raw<'a>(raw: PSID) -> &'a Self {
        // Safety: Same precondition as the public API.
        unsafe { Self::from_raw_internal(raw.cast_const().cast::<()>()) }
    }

    /// Returns the underlying raw `PSID` pointer.
    ///
    /// The APIs taking a `PSID` input do not write through it.
    #[inline]
    #[must_use]
    pub const fn as_raw(&self) -> PSID {
        core::ptr::from_ref(self).cast_mut().cast()
    }

    /// `IsValidSid` on this SID. Agrees with [`Sid::is_valid`].
    #[inline]
    #[must_use]
    pub fn is_valid_native(&self) -> bool {
        // SAFETY: `self` is a readable SID for the duration of the call.
        unsafe { IsValidSid(self.as_raw()) != 0 }
    }

    /// `GetLengthSid` on this SID. Agrees with [`Sid::len_bytes`].
    #[inline]
    #[must_use]
    pub fn native_len(&self) -> u32 {
        // SAFETY: `self` is a valid SID (checked by every constructor).
        unsafe { GetLengthSid(self.as_raw()) }
    }

    /// String form produced by `ConvertSidToStringSidW`.
    ///
    /// # Errors
    /// The [`Win32Error`] of `ConvertSidToStringSidW` (e.g. out of memory).
    #[inline]
    pub fn to_string_native(&self) -> Result<String, Win32Error> {
        let mut raw_string = core::ptr::null_mut::<u16>();
        // SAFETY: `raw_string` is a valid out-parameter, the SID is only read.
        let ok = unsafe { ConvertSidToStringSidW(self.as_raw(), &raw mut raw_string) };
        if ok == 0 {
            return Err(Win32Error::last("ConvertSidToStringSidW"));
        }
        // SAFETY: on success the pointer is a `LocalAlloc`ed string we now own.
        let owned = unsafe { LocalBox::from_raw(raw_string) }
            .ok_or_else(|| Win32Error::from_code("ConvertSidToStringSidW", 0))?;
        // SAFETY: the buffer is a NUL-terminated UTF-16 string.
        let wide = unsafe { U16CStr::from_ptr_str(owned.as_ptr()) };
        Ok(wide.to_string_lossy())
    }

    fn lookup_impl(&self, machine: Option<&OsStr>) -> Result<SidLookup, LookupError> {
        let machine = machine_name_to_wide(machine)?;
        SidLookupOperation::new(self, machine.as_deref())?.process()
    }

    fn sid_type_impl(&self, machine: Option<&OsStr>) -> Result<SidType, LookupError> {
        let lookup = self.lookup_impl(machine)?;
        Ok(lookup.sid_type().unwrap_or(SidType::Unknown))
    }

    /// Checks if this SID is known on the local machine.
    #[inline]
    #[must_use]
    pub fn is_known_local_sid(&self) -> bool {
        self.sid_type_impl(None).is_ok()
    }

    /// Checks if this SID is known on a remote machine.
    #[inline]
    #[must_use]
    pub fn is_known_remote_sid<S: AsRef<OsStr>>(&self, machine_name: S) -> bool {
        self.sid_type_impl(Some(machine_name.as_ref())).is_ok()
    }

    /// Resolves `DOMAIN\Name` of this SID on the local machine.
    ///
    /// # Errors
    /// [`LookupError::NoneMapped`] for unknown SIDs, or any other lookup failure.
    #[inline]
    pub fn lookup_local_sid(&self) -> Result<SidLookup, LookupError> {
        self.lookup_impl(None)
    }

    /// Resolves `DOMAIN\Name` of this SID on a remote machine.
    ///
    /// # Errors
    /// See [`Sid::lookup_local_sid`].
    #[inline]
    pub fn lookup_remote_sid<S: AsRef<OsStr>>(
        &self,
        machine_name: S,
    ) -> Result<SidLookup, LookupError> {
        self.lookup_impl(Some(machine_name.as_ref()))
    }

    /// Returns the `SidType` of this SID on the local machine.
    /// Unknown raw values map to [`SidType::Unknown`].
    ///
    /// # Errors
    /// See [`Sid::lookup_local_sid`].
    #[inline]
    pub fn local_sid_type(&self) -> Result<SidType, LookupError> {
        self.sid_type_impl(None)
    }

    /// Returns the `SidType` of this SID on a remote machine.
    ///
    /// # Errors
    /// See [`Sid::lookup_local_sid`].
    #[inline]
    pub fn remote_sid_type<S: AsRef<OsStr>>(&self, machine_name: S) -> Result<SidType, LookupError> {
        self.sid_type_impl(Some(machine_name.as_ref()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::{SecurityIdentifier, arb_security_identifier, well_known};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn native_checks_agree(sid in arb_security_identifier()) {
            prop_assert!(sid.is_valid_native());
            prop_assert_eq!(sid.native_len() as usize, sid.len_bytes());
        }

        #[test]
        fn native_string_matches_display(sid in arb_security_identifier()) {
            prop_assert_eq!(sid.to_string_native().unwrap(), sid.to_string());
        }

        #[test]
        fn native_parse_matches_from_str(sid in arb_security_identifier()) {
            let native = SecurityIdentifier::from_string_native(&sid.to_string()).unwrap();
            prop_assert_eq!(native, sid);
        }
    }

    #[test]
    fn lookup_builtin_administrators() {
        let lookup = well_known::BUILTIN_ADMINISTRATORS
            .as_sid()
            .lookup_local_sid()
            .unwrap();
        assert_eq!(lookup.sid_type().unwrap(), SidType::Alias);
        assert_eq!(
            well_known::BUILTIN_ADMINISTRATORS.as_sid().local_sid_type(),
            Ok(SidType::Alias)
        );
    }

    #[test]
    fn unknown_domain_sid_is_not_known() {
        let sid: SecurityIdentifier = "S-1-5-21-1-2-3-4242".parse().unwrap();
        assert!(!sid.is_known_local_sid());
        assert!(sid.lookup_local_sid().is_err());
    }
}
