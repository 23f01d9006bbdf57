use super::{LookupError, MAX_FILL_ATTEMPTS, SidLookup};
use crate::{DomainAndName, Sid, Win32Error};
use core::ptr::{null, null_mut};
use smallvec::SmallVec;
use std::{ffi::OsString, os::windows::ffi::OsStringExt};
use widestring::U16CStr;
use windows_sys::Win32::Foundation::ERROR_INSUFFICIENT_BUFFER;
use windows_sys::Win32::Security::LookupAccountSidW;

/// A `LookupAccountSidW` whose size query has been done.
pub(crate) struct SidLookupOperation<'a> {
    sid: &'a Sid,
    machine_name: Option<&'a U16CStr>,
    name_len: u32,
    domain_len: u32,
    sid_type_raw: i32,
}

impl<'a> SidLookupOperation<'a> {
    /// Runs the size query, which also reports the SID type.
    pub fn new(sid: &'a Sid, machine_name: Option<&'a U16CStr>) -> Result<Self, LookupError> {
        let mut name_len = 0u32;
        let mut domain_len = 0u32;
        let mut sid_type_raw = 0i32;

        // SAFETY: null buffers with zero sizes is the documented size query,
        // the SID and machine name outlive the call.
        let result = unsafe {
            LookupAccountSidW(
                machine_name.map_or(null(), U16CStr::as_ptr),
                sid.as_raw(),
                null_mut(),
                &raw mut name_len,
                null_mut(),
                &raw mut domain_len,
                &raw mut sid_type_raw,
            )
        };
        if result == 0 {
            let error = Win32Error::last("LookupAccountSidW");
            if error.code() != ERROR_INSUFFICIENT_BUFFER {
                return Err(error.into());
            }
        }

        Ok(Self {
            sid,
            machine_name,
            name_len,
            domain_len,
            sid_type_raw,
        })
    }

    /// Fills the name and domain buffers.
    pub fn process(mut self) -> Result<SidLookup, LookupError> {
        for _ in 0..MAX_FILL_ATTEMPTS {
            let mut name_buffer = SmallVec::<[u16; 256]>::from_elem(0, self.name_len as usize);
            let mut domain_buffer =
                SmallVec::<[u16; 256]>::from_elem(0, self.domain_len as usize);
            // SAFETY: the buffers hold `name_len` and `domain_len` code units,
            // the sizes passed to the API.
            let result = unsafe {
                LookupAccountSidW(
                    self.machine_name.map_or(null(), U16CStr::as_ptr),
                    self.sid.as_raw(),
                    name_buffer.as_mut_ptr(),
                    &raw mut self.name_len,
                    domain_buffer.as_mut_ptr(),
                    &raw mut self.domain_len,
                    &raw mut self.sid_type_raw,
                )
            };
            if result != 0 {
                // On success the sizes exclude the terminating NUL.
                name_buffer.truncate(self.name_len as usize);
                domain_buffer.truncate(self.domain_len as usize);
                let name = OsString::from_wide(&name_buffer);
                let domain = OsString::from_wide(&domain_buffer);
                return Ok(SidLookup {
                    domain_name: DomainAndName::new(domain, name),
                    sid_type_raw: self.sid_type_raw,
                });
            }
            let error = Win32Error::last("LookupAccountSidW");
            if error.code() != ERROR_INSUFFICIENT_BUFFER {
                return Err(error.into());
            }
            log::trace!(
                "LookupAccountSidW buffers grew to {}/{}",
                self.name_len,
                self.domain_len
            );
        }
        Err(LookupError::Other(ERROR_INSUFFICIENT_BUFFER))
    }
}
