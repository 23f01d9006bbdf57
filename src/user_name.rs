use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use smallvec::SmallVec;
use windows_sys::Win32::Foundation::ERROR_INSUFFICIENT_BUFFER;
use windows_sys::Win32::System::WindowsProgramming::GetUserNameW;

use crate::Win32Error;
use crate::sid_lookup::MAX_FILL_ATTEMPTS;

/// `UNLEN + 1`: longest user name plus the terminating NUL.
const USER_NAME_CAPACITY: u32 = 257;

/// Name of the user associated with the calling thread (`GetUserNameW`).
///
/// When the thread impersonates, this is the impersonated user.
///
/// # Errors
/// The [`Win32Error`] of `GetUserNameW`.
///
/// # Examples
/// ```no_run
/// # #[cfg(windows)]
/// # {
/// let name = win_advapi_security::current_user_name().unwrap();
/// assert!(!name.is_empty());
/// # }
/// ```
#[inline]
pub fn current_user_name() -> Result<OsString, Win32Error> {
    let mut len = USER_NAME_CAPACITY;
    for _ in 0..MAX_FILL_ATTEMPTS {
        let mut buffer = SmallVec::<[u16; USER_NAME_CAPACITY as usize]>::from_elem(0, len as usize);
        // SAFETY: `buffer` holds `len` code units, the size passed in.
        let ok = unsafe { GetUserNameW(buffer.as_mut_ptr(), &raw mut len) };
        if ok != 0 {
            // On success `len` counts the terminating NUL.
            buffer.truncate(len.saturating_sub(1) as usize);
            return Ok(OsString::from_wide(&buffer));
        }
        let error = Win32Error::last("GetUserNameW");
        if error.code() != ERROR_INSUFFICIENT_BUFFER {
            return Err(error);
        }
        log::trace!("GetUserNameW needs {len} code units");
    }
    Err(Win32Error::from_code("GetUserNameW", ERROR_INSUFFICIENT_BUFFER))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use std::os::windows::ffi::OsStrExt;

    #[test]
    fn name_has_no_nul() {
        let name = current_user_name().unwrap();
        assert!(!name.is_empty());
        assert!(name.encode_wide().all(|unit| unit != 0));
    }
}
