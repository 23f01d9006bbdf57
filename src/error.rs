//! Win32 failure reporting.
//!
//! Every binding follows the `BOOL` convention of advapi32: a zero return
//! means failure and the reason is fetched with `GetLastError`. The code is
//! kept as is, tagged with the entry point that produced it.

use core::fmt;
use core::num::NonZeroU32;

/// `ERROR_GEN_FAILURE`, reported when a call fails without setting a last error.
const UNKNOWN_FAILURE: NonZeroU32 = match NonZeroU32::new(31) {
    Some(code) => code,
    None => unreachable!(),
};

/// A failed Win32 call: the entry point name and its `GetLastError` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Win32Error {
    function: &'static str,
    code: NonZeroU32,
}

impl Win32Error {
    /// Wraps a known code.
    #[inline]
    #[must_use]
    pub const fn new(function: &'static str, code: NonZeroU32) -> Self {
        Self { function, code }
    }

    /// Wraps a raw code, `0` is mapped to `ERROR_GEN_FAILURE`.
    #[inline]
    #[must_use]
    pub const fn from_code(function: &'static str, code: u32) -> Self {
        match NonZeroU32::new(code) {
            Some(code) => Self::new(function, code),
            None => Self::new(function, UNKNOWN_FAILURE),
        }
    }

    /// Captures the calling thread's last error for `function`.
    ///
    /// Must run right after the failing call, before anything that may
    /// overwrite the last error (including logging).
    #[cfg(all(windows, feature = "std"))]
    #[inline]
    #[must_use]
    pub fn last(function: &'static str) -> Self {
        // SAFETY: GetLastError only reads thread-local state.
        let code = unsafe { windows_sys::Win32::Foundation::GetLastError() };
        let error = Self::from_code(function, code);
        log::debug!("{error}");
        error
    }

    /// Name of the entry point that failed.
    #[inline]
    #[must_use]
    pub const fn function(&self) -> &'static str {
        self.function
    }

    /// The Win32 error code.
    #[inline]
    #[must_use]
    pub const fn code(&self) -> u32 {
        self.code.get()
    }
}

impl fmt::Display for Win32Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed (error {})", self.function, self.code)
    }
}

impl core::error::Error for Win32Error {}

#[cfg(all(windows, feature = "std"))]
impl From<Win32Error> for std::io::Error {
    #[inline]
    fn from(value: Win32Error) -> Self {
        #[expect(
            clippy::cast_possible_wrap,
            reason = "Win32 error codes are below 2^16"
        )]
        let code = value.code() as i32;
        Self::from_raw_os_error(code)
    }
}

#[cfg(all(windows, feature = "std", feature = "windows_result"))]
impl From<Win32Error> for windows_result::HRESULT {
    #[inline]
    fn from(value: Win32Error) -> Self {
        Self::from_win32(value.code())
    }
}

#[cfg(all(windows, feature = "std", feature = "windows_result"))]
impl From<Win32Error> for windows_result::Error {
    #[inline]
    fn from(value: Win32Error) -> Self {
        Self::from_hresult(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_entry_point() {
        let error = Win32Error::from_code("LogonUserW", 1326);
        assert_eq!(error.to_string(), "LogonUserW failed (error 1326)");
        assert_eq!(error.function(), "LogonUserW");
        assert_eq!(error.code(), 1326);
    }

    #[test]
    fn zero_is_not_success() {
        assert_eq!(Win32Error::from_code("RevertToSelf", 0).code(), 31);
    }

    #[cfg(all(windows, feature = "std"))]
    #[test]
    fn io_error_keeps_the_code() {
        let io: std::io::Error = Win32Error::from_code("OpenProcessToken", 5).into();
        assert_eq!(io.raw_os_error(), Some(5));
        assert_eq!(io.kind(), std::io::ErrorKind::PermissionDenied);
    }
}
