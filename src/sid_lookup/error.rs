use core::num::NonZeroU32;

use thiserror::Error;
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_BAD_NETPATH, ERROR_INVALID_ACCOUNT_NAME, ERROR_INVALID_PARAMETER,
    ERROR_INVALID_SID, ERROR_NO_SUCH_DOMAIN, ERROR_NONE_MAPPED, ERROR_TRUSTED_DOMAIN_FAILURE,
};

use crate::Win32Error;

/// Errors returned by `LookupAccountSidW` and `LookupAccountNameW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LookupError {
    /// The SID is syntactically invalid.
    #[error("The SID is invalid")]
    InvalidSid,
    /// One or more parameters are invalid.
    #[error("Invalid lookup parameter")]
    InvalidParameter,
    /// The account name is syntactically invalid.
    #[error("The account name is invalid")]
    InvalidAccountName,
    /// No mapping between account names and security IDs was done.
    #[error("No account is mapped to the lookup input")]
    NoneMapped,
    /// Access denied while performing the lookup.
    #[error("Access denied")]
    AccessDenied,
    /// The specified computer name (server) could not be found/reached.
    #[error("The network path was not found")]
    NetworkPathNotFound,
    /// The specified domain either does not exist or could not be contacted.
    #[error("The domain does not exist or could not be contacted")]
    NoSuchDomain,
    /// Trust relationship issues with the domain.
    #[error("The trust relationship with the domain failed")]
    TrustedRelationshipFailure,
    /// An input string contains a NUL and cannot be passed to the API.
    #[error("Lookup input contains an interior NUL")]
    InteriorNul,
    /// Any other Win32 error code.
    #[error("Lookup failed (error {0})")]
    Other(u32),
}

impl From<NonZeroU32> for LookupError {
    #[inline]
    fn from(code: NonZeroU32) -> Self {
        match code.get() {
            ERROR_INVALID_SID => Self::InvalidSid,
            ERROR_INVALID_PARAMETER => Self::InvalidParameter,
            ERROR_INVALID_ACCOUNT_NAME => Self::InvalidAccountName,
            ERROR_NONE_MAPPED => Self::NoneMapped,
            ERROR_ACCESS_DENIED => Self::AccessDenied,
            ERROR_BAD_NETPATH => Self::NetworkPathNotFound,
            ERROR_NO_SUCH_DOMAIN => Self::NoSuchDomain,
            ERROR_TRUSTED_DOMAIN_FAILURE => Self::TrustedRelationshipFailure,
            other => Self::Other(other),
        }
    }
}

impl From<Win32Error> for LookupError {
    #[inline]
    fn from(error: Win32Error) -> Self {
        NonZeroU32::new(error.code()).map_or(Self::Other(0), Self::from)
    }
}

impl From<LookupError> for u32 {
    #[inline]
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::InvalidSid => ERROR_INVALID_SID,
            LookupError::InvalidParameter | LookupError::InteriorNul => ERROR_INVALID_PARAMETER,
            LookupError::InvalidAccountName => ERROR_INVALID_ACCOUNT_NAME,
            LookupError::NoneMapped => ERROR_NONE_MAPPED,
            LookupError::AccessDenied => ERROR_ACCESS_DENIED,
            LookupError::NetworkPathNotFound => ERROR_BAD_NETPATH,
            LookupError::NoSuchDomain => ERROR_NO_SUCH_DOMAIN,
            LookupError::TrustedRelationshipFailure => ERROR_TRUSTED_DOMAIN_FAILURE,
            LookupError::Other(other) => other,
        }
    }
}

#[cfg(feature = "windows_result")]
impl From<LookupError> for windows_result::HRESULT {
    #[inline]
    fn from(value: LookupError) -> Self {
        Self::from_win32(value.into())
    }
}

#[cfg(feature = "windows_result")]
impl From<LookupError> for windows_result::Error {
    #[inline]
    fn from(value: LookupError) -> Self {
        Self::from_hresult(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in [
            ERROR_INVALID_SID,
            ERROR_INVALID_PARAMETER,
            ERROR_INVALID_ACCOUNT_NAME,
            ERROR_NONE_MAPPED,
            ERROR_ACCESS_DENIED,
            ERROR_BAD_NETPATH,
            ERROR_NO_SUCH_DOMAIN,
            ERROR_TRUSTED_DOMAIN_FAILURE,
            1234,
        ] {
            let error = LookupError::from(Win32Error::from_code("LookupAccountSidW", code));
            assert_eq!(u32::from(error), code);
        }
    }
}
