use thiserror::Error;

use super::TokenInformationClass;
use crate::Win32Error;

/// Errors that can occur when acquiring, querying or using an access token.
///
/// Each variant corresponds to a specific failure point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// `OpenProcessToken` or `OpenThreadToken` failed.
    #[error("cannot open the token: {0}")]
    OpenTokenFailed(Win32Error),

    /// `LogonUserW` failed, e.g. `ERROR_LOGON_FAILURE` for bad credentials.
    #[error("logon failed: {0}")]
    LogonFailed(Win32Error),

    /// `DuplicateToken` failed.
    #[error("cannot duplicate the token: {0}")]
    DuplicateFailed(Win32Error),

    /// `GetTokenInformation` did not fail as expected when called with a
    /// zero-size buffer, so the required size could not be determined.
    #[error("failed to determine the {0} buffer size")]
    GetTokenSizeFailed(TokenInformationClass),

    /// `GetTokenInformation` failed.
    #[error("cannot query the token: {0}")]
    GetTokenInfoFailed(Win32Error),

    /// The returned information is shorter than its structure or holds an
    /// unknown value.
    #[error("malformed {class} information ({len} bytes)")]
    MalformedInformation {
        /// Queried class.
        class: TokenInformationClass,
        /// Bytes returned by the system.
        len: usize,
    },

    /// `ImpersonateLoggedOnUser` failed.
    #[error("cannot impersonate: {0}")]
    ImpersonateFailed(Win32Error),

    /// `RevertToSelf` failed, the thread still impersonates.
    #[error("cannot revert to self: {0}")]
    RevertFailed(Win32Error),

    /// A string argument contains a NUL character and cannot be passed to Windows.
    #[error("the {0} contains a NUL character")]
    InteriorNul(&'static str),
}

impl TokenError {
    /// The underlying Win32 failure, if any.
    #[inline]
    #[must_use]
    pub const fn win32(&self) -> Option<Win32Error> {
        match *self {
            Self::OpenTokenFailed(error)
            | Self::LogonFailed(error)
            | Self::DuplicateFailed(error)
            | Self::GetTokenInfoFailed(error)
            | Self::ImpersonateFailed(error)
            | Self::RevertFailed(error) => Some(error),
            Self::GetTokenSizeFailed(_)
            | Self::MalformedInformation { .. }
            | Self::InteriorNul(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let error = TokenError::LogonFailed(Win32Error::from_code("LogonUserW", 1326));
        assert_eq!(error.to_string(), "logon failed: LogonUserW failed (error 1326)");
        assert_eq!(error.win32().map(|e| e.code()), Some(1326));

        let error = TokenError::MalformedInformation {
            class: TokenInformationClass::User,
            len: 4,
        };
        assert_eq!(error.to_string(), "malformed TokenUser information (4 bytes)");
        assert_eq!(error.win32(), None);

        assert_eq!(
            TokenError::InteriorNul("password").to_string(),
            "the password contains a NUL character"
        );
    }
}
