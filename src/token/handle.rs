use core::ptr;
use std::os::windows::io::{
    AsHandle, AsRawHandle, BorrowedHandle, FromRawHandle, OwnedHandle, RawHandle,
};

use widestring::U16CString;
use windows_sys::Win32::Foundation::{ERROR_NO_TOKEN, HANDLE};
use windows_sys::Win32::Security::{DuplicateToken, LogonUserW};
use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, GetCurrentThread, OpenProcessToken, OpenThreadToken,
};
use zeroize::Zeroizing;

use super::{ImpersonationLevel, LogonRequest, TokenAccess, TokenError};
use crate::Win32Error;

/// An access token, closed with `CloseHandle` on drop.
///
/// # Examples
/// ```no_run
/// # #[cfg(windows)]
/// # {
/// use win_advapi_security::{Token, TokenAccess};
///
/// let token = Token::current_process(TokenAccess::QUERY).unwrap();
/// println!("running as {}", token.user().unwrap());
/// # }
/// ```
#[derive(Debug)]
pub struct Token {
    handle: OwnedHandle,
}

impl Token {
    /// Takes ownership of a handle written by a successful API call.
    ///
    /// # Safety
    /// `raw` must be an open token handle owned by the caller.
    unsafe fn from_output(raw: HANDLE) -> Self {
        // SAFETY: precondition of this function.
        let handle = unsafe { OwnedHandle::from_raw_handle(raw) };
        Self { handle }
    }

    /// Opens the token of `process` (`OpenProcessToken`).
    ///
    /// # Errors
    /// [`TokenError::OpenTokenFailed`], e.g. `ERROR_ACCESS_DENIED`.
    #[inline]
    pub fn open_process(process: BorrowedHandle<'_>, access: TokenAccess) -> Result<Self, TokenError> {
        let mut raw: HANDLE = ptr::null_mut();
        // SAFETY: `process` is a live handle and `raw` a valid out-parameter.
        let ok = unsafe { OpenProcessToken(process.as_raw_handle(), access.bits(), &raw mut raw) };
        if ok == 0 {
            return Err(TokenError::OpenTokenFailed(Win32Error::last("OpenProcessToken")));
        }
        // SAFETY: on success `raw` is a token handle we own.
        Ok(unsafe { Self::from_output(raw) })
    }

    /// Opens the token of the calling process.
    ///
    /// # Errors
    /// See [`Token::open_process`].
    #[inline]
    pub fn current_process(access: TokenAccess) -> Result<Self, TokenError> {
        // SAFETY: the pseudo handle of the current process is always valid
        // and does not need to be closed.
        let process = unsafe { BorrowedHandle::borrow_raw(GetCurrentProcess()) };
        Self::open_process(process, access)
    }

    /// Opens the impersonation token of `thread` (`OpenThreadToken`).
    ///
    /// With `open_as_self` the access check uses the process security
    /// context instead of the impersonated one.
    ///
    /// Returns `Ok(None)` when the thread does not impersonate.
    ///
    /// # Errors
    /// [`TokenError::OpenTokenFailed`] for any failure but `ERROR_NO_TOKEN`.
    #[inline]
    pub fn open_thread(
        thread: BorrowedHandle<'_>,
        access: TokenAccess,
        open_as_self: bool,
    ) -> Result<Option<Self>, TokenError> {
        let mut raw: HANDLE = ptr::null_mut();
        // SAFETY: `thread` is a live handle and `raw` a valid out-parameter.
        let ok = unsafe {
            OpenThreadToken(
                thread.as_raw_handle(),
                access.bits(),
                i32::from(open_as_self),
                &raw mut raw,
            )
        };
        if ok == 0 {
            let error = Win32Error::last("OpenThreadToken");
            if error.code() == ERROR_NO_TOKEN {
                return Ok(None);
            }
            return Err(TokenError::OpenTokenFailed(error));
        }
        // SAFETY: on success `raw` is a token handle we own.
        Ok(Some(unsafe { Self::from_output(raw) }))
    }

    /// Opens the impersonation token of the calling thread, if any.
    ///
    /// # Errors
    /// See [`Token::open_thread`].
    #[inline]
    pub fn current_thread(access: TokenAccess, open_as_self: bool) -> Result<Option<Self>, TokenError> {
        // SAFETY: the pseudo handle of the current thread is always valid
        // and does not need to be closed.
        let thread = unsafe { BorrowedHandle::borrow_raw(GetCurrentThread()) };
        Self::open_thread(thread, access, open_as_self)
    }

    /// The token the calling thread runs with: its impersonation token when
    /// it impersonates, the process token otherwise.
    ///
    /// # Errors
    /// See [`Token::open_thread`] and [`Token::open_process`].
    #[inline]
    pub fn effective(access: TokenAccess) -> Result<Self, TokenError> {
        match Self::current_thread(access, true)? {
            Some(token) => Ok(token),
            None => Self::current_process(access),
        }
    }

    /// Logs a user on the local computer (`LogonUserW`).
    ///
    /// Network logons return an impersonation token, the others a primary
    /// token.
    ///
    /// # Errors
    /// [`TokenError::InteriorNul`] when a field cannot be encoded,
    /// [`TokenError::LogonFailed`] otherwise (e.g. `ERROR_LOGON_FAILURE`).
    pub fn logon_user(request: &LogonRequest) -> Result<Self, TokenError> {
        let user =
            U16CString::from_str(request.user()).map_err(|_| TokenError::InteriorNul("user name"))?;
        let domain = request
            .domain_name()
            .map(U16CString::from_str)
            .transpose()
            .map_err(|_| TokenError::InteriorNul("domain"))?;
        let mut password: Zeroizing<Vec<u16>> =
            Zeroizing::new(request.password().encode_utf16().collect());
        if password.contains(&0) {
            return Err(TokenError::InteriorNul("password"));
        }
        password.push(0);

        log::trace!(
            "LogonUserW {}\\{} ({:?}, {:?})",
            request.domain_name().unwrap_or_default(),
            request.user(),
            request.get_logon_type(),
            request.get_provider()
        );
        let mut raw: HANDLE = ptr::null_mut();
        // SAFETY: the strings are NUL-terminated and outlive the call, `raw`
        // is a valid out-parameter.
        let ok = unsafe {
            LogonUserW(
                user.as_ptr(),
                domain.as_ref().map_or(ptr::null(), |domain| domain.as_ptr()),
                password.as_ptr(),
                request.get_logon_type().into(),
                request.get_provider().into(),
                &raw mut raw,
            )
        };
        if ok == 0 {
            return Err(TokenError::LogonFailed(Win32Error::last("LogonUserW")));
        }
        // SAFETY: on success `raw` is a token handle we own.
        Ok(unsafe { Self::from_output(raw) })
    }

    /// Creates an impersonation token duplicating this one (`DuplicateToken`).
    ///
    /// Requires [`TokenAccess::DUPLICATE`].
    ///
    /// # Errors
    /// [`TokenError::DuplicateFailed`].
    #[inline]
    pub fn duplicate(&self, level: ImpersonationLevel) -> Result<Self, TokenError> {
        let mut raw: HANDLE = ptr::null_mut();
        // SAFETY: `self` owns a live token handle and `raw` is a valid out-parameter.
        let ok = unsafe { DuplicateToken(self.as_raw_handle(), level.into(), &raw mut raw) };
        if ok == 0 {
            return Err(TokenError::DuplicateFailed(Win32Error::last("DuplicateToken")));
        }
        // SAFETY: on success `raw` is a token handle we own.
        Ok(unsafe { Self::from_output(raw) })
    }
}

impl AsHandle for Token {
    #[inline]
    fn as_handle(&self) -> BorrowedHandle<'_> {
        self.handle.as_handle()
    }
}

impl AsRawHandle for Token {
    #[inline]
    fn as_raw_handle(&self) -> RawHandle {
        self.handle.as_raw_handle()
    }
}

impl From<OwnedHandle> for Token {
    /// Wraps a handle the caller knows to be an access token.
    #[inline]
    fn from(handle: OwnedHandle) -> Self {
        Self { handle }
    }
}

impl From<Token> for OwnedHandle {
    #[inline]
    fn from(token: Token) -> Self {
        token.handle
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::TokenType;

    #[test]
    fn process_token() {
        let token = Token::current_process(TokenAccess::QUERY).unwrap();
        assert_eq!(token.token_type().unwrap(), TokenType::Primary);
    }

    #[test]
    fn thread_without_impersonation_has_no_token() {
        assert!(Token::current_thread(TokenAccess::QUERY, true).unwrap().is_none());
        let effective = Token::effective(TokenAccess::QUERY).unwrap();
        assert_eq!(effective.token_type().unwrap(), TokenType::Primary);
    }

    #[test]
    fn duplicate_gives_an_impersonation_token() {
        let token = Token::current_process(TokenAccess::DUPLICATE | TokenAccess::QUERY).unwrap();
        let duplicate = token.duplicate(ImpersonationLevel::Identification).unwrap();
        assert_eq!(duplicate.token_type().unwrap(), TokenType::Impersonation);
        assert_eq!(
            duplicate.impersonation_level().unwrap(),
            ImpersonationLevel::Identification
        );
    }

    #[test]
    fn duplicate_needs_access() {
        let token = Token::current_process(TokenAccess::QUERY).unwrap();
        let error = token.duplicate(ImpersonationLevel::Impersonation).unwrap_err();
        assert!(matches!(error, TokenError::DuplicateFailed(_)));
        assert_eq!(error.win32().map(|e| e.code()), Some(5));
    }

    #[test]
    fn logon_rejects_nul() {
        let request = LogonRequest::new("alice", "pass\0word");
        assert_eq!(
            Token::logon_user(&request).unwrap_err(),
            TokenError::InteriorNul("password")
        );
    }

    #[test]
    fn logon_with_bad_credentials() {
        let request = LogonRequest::new("no-such-user-0f3a9c", "wrong").domain(".");
        let error = Token::logon_user(&request).unwrap_err();
        assert!(matches!(error, TokenError::LogonFailed(_)));
    }

    #[test]
    fn handle_round_trip() {
        let token = Token::current_process(TokenAccess::QUERY).unwrap();
        let raw = token.as_raw_handle();
        let handle = OwnedHandle::from(token);
        assert_eq!(handle.as_raw_handle(), raw);
        let token = Token::from(handle);
        assert!(token.user().is_ok());
    }
}
