use core::marker::PhantomData;
use std::os::windows::io::AsRawHandle;

use windows_sys::Win32::Security::{ImpersonateLoggedOnUser, RevertToSelf};

use super::{Token, TokenError};
use crate::Win32Error;

/// Stops any impersonation of the calling thread (`RevertToSelf`).
///
/// Succeeds when the thread does not impersonate.
///
/// # Errors
/// [`TokenError::RevertFailed`].
#[inline]
pub fn revert_to_self() -> Result<(), TokenError> {
    // SAFETY: no arguments, only affects the calling thread.
    if unsafe { RevertToSelf() } == 0 {
        return Err(TokenError::RevertFailed(Win32Error::last("RevertToSelf")));
    }
    Ok(())
}

/// The calling thread impersonates a token while this guard lives.
///
/// Dropping the guard reverts the thread to its own security context. A
/// failure there is logged since `Drop` cannot report it; call
/// [`Impersonation::revert`] to handle it. The guard is neither `Send` nor
/// `Sync`: impersonation belongs to the thread that started it.
#[derive(Debug)]
#[must_use = "the impersonation ends when the guard is dropped"]
pub struct Impersonation {
    active: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl Impersonation {
    /// Ends the impersonation.
    ///
    /// # Errors
    /// [`TokenError::RevertFailed`], the thread keeps impersonating.
    #[inline]
    pub fn revert(mut self) -> Result<(), TokenError> {
        self.active = false;
        revert_to_self()
    }
}

impl Drop for Impersonation {
    fn drop(&mut self) {
        if self.active {
            if let Err(error) = revert_to_self() {
                log::error!("impersonation not reverted: {error}");
            }
        }
    }
}

impl Token {
    /// Makes the calling thread impersonate this token
    /// (`ImpersonateLoggedOnUser`).
    ///
    /// The token needs [`TokenAccess::QUERY`](crate::TokenAccess::QUERY) and
    /// [`TokenAccess::DUPLICATE`](crate::TokenAccess::DUPLICATE), or
    /// [`TokenAccess::IMPERSONATE`](crate::TokenAccess::IMPERSONATE) for
    /// impersonation tokens. The token can be dropped while the guard lives.
    ///
    /// # Errors
    /// [`TokenError::ImpersonateFailed`].
    ///
    /// # Examples
    /// ```no_run
    /// # #[cfg(windows)]
    /// # {
    /// use win_advapi_security::{LogonRequest, Token};
    ///
    /// let token = Token::logon_user(&LogonRequest::new("alice", "secret").domain(".")).unwrap();
    /// let guard = token.impersonate().unwrap();
    /// // ... access resources as alice ...
    /// guard.revert().unwrap();
    /// # }
    /// ```
    #[inline]
    pub fn impersonate(&self) -> Result<Impersonation, TokenError> {
        // SAFETY: `self` owns a live token handle.
        if unsafe { ImpersonateLoggedOnUser(self.as_raw_handle()) } == 0 {
            return Err(TokenError::ImpersonateFailed(Win32Error::last(
                "ImpersonateLoggedOnUser",
            )));
        }
        Ok(Impersonation {
            active: true,
            _thread_bound: PhantomData,
        })
    }

    /// Runs `f` while impersonating this token.
    ///
    /// The thread reverts even if `f` panics.
    ///
    /// # Errors
    /// [`TokenError::ImpersonateFailed`] (`f` is not called) or
    /// [`TokenError::RevertFailed`].
    #[inline]
    pub fn run_as<R>(&self, f: impl FnOnce() -> R) -> Result<R, TokenError> {
        let guard = self.impersonate()?;
        let result = f();
        guard.revert()?;
        Ok(result)
    }
}
