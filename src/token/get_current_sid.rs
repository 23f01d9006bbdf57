use super::{Token, TokenAccess, TokenError};
use crate::Sid;

/// Reads the user SID of the running code into any type built from a `&Sid`.
pub trait GetCurrentSid: Sized
where
    for<'a> &'a Sid: Into<Self>,
{
    /// Retrieves the current user's SID from the process token.
    ///
    /// # Errors
    /// Returns a `TokenError` when opening the token or querying it fails.
    ///
    /// # Examples
    /// ```no_run
    /// # #[cfg(windows)]
    /// # {
    /// use win_advapi_security::{GetCurrentSid, SecurityIdentifier};
    /// let sid = SecurityIdentifier::get_current_user_sid().unwrap();
    /// println!("{}", sid);
    /// # }
    /// ```
    #[inline]
    fn get_current_user_sid() -> Result<Self, TokenError> {
        Token::current_process(TokenAccess::QUERY)?.with_user(|sid| sid.into())
    }

    /// Retrieves the SID of the user the calling thread acts as: the
    /// impersonated user when the thread impersonates, the process user
    /// otherwise.
    ///
    /// # Errors
    /// Returns a `TokenError` when opening the token or querying it fails.
    #[inline]
    fn get_effective_user_sid() -> Result<Self, TokenError> {
        Token::effective(TokenAccess::QUERY)?.with_user(|sid| sid.into())
    }
}

impl<T> GetCurrentSid for T
where
    T: Sized,
    for<'a> &'a Sid: Into<T>,
{
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::SecurityIdentifier;

    #[test]
    fn effective_matches_process_without_impersonation() {
        let process = SecurityIdentifier::get_current_user_sid().unwrap();
        let effective = SecurityIdentifier::get_effective_user_sid().unwrap();
        assert_eq!(process, effective);
    }

    #[test]
    fn current_sid_resolves_to_the_current_user() {
        let sid = SecurityIdentifier::get_current_user_sid().unwrap();
        let lookup = sid.lookup_local_sid().unwrap();
        let name = crate::current_user_name().unwrap();
        assert!(
            lookup
                .domain_name
                .name
                .to_string_lossy()
                .eq_ignore_ascii_case(&name.to_string_lossy())
        );
    }
}
