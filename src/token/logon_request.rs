use core::fmt;

use zeroize::Zeroizing;

use super::{LogonProvider, LogonType};

/// Credentials and options for `Token::logon_user` (Windows).
///
/// The password lives in a buffer wiped on drop and is never printed.
///
/// # Examples
/// ```rust
/// use win_advapi_security::{LogonRequest, LogonType};
///
/// let request = LogonRequest::new("svc-backup", "hunter2")
///     .domain("CONTOSO")
///     .logon_type(LogonType::Batch);
/// assert_eq!(request.user(), "svc-backup");
/// assert!(!format!("{request:?}").contains("hunter2"));
/// ```
#[derive(Clone)]
pub struct LogonRequest {
    user: String,
    domain: Option<String>,
    password: Zeroizing<String>,
    logon_type: LogonType,
    provider: LogonProvider,
}

impl LogonRequest {
    /// Interactive logon with the default provider.
    ///
    /// Without a [`domain`](Self::domain), `user` may be a UPN such as
    /// `user@contoso.com`.
    #[inline]
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            domain: None,
            password: Zeroizing::new(password.into()),
            logon_type: LogonType::default(),
            provider: LogonProvider::default(),
        }
    }

    /// Domain of the account, `.` for the local account database.
    #[inline]
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Kind of logon, see [`LogonType`].
    #[inline]
    #[must_use]
    pub const fn logon_type(mut self, logon_type: LogonType) -> Self {
        self.logon_type = logon_type;
        self
    }

    /// Logon provider, see [`LogonProvider`].
    #[inline]
    #[must_use]
    pub const fn provider(mut self, provider: LogonProvider) -> Self {
        self.provider = provider;
        self
    }

    /// The account name.
    #[inline]
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The account domain, if one was set.
    #[inline]
    #[must_use]
    pub fn domain_name(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// The requested logon type.
    #[inline]
    #[must_use]
    pub const fn get_logon_type(&self) -> LogonType {
        self.logon_type
    }

    /// The requested logon provider.
    #[inline]
    #[must_use]
    pub const fn get_provider(&self) -> LogonProvider {
        self.provider
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LogonRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogonRequest")
            .field("user", &self.user)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .field("logon_type", &self.logon_type)
            .field("provider", &self.provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let request = LogonRequest::new("alice@contoso.com", "secret");
        assert_eq!(request.domain_name(), None);
        assert_eq!(request.get_logon_type(), LogonType::Interactive);
        assert_eq!(request.get_provider(), LogonProvider::Default);
        assert_eq!(request.password(), "secret");
    }

    #[test]
    fn builder() {
        let request = LogonRequest::new("alice", "secret")
            .domain(".")
            .logon_type(LogonType::Network)
            .provider(LogonProvider::WinNT50);
        assert_eq!(request.domain_name(), Some("."));
        assert_eq!(request.get_logon_type(), LogonType::Network);
        assert_eq!(request.get_provider(), LogonProvider::WinNT50);
    }

    #[test]
    fn debug_hides_the_password() {
        let request = LogonRequest::new("alice", "correct horse");
        let debug = format!("{request:?}");
        assert!(debug.contains("alice"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("correct horse"));
    }
}
