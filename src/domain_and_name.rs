//! `DOMAIN\Name` account names.
//!
//! - `DomainAndName` stores parts as `OsString` (Windows-friendly).
//! - `Display` prints as `DOMAIN\Name` using `to_string_lossy()`.
//! - `FromStr` parses with the default policy (exactly one `\`).
//! - Optional validation is controlled by a lightweight `ParsePolicy`.

use core::{
    fmt::{self, Display},
    str::FromStr,
};
use std::ffi::{OsStr, OsString};

use thiserror::Error;

/// Which component an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Component {
    /// The part before the `\`.
    Domain,
    /// The part after the `\`.
    Name,
}

impl Display for Component {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain => f.write_str("domain"),
            Self::Name => f.write_str("name"),
        }
    }
}

/// Parsing/validation errors for `DOMAIN\Name`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainParsingError {
    /// Input did not contain a `\` separator.
    #[error("Missing '\\' separator")]
    MissingSeparator,

    /// Input contained more than one `\` separator.
    #[error("Too many '\\' separators")]
    TooManySeparators,

    /// Left part is empty while policy forbids it.
    #[error("Domain is empty")]
    EmptyDomain,

    /// Right part is empty while policy forbids it.
    #[error("Name is empty")]
    EmptyName,

    /// A component exceeded the configured maximum length.
    #[error("{which} too long: max={max}, actual={actual}")]
    ComponentTooLong {
        /// Offending component.
        which: Component,
        /// Configured limit.
        max: usize,
        /// Measured length.
        actual: usize,
    },

    /// A forbidden code unit was found (e.g., `\` or NUL).
    #[error("Forbidden code unit 0x{unit:02X} in {which} at index {index}")]
    ForbiddenUnit {
        /// Offending component.
        which: Component,
        /// The code unit (UTF-16 on Windows, byte elsewhere).
        unit: u32,
        /// Index of the code unit in the component.
        index: usize,
    },
}

/// Validation policy for account names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParsePolicy {
    /// Allow empty domain (e.g., `\User`)?
    pub allow_empty_domain: bool,
    /// Allow empty name (e.g., `DOMAIN\`)?
    pub allow_empty_name: bool,
    /// Optional max length of each component, counted in UTF-16 code units
    /// on Windows and bytes elsewhere.
    pub max_component_len: Option<usize>,
    /// ASCII code points disallowed in components. NUL is always rejected.
    pub forbidden_ascii: &'static [u8],
}

impl ParsePolicy {
    /// Windows-style `DOMAIN\Name`, the domain may be empty.
    pub const DEFAULT: Self = Self {
        allow_empty_domain: true,
        allow_empty_name: false,
        max_component_len: None,
        forbidden_ascii: b"\\\0",
    };

    /// Names accepted by the local account database: both parts present,
    /// at most `UNLEN` (256) code units each, and `"/[]:|<>+=;,?*@` rejected.
    pub const SAM_ACCOUNT: Self = Self {
        allow_empty_domain: false,
        allow_empty_name: false,
        max_component_len: Some(256),
        forbidden_ascii: b"\\\0\"/[]:|<>+=;,?*@",
    };

    /// Const constructor.
    #[inline]
    #[must_use]
    pub const fn new(
        allow_empty_domain: bool,
        allow_empty_name: bool,
        max_component_len: Option<usize>,
        forbidden_ascii: &'static [u8],
    ) -> Self {
        Self {
            allow_empty_domain,
            allow_empty_name,
            max_component_len,
            forbidden_ascii,
        }
    }

    fn validate_component(&self, which: Component, s: &OsStr) -> Result<(), DomainParsingError> {
        if s.is_empty() {
            let allowed = match which {
                Component::Domain => self.allow_empty_domain,
                Component::Name => self.allow_empty_name,
            };
            return match (allowed, which) {
                (true, _) => Ok(()),
                (false, Component::Domain) => Err(DomainParsingError::EmptyDomain),
                (false, Component::Name) => Err(DomainParsingError::EmptyName),
            };
        }

        let mut len = 0usize;
        for (index, unit) in code_units(s).enumerate() {
            len += 1;
            if unit == 0
                || self
                    .forbidden_ascii
                    .iter()
                    .any(|&b| unit == u32::from(b))
            {
                return Err(DomainParsingError::ForbiddenUnit { which, unit, index });
            }
        }
        match self.max_component_len {
            Some(max) if len > max => Err(DomainParsingError::ComponentTooLong {
                which,
                max,
                actual: len,
            }),
            _ => Ok(()),
        }
    }

    fn validate_pair(&self, domain: &OsStr, name: &OsStr) -> Result<(), DomainParsingError> {
        self.validate_component(Component::Domain, domain)?;
        self.validate_component(Component::Name, name)
    }
}

impl Default for ParsePolicy {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Code units of an `OsStr`: UTF-16 on Windows, raw bytes elsewhere.
fn code_units(s: &OsStr) -> impl Iterator<Item = u32> + '_ {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        s.encode_wide().map(u32::from)
    }
    #[cfg(not(windows))]
    {
        s.as_encoded_bytes().iter().map(|&b| u32::from(b))
    }
}

/// Account name as a `DOMAIN\Name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DomainAndName {
    /// The domain part (before the `\`).
    pub domain: OsString,
    /// The name part (after the `\`).
    pub name: OsString,
}

impl DomainAndName {
    /// Non-validating constructor (domain, then name).
    #[inline]
    pub fn new<D: Into<OsString>, N: Into<OsString>>(domain: D, name: N) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    /// Validating constructor from owned parts.
    ///
    /// # Errors
    /// See [`DomainParsingError`].
    #[inline]
    pub fn try_new_with_policy<D: Into<OsString>, N: Into<OsString>>(
        policy: &ParsePolicy,
        domain: D,
        name: N,
    ) -> Result<Self, DomainParsingError> {
        let this = Self::new(domain, name);
        policy.validate_pair(&this.domain, &this.name)?;
        Ok(this)
    }

    /// Parse `"DOMAIN\Name"` with a specific policy.
    ///
    /// # Errors
    /// See [`DomainParsingError`] and [`ParsePolicy`].
    #[inline]
    pub fn parse_with_policy(policy: &ParsePolicy, s: &str) -> Result<Self, DomainParsingError> {
        let (domain, name) = s
            .split_once('\\')
            .ok_or(DomainParsingError::MissingSeparator)?;
        if name.contains('\\') {
            return Err(DomainParsingError::TooManySeparators);
        }
        policy.validate_pair(OsStr::new(domain), OsStr::new(name))?;
        Ok(Self::new(domain, name))
    }

    /// The `DOMAIN\Name` form expected by `LookupAccountNameW`, or the bare
    /// name when the domain is empty.
    #[inline]
    #[must_use]
    pub fn to_account_name(&self) -> OsString {
        if self.domain.is_empty() {
            return self.name.clone();
        }
        let mut account = OsString::with_capacity(self.domain.len() + self.name.len() + 1);
        account.push(&self.domain);
        account.push("\\");
        account.push(&self.name);
        account
    }
}

impl Display for DomainAndName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\\{}",
            self.domain.to_string_lossy(),
            self.name.to_string_lossy()
        )
    }
}

impl FromStr for DomainAndName {
    type Err = DomainParsingError;

    /// Parses with `ParsePolicy::DEFAULT`.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_policy(&ParsePolicy::DEFAULT, s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::expect_used, reason = "Expect is not an issue in test")]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn default_policy_round_trip(domain in r"[^\x00\\]*", name in r"[^\x00\\]+") {
            let input = format!("{domain}\\{name}");
            let parsed = DomainAndName::from_str(&input).expect("parse failed");
            prop_assert_eq!(parsed.to_string(), input);
            prop_assert_eq!(parsed.domain, OsString::from(&domain));
            prop_assert_eq!(parsed.name, OsString::from(&name));
        }
    }

    #[test]
    fn missing_or_extra_separators() {
        assert_eq!(
            DomainAndName::from_str("NoSlash"),
            Err(DomainParsingError::MissingSeparator)
        );
        assert_eq!(
            DomainAndName::from_str("A\\B\\C"),
            Err(DomainParsingError::TooManySeparators)
        );
    }

    #[test]
    fn empty_segments_by_policy() {
        const P: ParsePolicy = ParsePolicy::new(false, false, None, b"\\\0");
        assert!(DomainAndName::from_str("\\user").is_ok());
        assert_eq!(
            DomainAndName::from_str("DOMAIN\\"),
            Err(DomainParsingError::EmptyName)
        );
        assert_eq!(
            DomainAndName::parse_with_policy(&P, "\\user"),
            Err(DomainParsingError::EmptyDomain)
        );
    }

    #[test]
    fn max_len_and_forbidden_ascii() {
        const P: ParsePolicy = ParsePolicy::new(true, false, Some(5), b"\\\0/");
        assert!(matches!(
            DomainAndName::try_new_with_policy(&P, "LONGER", "ok"),
            Err(DomainParsingError::ComponentTooLong {
                which: Component::Domain,
                max: 5,
                actual: 6
            })
        ));
        assert_eq!(
            DomainAndName::try_new_with_policy(&P, "AC/ME", "john"),
            Err(DomainParsingError::ForbiddenUnit {
                which: Component::Domain,
                unit: u32::from(b'/'),
                index: 2
            })
        );
    }

    #[test]
    fn sam_account_policy() {
        assert!(DomainAndName::parse_with_policy(&ParsePolicy::SAM_ACCOUNT, "HOST\\alice").is_ok());
        assert!(matches!(
            DomainAndName::parse_with_policy(&ParsePolicy::SAM_ACCOUNT, "HOST\\al*ce"),
            Err(DomainParsingError::ForbiddenUnit { which: Component::Name, .. })
        ));
        assert_eq!(
            DomainAndName::parse_with_policy(&ParsePolicy::SAM_ACCOUNT, "\\alice"),
            Err(DomainParsingError::EmptyDomain)
        );
    }

    #[test]
    fn account_name_form() {
        assert_eq!(
            DomainAndName::new("HOST", "alice").to_account_name(),
            OsString::from("HOST\\alice")
        );
        assert_eq!(
            DomainAndName::new("", "alice").to_account_name(),
            OsString::from("alice")
        );
    }
}
