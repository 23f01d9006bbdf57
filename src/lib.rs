//! # Safe bindings to the advapi32 account, SID and token APIs
//!
//! The crate binds the part of the Windows security API used to identify
//! principals and act on their behalf:
//! - [`Sid`]: a `repr(C)` dynamically-sized view matching the Windows SID
//!   in-memory layout (header + trailing `[u32]` sub-authorities).
//! - [`SecurityIdentifier`]: an owned, heap-allocated SID.
//! - [`ConstSid`]: a const-friendly, fixed-size SID (`N` sub-authorities)
//!   used for the [`well_known`] constants.
//! - [`SidIdentifierAuthority`]: the 6-byte authority component of SIDs.
//! - [`DomainAndName`] and [`SidType`]: the `DOMAIN\Name` pair and the
//!   `SID_NAME_USE` kind reported by account lookups.
//! - (Windows) `Token`: access tokens opened from a process or thread,
//!   created by `LogonUserW` or duplicated, their queries and impersonation.
//! - (Windows) `sid_lookup`: `LookupAccountSidW` and `LookupAccountNameW`.
//!
//! ## Errors
//! Every Win32 call follows the `BOOL` convention: on failure the code of
//! `GetLastError` is captured right away in a [`Win32Error`] naming the
//! entry point. Account lookups classify the documented codes in
//! `sid_lookup::LookupError`, token operations report which step failed in
//! a [`TokenError`].
//!
//! ## Logging
//! Failures are logged at `debug` level and buffer-size retries at `trace`
//! level through the `log` facade. Passwords are never logged.
//!
//! ## Features
//! - `std` (default): owned types, account names, Windows bindings.
//! - `alloc`: [`SecurityIdentifier`] without `std`.
//! - `serde`: SIDs as strings in human-readable formats, bytes otherwise.
//! - `windows_result` (default): conversions of [`Win32Error`] into
//!   `windows_result::HRESULT` and `windows_result::Error`.
//!
//! ## Examples
//! ### Create a SID from parts
//! ```rust
//! use win_advapi_security::{SecurityIdentifier, SidIdentifierAuthority};
//!
//! let sid = SecurityIdentifier::try_new(
//!     SidIdentifierAuthority::NT_AUTHORITY,
//!     [32u32, 544u32], // BUILTIN\Administrators => S-1-5-32-544
//! ).expect("valid SID");
//! assert_eq!(sid.to_string(), "S-1-5-32-544");
//! ```
//!
//! ### Use a const SID
//! ```rust
//! use win_advapi_security::{ConstSid, SecurityIdentifier, SidIdentifierAuthority};
//!
//! const ADMIN: ConstSid<2> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);
//!
//! let owned = SecurityIdentifier::from(ADMIN);
//! assert_eq!(owned.to_string(), "S-1-5-32-544");
//! ```
//!
//! ### (Windows) Resolve DOMAIN\\Name of the current user
//! ```no_run
//! # #[cfg(windows)]
//! # {
//! use win_advapi_security::{GetCurrentSid, SecurityIdentifier, SidType};
//!
//! let sid = SecurityIdentifier::get_current_user_sid().unwrap();
//! let lookup = sid.lookup_local_sid().unwrap();
//! println!("{sid} => {}", lookup.domain_name); // e.g. "MACHINE\\User"
//! assert_eq!(lookup.sid_type().ok(), Some(SidType::User));
//! # }
//! ```
//!
//! ### (Windows) Impersonate a user
//! ```no_run
//! # #[cfg(windows)]
//! # {
//! use win_advapi_security::{LogonRequest, Token};
//!
//! let token = Token::logon_user(&LogonRequest::new("alice", "secret").domain(".")).unwrap();
//! let name = token.run_as(win_advapi_security::current_user_name).unwrap().unwrap();
//! assert_eq!(name, "alice");
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

#[cfg(feature = "alloc")]
extern crate alloc;

mod const_sid;
mod error;
mod sid;
mod sid_identifier_authority;
mod sid_ptr;
mod sid_size_info;
mod sid_type;
pub mod token;
pub(crate) mod utils;
pub mod well_known;

#[cfg(feature = "alloc")]
mod security_identifier;

#[cfg(feature = "std")]
mod domain_and_name;

#[cfg(feature = "serde")]
mod serde_impl;

cfg_if::cfg_if! {
    if #[cfg(all(windows, feature = "std"))] {
        mod local_alloc;
        pub mod sid_lookup;
        mod user_name;

        pub use user_name::current_user_name;
        pub use token::{GetCurrentSid, Impersonation, Token, TokenGroup, revert_to_self};
    }
}

pub use const_sid::ConstSid;
pub use error::Win32Error;
pub use parsing::InvalidSidFormat;
pub use sid::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT, Sid};
pub use sid_identifier_authority::SidIdentifierAuthority;
pub(crate) use sid_size_info::SidSizeInfo;
pub use sid_type::SidType;
pub use token::{
    GroupAttributes, ImpersonationLevel, LogonProvider, LogonType, TokenAccess, TokenError,
    TokenInformationClass, TokenType,
};

#[cfg(feature = "alloc")]
pub use security_identifier::SecurityIdentifier;

#[cfg(feature = "std")]
pub use domain_and_name::DomainAndName;
#[cfg(feature = "std")]
pub use token::LogonRequest;

#[cfg(all(test, feature = "alloc"))]
pub(crate) use security_identifier::test::arb_security_identifier;
#[cfg(test)]
pub(crate) use sid_identifier_authority::test::arb_identifier_authority;
