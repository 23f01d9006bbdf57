//! Access tokens: acquisition (`OpenProcessToken`, `OpenThreadToken`,
//! `LogonUserW`, `DuplicateToken`), queries (`GetTokenInformation`) and
//! impersonation (`ImpersonateLoggedOnUser`, `RevertToSelf`).
//!
//! The value types are portable, the `Token` handle and its operations
//! are Windows-only.

mod access;
mod error;
mod kinds;
#[cfg(feature = "std")]
mod logon_request;

pub use access::{GroupAttributes, TokenAccess};
pub use error::TokenError;
pub use kinds::{ImpersonationLevel, LogonProvider, LogonType, TokenInformationClass, TokenType};
#[cfg(feature = "std")]
pub use logon_request::LogonRequest;

cfg_if::cfg_if! {
    if #[cfg(all(windows, feature = "std"))] {
        mod get_current_sid;
        mod handle;
        mod impersonation;
        mod information;

        pub use get_current_sid::GetCurrentSid;
        pub use handle::Token;
        pub use impersonation::{Impersonation, revert_to_self};
        pub use information::{TokenGroup, TokenInformation};
    }
}
