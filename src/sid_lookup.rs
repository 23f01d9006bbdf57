//! Account lookups through `LookupAccountSidW` (SID → name) and
//! `LookupAccountNameW` (name → SID).
//!
//! Both calls use the size-query pattern: a first call with empty buffers
//! fails with `ERROR_INSUFFICIENT_BUFFER` and reports the sizes, the second
//! call fills the buffers. The sizes can grow between the two calls (an
//! account renamed meanwhile), so the fill is retried a few times.

mod account_lookup;
/// Errors of the account lookups.
pub mod error;
mod sid_lookup_operation;

use std::ffi::OsStr;

use num_enum::TryFromPrimitive;
use num_enum::TryFromPrimitiveError;
use widestring::U16CString;

pub use crate::domain_and_name::{Component, DomainAndName, DomainParsingError, ParsePolicy};
pub use crate::sid_type::SidType;
pub use account_lookup::{AccountLookup, lookup_account_name};
pub use error::LookupError;
pub(crate) use sid_lookup_operation::SidLookupOperation;

/// Number of fill attempts after the size query.
pub(crate) const MAX_FILL_ATTEMPTS: usize = 4;

/// Result of a [SID lookup operation](https://learn.microsoft.com/windows/win32/api/winbase/nf-winbase-lookupaccountsidw).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidLookup {
    /// The domain and name associated with the SID.
    pub domain_name: DomainAndName,
    /// The raw SID type value.
    pub sid_type_raw: i32,
}

impl SidLookup {
    /// Get the SID type as an enum.
    ///
    /// # Errors
    /// Return a [`TryFromPrimitiveError<SidType>`] error if the raw SID type value is unknown.
    #[inline]
    pub fn sid_type(&self) -> Result<SidType, TryFromPrimitiveError<SidType>> {
        SidType::try_from_primitive(self.sid_type_raw)
    }
}

/// Encodes an optional machine name, `None` meaning the local machine.
pub(crate) fn machine_name_to_wide(
    machine_name: Option<&OsStr>,
) -> Result<Option<U16CString>, LookupError> {
    machine_name
        .map(|name| U16CString::from_os_str(name).map_err(|_| LookupError::InteriorNul))
        .transpose()
}
