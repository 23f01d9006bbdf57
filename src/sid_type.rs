use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Values specify the type of a Security Identifier (SID) returned by
/// `LookupAccountSidW` and `LookupAccountNameW`.
///
/// See Microsoft docs for [SID_NAME_USE](https://learn.microsoft.com/windows/win32/api/winnt/ne-winnt-sid_name_use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum SidType {
    /// A SID for a user account.
    User = 1,

    /// A SID for a group account.
    Group = 2,

    /// A SID that identifies a domain.
    Domain = 3,

    /// A SID for an alias (local group).
    Alias = 4,

    /// A well-known group SID (e.g., Everyone, LocalSystem).
    WellKnownGroup = 5,

    /// A SID for an account that has been deleted.
    DeletedAccount = 6,

    /// An invalid SID (not a valid account/domain SID).
    Invalid = 7,

    /// A SID of unknown type (could not be determined).
    Unknown = 8,

    /// A SID that identifies a computer (machine account).
    Computer = 9,

    /// A mandatory integrity label SID.
    Label = 10,

    /// A logon session SID.
    LogonSession = 11,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values() {
        assert_eq!(SidType::try_from(1).ok(), Some(SidType::User));
        assert_eq!(SidType::try_from(2).ok(), Some(SidType::Group));
        assert_eq!(i32::from(SidType::LogonSession), 11);
        assert!(SidType::try_from(0).is_err());
        assert!(SidType::try_from(12).is_err());
    }

    #[cfg(all(windows, feature = "std"))]
    #[test]
    fn matches_windows_constants() {
        use windows_sys::Win32::Security::{SidTypeAlias, SidTypeLabel, SidTypeUser};
        assert_eq!(i32::from(SidType::User), SidTypeUser);
        assert_eq!(i32::from(SidType::Alias), SidTypeAlias);
        assert_eq!(i32::from(SidType::Label), SidTypeLabel);
    }
}
