use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Kind of logon performed by `LogonUserW` (`LOGON32_LOGON_*`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum LogonType {
    /// Interactive user, cached for disconnected operation.
    #[default]
    Interactive = 2,
    /// Network server access, the token is an impersonation token.
    Network = 3,
    /// Batch server, processes run on behalf of a user without interaction.
    Batch = 4,
    /// Service account.
    Service = 5,
    /// Workstation unlock.
    Unlock = 7,
    /// Network logon keeping the credentials for further hops.
    NetworkCleartext = 8,
    /// Clone of the caller's token with new credentials for outbound connections.
    NewCredentials = 9,
}

/// Logon provider used by `LogonUserW` (`LOGON32_PROVIDER_*`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum LogonProvider {
    /// Standard provider for the system.
    #[default]
    Default = 0,
    /// Windows NT 3.5 provider.
    WinNT35 = 1,
    /// NTLM provider.
    WinNT40 = 2,
    /// Negotiate provider.
    WinNT50 = 3,
    /// Virtual accounts.
    Virtual = 4,
}

/// How far a server may act on behalf of a client (`SECURITY_IMPERSONATION_LEVEL`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[repr(i32)]
pub enum ImpersonationLevel {
    /// The server cannot identify nor impersonate the client.
    Anonymous = 0,
    /// The server can identify the client but not impersonate it.
    Identification = 1,
    /// The server can impersonate the client on the local system.
    Impersonation = 2,
    /// The server can impersonate the client on remote systems.
    Delegation = 3,
}

/// Primary or impersonation token (`TOKEN_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum TokenType {
    /// Token attached to a process.
    Primary = 1,
    /// Token attached to an impersonating thread.
    Impersonation = 2,
}

/// Information classes queried with `GetTokenInformation`
/// (`TOKEN_INFORMATION_CLASS`, subset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
#[non_exhaustive]
pub enum TokenInformationClass {
    /// `TOKEN_USER`
    User = 1,
    /// `TOKEN_GROUPS`
    Groups = 2,
    /// `TOKEN_PRIVILEGES`
    Privileges = 3,
    /// `TOKEN_OWNER`
    Owner = 4,
    /// `TOKEN_PRIMARY_GROUP`
    PrimaryGroup = 5,
    /// `TOKEN_DEFAULT_DACL`
    DefaultDacl = 6,
    /// `TOKEN_SOURCE`
    Source = 7,
    /// `TOKEN_TYPE`
    Type = 8,
    /// `SECURITY_IMPERSONATION_LEVEL`
    ImpersonationLevel = 9,
    /// `TOKEN_STATISTICS`
    Statistics = 10,
    /// `TOKEN_GROUPS` of restricting SIDs
    RestrictedSids = 11,
    /// Terminal Services session identifier (`DWORD`)
    SessionId = 12,
    /// `TOKEN_ELEVATION_TYPE`
    ElevationType = 18,
    /// `TOKEN_LINKED_TOKEN`
    LinkedToken = 19,
    /// `TOKEN_ELEVATION`
    Elevation = 20,
    /// `TOKEN_MANDATORY_LABEL`
    IntegrityLevel = 25,
    /// `TOKEN_GROUPS` of the logon SID
    LogonSid = 28,
}

impl fmt::Display for TokenInformationClass {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token")?;
        fmt::Debug::fmt(self, f)
    }
}
