//! Well-known SIDs.
//!
//! Source: <https://learn.microsoft.com/windows/win32/secauthz/well-known-sids>

use crate::{ConstSid, SidIdentifierAuthority};

// ---- Basic Authorities ----

/// Null SID (S-1-0-0)
pub const NULL: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NULL_AUTHORITY, [0]);

/// World / Everyone (S-1-1-0)
pub const WORLD: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::SECURITY_WORLD_AUTHORITY, [0]);

/// Local (S-1-2-0)
pub const LOCAL: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::SECURITY_LOCAL_AUTHORITY, [0]);

/// Console logon (S-1-2-1)
pub const CONSOLE_LOGON: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::SECURITY_LOCAL_AUTHORITY, [1]);

/// Creator Owner (S-1-3-0)
pub const CREATOR_OWNER: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::SECURITY_CREATOR_AUTHORITY, [0]);

/// Creator Group (S-1-3-1)
pub const CREATOR_GROUP: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::SECURITY_CREATOR_AUTHORITY, [1]);

// ---- NT Authority (S-1-5) ----

/// Network logon (S-1-5-2)
pub const NETWORK: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [2]);

/// Batch logon (S-1-5-3)
pub const BATCH: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [3]);

/// Interactive logon (S-1-5-4)
pub const INTERACTIVE: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [4]);

/// Service logon (S-1-5-6)
pub const SERVICE: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [6]);

/// Anonymous logon (S-1-5-7)
pub const ANONYMOUS: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [7]);

/// Authenticated Users (S-1-5-11)
pub const AUTHENTICATED_USERS: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [11]);

/// Local System (S-1-5-18)
pub const LOCAL_SYSTEM: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [18]);

/// Local Service (S-1-5-19)
pub const LOCAL_SERVICE: ConstSid<1> = ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [19]);

/// Network Service (S-1-5-20)
pub const NETWORK_SERVICE: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [20]);

// ---- BUILTIN Domain (S-1-5-32) ----

/// BUILTIN\Administrators (S-1-5-32-544)
pub const BUILTIN_ADMINISTRATORS: ConstSid<2> =
    ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [32, 544]);

/// BUILTIN\Users (S-1-5-32-545)
pub const BUILTIN_USERS: ConstSid<2> =
    ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [32, 545]);

/// BUILTIN\Guests (S-1-5-32-546)
pub const BUILTIN_GUESTS: ConstSid<2> =
    ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [32, 546]);

/// BUILTIN\Power Users (S-1-5-32-547)
pub const BUILTIN_POWER_USERS: ConstSid<2> =
    ConstSid::new(1, SidIdentifierAuthority::NT_AUTHORITY, [32, 547]);

// ---- Mandatory labels (S-1-16) ----

/// Low integrity level (S-1-16-4096)
pub const LOW_MANDATORY_LEVEL: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::MANDATORY_LABEL_AUTHORITY, [0x1000]);

/// Medium integrity level (S-1-16-8192)
pub const MEDIUM_MANDATORY_LEVEL: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::MANDATORY_LABEL_AUTHORITY, [0x2000]);

/// High integrity level (S-1-16-12288)
pub const HIGH_MANDATORY_LEVEL: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::MANDATORY_LABEL_AUTHORITY, [0x3000]);

/// System integrity level (S-1-16-16384)
pub const SYSTEM_MANDATORY_LEVEL: ConstSid<1> =
    ConstSid::new(1, SidIdentifierAuthority::MANDATORY_LABEL_AUTHORITY, [0x4000]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_forms() {
        assert_eq!(NULL.to_string(), "S-1-0-0");
        assert_eq!(WORLD.to_string(), "S-1-1-0");
        assert_eq!(AUTHENTICATED_USERS.to_string(), "S-1-5-11");
        assert_eq!(BUILTIN_POWER_USERS.to_string(), "S-1-5-32-547");
        assert_eq!(HIGH_MANDATORY_LEVEL.to_string(), "S-1-16-12288");
    }
}
